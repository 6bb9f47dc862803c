#![no_main]

use libfuzzer_sys::fuzz_target;
use tau_github_approve::approve_event_gate::{
    generic_comment_trigger, pull_request_trigger, ApproveTrigger, GenericCommentEvent,
    GithubIssueCommentEvent, GithubPullRequestEvent,
};

fuzz_target!(|data: &[u8]| {
    if let Ok(event) = serde_json::from_slice::<GithubIssueCommentEvent>(data) {
        let trigger =
            generic_comment_trigger(&GenericCommentEvent::from_issue_comment(&event), "fuzz-bot");
        if let ApproveTrigger::Reconcile(state) = trigger {
            assert_eq!(state.number, event.issue.number);
            assert_ne!(event.issue.state, "closed");
        }
    }
    if let Ok(event) = serde_json::from_slice::<GithubPullRequestEvent>(data) {
        if let ApproveTrigger::Reconcile(state) = pull_request_trigger(&event, "fuzz-bot") {
            assert_eq!(state.number, event.number);
            if event.action == "labeled" {
                assert_ne!(event.sender.login, "fuzz-bot");
            }
        }
    }
});
