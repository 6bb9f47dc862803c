use anyhow::Result;

use crate::approve_command::is_automation_login;
use crate::github_client::{ApproveGithubClient, GithubIssueEvent};

const LABELED_EVENT: &str = "labeled";

/// Return true when the most recent `labeled` event for `label` has a human actor.
pub fn label_added_by_human(events: &[GithubIssueEvent], label: &str, bot_login: &str) -> bool {
    let last_added = events.iter().rev().find(|event| {
        event.event == LABELED_EVENT
            && event
                .label
                .as_ref()
                .is_some_and(|event_label| event_label.name == label)
    });
    let actor = last_added
        .and_then(|event| event.actor.as_ref())
        .map(|actor| actor.login.as_str())
        .unwrap_or_default();
    !actor.is_empty() && !is_automation_login(actor, bot_login)
}

/// Resolves label provenance once for a reconciliation pass.
///
/// An absent label short-circuits to `false` without fetching the event
/// history. The returned value is threaded into the tracker settings; it is
/// never cached beyond the pass.
pub async fn resolve_human_added_label(
    client: &dyn ApproveGithubClient,
    org: &str,
    repo: &str,
    number: u64,
    label: &str,
    bot_login: &str,
    has_label: bool,
) -> Result<bool> {
    if !has_label {
        return Ok(false);
    }
    let events = client.list_issue_events(org, repo, number).await?;
    Ok(label_added_by_human(&events, label, bot_login))
}
