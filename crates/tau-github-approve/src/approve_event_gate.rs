//! Webhook payload shapes and the decision whether an event starts a pass.

use serde::{Deserialize, Serialize};

use crate::approve_command::comment_has_approval_command;
use crate::approve_comment::GithubUser;
use crate::github_client::GithubLabel;
use crate::label_sync::APPROVED_LABEL;
use crate::reconcile::PullRequestApprovalState;

const CLOSED_STATE: &str = "closed";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// Repository fields shared by every webhook kind.
pub struct GithubRepository {
    pub name: String,
    pub owner: GithubUser,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// Pull request (or issue) fields shared by every webhook kind.
pub struct GithubPullRequestPayload {
    pub number: u64,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub user: GithubUser,
    #[serde(default)]
    pub assignees: Vec<GithubUser>,
    /// Present on issue payloads when the issue is a pull request.
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// Comment body carried by comment and review webhooks.
pub struct GithubCommentPayload {
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub user: GithubUser,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// `issue_comment` webhook.
pub struct GithubIssueCommentEvent {
    pub action: String,
    pub issue: GithubPullRequestPayload,
    pub comment: GithubCommentPayload,
    pub repository: GithubRepository,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// `pull_request_review` webhook.
pub struct GithubReviewEvent {
    pub action: String,
    pub pull_request: GithubPullRequestPayload,
    pub review: GithubCommentPayload,
    pub repository: GithubRepository,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// `pull_request_review_comment` webhook.
pub struct GithubReviewCommentEvent {
    pub action: String,
    pub pull_request: GithubPullRequestPayload,
    pub comment: GithubCommentPayload,
    pub repository: GithubRepository,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// `pull_request` webhook.
pub struct GithubPullRequestEvent {
    pub action: String,
    pub number: u64,
    pub pull_request: GithubPullRequestPayload,
    #[serde(default)]
    pub label: Option<GithubLabel>,
    #[serde(default)]
    pub sender: GithubUser,
    pub repository: GithubRepository,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Comment created on a pull request from any of the three comment sources.
pub struct GenericCommentEvent {
    pub created: bool,
    pub is_pull_request: bool,
    pub body: String,
    pub author: String,
    pub pull_request: PullRequestApprovalState,
    pub pull_request_state: String,
}

impl GenericCommentEvent {
    pub fn from_issue_comment(event: &GithubIssueCommentEvent) -> Self {
        Self {
            created: event.action == "created",
            is_pull_request: event.issue.pull_request.is_some(),
            body: event.comment.body.clone().unwrap_or_default(),
            author: event.comment.user.login.clone(),
            pull_request: approval_state(&event.repository, event.issue.number, &event.issue),
            pull_request_state: event.issue.state.clone(),
        }
    }

    pub fn from_review(event: &GithubReviewEvent) -> Self {
        Self {
            created: event.action == "submitted",
            is_pull_request: true,
            body: event.review.body.clone().unwrap_or_default(),
            author: event.review.user.login.clone(),
            pull_request: approval_state(
                &event.repository,
                event.pull_request.number,
                &event.pull_request,
            ),
            pull_request_state: event.pull_request.state.clone(),
        }
    }

    pub fn from_review_comment(event: &GithubReviewCommentEvent) -> Self {
        Self {
            created: event.action == "created",
            is_pull_request: true,
            body: event.comment.body.clone().unwrap_or_default(),
            author: event.comment.user.login.clone(),
            pull_request: approval_state(
                &event.repository,
                event.pull_request.number,
                &event.pull_request,
            ),
            pull_request_state: event.pull_request.state.clone(),
        }
    }
}

/// Per-pass input for `payload`, the pull request numbered `number` in `repository`.
pub fn approval_state(
    repository: &GithubRepository,
    number: u64,
    payload: &GithubPullRequestPayload,
) -> PullRequestApprovalState {
    PullRequestApprovalState {
        org: repository.owner.login.clone(),
        repo: repository.name.clone(),
        number,
        body: payload.body.clone().unwrap_or_default(),
        author: payload.user.login.clone(),
        assignees: payload
            .assignees
            .iter()
            .map(|user| user.login.clone())
            .collect(),
        html_url: payload.html_url.clone(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Enumerates supported `ApproveTrigger` values.
pub enum ApproveTrigger {
    Reconcile(Box<PullRequestApprovalState>),
    Skip { reason_code: &'static str },
}

impl ApproveTrigger {
    fn skip(reason_code: &'static str) -> Self {
        Self::Skip { reason_code }
    }
}

/// Comment events only start a pass for new approval commands on open PRs.
pub fn generic_comment_trigger(event: &GenericCommentEvent, bot_login: &str) -> ApproveTrigger {
    if !event.created {
        return ApproveTrigger::skip("skip_comment_not_created");
    }
    if !event.is_pull_request {
        return ApproveTrigger::skip("skip_comment_not_pull_request");
    }
    if event.pull_request_state == CLOSED_STATE {
        return ApproveTrigger::skip("skip_pull_request_closed");
    }
    if !comment_has_approval_command(&event.body, &event.author, bot_login) {
        return ApproveTrigger::skip("skip_comment_without_approval_command");
    }
    ApproveTrigger::Reconcile(Box::new(event.pull_request.clone()))
}

/// Pull request events start a pass on open/reopen/push and on manual labeling.
pub fn pull_request_trigger(event: &GithubPullRequestEvent, bot_login: &str) -> ApproveTrigger {
    match event.action.as_str() {
        "opened" | "reopened" | "synchronize" => {}
        "labeled" => {
            let label = event
                .label
                .as_ref()
                .map(|label| label.name.as_str())
                .unwrap_or_default();
            if label != APPROVED_LABEL {
                return ApproveTrigger::skip("skip_label_not_approved");
            }
            if event.sender.login == bot_login {
                return ApproveTrigger::skip("skip_label_applied_by_bot");
            }
            if event.pull_request.state == CLOSED_STATE {
                return ApproveTrigger::skip("skip_pull_request_closed");
            }
        }
        _ => return ApproveTrigger::skip("skip_pull_request_action_ignored"),
    }
    ApproveTrigger::Reconcile(Box::new(approval_state(
        &event.repository,
        event.number,
        &event.pull_request,
    )))
}
