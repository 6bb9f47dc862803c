//! One reconciliation pass for a single pull request.
//!
//! Reads happen first and any read failure aborts the pass before a label or
//! comment is touched. Mutations afterwards are logged on failure and never
//! escalate, since the next triggering event converges again.

use serde::Serialize;
use thiserror::Error;

use crate::approval_tracker::{ApprovalAuthority, ApprovalTrackerSettings};
use crate::approve_applier::{apply_approve_commands, register_assignees};
use crate::approve_command::collect_approve_commands;
use crate::approve_comment::{comments_from_issue_comments, unify_comment_timeline};
use crate::approve_notification::{
    collect_approval_notifications, reconcile_notification, NotificationOutcome,
};
use crate::associated_issue::find_associated_issue;
use crate::github_client::ApproveGithubClient;
use crate::label_provenance::resolve_human_added_label;
use crate::label_sync::{approved_label_transition, has_label, LabelTransition, APPROVED_LABEL};
use crate::repo_options::ApproveRepoOptions;

#[derive(Debug, Error)]
/// Enumerates supported `ReconcileError` values.
pub enum ReconcileError {
    #[error("failed to get {resource} for {org}/{repo}#{number}: {source:#}")]
    Fetch {
        resource: &'static str,
        org: String,
        repo: String,
        number: u64,
        #[source]
        source: anyhow::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Pull request facts carried by the triggering event.
pub struct PullRequestApprovalState {
    pub org: String,
    pub repo: String,
    pub number: u64,
    pub body: String,
    pub author: String,
    pub assignees: Vec<String>,
    pub html_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Summary of what one pass observed and changed.
pub struct ReconcileReport {
    pub approved: bool,
    pub associated_issue: u64,
    pub commands_applied: usize,
    pub human_added_label: bool,
    pub notification: NotificationOutcome,
    pub label: LabelTransition,
    pub label_mutation_succeeded: bool,
}

/// Reconciles approval commands, the status notification and the `approved` label.
#[tracing::instrument(
    level = "debug",
    skip(client, authority, options, state),
    fields(org = %state.org, repo = %state.repo, number = state.number)
)]
pub async fn reconcile_pull_request_approval(
    client: &dyn ApproveGithubClient,
    authority: &dyn ApprovalAuthority,
    options: &ApproveRepoOptions,
    state: &PullRequestApprovalState,
) -> Result<ReconcileReport, ReconcileError> {
    let (org, repo, number) = (state.org.as_str(), state.repo.as_str(), state.number);
    let fetch_error = move |resource: &'static str| {
        move |source: anyhow::Error| ReconcileError::Fetch {
            resource,
            org: org.to_string(),
            repo: repo.to_string(),
            number,
            source,
        }
    };

    let changed_paths = client
        .list_changed_files(org, repo, number)
        .await
        .map_err(fetch_error("PR file changes"))?;
    let labels = client
        .list_labels(org, repo, number)
        .await
        .map_err(fetch_error("issue labels"))?;
    let has_approved_label = has_label(&labels, APPROVED_LABEL);
    let bot_login = client
        .bot_login()
        .await
        .map_err(fetch_error("bot name"))?;
    let issue_comments = client
        .list_issue_comments(org, repo, number)
        .await
        .map_err(fetch_error("issue comments"))?;
    let review_comments = client
        .list_review_comments(org, repo, number)
        .await
        .map_err(fetch_error("review comments"))?;
    let reviews = client
        .list_reviews(org, repo, number)
        .await
        .map_err(fetch_error("reviews"))?;
    let human_added_label = resolve_human_added_label(
        client,
        org,
        repo,
        number,
        APPROVED_LABEL,
        &bot_login,
        has_approved_label,
    )
    .await
    .map_err(fetch_error("issue events"))?;

    let associated_issue = find_associated_issue(&state.body);
    let mut tracker = authority.tracker_for(
        &changed_paths,
        ApprovalTrackerSettings {
            org: org.to_string(),
            repo: repo.to_string(),
            number,
            pull_request_author: state.author.clone(),
            associated_issue,
            require_issue: options.issue_required,
            allow_self_approval: options.implicit_self_approve,
            manually_approved: human_added_label,
        },
    );
    if options.implicit_self_approve {
        tracker.add_author_self_approver(&state.author, &format!("{}#", state.html_url), false);
    }

    let timeline = unify_comment_timeline(&issue_comments, &review_comments, &reviews);
    let commands = collect_approve_commands(&timeline, &bot_login);
    let commands_applied = apply_approve_commands(tracker.as_mut(), &commands, &state.author);
    register_assignees(
        tracker.as_mut(),
        state.assignees.iter().map(String::as_str),
    );

    let notifications =
        collect_approval_notifications(&comments_from_issue_comments(&issue_comments), &bot_login);
    let notification = reconcile_notification(
        client,
        org,
        repo,
        number,
        &notifications,
        tracker.render_message(),
    )
    .await;

    let approved = tracker.is_approved();
    let label = approved_label_transition(approved, has_approved_label);
    let label_mutation_succeeded = match label {
        LabelTransition::Add => match client.add_label(org, repo, number, APPROVED_LABEL).await {
            Ok(()) => true,
            Err(error) => {
                tracing::error!(
                    org,
                    repo,
                    number,
                    label = APPROVED_LABEL,
                    error = %error,
                    "failed to add approval label"
                );
                false
            }
        },
        LabelTransition::Remove => {
            match client.remove_label(org, repo, number, APPROVED_LABEL).await {
                Ok(()) => true,
                Err(error) => {
                    tracing::error!(
                        org,
                        repo,
                        number,
                        label = APPROVED_LABEL,
                        error = %error,
                        "failed to remove approval label"
                    );
                    false
                }
            }
        }
        LabelTransition::Unchanged => true,
    };

    tracing::debug!(
        approved,
        commands_applied,
        human_added_label,
        label = label.as_str(),
        "approval reconciliation finished"
    );
    Ok(ReconcileReport {
        approved,
        associated_issue,
        commands_applied,
        human_added_label,
        notification,
        label,
        label_mutation_succeeded,
    })
}
