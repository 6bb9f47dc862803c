use serde::Serialize;

use crate::approve_command::is_automation_login;
use crate::approve_comment::ApprovalComment;
use crate::github_client::ApproveGithubClient;

/// Marker every status notification starts with.
pub const APPROVAL_NOTIFICATION_NAME: &str = "APPROVALNOTIFIER";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
/// Enumerates supported `NotificationOutcome` values.
pub enum NotificationOutcome {
    Unchanged,
    Replaced {
        deleted: usize,
        failed_deletes: usize,
        posted: bool,
    },
}

/// Return true when `comment` is a status notification posted by automation.
pub fn is_approval_notification(comment: &ApprovalComment, bot_login: &str) -> bool {
    if !is_automation_login(&comment.author, bot_login) {
        return false;
    }
    let marker = format!("[{APPROVAL_NOTIFICATION_NAME}]");
    comment
        .body
        .get(..marker.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(&marker))
}

pub fn collect_approval_notifications(
    comments: &[ApprovalComment],
    bot_login: &str,
) -> Vec<ApprovalComment> {
    comments
        .iter()
        .filter(|comment| is_approval_notification(comment, bot_login))
        .cloned()
        .collect()
}

/// Decides whether a freshly rendered message must replace the posted one.
///
/// Returns the message to post, or `None` when nothing should change.
pub fn plan_notification_update(
    latest: Option<&ApprovalComment>,
    rendered: Option<String>,
) -> Option<String> {
    let message = rendered?;
    if latest.is_some_and(|comment| comment.body.contains(&message)) {
        return None;
    }
    Some(message)
}

/// Replaces stale notifications with `message`.
///
/// Every existing notification is deleted before the single post. Failures
/// are logged and never abort the reconciliation pass.
pub async fn reconcile_notification(
    client: &dyn ApproveGithubClient,
    org: &str,
    repo: &str,
    number: u64,
    notifications: &[ApprovalComment],
    rendered: Option<String>,
) -> NotificationOutcome {
    let Some(message) = plan_notification_update(notifications.last(), rendered) else {
        return NotificationOutcome::Unchanged;
    };

    let mut deleted = 0_usize;
    let mut failed_deletes = 0_usize;
    for notification in notifications {
        match client.delete_comment(org, repo, notification.id).await {
            Ok(()) => deleted = deleted.saturating_add(1),
            Err(error) => {
                failed_deletes = failed_deletes.saturating_add(1);
                tracing::error!(
                    org,
                    repo,
                    number,
                    comment_id = notification.id,
                    error = %error,
                    "failed to delete approval notification"
                );
            }
        }
    }

    let posted = match client.create_comment(org, repo, number, &message).await {
        Ok(()) => true,
        Err(error) => {
            tracing::error!(
                org,
                repo,
                number,
                message = %message,
                error = %error,
                "failed to create approval notification"
            );
            false
        }
    };

    NotificationOutcome::Replaced {
        deleted,
        failed_deletes,
        posted,
    }
}
