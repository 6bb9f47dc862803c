use crate::approval_tracker::ApprovalTracker;
use crate::approve_command::{ApproveCommand, ApproveCommandName};

/// Replays commands in timeline order against the tracker.
///
/// `cancel` removes the author regardless of command name. The request
/// author's own commands are additionally recorded as self-approval so the
/// tracker can gate them. Returns the number of commands applied.
pub fn apply_approve_commands(
    tracker: &mut dyn ApprovalTracker,
    commands: &[ApproveCommand],
    pull_request_author: &str,
) -> usize {
    let mut applied = 0_usize;
    for command in commands {
        if command.author.is_empty() {
            continue;
        }
        applied = applied.saturating_add(1);
        if command.argument.is_cancel() {
            tracker.remove_approver(&command.author);
            continue;
        }

        let no_issue = command.argument.is_no_issue();
        if command.author == pull_request_author {
            tracker.add_author_self_approver(&command.author, &command.html_url, no_issue);
        }
        match command.name {
            ApproveCommandName::Approve => {
                tracker.add_approver(&command.author, &command.html_url, no_issue)
            }
            ApproveCommandName::Lgtm => {
                tracker.add_lgtmer(&command.author, &command.html_url, no_issue)
            }
        }
    }
    applied
}

/// Registers every assignee; assignees inform rendering, not approval.
pub fn register_assignees<'a>(
    tracker: &mut dyn ApprovalTracker,
    assignees: impl IntoIterator<Item = &'a str>,
) {
    for login in assignees {
        tracker.add_assignee(login);
    }
}
