//! Seams between the reconciliation pass and the approval authority.
//!
//! The reconciliation pass only feeds commands into an [`ApprovalTracker`]
//! and asks it two questions: whether the request is approved and what the
//! status notification should say. Which logins may approve which paths is
//! the authority's business.

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Per-pass inputs handed to the authority when a tracker is built.
pub struct ApprovalTrackerSettings {
    pub org: String,
    pub repo: String,
    pub number: u64,
    pub pull_request_author: String,
    pub associated_issue: u64,
    pub require_issue: bool,
    pub allow_self_approval: bool,
    pub manually_approved: bool,
}

/// Mutable sink for approval commands and source of the approval predicate.
///
/// `add_*` and `remove_approver` overwrite per login, so replaying a timeline
/// in order leaves each author's last command in effect.
pub trait ApprovalTracker: Send {
    fn add_approver(&mut self, login: &str, reference: &str, no_issue: bool);

    /// Records the request author's approval of their own pull request.
    fn add_author_self_approver(&mut self, login: &str, reference: &str, no_issue: bool);

    fn add_lgtmer(&mut self, login: &str, reference: &str, no_issue: bool);

    fn remove_approver(&mut self, login: &str);

    fn add_assignee(&mut self, login: &str);

    fn is_approved(&self) -> bool;

    /// Renders the status notification, or `None` when there is nothing to report.
    fn render_message(&self) -> Option<String>;
}

/// Builds a tracker scoped to one pull request's changed paths.
pub trait ApprovalAuthority: Send + Sync {
    fn tracker_for(
        &self,
        changed_paths: &[String],
        settings: ApprovalTrackerSettings,
    ) -> Box<dyn ApprovalTracker>;
}
