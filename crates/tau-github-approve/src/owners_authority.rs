//! Static OWNERS-map approval authority.
//!
//! Maps repository directories to approver logins. A changed path is owned by
//! the approvers of its nearest listed ancestor directory; the empty string
//! (or `.`) is the repository root.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::approval_tracker::{ApprovalAuthority, ApprovalTracker, ApprovalTrackerSettings};
use crate::approve_notification::APPROVAL_NOTIFICATION_NAME;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
/// On-disk shape of the owners map.
pub struct OwnersFile {
    #[serde(default)]
    pub approvers: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ApprovalKind {
    Approved,
    Lgtm,
    SelfApproved,
}

impl ApprovalKind {
    fn title(&self) -> &'static str {
        match self {
            Self::Approved => "Approved",
            Self::Lgtm => "LGTM",
            Self::SelfApproved => "Author self-approved",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Approval {
    login: String,
    reference: String,
    kind: ApprovalKind,
    no_issue: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct OwnedPath {
    owners_dir: Option<String>,
    owners: BTreeSet<String>,
}

fn normalize_owners_dir(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed == "." {
        String::new()
    } else {
        trimmed.to_string()
    }
}

fn normalize_login(raw: &str) -> String {
    raw.trim().trim_start_matches('@').to_ascii_lowercase()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Public struct `OwnersApprovalAuthority` used across Tau components.
pub struct OwnersApprovalAuthority {
    approvers: BTreeMap<String, BTreeSet<String>>,
}

impl OwnersApprovalAuthority {
    pub fn new(file: OwnersFile) -> Self {
        let mut approvers: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (dir, logins) in file.approvers {
            let entry = approvers.entry(normalize_owners_dir(&dir)).or_default();
            entry.extend(
                logins
                    .iter()
                    .map(|login| normalize_login(login))
                    .filter(|login| !login.is_empty()),
            );
        }
        Self { approvers }
    }

    /// Nearest listed ancestor directory of `path`, if any.
    pub fn owners_dir_for(&self, path: &str) -> Option<&str> {
        let mut current = path.trim_matches('/');
        loop {
            current = match current.rfind('/') {
                Some(index) => &current[..index],
                None if current.is_empty() => return None,
                None => "",
            };
            if let Some((dir, _)) = self.approvers.get_key_value(current) {
                return Some(dir.as_str());
            }
            if current.is_empty() {
                return None;
            }
        }
    }

    fn owned_path(&self, path: &str) -> OwnedPath {
        let owners_dir = self.owners_dir_for(path).map(ToOwned::to_owned);
        let owners = owners_dir
            .as_ref()
            .and_then(|dir| self.approvers.get(dir))
            .cloned()
            .unwrap_or_default();
        OwnedPath {
            owners_dir,
            owners,
        }
    }

    pub fn tracker(
        &self,
        changed_paths: &[String],
        settings: ApprovalTrackerSettings,
    ) -> OwnersApprovalTracker {
        OwnersApprovalTracker {
            paths: changed_paths
                .iter()
                .map(|path| self.owned_path(path))
                .collect(),
            settings,
            approvals: BTreeMap::new(),
            assignees: BTreeSet::new(),
        }
    }
}

impl ApprovalAuthority for OwnersApprovalAuthority {
    fn tracker_for(
        &self,
        changed_paths: &[String],
        settings: ApprovalTrackerSettings,
    ) -> Box<dyn ApprovalTracker> {
        Box::new(self.tracker(changed_paths, settings))
    }
}

#[derive(Debug, Clone)]
/// Tracker produced by [`OwnersApprovalAuthority`].
pub struct OwnersApprovalTracker {
    settings: ApprovalTrackerSettings,
    paths: Vec<OwnedPath>,
    approvals: BTreeMap<String, Approval>,
    assignees: BTreeSet<String>,
}

impl OwnersApprovalTracker {
    /// Logins whose `/approve` (or counted self-approval) is in effect.
    pub fn approvers(&self) -> Vec<&str> {
        self.logins_with(|kind| matches!(kind, ApprovalKind::Approved | ApprovalKind::SelfApproved))
    }

    pub fn lgtmers(&self) -> Vec<&str> {
        self.logins_with(|kind| kind == ApprovalKind::Lgtm)
    }

    pub fn assignees(&self) -> Vec<&str> {
        self.assignees.iter().map(String::as_str).collect()
    }

    fn logins_with(&self, keep: impl Fn(ApprovalKind) -> bool) -> Vec<&str> {
        self.approvals
            .values()
            .filter(|approval| keep(approval.kind))
            .map(|approval| approval.login.as_str())
            .collect()
    }

    fn is_author(&self, login: &str) -> bool {
        normalize_login(login) == normalize_login(&self.settings.pull_request_author)
    }

    fn record(&mut self, login: &str, reference: &str, no_issue: bool, kind: ApprovalKind) {
        if self.is_author(login) && !self.settings.allow_self_approval {
            return;
        }
        self.approvals.insert(
            normalize_login(login),
            Approval {
                login: login.to_string(),
                reference: reference.to_string(),
                kind,
                no_issue,
            },
        );
    }

    fn path_is_approved(&self, path: &OwnedPath) -> bool {
        path.owners
            .iter()
            .any(|owner| self.approvals.contains_key(owner))
    }

    fn issue_requirement_met(&self) -> bool {
        !self.settings.require_issue
            || self.settings.associated_issue != 0
            || self.approvals.values().any(|approval| approval.no_issue)
    }

    fn unapproved_owner_dirs(&self) -> BTreeSet<&str> {
        self.paths
            .iter()
            .filter(|path| !self.path_is_approved(path))
            .map(|path| path.owners_dir.as_deref().unwrap_or_default())
            .collect()
    }

    fn suggested_approvers(&self) -> Vec<String> {
        let mut suggested = BTreeSet::new();
        for path in self.paths.iter().filter(|path| !self.path_is_approved(path)) {
            let assigned = path
                .owners
                .iter()
                .find(|owner| self.assignees.contains(*owner));
            if let Some(owner) = assigned.or_else(|| path.owners.iter().next()) {
                suggested.insert(owner.clone());
            }
        }
        suggested.into_iter().collect()
    }
}

impl ApprovalTracker for OwnersApprovalTracker {
    fn add_approver(&mut self, login: &str, reference: &str, no_issue: bool) {
        self.record(login, reference, no_issue, ApprovalKind::Approved);
    }

    fn add_author_self_approver(&mut self, login: &str, reference: &str, no_issue: bool) {
        self.record(login, reference, no_issue, ApprovalKind::SelfApproved);
    }

    fn add_lgtmer(&mut self, login: &str, reference: &str, no_issue: bool) {
        self.record(login, reference, no_issue, ApprovalKind::Lgtm);
    }

    fn remove_approver(&mut self, login: &str) {
        self.approvals.remove(&normalize_login(login));
    }

    fn add_assignee(&mut self, login: &str) {
        let login = normalize_login(login);
        if !login.is_empty() {
            self.assignees.insert(login);
        }
    }

    fn is_approved(&self) -> bool {
        if self.settings.manually_approved {
            return true;
        }
        self.paths.iter().all(|path| self.path_is_approved(path)) && self.issue_requirement_met()
    }

    fn render_message(&self) -> Option<String> {
        if self.paths.is_empty() {
            return None;
        }
        let status = if self.is_approved() {
            "APPROVED"
        } else {
            "NOT APPROVED"
        };
        let mut lines = vec![format!(
            "[{APPROVAL_NOTIFICATION_NAME}] This PR is **{status}**"
        )];
        lines.push(String::new());

        if self.approvals.is_empty() {
            lines.push("This pull-request has not been approved by anyone yet.".to_string());
        } else {
            let approved_by = self
                .approvals
                .values()
                .map(|approval| {
                    format!(
                        "*<a href=\"{}\" title=\"{}\">{}</a>*",
                        approval.reference,
                        approval.kind.title(),
                        approval.login
                    )
                })
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(format!("This pull-request has been approved by: {approved_by}"));
        }
        if self.settings.manually_approved {
            lines.push("The `approved` label was applied manually.".to_string());
        }

        if self.settings.associated_issue != 0 {
            lines.push(String::new());
            lines.push(format!(
                "Associated issue: *#{}*",
                self.settings.associated_issue
            ));
        } else if self.settings.require_issue {
            lines.push(String::new());
            lines.push(
                "*No associated issue*. Update pull-request body to add a reference to an issue, or get approval with `/approve no-issue`".to_string(),
            );
        }

        let unapproved = self.unapproved_owner_dirs();
        if !unapproved.is_empty() {
            lines.push(String::new());
            lines.push("Needs approval from an approver in each of these files:".to_string());
            for dir in &unapproved {
                let owners_path = if dir.is_empty() {
                    "OWNERS".to_string()
                } else {
                    format!("{dir}/OWNERS")
                };
                lines.push(format!(
                    "- **[{owners_path}](https://github.com/{}/{}/blob/HEAD/{owners_path})**",
                    self.settings.org, self.settings.repo
                ));
            }
        }

        let suggested = self.suggested_approvers();
        if !suggested.is_empty() {
            let mentions = suggested
                .iter()
                .map(|login| format!("@{login}"))
                .collect::<Vec<_>>()
                .join(" ");
            lines.push(String::new());
            lines.push(format!(
                "Assign the PR to them by writing `/assign {mentions}` in a comment when ready."
            ));
        }

        lines.push(String::new());
        lines.push(format!(
            "<!-- META={} -->",
            json!({ "approvers": suggested })
        ));
        Some(lines.join("\n"))
    }
}
