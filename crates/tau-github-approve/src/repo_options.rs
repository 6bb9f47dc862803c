use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
/// Approval policy applied to the organizations or repositories it lists.
pub struct ApproveRepoOptions {
    /// Organization names (`org`) or full names (`org/repo`).
    #[serde(default)]
    pub repos: Vec<String>,
    #[serde(default)]
    pub issue_required: bool,
    #[serde(default)]
    pub implicit_self_approve: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
/// Public struct `ApprovePluginConfig` used across Tau components.
pub struct ApprovePluginConfig {
    #[serde(default)]
    pub approve: Vec<ApproveRepoOptions>,
}

impl ApprovePluginConfig {
    /// First entry listing `org` or `org/repo`; defaults to both flags off.
    pub fn options_for_repo(&self, org: &str, repo: &str) -> ApproveRepoOptions {
        let full_name = format!("{org}/{repo}");
        self.approve
            .iter()
            .find(|options| {
                options
                    .repos
                    .iter()
                    .any(|entry| entry == org || *entry == full_name)
            })
            .cloned()
            .unwrap_or_default()
    }
}
