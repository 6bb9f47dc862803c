use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::approve_comment::{GithubIssueComment, GithubReview, GithubReviewComment, GithubUser};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// Public struct `GithubLabel` used across Tau components.
pub struct GithubLabel {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// One changed file reported for a pull request.
pub struct GithubPullRequestFile {
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// Entry of the issue events listing (labeled, unlabeled, assigned, ...).
pub struct GithubIssueEvent {
    pub event: String,
    #[serde(default)]
    pub label: Option<GithubLabel>,
    #[serde(default)]
    pub actor: Option<GithubUser>,
}

/// Pull request reads and writes needed by one reconciliation pass.
///
/// Every call is scoped to the repository and pull request the client was
/// built for, or to the explicit `org`/`repo`/`number` passed in.
#[async_trait]
pub trait ApproveGithubClient: Send + Sync {
    async fn bot_login(&self) -> Result<String>;

    async fn list_changed_files(&self, org: &str, repo: &str, number: u64) -> Result<Vec<String>>;

    async fn list_labels(&self, org: &str, repo: &str, number: u64) -> Result<Vec<GithubLabel>>;

    async fn list_issue_comments(
        &self,
        org: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<GithubIssueComment>>;

    async fn list_review_comments(
        &self,
        org: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<GithubReviewComment>>;

    async fn list_reviews(&self, org: &str, repo: &str, number: u64) -> Result<Vec<GithubReview>>;

    async fn list_issue_events(
        &self,
        org: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<GithubIssueEvent>>;

    async fn add_label(&self, org: &str, repo: &str, number: u64, label: &str) -> Result<()>;

    async fn remove_label(&self, org: &str, repo: &str, number: u64, label: &str) -> Result<()>;

    async fn create_comment(&self, org: &str, repo: &str, number: u64, body: &str) -> Result<()>;

    async fn delete_comment(&self, org: &str, repo: &str, comment_id: u64) -> Result<()>;
}
