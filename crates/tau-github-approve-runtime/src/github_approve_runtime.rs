//! Runs approval reconciliation against the GitHub REST API.

mod github_api_client;
mod github_transport_helpers;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use tau_github_approve::approve_event_gate::{
    approval_state, generic_comment_trigger, pull_request_trigger, ApproveTrigger,
    GenericCommentEvent, GithubIssueCommentEvent, GithubPullRequestEvent, GithubRepository,
    GithubReviewCommentEvent, GithubReviewEvent,
};
use tau_github_approve::approve_comment::GithubUser;
use tau_github_approve::github_client::ApproveGithubClient;
use tau_github_approve::owners_authority::{OwnersApprovalAuthority, OwnersFile};
use tau_github_approve::reconcile::{
    reconcile_pull_request_approval, PullRequestApprovalState, ReconcileReport,
};
use tau_github_approve::repo_options::ApprovePluginConfig;

use github_api_client::GithubApiClient;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Public struct `RepoRef` used across Tau components.
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let (owner, name) = trimmed
            .split_once('/')
            .ok_or_else(|| anyhow!("invalid --repo '{raw}', expected owner/repo"))?;
        let owner = owner.trim();
        let name = name.trim();
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            bail!("invalid --repo '{raw}', expected owner/repo");
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn as_slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone)]
/// Process-level settings for one runtime invocation.
pub struct GithubApproveRuntimeConfig {
    pub api_base: String,
    pub token: String,
    pub bot_login: Option<String>,
    pub plugin_config_path: Option<PathBuf>,
    pub owners_path: PathBuf,
    pub request_timeout_ms: u64,
    pub retry_max_attempts: usize,
    pub retry_base_delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Enumerates supported `ApproveRunCommand` values.
pub enum ApproveRunCommand {
    Reconcile { repo: RepoRef, number: u64 },
    Event { name: String, path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
/// Result printed by the binary for one invocation.
pub enum ApproveRunOutcome {
    Reconciled {
        repo: String,
        number: u64,
        report: ReconcileReport,
    },
    Skipped {
        event_name: String,
        reason_code: &'static str,
    },
}

/// Reads the per-repository options; a missing path means defaults everywhere.
pub fn load_plugin_config(path: Option<&Path>) -> Result<ApprovePluginConfig> {
    let Some(path) = path else {
        return Ok(ApprovePluginConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read approve plugin config {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse approve plugin config {}", path.display()))
}

pub fn load_owners_authority(path: &Path) -> Result<OwnersApprovalAuthority> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read owners file {}", path.display()))?;
    let owners: OwnersFile = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse owners file {}", path.display()))?;
    Ok(OwnersApprovalAuthority::new(owners))
}

pub async fn run_github_approve(
    config: GithubApproveRuntimeConfig,
    command: ApproveRunCommand,
) -> Result<ApproveRunOutcome> {
    let runtime = GithubApproveRuntime::new(config)?;
    match command {
        ApproveRunCommand::Reconcile { repo, number } => {
            runtime.reconcile_pull_request(&repo, number).await
        }
        ApproveRunCommand::Event { name, path } => {
            let payload = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read event payload {}", path.display()))?;
            runtime.handle_event(&name, &payload).await
        }
    }
}

struct GithubApproveRuntime {
    client: GithubApiClient,
    plugin_config: ApprovePluginConfig,
    authority: OwnersApprovalAuthority,
}

impl GithubApproveRuntime {
    fn new(config: GithubApproveRuntimeConfig) -> Result<Self> {
        let plugin_config = load_plugin_config(config.plugin_config_path.as_deref())?;
        let authority = load_owners_authority(&config.owners_path)?;
        let client = GithubApiClient::new(
            config.api_base,
            config.token,
            config.bot_login,
            config.request_timeout_ms,
            config.retry_max_attempts,
            config.retry_base_delay_ms,
        )?;
        Ok(Self {
            client,
            plugin_config,
            authority,
        })
    }

    async fn reconcile_pull_request(
        &self,
        repo: &RepoRef,
        number: u64,
    ) -> Result<ApproveRunOutcome> {
        let pull_request = self
            .client
            .get_pull_request(&repo.owner, &repo.name, number)
            .await
            .with_context(|| format!("failed to load pull request {}#{number}", repo.as_slug()))?;
        let repository = GithubRepository {
            name: repo.name.clone(),
            owner: GithubUser {
                login: repo.owner.clone(),
            },
        };
        let state = approval_state(&repository, pull_request.number, &pull_request);
        self.run_pass(&state).await
    }

    async fn handle_event(&self, event_name: &str, payload: &str) -> Result<ApproveRunOutcome> {
        let trigger = match event_name {
            "issue_comment" => {
                let event: GithubIssueCommentEvent = parse_event(event_name, payload)?;
                generic_comment_trigger(
                    &GenericCommentEvent::from_issue_comment(&event),
                    &self.client.bot_login().await?,
                )
            }
            "pull_request_review" => {
                let event: GithubReviewEvent = parse_event(event_name, payload)?;
                generic_comment_trigger(
                    &GenericCommentEvent::from_review(&event),
                    &self.client.bot_login().await?,
                )
            }
            "pull_request_review_comment" => {
                let event: GithubReviewCommentEvent = parse_event(event_name, payload)?;
                generic_comment_trigger(
                    &GenericCommentEvent::from_review_comment(&event),
                    &self.client.bot_login().await?,
                )
            }
            "pull_request" | "pull_request_target" => {
                let event: GithubPullRequestEvent = parse_event(event_name, payload)?;
                pull_request_trigger(&event, &self.client.bot_login().await?)
            }
            // Unsupported events never touch the API, not even `/user`.
            _ => ApproveTrigger::Skip {
                reason_code: "skip_event_unsupported",
            },
        };

        match trigger {
            ApproveTrigger::Reconcile(state) => self.run_pass(&state).await,
            ApproveTrigger::Skip { reason_code } => {
                tracing::info!(event_name, reason_code, "approval event skipped");
                Ok(ApproveRunOutcome::Skipped {
                    event_name: event_name.to_string(),
                    reason_code,
                })
            }
        }
    }

    async fn run_pass(&self, state: &PullRequestApprovalState) -> Result<ApproveRunOutcome> {
        let options = self.plugin_config.options_for_repo(&state.org, &state.repo);
        let report =
            reconcile_pull_request_approval(&self.client, &self.authority, &options, state)
                .await?;
        tracing::info!(
            org = %state.org,
            repo = %state.repo,
            number = state.number,
            approved = report.approved,
            label = report.label.as_str(),
            "approval reconciled"
        );
        Ok(ApproveRunOutcome::Reconciled {
            repo: format!("{}/{}", state.org, state.repo),
            number: state.number,
            report,
        })
    }
}

fn parse_event<T: serde::de::DeserializeOwned>(event_name: &str, payload: &str) -> Result<T> {
    serde_json::from_str(payload)
        .with_context(|| format!("failed to parse {event_name} event payload"))
}
