use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::github_approve_runtime::{ApproveRunCommand, GithubApproveRuntimeConfig, RepoRef};

fn parse_positive_usize(value: &str) -> Result<usize, String> {
    let parsed = value
        .parse::<usize>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

#[derive(Debug, Parser)]
#[command(
    name = "tau-github-approve",
    about = "Reconcile /approve and /lgtm commands with the approved label",
    version
)]
/// Public struct `ApproveCli` used across Tau components.
pub struct ApproveCli {
    #[arg(
        long = "github-api-base",
        env = "GITHUB_API_URL",
        default_value = "https://api.github.com",
        help = "GitHub API base URL"
    )]
    pub github_api_base: String,

    #[arg(
        long = "github-token",
        env = "GITHUB_TOKEN",
        hide_env_values = true,
        help = "GitHub token used for API access"
    )]
    pub github_token: String,

    #[arg(
        long = "bot-login",
        env = "TAU_GITHUB_BOT_LOGIN",
        help = "Login of the automation account; resolved from the token when omitted"
    )]
    pub bot_login: Option<String>,

    #[arg(
        long = "plugin-config",
        env = "TAU_APPROVE_PLUGIN_CONFIG",
        help = "JSON file with per-repository approve options"
    )]
    pub plugin_config: Option<PathBuf>,

    #[arg(
        long = "owners-file",
        env = "TAU_APPROVE_OWNERS_FILE",
        help = "JSON file mapping repository directories to approver logins"
    )]
    pub owners_file: PathBuf,

    #[arg(
        long = "request-timeout-ms",
        env = "TAU_GITHUB_REQUEST_TIMEOUT_MS",
        default_value_t = 30_000,
        value_parser = parse_positive_u64,
        help = "Timeout for each GitHub API request"
    )]
    pub request_timeout_ms: u64,

    #[arg(
        long = "retry-max-attempts",
        env = "TAU_GITHUB_RETRY_MAX_ATTEMPTS",
        default_value_t = 4,
        value_parser = parse_positive_usize,
        help = "Attempts per GitHub API request, including the first"
    )]
    pub retry_max_attempts: usize,

    #[arg(
        long = "retry-base-delay-ms",
        env = "TAU_GITHUB_RETRY_BASE_DELAY_MS",
        default_value_t = 500,
        value_parser = parse_positive_u64,
        help = "Base delay for exponential retry backoff"
    )]
    pub retry_base_delay_ms: u64,

    #[command(subcommand)]
    pub command: ApproveCliCommand,
}

#[derive(Debug, Subcommand)]
/// Enumerates supported `ApproveCliCommand` values.
pub enum ApproveCliCommand {
    /// Run one reconciliation pass for a pull request.
    Reconcile {
        #[arg(long, help = "Repository in owner/name form")]
        repo: String,
        #[arg(long = "pr", value_parser = parse_positive_u64, help = "Pull request number")]
        pr: u64,
    },
    /// Gate a webhook payload and reconcile when it qualifies.
    Event {
        #[arg(long = "event-name", env = "GITHUB_EVENT_NAME")]
        event_name: String,
        #[arg(long = "event-path", env = "GITHUB_EVENT_PATH")]
        event_path: PathBuf,
    },
}

impl ApproveCli {
    pub fn runtime_config(&self) -> GithubApproveRuntimeConfig {
        GithubApproveRuntimeConfig {
            api_base: self.github_api_base.clone(),
            token: self.github_token.clone(),
            bot_login: self.bot_login.clone(),
            plugin_config_path: self.plugin_config.clone(),
            owners_path: self.owners_file.clone(),
            request_timeout_ms: self.request_timeout_ms,
            retry_max_attempts: self.retry_max_attempts,
            retry_base_delay_ms: self.retry_base_delay_ms,
        }
    }

    pub fn run_command(&self) -> Result<ApproveRunCommand> {
        Ok(match &self.command {
            ApproveCliCommand::Reconcile { repo, pr } => ApproveRunCommand::Reconcile {
                repo: RepoRef::parse(repo)?,
                number: *pr,
            },
            ApproveCliCommand::Event {
                event_name,
                event_path,
            } => ApproveRunCommand::Event {
                name: event_name.clone(),
                path: event_path.clone(),
            },
        })
    }
}
