//! GitHub REST adapter and command-line runtime for `tau-github-approve`.

pub mod cli_args;
pub mod github_approve_runtime;

pub use cli_args::{ApproveCli, ApproveCliCommand};
pub use github_approve_runtime::{
    load_owners_authority, load_plugin_config, run_github_approve, ApproveRunCommand,
    ApproveRunOutcome, GithubApproveRuntimeConfig, RepoRef,
};
