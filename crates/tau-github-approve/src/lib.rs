//! Approval reconciliation core for the Tau GitHub approve bridge.
//! This crate turns `/approve` and `/lgtm` comment commands into approval
//! tracker state, the `approved` label, and a single status notification.

pub mod approval_tracker;
pub mod approve_applier;
pub mod approve_command;
pub mod approve_comment;
pub mod approve_event_gate;
pub mod approve_notification;
pub mod associated_issue;
pub mod github_client;
pub mod label_provenance;
pub mod label_sync;
pub mod owners_authority;
pub mod reconcile;
pub mod repo_options;

#[cfg(test)]
pub(crate) mod test_support;
