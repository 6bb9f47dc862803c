use serde::Serialize;

use crate::github_client::GithubLabel;

pub const APPROVED_LABEL: &str = "approved";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
/// Enumerates supported `LabelTransition` values.
pub enum LabelTransition {
    Add,
    Remove,
    Unchanged,
}

impl LabelTransition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Unchanged => "unchanged",
        }
    }
}

/// Pure transition between label-present and label-absent.
///
/// Provenance does not enter here; it feeds the tracker's manual override.
pub fn approved_label_transition(is_approved: bool, has_label: bool) -> LabelTransition {
    match (is_approved, has_label) {
        (true, false) => LabelTransition::Add,
        (false, true) => LabelTransition::Remove,
        _ => LabelTransition::Unchanged,
    }
}

pub fn has_label(labels: &[GithubLabel], name: &str) -> bool {
    labels.iter().any(|label| label.name == name)
}
