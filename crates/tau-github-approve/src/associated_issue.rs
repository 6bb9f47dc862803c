use std::sync::OnceLock;

use regex::Regex;

fn associated_issue_regex() -> &'static Regex {
    static ASSOCIATED_ISSUE: OnceLock<Regex> = OnceLock::new();
    ASSOCIATED_ISSUE.get_or_init(|| {
        Regex::new(r"(?:[\w.-]+/[\w.-]+/issues/|#)(\d+)")
            .expect("associated issue regex must compile")
    })
}

/// Returns the first issue referenced by the pull request body, or 0.
///
/// Matches `<org>/<repo>/issues/<N>` or `#<N>`; only the first match counts.
pub fn find_associated_issue(body: &str) -> u64 {
    associated_issue_regex()
        .captures(body)
        .and_then(|captures| captures.get(1))
        .and_then(|number| number.as_str().parse::<u64>().ok())
        .unwrap_or(0)
}
