use std::sync::OnceLock;

use regex::Regex;

use crate::approve_comment::ApprovalComment;

/// Login of the bot that handled approvals before the current automation identity.
pub const LEGACY_BOT_LOGIN: &str = "k8s-merge-robot";

const APPROVE_COMMAND: &str = "APPROVE";
const LGTM_COMMAND: &str = "LGTM";
const CANCEL_ARGUMENT: &str = "cancel";
const NO_ISSUE_ARGUMENT: &str = "no-issue";

fn command_regex() -> &'static Regex {
    static COMMAND: OnceLock<Regex> = OnceLock::new();
    COMMAND.get_or_init(|| {
        // ASCII whitespace only: a non-breaking space stays inside the token.
        Regex::new(r"(?m)^/([^\t\n\x0C\r ]+)[\t ]*([^\n\r]*)")
            .expect("command regex must compile")
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Enumerates actionable approval command names.
pub enum ApproveCommandName {
    Approve,
    Lgtm,
}

impl ApproveCommandName {
    /// Matches a raw slash-command token case-insensitively.
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            APPROVE_COMMAND => Some(Self::Approve),
            LGTM_COMMAND => Some(Self::Lgtm),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Lgtm => "lgtm",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Enumerates normalized command arguments.
pub enum ApproveArgument {
    Cancel,
    NoIssue,
    Other(String),
}

impl ApproveArgument {
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase();
        match normalized.as_str() {
            CANCEL_ARGUMENT => Self::Cancel,
            NO_ISSUE_ARGUMENT => Self::NoIssue,
            _ => Self::Other(normalized),
        }
    }

    pub fn is_cancel(&self) -> bool {
        matches!(self, Self::Cancel)
    }

    pub fn is_no_issue(&self) -> bool {
        matches!(self, Self::NoIssue)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One `/approve` or `/lgtm` line extracted from a comment body.
pub struct ParsedApproveCommand {
    pub name: ApproveCommandName,
    pub argument: ApproveArgument,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// An actionable command bound to the comment that carried it.
pub struct ApproveCommand {
    pub name: ApproveCommandName,
    pub argument: ApproveArgument,
    pub author: String,
    pub html_url: String,
}

/// Parses every actionable command line in `body`, top to bottom.
///
/// Lines must start with `/` followed by a non-whitespace token. Slash
/// commands other than `approve` and `lgtm` belong to other bots sharing the
/// comment stream and are skipped.
pub fn parse_approve_commands(body: &str) -> Vec<ParsedApproveCommand> {
    command_regex()
        .captures_iter(body)
        .filter_map(|captures| {
            let name = ApproveCommandName::parse(captures.get(1)?.as_str())?;
            let argument =
                ApproveArgument::parse(captures.get(2).map(|m| m.as_str()).unwrap_or_default());
            Some(ParsedApproveCommand { name, argument })
        })
        .collect()
}

/// Return true when `login` is the current bot or the legacy approval bot.
pub fn is_automation_login(login: &str, bot_login: &str) -> bool {
    login == bot_login || login == LEGACY_BOT_LOGIN
}

/// Cheap pre-check used before a full reconciliation pass is scheduled.
pub fn comment_has_approval_command(body: &str, author: &str, bot_login: &str) -> bool {
    if is_automation_login(author, bot_login) {
        return false;
    }
    !parse_approve_commands(body).is_empty()
}

/// Extracts actionable commands from an ordered timeline.
///
/// Bot-authored and anonymous comments never contribute commands.
pub fn collect_approve_commands(
    comments: &[ApprovalComment],
    bot_login: &str,
) -> Vec<ApproveCommand> {
    comments
        .iter()
        .filter(|comment| !comment.author.is_empty())
        .filter(|comment| !is_automation_login(&comment.author, bot_login))
        .flat_map(|comment| {
            parse_approve_commands(&comment.body)
                .into_iter()
                .map(|parsed| ApproveCommand {
                    name: parsed.name,
                    argument: parsed.argument,
                    author: comment.author.clone(),
                    html_url: comment.html_url.clone(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{
        collect_approve_commands, comment_has_approval_command, parse_approve_commands,
        ApproveArgument, ApproveCommandName, ParsedApproveCommand, LEGACY_BOT_LOGIN,
    };
    use crate::test_support::comment_at;

    #[test]
    fn unit_parse_approve_commands_matches_names_case_insensitively() {
        let parsed = parse_approve_commands("/Approve\n/lGtM");
        assert_eq!(
            parsed,
            vec![
                ParsedApproveCommand {
                    name: ApproveCommandName::Approve,
                    argument: ApproveArgument::Other(String::new()),
                },
                ParsedApproveCommand {
                    name: ApproveCommandName::Lgtm,
                    argument: ApproveArgument::Other(String::new()),
                },
            ]
        );
    }

    #[test]
    fn unit_approve_argument_normalizes_case_and_whitespace() {
        assert_eq!(ApproveArgument::parse("  CANCEL "), ApproveArgument::Cancel);
        assert_eq!(ApproveArgument::parse("No-Issue"), ApproveArgument::NoIssue);
        assert_eq!(
            ApproveArgument::parse(" Fixes #12 "),
            ApproveArgument::Other("fixes #12".to_string())
        );
    }

    #[test]
    fn functional_parse_approve_commands_ignores_foreign_and_inline_commands() {
        let body = "Looks good to me, /approve inline should not count\n/hold\n/retest\n  /lgtm\n/approve no-issue";
        let parsed = parse_approve_commands(body);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name, ApproveCommandName::Approve);
        assert_eq!(parsed[0].argument, ApproveArgument::NoIssue);
    }

    #[test]
    fn functional_parse_approve_commands_preserves_line_order() {
        let parsed = parse_approve_commands("/lgtm\r\n/approve cancel\r\n/approve");
        let names = parsed.iter().map(|command| command.name).collect::<Vec<_>>();
        assert_eq!(
            names,
            vec![
                ApproveCommandName::Lgtm,
                ApproveCommandName::Approve,
                ApproveCommandName::Approve
            ]
        );
        assert_eq!(parsed[1].argument, ApproveArgument::Cancel);
    }

    #[test]
    fn integration_collect_approve_commands_skips_bot_and_legacy_bot_comments() {
        let comments = vec![
            comment_at(1, "alice", "/approve", 10),
            comment_at(2, "approve-bot", "/approve", 11),
            comment_at(3, LEGACY_BOT_LOGIN, "/lgtm", 12),
            comment_at(4, "", "/lgtm", 13),
        ];
        let commands = collect_approve_commands(&comments, "approve-bot");
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].author, "alice");
        assert_eq!(commands[0].html_url, "https://example.test/comment/1");
    }

    #[test]
    fn regression_parse_approve_commands_treats_unicode_spaces_as_part_of_token() {
        assert!(parse_approve_commands("/approve\u{a0}cancel").is_empty());
        assert!(parse_approve_commands("/approve\u{2003}no-issue").is_empty());
        let parsed = parse_approve_commands("/lgtm\u{a0}\n/approve cancel");
        assert_eq!(
            parsed,
            vec![ParsedApproveCommand {
                name: ApproveCommandName::Approve,
                argument: ApproveArgument::Cancel,
            }]
        );
    }

    #[test]
    fn regression_comment_has_approval_command_rejects_bot_status_messages() {
        let status = "[APPROVALNOTIFIER] This PR is **NOT APPROVED**\n\n/approve";
        assert!(!comment_has_approval_command(
            status,
            "approve-bot",
            "approve-bot"
        ));
        assert!(!comment_has_approval_command(
            status,
            LEGACY_BOT_LOGIN,
            "approve-bot"
        ));
        assert!(comment_has_approval_command(
            "/approve",
            "alice",
            "approve-bot"
        ));
        assert!(!comment_has_approval_command(
            "/assign @bob",
            "alice",
            "approve-bot"
        ));
    }
}
