#![no_main]

use libfuzzer_sys::fuzz_target;
use tau_github_approve::approve_command::{
    comment_has_approval_command, parse_approve_commands, ApproveArgument,
};
use tau_github_approve::associated_issue::find_associated_issue;

fuzz_target!(|data: &[u8]| {
    let body = String::from_utf8_lossy(data);
    let commands = parse_approve_commands(&body);
    assert!(commands.len() <= body.lines().count());
    for command in &commands {
        if let ApproveArgument::Other(raw) = &command.argument {
            assert_eq!(raw.trim(), raw.as_str());
        }
    }
    assert_eq!(
        comment_has_approval_command(&body, "fuzz-author", "fuzz-bot"),
        !commands.is_empty()
    );
    assert!(!comment_has_approval_command(&body, "fuzz-bot", "fuzz-bot"));
    let _ = find_associated_issue(&body);
});
