//! Event-tag extraction from notification bodies.

use regex::Regex;
use std::sync::LazyLock;

static CMD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""cmd":"([^"]+)""#).unwrap());

/// Extract the normalized `cmd` tag from a notification body.
///
/// Some commands arrive with trailing parameters (e.g. `DANMU_MSG:4:0:2:2:2:0`); the
/// canonical tag is everything before the first `:`. Returns an empty string when the
/// body carries no `cmd` field, which routes to the unknown branch downstream.
pub fn parse_cmd(body: &str) -> &str {
    let cmd = CMD_REGEX
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or("");

    match cmd.find(':') {
        Some(idx) => &cmd[..idx],
        None => cmd,
    }
}
