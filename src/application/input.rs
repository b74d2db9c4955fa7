//! # Command Input Parsing
//!
//! Splits chat commands such as `/letzteEpisode 2` or `/findeStichwort 1 Kekse`
//! into the command name, the selected feed, and the remaining argument.

use regex::Regex;
use std::sync::LazyLock;

/// Command prefixes: `/` for Telegram, `.` for Matrix clients that swallow `/`.
pub const PREFIXES: [char; 2] = ['/', '.'];

static FEED_ARG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[/.][\w@]+ (\d+|)(.*)").unwrap());
static NUMBER_ARG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[/.][\w@]+ (\d+)").unwrap());

/// Lowercased command name without prefix and `@botname` suffix.
/// `None` for text that is not a command.
pub fn command_name(text: &str) -> Option<String> {
    let rest = text.trim_start().strip_prefix(PREFIXES)?;
    let word = rest.split_whitespace().next()?;
    let name = word.split('@').next().unwrap_or(word);
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    Some(name.to_lowercase())
}

/// Everything after the first space, or `None` when there is nothing.
pub fn command_args(text: &str) -> Option<&str> {
    let (_, args) = text.trim_start().split_once(' ')?;
    Some(args).filter(|a| !a.trim().is_empty())
}

/// Returns `(feed_index, argument)` for commands taking an optional feed number.
///
/// The number is 1-based and clamped to the available feeds; without a
/// number the first feed is selected.
pub fn parse_input(text: &str, feed_count: usize) -> (usize, String) {
    let Some(caps) = FEED_ARG.captures(text.trim_start()) else {
        return (0, String::new());
    };
    let number = match caps.get(1).map(|m| m.as_str()).filter(|s| !s.is_empty()) {
        Some(digits) => digits
            .parse::<usize>()
            .unwrap_or(usize::MAX)
            .clamp(1, feed_count.max(1)),
        None => 1,
    };
    let arg = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
    (number - 1, arg.to_string())
}

/// Leading numeric argument, e.g. the seconds of `/debugNewEpisode 600`.
pub fn numeric_arg(text: &str) -> Option<i64> {
    NUMBER_ARG
        .captures(text.trim_start())
        .and_then(|c| c[1].parse().ok())
}
