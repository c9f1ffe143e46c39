//! # Terminal Output
//!
//! Decides whether the CLI decorates what it prints, and provides the few
//! markers the commands use for per-repository status lines.
//!
//! Color is on for `--color=always`, off for `--color=never`, and for
//! `--color=auto` follows the environment: `NO_COLOR` (any value),
//! `CLICOLOR=0` and `TERM=dumb` turn it off, `CLICOLOR_FORCE` turns it on
//! even without a terminal, otherwise it is on when stdout is a color TTY.
//!
//! The same decision is handed to `env_logger`, so log lines and command
//! output agree.

use console::style;
use std::env;
use std::fmt::Display;

/// Whether output should be decorated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    pub use_color: bool,
}

impl OutputConfig {
    /// Resolves the `--color` flag against the environment.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_ascii_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => color_from_env(),
        };
        Self { use_color }
    }

    pub fn plain() -> Self {
        Self { use_color: false }
    }

    pub fn log_style(&self) -> env_logger::WriteStyle {
        if self.use_color {
            env_logger::WriteStyle::Always
        } else {
            env_logger::WriteStyle::Never
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

fn color_from_env() -> bool {
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
        return false;
    }
    if env::var("CLICOLOR_FORCE").is_ok_and(|v| !v.is_empty() && v != "0") {
        return true;
    }
    if env::var("TERM").is_ok_and(|v| v == "dumb") {
        return false;
    }
    console::Term::stdout().features().colors_supported()
}

/// Returns `emoji_str` when decorating, `plain` otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// Outcome of one line of a status report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Ok,
    Warn,
    Fail,
    Skip,
}

impl Mark {
    fn symbols(self) -> (&'static str, &'static str) {
        match self {
            Mark::Ok => ("✅", "[OK]"),
            Mark::Warn => ("⚠️", "[WARN]"),
            Mark::Fail => ("❌", "[ERR]"),
            Mark::Skip => ("⏭️", "[SKIP]"),
        }
    }
}

/// Formats `message` behind the marker for `mark`.
pub fn status_line(config: &OutputConfig, mark: Mark, message: impl Display) -> String {
    let (fancy, plain) = mark.symbols();
    let marker = emoji(config, fancy, plain);
    if !config.use_color {
        return format!("{} {}", marker, message);
    }
    let message = match mark {
        Mark::Ok => style(message.to_string()).green(),
        Mark::Warn => style(message.to_string()).yellow(),
        Mark::Fail => style(message.to_string()).red().bold(),
        Mark::Skip => style(message.to_string()).dim(),
    };
    format!("{} {}", marker, message.force_styling(true))
}
