// pii-anonymizer/src/ui/output_format.rs
//! Status messages on stderr.
//!
//! Messages are prefixed with their kind and colored only when the target is
//! a terminal. Anonymized text itself is never routed through here.

use is_terminal::IsTerminal;
use owo_colors::{AnsiColors, OwoColorize};
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Warn,
    Error,
}

impl MessageKind {
    fn prefix(self) -> &'static str {
        match self {
            MessageKind::Info => "info",
            MessageKind::Warn => "warning",
            MessageKind::Error => "error",
        }
    }

    fn color(self) -> AnsiColors {
        match self {
            MessageKind::Info => AnsiColors::Cyan,
            MessageKind::Warn => AnsiColors::Yellow,
            MessageKind::Error => AnsiColors::BrightRed,
        }
    }
}

/// Writes `[prefix] message` plus a newline to `writer`.
pub fn print_message<W: Write>(
    writer: &mut W,
    kind: MessageKind,
    message: &str,
    supports_color: bool,
) -> io::Result<()> {
    let prefix = format!("[{}]", kind.prefix());
    if supports_color {
        writeln!(writer, "{} {}", prefix.color(kind.color()).bold(), message)
    } else {
        writeln!(writer, "{} {}", prefix, message)
    }
}

fn to_stderr(kind: MessageKind, msg: &str) {
    let stderr = io::stderr();
    let supports_color = stderr.is_terminal();
    let _ = print_message(&mut stderr.lock(), kind, msg, supports_color);
}

/// Helper for printing info messages to stderr.
pub fn info_msg(msg: impl AsRef<str>) {
    to_stderr(MessageKind::Info, msg.as_ref());
}

/// Helper for printing warning messages to stderr.
pub fn warn_msg(msg: impl AsRef<str>) {
    to_stderr(MessageKind::Warn, msg.as_ref());
}

/// Helper for printing error messages to stderr.
pub fn error_msg(msg: impl AsRef<str>) {
    to_stderr(MessageKind::Error, msg.as_ref());
}
