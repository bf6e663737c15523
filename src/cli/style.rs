//! Terminal styling helpers
//!
//! Colors are applied through owo-colors and stripped by anstream when the
//! output is not a terminal.

use indicatif::ProgressStyle;
use owo_colors::OwoColorize;
use stackboi::types::{PrStatus, SyncStatus};
use std::fmt::Display;

/// Check mark glyph
pub const CHECK: &str = "\u{2713}";

/// Cross glyph
pub const CROSS: &str = "\u{2717}";

/// Semantic colors for CLI output
pub trait Stylize: Display + Sized {
    /// Headings and key nouns
    fn emphasis(&self) -> String {
        self.bold().to_string()
    }

    /// Secondary information
    fn muted(&self) -> String {
        self.dimmed().to_string()
    }

    /// Branch names, numbers, URLs
    fn accent(&self) -> String {
        self.cyan().to_string()
    }

    /// Completed actions
    fn success(&self) -> String {
        self.green().to_string()
    }

    /// Recoverable problems
    fn warn(&self) -> String {
        self.yellow().to_string()
    }

    /// Failures
    fn error(&self) -> String {
        self.red().bold().to_string()
    }
}

impl<T: Display> Stylize for T {}

/// Green check mark
pub fn check() -> String {
    CHECK.success()
}

/// Red cross
pub fn cross() -> String {
    CROSS.error()
}

/// Dimmed arrow for list items
pub fn arrow() -> String {
    "\u{2192}".muted()
}

/// Spinner style shared by long-running commands
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("\u{280B}\u{2819}\u{2839}\u{2838}\u{283C}\u{2834}\u{2826}\u{2827}\u{2807}\u{280F} ")
}

/// Colored sync status
pub fn sync_status(status: SyncStatus) -> String {
    let text = status.to_string();
    match status {
        SyncStatus::UpToDate => text.success(),
        SyncStatus::NeedsPush | SyncStatus::PendingSync => text.warn(),
        SyncStatus::NeedsRebase | SyncStatus::Conflicts => text.error(),
        SyncStatus::Unknown => text.muted(),
    }
}

/// Colored PR status
pub fn pr_status(status: PrStatus) -> String {
    let text = status.to_string();
    match status {
        PrStatus::Open => text.success(),
        PrStatus::Merged => text.accent(),
        PrStatus::Draft | PrStatus::None => text.muted(),
        PrStatus::Closed => text.error(),
    }
}

/// Clickable link when the terminal supports it
pub fn hyperlink(text: &str, url: &str) -> String {
    if supports_hyperlinks::on(supports_hyperlinks::Stream::Stdout) {
        terminal_link::Link::new(text, url).to_string()
    } else {
        text.to_string()
    }
}
