//! Terminal styling helpers
//!
//! Colors are applied only when stdout supports them; `anstream` strips
//! anything left over when output is redirected.

use indicatif::ProgressStyle;
use owo_colors::{OwoColorize, Stream};
use std::fmt::Display;
use terminal_link::Link;

/// Check mark used in summaries
pub const CHECK: &str = "✓";

/// Cross used for failed steps
pub const CROSS: &str = "✗";

/// Semantic styles for CLI output
pub trait Stylize: Display + Sized {
    /// De-emphasized detail text
    fn muted(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.dimmed())
            .to_string()
    }

    /// Headings and labels
    fn emphasis(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.bold())
            .to_string()
    }

    /// Names the operator will want to copy (branches, SHAs, PR numbers)
    fn accent(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.cyan())
            .to_string()
    }

    /// Success text
    fn success(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.green())
            .to_string()
    }

    /// Warnings and failures
    fn warn(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.yellow())
            .to_string()
    }
}

impl<T: Display> Stylize for T {}

/// Styled check mark
pub fn check() -> String {
    CHECK.success()
}

/// Styled cross
pub fn cross() -> String {
    CROSS
        .if_supports_color(Stream::Stdout, |t| t.red())
        .to_string()
}

/// Styled arrow for list items
pub fn arrow() -> String {
    "→".muted()
}

/// Spinner style for step progress
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
}

/// `#<number>`, as a clickable link when the terminal supports it
pub fn pr_link(number: u64, url: &str) -> String {
    let text = format!("#{number}");
    if !url.is_empty() && supports_hyperlinks::on(supports_hyperlinks::Stream::Stdout) {
        Link::new(&text, url).to_string().accent()
    } else {
        text.accent()
    }
}
