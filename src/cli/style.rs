//! Terminal styling helpers

use indicatif::ProgressStyle;
use owo_colors::{OwoColorize, Stream, Style};
use std::fmt::Display;

/// Check mark used in success lines
pub const CHECK: &str = "✓";
/// Cross used in failure lines
pub const CROSS: &str = "✗";

/// Semantic styles for CLI output
///
/// Colors are only applied when stdout supports them.
pub trait Stylize: Display {
    /// Bold text for headings
    fn emphasis(&self) -> String {
        self.styled(Style::new().bold())
    }

    /// Dimmed text for secondary information
    fn muted(&self) -> String {
        self.styled(Style::new().dimmed())
    }

    /// Cyan text for names and numbers
    fn accent(&self) -> String {
        self.styled(Style::new().cyan())
    }

    /// Green text
    fn success(&self) -> String {
        self.styled(Style::new().green())
    }

    /// Yellow text
    fn warn(&self) -> String {
        self.styled(Style::new().yellow())
    }

    /// Red text
    fn error(&self) -> String {
        self.styled(Style::new().red())
    }

    /// Apply `style` if the terminal supports color
    fn styled(&self, style: Style) -> String {
        paint(self.to_string(), style)
    }
}

fn paint(text: String, style: Style) -> String {
    text.if_supports_color(Stream::Stdout, |t| t.style(style))
        .to_string()
}

impl<T: Display + ?Sized> Stylize for T {}

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
    "→".muted()
}

/// Spinner style used while waiting on the network
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", " "])
}
