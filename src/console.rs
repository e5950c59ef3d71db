//! Console output formatting with ANSI color support.
//!
//! Provides styled terminal output with automatic TTY detection
//! and respect for the NO_COLOR environment variable. A quiet console
//! keeps stdout free for machine-readable output; errors still reach stderr.

use std::io::{self, IsTerminal, Write};

/// ANSI style codes for terminal formatting.
#[derive(Debug, Clone, Copy)]
pub enum Style {
    Bold,
    Dim,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    Gray,
}

impl Style {
    /// Returns the ANSI escape code for this style.
    fn code(self) -> &'static str {
        match self {
            Style::Bold => "1",
            Style::Dim => "2",
            Style::Red => "31",
            Style::Green => "32",
            Style::Yellow => "33",
            Style::Blue => "34",
            Style::Magenta => "35",
            Style::Cyan => "36",
            Style::Gray => "90",
        }
    }
}

const RESET: &str = "\x1b[0m";

/// Console output handler with color support detection.
#[derive(Debug)]
pub struct Console {
    colors_enabled: bool,
    quiet: bool,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    /// Creates a new Console instance, detecting color support.
    ///
    /// Colors are disabled if:
    /// - The `NO_COLOR` environment variable is set
    /// - stdout is not a terminal (TTY)
    pub fn new() -> Self {
        let colors_enabled = std::env::var("NO_COLOR").is_err() && io::stdout().is_terminal();

        Self {
            colors_enabled,
            quiet: false,
        }
    }

    /// Creates a Console with colors explicitly enabled or disabled.
    pub fn with_colors(enabled: bool) -> Self {
        Self {
            colors_enabled: enabled,
            quiet: false,
        }
    }

    /// Creates a Console that prints nothing but errors.
    pub fn quiet() -> Self {
        Self {
            colors_enabled: false,
            quiet: true,
        }
    }

    fn line(&self, label: &str, color: Style, message: &str) {
        if !self.quiet {
            println!("{}", self.message(label, color, message));
        }
    }

    fn message(&self, label: &str, color: Style, message: &str) -> String {
        format!("{} {}", self.label(label, color), message)
    }

    /// Applies ANSI styles to text if colors are enabled.
    pub fn style(&self, text: &str, styles: &[Style]) -> String {
        if !self.colors_enabled || styles.is_empty() {
            return text.to_string();
        }

        let codes: Vec<&str> = styles.iter().map(|s| s.code()).collect();
        format!("\x1b[{}m{}{}", codes.join(";"), text, RESET)
    }

    /// Creates a colored label like `[INFO]`.
    pub fn label(&self, label: &str, color: Style) -> String {
        let styled = self.style(label, &[color, Style::Bold]);
        format!("[{}]", styled)
    }

    /// Prints an info message with blue `[INFO]` label.
    pub fn info(&self, message: &str) {
        self.line("INFO", Style::Blue, message);
    }

    /// Prints a success message with green `[OK]` label.
    pub fn success(&self, message: &str) {
        self.line("OK", Style::Green, message);
    }

    /// Prints a warning message with yellow `[WARN]` label.
    pub fn warning(&self, message: &str) {
        self.line("WARN", Style::Yellow, message);
    }

    /// Prints an error message with red `[ERROR]` label.
    pub fn error(&self, message: &str) {
        eprintln!("{}", self.message("ERROR", Style::Red, message));
    }

    /// Prints a step message with cyan `[STEP]` label.
    pub fn step(&self, message: &str) {
        self.line("STEP", Style::Cyan, message);
    }

    /// Prints a section header in magenta bold.
    pub fn section(&self, message: &str) {
        if self.quiet {
            return;
        }
        println!();
        println!("{}", self.style(message, &[Style::Magenta, Style::Bold]));
    }

    /// Returns text styled as muted (dim gray).
    pub fn muted(&self, text: &str) -> String {
        self.style(text, &[Style::Gray, Style::Dim])
    }

    /// Clears the current line (for progress updates).
    pub fn clear_line(&self) {
        if self.colors_enabled && !self.quiet {
            print!("\r\x1b[2K");
            let _ = io::stdout().flush();
        }
    }

    /// Prints a progress update on the same line.
    pub fn progress_update(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.clear_line();
        print!("{} {}", self.label("..", Style::Cyan), message);
        let _ = io::stdout().flush();
    }

    /// Ends a run of progress updates so the next message starts clean.
    pub fn finish_progress(&self) {
        if self.quiet {
            return;
        }
        if self.colors_enabled {
            self.clear_line();
        } else {
            println!();
        }
    }

    /// Formats a count with styling (e.g., for chapter counts).
    pub fn count(&self, n: usize) -> String {
        self.style(&n.to_string(), &[Style::Green, Style::Bold])
    }

    /// Formats TOC page progress, e.g. `[TOC 3/12]`.
    pub fn page_progress(&self, done: usize, total: usize) -> String {
        self.style(&format!("[TOC {}/{}]", done, total), &[Style::Cyan, Style::Bold])
    }
}
