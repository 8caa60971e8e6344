//! Terminal output for interactive runs.
//!
//! Operator-facing status lines, distinct from the `log` diagnostics which
//! go through `env_logger`. Quiet mode suppresses everything except
//! warnings.

use std::io::{self, Write};

/// Writes status lines to the terminal.
#[derive(Debug, Clone)]
pub struct OutputManager {
    verbose: bool,
    quiet: bool,
}

impl OutputManager {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    /// Detail line, only in verbose mode.
    pub fn verbose(&self, message: &str) -> io::Result<()> {
        if self.verbose && !self.quiet {
            writeln!(io::stdout(), "{message}")?;
        }
        Ok(())
    }

    /// Step progress line.
    pub fn progress(&self, message: &str) -> io::Result<()> {
        if !self.quiet {
            writeln!(io::stdout(), "{message}")?;
        }
        Ok(())
    }

    /// Completed-step line.
    pub fn success(&self, message: &str) -> io::Result<()> {
        if !self.quiet {
            writeln!(io::stdout(), "✓ {message}")?;
        }
        Ok(())
    }

    /// Warning line; printed even in quiet mode.
    pub fn warn(&self, message: &str) -> io::Result<()> {
        writeln!(io::stderr(), "warning: {message}")
    }

    /// Section header.
    pub fn section(&self, title: &str) -> io::Result<()> {
        if !self.quiet {
            let mut out = io::stdout();
            writeln!(out, "{title}")?;
            writeln!(out, "{}", "=".repeat(title.len()))?;
        }
        Ok(())
    }
}
