//! Console output for demoscan
//!
//! Styled status messages plus the live [`StatusStream`] of a run: mirrored report
//! lines and `Progress: K/N files processed` updates.

use std::fmt;
use std::io::{self, Write};

use console::style;
use tracing::debug;

use crate::parallel::ProgressTracker;
use crate::report::StatusStream;

/// Write one line to stdout. A closed stdout (e.g. `demoscan run | head`) is
/// logged, not a panic: the report file is still being written.
fn stdout_line(args: fmt::Arguments<'_>) {
    let mut stdout = io::stdout().lock();
    if let Err(e) = stdout.write_fmt(args).and_then(|()| stdout.write_all(b"\n")) {
        debug!(error = %e, "stdout closed, console line dropped");
    }
}

/// Output handler for consistent CLI formatting
#[derive(Debug, Clone, Copy)]
pub struct Output {
    verbose: bool,
    quiet: bool,
}

impl Output {
    /// Create a new output handler
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if !self.quiet {
            stdout_line(format_args!("{} {}", style("✔").green(), message));
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if !self.quiet {
            stdout_line(format_args!("{} {}", style("⚠").yellow(), message));
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if !self.quiet {
            stdout_line(format_args!("{} {}", style("ℹ").blue(), message));
        }
    }

    /// Print a verbose message (only if verbose mode is enabled)
    pub fn verbose(&self, message: &str) {
        if self.verbose && !self.quiet {
            stdout_line(format_args!("{} {}", style("ℹ").dim(), style(message).dim()));
        }
    }

    /// Print summary statistics with enhanced styling
    pub fn summary_stats(&self, label: &str, value: impl fmt::Display) {
        if !self.quiet {
            stdout_line(format_args!("  {} {}", style(label).dim(), style(value.to_string()).bold()));
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }
}

/// Mirrors a run to the terminal.
///
/// Report lines are printed even with `--quiet`; they are the product of the run.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleStatus {
    output: Output,
}

impl ConsoleStatus {
    pub fn new(output: Output) -> Self {
        Self { output }
    }
}

impl StatusStream for ConsoleStatus {
    fn report_line(&self, line: &str) {
        stdout_line(format_args!("{line}"));
    }

    fn progress(&self, completed: usize, total: usize) {
        if !self.output.is_quiet() {
            stdout_line(format_args!(
                "{} {}",
                style("Progress:").cyan(),
                ProgressTracker::message(completed, total)
            ));
        }
    }
}
