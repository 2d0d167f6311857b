//! Typed errors for the stages that run before a command exists.
//!
//! [`LexingError`] and [`InputError::LineTooLong`] abort only the current line.
//! Errors from running a command travel as [`anyhow::Error`] and are confined to
//! that command. A line that cannot be decoded is skipped. Any other failure of
//! the line source ends the session, as does an interrupt at the prompt.

use thiserror::Error;

/// Errors raised while splitting a line into arguments.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LexingError {
    /// A single token grew past the configured byte limit.
    #[error("argument {index} too long (max {limit} bytes)")]
    ArgumentTooLong { index: usize, limit: usize },
}

/// Errors raised by a line source.
#[derive(Debug, Error)]
pub enum InputError {
    /// The line was read but exceeds the configured limit; it is not run.
    #[error("line too long ({len} bytes, max {limit})")]
    LineTooLong { len: usize, limit: usize },
    /// The line was read but is not valid UTF-8; it is not run.
    #[error("line is not valid UTF-8")]
    InvalidEncoding,
    /// Ctrl-C at the prompt.
    #[error("interrupted")]
    Interrupted,
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
    #[error("line editor failed: {0}")]
    Editor(#[from] rustyline::error::ReadlineError),
}

impl InputError {
    /// Whether the session can go on with the next line.
    pub fn is_line_error(&self) -> bool {
        matches!(self, Self::LineTooLong { .. } | Self::InvalidEncoding)
    }
}
