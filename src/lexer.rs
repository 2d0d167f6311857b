//! Splits a raw input line into argument strings.
//!
//! Quoting rules:
//! - outside quotes, runs of spaces separate arguments (tabs do not);
//! - `\"` and `\\` are escapes in every state, including inside single quotes;
//! - a doubled quote (`''` or `""`) is dropped without ending the argument;
//! - quoted and unquoted text that touch merge into one argument,
//!   so `foo'bar'baz` is the single argument `foobarbaz`.
//!
//! Scanning stops silently once `max_args` arguments have been collected; the
//! rest of the line is discarded.

use crate::config::Limits;
use crate::error::LexingError;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    Unquoted,
    SingleQuoted,
    DoubleQuoted,
}

struct LexingFSM<'a> {
    input: Vec<char>,
    pos: usize,
    state: LexingState,
    buffer: String,
    out: Vec<String>,
    limits: &'a Limits,
}

impl<'a> LexingFSM<'a> {
    fn new(line: &str, limits: &'a Limits) -> Self {
        LexingFSM {
            input: line.chars().collect(),
            pos: 0,
            state: LexingState::Unquoted,
            buffer: String::new(),
            out: Vec::new(),
            limits,
        }
    }

    /// Runs the state machine over the whole line.
    ///
    /// An argument still open at end of line is emitted as is, even when the
    /// line ends inside a quote.
    fn make_args(mut self) -> Result<Vec<String>, LexingError> {
        self.skip_spaces();

        while self.out.len() < self.limits.max_args {
            let Some(ch) = self.read_char() else {
                break;
            };

            if ch == '\\' {
                if let Some(escaped @ ('"' | '\\')) = self.peek_char() {
                    self.read_char();
                    self.push(escaped)?;
                    continue;
                }
            }

            match self.state {
                LexingState::Unquoted => self.handle_unquoted(ch)?,
                LexingState::SingleQuoted => self.handle_single_quote(ch)?,
                LexingState::DoubleQuoted => self.handle_double_quote(ch)?,
            }
        }

        if self.out.len() < self.limits.max_args {
            if self.state != LexingState::Unquoted {
                debug!(state = ?self.state, "line ended inside a quote");
            }
            self.finish_arg();
        } else if self.pos < self.input.len() {
            debug!(
                max_args = self.limits.max_args,
                dropped = self.input.len() - self.pos,
                "argument limit reached, discarding rest of line"
            );
        }

        Ok(self.out)
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.input.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn skip_spaces(&mut self) {
        while self.peek_char() == Some(' ') {
            self.pos += 1;
        }
    }

    fn handle_unquoted(&mut self, ch: char) -> Result<(), LexingError> {
        match ch {
            ' ' => {
                self.finish_arg();
                self.skip_spaces();
            }
            '\'' => {
                if self.peek_char() == Some('\'') {
                    self.read_char();
                } else {
                    self.state = LexingState::SingleQuoted;
                }
            }
            '"' => {
                if self.peek_char() == Some('"') {
                    self.read_char();
                } else {
                    self.state = LexingState::DoubleQuoted;
                }
            }
            c => self.push(c)?,
        }
        Ok(())
    }

    fn handle_single_quote(&mut self, ch: char) -> Result<(), LexingError> {
        match ch {
            '\'' => {
                if self.peek_char() == Some('\'') {
                    self.read_char();
                } else {
                    self.state = LexingState::Unquoted;
                }
            }
            c => self.push(c)?,
        }
        Ok(())
    }

    fn handle_double_quote(&mut self, ch: char) -> Result<(), LexingError> {
        match ch {
            '"' => {
                if self.peek_char() == Some('"') {
                    self.read_char();
                    return Ok(());
                }
                self.state = LexingState::Unquoted;
                // A closing quote followed by text keeps the argument open.
                if matches!(self.peek_char(), None | Some(' ')) {
                    self.finish_arg();
                    self.skip_spaces();
                }
            }
            c => self.push(c)?,
        }
        Ok(())
    }

    fn push(&mut self, ch: char) -> Result<(), LexingError> {
        if self.buffer.len() + ch.len_utf8() > self.limits.max_arg_len {
            return Err(LexingError::ArgumentTooLong {
                index: self.out.len(),
                limit: self.limits.max_arg_len,
            });
        }
        self.buffer.push(ch);
        Ok(())
    }

    fn finish_arg(&mut self) {
        if !self.buffer.is_empty() {
            self.out.push(std::mem::take(&mut self.buffer));
        }
    }
}

/// Tokenizes one input line (without its newline) into an argument sequence.
///
/// An all-space line yields an empty vector. Fails only when an argument is
/// longer than `limits.max_arg_len` bytes.
pub fn split_into_args(line: &str, limits: &Limits) -> Result<Vec<String>, LexingError> {
    LexingFSM::new(line, limits).make_args()
}
