//! A minimal interactive command interpreter.
//!
//! Each input line is split into arguments by [`lexer`], the first argument is
//! resolved by [`resolve`] to a builtin or an executable on `PATH`, and the command
//! is then run in-process or as a child process that is waited on before the next
//! prompt.
//!
//! The main entry point is [`Interpreter`]. All mutable process state a command may
//! read or change (variables, working directory, the exit request) lives in
//! [`env::Environment`], which is threaded through every command.

mod builtin;
pub mod command;
pub mod config;
pub mod env;
pub mod error;
pub mod external;
pub mod input;
mod interpreter;
pub mod lexer;
pub mod process;
pub mod resolve;

/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::{Interpreter, NOT_FOUND};
