use crate::env::Environment;
use anyhow::Result;
use std::io::Write;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// Codes are logged but never exposed to the user as `$?`.
pub type ExitCode = i32;

/// Object-safe trait for any command that can be executed by the shell.
///
/// This is implemented by built-ins via a blanket impl and by external commands.
pub trait ExecutableCommand {
    /// Executes the command. Builtins write to `stdout`; external programs
    /// inherit the interpreter's own streams.
    fn execute(self: Box<Self>, stdout: &mut dyn Write, env: &mut Environment)
    -> Result<ExitCode>;
}

/// Factory that tries to create a command from its argument sequence.
///
/// `argv[0]` is the command name as typed. Returns `None` when the factory
/// doesn't recognize it.
pub trait CommandFactory {
    fn try_create(&self, env: &Environment, argv: &[String])
    -> Option<Box<dyn ExecutableCommand>>;
}
