//! The in-process commands: `exit`, `echo`, `type`, `pwd` and `cd`.

use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::env::Environment;
use crate::interpreter::Factory;
use crate::resolve::{Resolution, resolve};
use anyhow::{Result, anyhow};
use argh::{EarlyExit, FromArgs};
use std::env;
use std::fs;
use std::io::{self, Write};

/// Built-in commands known to the shell at compile time.
///
/// Builtins are built through [`argh::FromArgs`] and executed directly in-process
/// without spawning a child process. None of them takes options, so each one
/// implements `from_args` by hand and keeps its arguments verbatim: `type help`
/// looks up `help`, `cd -x` enters `-x`.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "echo" or "cd".
    fn name() -> &'static str;

    /// Executes the command against the shared environment.
    ///
    /// An `Err` is shown to the user and only fails this command.
    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        match <T as BuiltinCommand>::execute(*self, stdout, env) {
            Ok(x) => Ok(x),
            Err(e) => {
                writeln!(stdout, "{}", e)?;
                Ok(1)
            }
        }
    }
}

struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(self: Box<Self>, stdout: &mut dyn Write, _env: &mut Environment) -> Result<i32> {
        stdout.write_all(self.output.as_bytes())?;
        if !self.output.ends_with('\n') {
            stdout.write_all(b"\n")?;
        }
        Ok(if self.is_error { 1 } else { 0 })
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(
        &self,
        _env: &Environment,
        argv: &[String],
    ) -> Option<Box<dyn ExecutableCommand>> {
        let (name, rest) = argv.split_first()?;
        if name != T::name() {
            return None;
        }
        let args: Vec<&str> = rest.iter().map(String::as_str).collect();
        Some(match T::from_args(&[name.as_str()], &args) {
            Ok(cmd) => Box::new(cmd),
            Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                output,
                is_error: status.is_err(),
            }),
        })
    }
}

/// Print the current working directory to standard output. Arguments are ignored.
pub struct Pwd;

impl FromArgs for Pwd {
    fn from_args(_command_name: &[&str], _args: &[&str]) -> Result<Self, EarlyExit> {
        Ok(Pwd)
    }
}

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "pwd"
    }

    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        writeln!(stdout, "{}", env.current_dir.display())?;
        Ok(0)
    }
}

/// Change the current working directory.
/// A leading `~` is replaced with the value of HOME.
pub struct Cd {
    /// Directory to switch to; only the first one is used.
    pub targets: Vec<String>,
}

impl FromArgs for Cd {
    fn from_args(_command_name: &[&str], args: &[&str]) -> Result<Self, EarlyExit> {
        Ok(Cd {
            targets: args.iter().map(|s| s.to_string()).collect(),
        })
    }
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        let target = self
            .targets
            .first()
            .ok_or_else(|| anyhow!("cd: missing argument"))?;

        let dir = match target.strip_prefix('~') {
            Some(rest) => {
                let home = env.get_var("HOME").ok_or_else(|| anyhow!("cd: HOME not set"))?;
                format!("{home}{rest}")
            }
            None => target.clone(),
        };

        let new_dir = env.current_dir.join(&dir);
        let canonical = fs::canonicalize(&new_dir).map_err(|e| cd_error(&dir, e))?;
        env::set_current_dir(&canonical).map_err(|e| cd_error(&dir, e))?;
        env.current_dir = canonical;
        Ok(0)
    }
}

fn cd_error(dir: &str, e: io::Error) -> anyhow::Error {
    if e.kind() == io::ErrorKind::NotFound {
        return anyhow!("cd: {}: No such file or directory", dir);
    }
    match e.raw_os_error() {
        Some(errno) => anyhow!("cd: {}: {}", dir, nix::errno::Errno::from_raw(errno).desc()),
        None => anyhow!("cd: {}: {}", dir, e),
    }
}

/// Leave the shell. Arguments are ignored.
pub struct Exit;

impl FromArgs for Exit {
    fn from_args(_command_name: &[&str], _args: &[&str]) -> Result<Self, EarlyExit> {
        Ok(Exit)
    }
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        env.should_exit = true;
        Ok(0)
    }
}

/// Write the arguments to standard output, separated by single spaces.
///
/// Arguments are taken verbatim: there are no options, so `echo -n x` prints `-n x`.
pub struct Echo {
    pub args: Vec<String>,
}

impl FromArgs for Echo {
    fn from_args(_command_name: &[&str], args: &[&str]) -> Result<Self, EarlyExit> {
        Ok(Echo {
            args: args.iter().map(|s| s.to_string()).collect(),
        })
    }
}

impl BuiltinCommand for Echo {
    fn name() -> &'static str {
        "echo"
    }

    fn execute(self, stdout: &mut dyn Write, _env: &mut Environment) -> Result<ExitCode> {
        if !self.args.is_empty() {
            writeln!(stdout, "{}", self.args.join(" "))?;
        }
        Ok(0)
    }
}

/// Tell how a command name would be interpreted.
pub struct Type {
    pub names: Vec<String>,
}

impl FromArgs for Type {
    fn from_args(_command_name: &[&str], args: &[&str]) -> Result<Self, EarlyExit> {
        Ok(Type {
            names: args.iter().map(|s| s.to_string()).collect(),
        })
    }
}

impl BuiltinCommand for Type {
    fn name() -> &'static str {
        "type"
    }

    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode> {
        let name = self
            .names
            .first()
            .ok_or_else(|| anyhow!("type: missing argument"))?;

        match resolve(env, name) {
            Resolution::Builtin => writeln!(stdout, "{} is a shell builtin", name)?,
            Resolution::External(path) => writeln!(stdout, "{} is {}", name, path.display())?,
            Resolution::NotFound => {
                writeln!(stdout, "{}: not found", name)?;
                return Ok(1);
            }
        }
        Ok(0)
    }
}
