//! Process launching behind a small interface, so the executor can be driven by
//! a fake in tests.

use crate::env::Environment;
use nix::sys::signal::Signal;
use std::fmt;
use std::io;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::path::Path;
use std::process::{Child, Command, ExitStatus};

/// How a child process ended.
///
/// Only exit and death by signal count; a stopped child is still waited on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalStatus {
    Exited(i32),
    Signaled(i32),
}

impl TerminalStatus {
    /// Shell-style numeric status: the exit code, or 128 + signal number.
    pub fn code(self) -> i32 {
        match self {
            TerminalStatus::Exited(code) => code,
            TerminalStatus::Signaled(signal) => 128 + signal,
        }
    }

    pub fn success(self) -> bool {
        self == TerminalStatus::Exited(0)
    }
}

impl From<ExitStatus> for TerminalStatus {
    fn from(status: ExitStatus) -> Self {
        match (status.code(), status.signal()) {
            (Some(code), _) => TerminalStatus::Exited(code),
            (None, Some(signal)) => TerminalStatus::Signaled(signal),
            // wait(2) only reports terminal states, so one of the two is set
            (None, None) => TerminalStatus::Exited(-1),
        }
    }
}

impl fmt::Display for TerminalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminalStatus::Exited(code) => write!(f, "exited with {code}"),
            TerminalStatus::Signaled(signal) => match Signal::try_from(*signal) {
                Ok(sig) => write!(f, "killed by {}", sig.as_str()),
                Err(_) => write!(f, "killed by signal {signal}"),
            },
        }
    }
}

/// A started child process.
pub trait ProcessHandle {
    fn id(&self) -> u32;

    /// Block until the child reaches a terminal state.
    fn wait(self: Box<Self>) -> io::Result<TerminalStatus>;
}

/// Starts external programs.
pub trait ProcessLauncher {
    /// Start `program` with `argv`, where `argv[0]` is the name the user typed
    /// and becomes the child's own `argv[0]`.
    fn spawn(
        &self,
        program: &Path,
        argv: &[String],
        env: &Environment,
    ) -> io::Result<Box<dyn ProcessHandle>>;
}

/// Launcher backed by `std::process::Command`; standard streams are inherited.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdLauncher;

impl ProcessLauncher for StdLauncher {
    fn spawn(
        &self,
        program: &Path,
        argv: &[String],
        env: &Environment,
    ) -> io::Result<Box<dyn ProcessHandle>> {
        let mut cmd = Command::new(program);
        if let Some((arg0, args)) = argv.split_first() {
            cmd.arg0(arg0).args(args);
        }
        let child = cmd
            .env_clear()
            .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&env.current_dir)
            .spawn()?;
        Ok(Box::new(StdChild(child)))
    }
}

struct StdChild(Child);

impl ProcessHandle for StdChild {
    fn id(&self) -> u32 {
        self.0.id()
    }

    fn wait(mut self: Box<Self>) -> io::Result<TerminalStatus> {
        // Child::wait uses waitpid without WUNTRACED: stops are never reported.
        self.0.wait().map(TerminalStatus::from)
    }
}
