//! Commands run as child processes.

use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::env::Environment;
use crate::process::ProcessLauncher;
use crate::resolve::find_command_path;
use anyhow::Result;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::{debug, warn};

/// Status reported when the program could not be started at all.
pub const LAUNCH_FAILED: ExitCode = 127;

/// Command that is not a builtin.
pub struct ExternalCommand {
    program: PathBuf,
    argv: Vec<String>,
    launcher: Rc<dyn ProcessLauncher>,
}

impl ExternalCommand {
    pub fn new(program: PathBuf, argv: Vec<String>, launcher: Rc<dyn ProcessLauncher>) -> Self {
        Self {
            program,
            argv,
            launcher,
        }
    }
}

/// Creates [`ExternalCommand`]s for names found via `PATH`.
///
/// Must be queried after the builtin factories.
pub struct ExternalFactory {
    launcher: Rc<dyn ProcessLauncher>,
}

impl ExternalFactory {
    pub fn new(launcher: Rc<dyn ProcessLauncher>) -> Self {
        Self { launcher }
    }
}

impl CommandFactory for ExternalFactory {
    fn try_create(
        &self,
        env: &Environment,
        argv: &[String],
    ) -> Option<Box<dyn ExecutableCommand>> {
        let name = argv.first()?;
        let program = find_command_path(env, name)?;
        Some(Box::new(ExternalCommand::new(
            program,
            argv.to_vec(),
            Rc::clone(&self.launcher),
        )))
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(
        self: Box<Self>,
        _stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let name = self.argv.first().map(String::as_str).unwrap_or_default();
        let handle = match self.launcher.spawn(&self.program, &self.argv, env) {
            Ok(handle) => handle,
            Err(e) => {
                // Confined to this command; the loop goes on.
                warn!(program = %self.program.display(), error = %e, "launch failed");
                eprintln!("{}: {}", name, e);
                return Ok(LAUNCH_FAILED);
            }
        };

        let pid = handle.id();
        debug!(pid, program = %self.program.display(), "spawned");
        let status = handle.wait()?;
        debug!(pid, %status, "child finished");
        Ok(status.code())
    }
}
