//! Classifying a command name: builtin, executable found on `PATH`, or nothing.

use crate::env::Environment;
use nix::unistd::{AccessFlags, access};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Names handled in-process. Matching is exact and case-sensitive.
pub const BUILTINS: [&str; 5] = ["echo", "exit", "type", "pwd", "cd"];

/// What a command name refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Builtin,
    External(PathBuf),
    NotFound,
}

pub fn is_builtin(name: &str) -> bool {
    BUILTINS.contains(&name)
}

/// Classify `name`. Builtins win over executables with the same name.
pub fn resolve(env: &Environment, name: &str) -> Resolution {
    let resolution = if is_builtin(name) {
        Resolution::Builtin
    } else {
        match find_command_path(env, name) {
            Some(path) => Resolution::External(path),
            None => Resolution::NotFound,
        }
    };
    debug!(name, ?resolution, "resolved command");
    resolution
}

/// Locate the executable a command name refers to.
///
/// Behavior:
/// - Empty name: `None`.
/// - Name containing `/` (e.g. `/bin/sh`, `./run`): checked directly, relative
///   names against the environment's working directory.
/// - Anything else: searched in `PATH`, read from `env` on every call. A missing
///   or empty `PATH` finds nothing.
pub fn find_command_path(env: &Environment, name: &str) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }

    if name.contains('/') {
        let path = env.current_dir.join(name);
        return is_executable(&path).then_some(path);
    }

    let search_paths = env.get_var("PATH")?;
    find_in_path(search_paths, name)
}

/// Scan `search_paths` (colon separated) left to right and return the first
/// `dir/name` that is executable. Empty entries are skipped.
pub fn find_in_path(search_paths: &str, name: &str) -> Option<PathBuf> {
    search_paths
        .split(':')
        .filter(|dir| !dir.is_empty())
        .map(|dir| PathBuf::from(format!("{dir}/{name}")))
        .find(|candidate| {
            let found = is_executable(candidate);
            trace!(candidate = %candidate.display(), found, "path candidate");
            found
        })
}

fn is_executable(path: &Path) -> bool {
    access(path, AccessFlags::X_OK).is_ok() && !path.is_dir()
}
