use crate::env::Environment;
use tracing::{debug, warn};

pub const DEFAULT_MAX_LINE_LEN: usize = 1024;
pub const DEFAULT_MAX_ARGS: usize = 10;
pub const DEFAULT_MAX_ARG_LEN: usize = 128;

/// Size limits applied to every input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Longest accepted input line, in bytes, without the newline.
    pub max_line_len: usize,
    /// Tokens kept per line; anything scanned after the last one is dropped.
    pub max_args: usize,
    /// Longest accepted single token, in bytes.
    pub max_arg_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_line_len: DEFAULT_MAX_LINE_LEN,
            max_args: DEFAULT_MAX_ARGS,
            max_arg_len: DEFAULT_MAX_ARG_LEN,
        }
    }
}

/// Interpreter settings.
///
/// There are no command-line flags; limits can be overridden through
/// `MINISH_MAX_LINE`, `MINISH_MAX_ARGS` and `MINISH_MAX_ARG_LEN`.
#[derive(Debug, Clone)]
pub struct Config {
    pub limits: Limits,
    pub prompt: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            prompt: String::from("$ "),
        }
    }
}

impl Config {
    pub fn from_env(env: &Environment) -> Config {
        let mut config = Config::default();
        let limits = &mut config.limits;
        override_limit(env, "MINISH_MAX_LINE", &mut limits.max_line_len);
        override_limit(env, "MINISH_MAX_ARGS", &mut limits.max_args);
        override_limit(env, "MINISH_MAX_ARG_LEN", &mut limits.max_arg_len);
        config
    }

    /// Line editor settings. History stays off: the shell keeps none.
    pub fn editor_config(&self) -> rustyline::Config {
        rustyline::config::Builder::new()
            .auto_add_history(false)
            .build()
    }
}

fn override_limit(env: &Environment, key: &str, slot: &mut usize) {
    let Some(raw) = env.get_var(key) else {
        return;
    };
    match raw.trim().parse::<usize>() {
        Ok(value) if value > 0 => {
            debug!(key, value, "limit overridden");
            *slot = value;
        }
        _ => warn!(key, raw, "ignoring invalid limit, keeping {}", slot),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.prompt, "$ ");
        assert_eq!(config.limits.max_line_len, 1024);
        assert_eq!(config.limits.max_args, 10);
        assert_eq!(config.limits.max_arg_len, 128);
    }

    #[test]
    fn test_overrides_from_env() {
        let mut env = Environment::empty("/");
        env.set_var("MINISH_MAX_ARGS", "3");
        env.set_var("MINISH_MAX_ARG_LEN", " 16 ");

        let config = Config::from_env(&env);
        assert_eq!(config.limits.max_args, 3);
        assert_eq!(config.limits.max_arg_len, 16);
        assert_eq!(config.limits.max_line_len, DEFAULT_MAX_LINE_LEN);
    }

    #[test]
    fn test_invalid_overrides_are_ignored() {
        let mut env = Environment::empty("/");
        env.set_var("MINISH_MAX_ARGS", "0");
        env.set_var("MINISH_MAX_LINE", "lots");

        let config = Config::from_env(&env);
        assert_eq!(config.limits, Limits::default());
    }
}
