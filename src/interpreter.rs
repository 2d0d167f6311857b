use crate::command::{CommandFactory, ExitCode};
use crate::config::Config;
use crate::env::Environment;
use crate::error::InputError;
use crate::external::ExternalFactory;
use crate::input::LineSource;
use crate::lexer::split_into_args;
use crate::process::{ProcessLauncher, StdLauncher};
use std::io::Write;
use std::rc::Rc;
use tracing::{debug, trace};

/// Status reported for a name that is neither a builtin nor found on `PATH`.
pub const NOT_FOUND: ExitCode = 127;

/// Factory allows creating instances of ExecutableCommand.
///
/// Only used for builtins; external programs go through [`ExternalFactory`].
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// A minimal shell-like interpreter that can execute built-in and external commands.
///
/// The interpreter owns an [`Environment`] and a list of [`CommandFactory`] objects
/// that are queried, in order, to create commands by name. See [`Default`] for the
/// factories included out of the box.
///
/// Example
/// ```
/// use minish::Interpreter;
/// let mut sh = Interpreter::default();
/// let mut out = Vec::new();
/// let code = sh.execute_line("echo 'hello   world'", &mut out).unwrap();
/// assert_eq!(code, 0);
/// assert_eq!(out, b"hello   world\n");
/// ```
pub struct Interpreter {
    env: Environment,
    config: Config,
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of command factories.
    pub fn new(env: Environment, config: Config, commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            env,
            config,
            commands,
        }
    }

    /// The standard builtins plus external programs started through `launcher`.
    pub fn with_launcher(
        env: Environment,
        config: Config,
        launcher: Rc<dyn ProcessLauncher>,
    ) -> Self {
        use crate::builtin::*;
        Self::new(
            env,
            config,
            vec![
                Box::new(Factory::<Pwd>::default()),
                Box::new(Factory::<Cd>::default()),
                Box::new(Factory::<Echo>::default()),
                Box::new(Factory::<Exit>::default()),
                Box::new(Factory::<Type>::default()),
                Box::new(ExternalFactory::new(launcher)),
            ],
        )
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether `exit` has been run.
    pub fn should_exit(&self) -> bool {
        self.env.should_exit
    }

    /// Run one argument sequence; `argv[0]` is the command name.
    ///
    /// An unknown name is reported on `stdout` and yields [`NOT_FOUND`]. An empty
    /// sequence does nothing.
    pub fn run(&mut self, argv: &[String], stdout: &mut dyn Write) -> anyhow::Result<ExitCode> {
        let Some(name) = argv.first() else {
            return Ok(0);
        };
        for factory in &self.commands {
            if let Some(cmd) = factory.try_create(&self.env, argv) {
                return cmd.execute(stdout, &mut self.env);
            }
        }
        writeln!(stdout, "{}: command not found", name)?;
        Ok(NOT_FOUND)
    }

    /// Tokenize and run one input line.
    ///
    /// Errors only concern this line: it was too long, or one of its arguments was.
    pub fn execute_line(&mut self, line: &str, stdout: &mut dyn Write) -> anyhow::Result<ExitCode> {
        let limit = self.config.limits.max_line_len;
        if line.len() > limit {
            return Err(InputError::LineTooLong {
                len: line.len(),
                limit,
            }
            .into());
        }

        let argv = split_into_args(line, &self.config.limits)?;
        trace!(?argv, "tokenized");
        if argv.is_empty() {
            return Ok(0);
        }

        let code = self.run(&argv, stdout)?;
        debug!(command = %argv[0], code, "command finished");
        Ok(code)
    }

    /// Read-eval loop: prompt, read, run, until `exit` or end of input.
    ///
    /// Failures of a single line, including one that cannot be decoded, are
    /// printed to stderr and the loop continues. Any other failure of the line
    /// source, or an interrupt at the prompt, is returned.
    pub fn repl(
        &mut self,
        source: &mut dyn LineSource,
        stdout: &mut dyn Write,
    ) -> anyhow::Result<()> {
        while !self.env.should_exit {
            let line = match source.read_line(&self.config.prompt) {
                Ok(Some(line)) => line,
                Ok(None) => {
                    debug!("end of input");
                    break;
                }
                Err(e) if e.is_line_error() => {
                    eprintln!("{}", e);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            if let Err(e) = self.execute_line(&line, stdout) {
                eprintln!("{}", e);
            }
            stdout.flush()?;
        }
        Ok(())
    }
}

impl Default for Interpreter {
    /// Create an interpreter over the current process state with the default commands:
    /// - built-ins: `pwd`, `cd`, `echo`, `exit`, `type`
    /// - external command launcher
    fn default() -> Self {
        let env = Environment::new();
        let config = Config::from_env(&env);
        Self::with_launcher(env, config, Rc::new(StdLauncher))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::tests::lock_current_dir;
    use crate::config::Limits;
    use crate::error::LexingError;
    use crate::input::ReaderSource;
    use crate::process::tests::rooted_env;
    use crate::resolve::tests::{make_unique_temp_dir, touch};
    use std::env as stdenv;
    use std::fs;
    use std::io::Cursor;

    fn interpreter(env: Environment) -> Interpreter {
        Interpreter::with_launcher(env, Config::default(), Rc::new(StdLauncher))
    }

    fn line(sh: &mut Interpreter, input: &str) -> (ExitCode, String) {
        let mut out = Vec::new();
        let code = sh.execute_line(input, &mut out).unwrap();
        (code, String::from_utf8(out).unwrap())
    }

    /// Feed `input` through the read loop, returning stdout and the prompt stream.
    fn session(sh: &mut Interpreter, input: &str) -> (String, String) {
        let mut source = ReaderSource::new(Cursor::new(input.to_string()), Vec::new());
        let mut out = Vec::new();
        sh.repl(&mut source, &mut out).unwrap();
        let (_, prompts) = source.into_inner();
        (
            String::from_utf8(out).unwrap(),
            String::from_utf8(prompts).unwrap(),
        )
    }

    #[test]
    fn test_echo_through_tokenizer() {
        let mut sh = interpreter(Environment::empty("/"));
        assert_eq!(line(&mut sh, "echo hello world"), (0, "hello world\n".into()));
        assert_eq!(line(&mut sh, "echo 'a  b'"), (0, "a  b\n".into()));
        assert_eq!(line(&mut sh, "echo \"a\"\"b\""), (0, "ab\n".into()));
        assert_eq!(line(&mut sh, "echo foo'bar'baz"), (0, "foobarbaz\n".into()));
    }

    #[test]
    fn test_command_not_found() {
        let mut sh = interpreter(Environment::empty("/"));
        assert_eq!(
            line(&mut sh, "frobnicate now"),
            (NOT_FOUND, "frobnicate: command not found\n".into())
        );
    }

    #[test]
    fn test_blank_line_does_nothing() {
        let mut sh = interpreter(Environment::empty("/"));
        assert_eq!(line(&mut sh, ""), (0, String::new()));
        assert_eq!(line(&mut sh, "     "), (0, String::new()));
    }

    #[test]
    fn test_extra_arguments_are_dropped() {
        let mut sh = interpreter(Environment::empty("/"));
        assert_eq!(
            line(&mut sh, "echo 1 2 3 4 5 6 7 8 9 10 11 12"),
            (0, "1 2 3 4 5 6 7 8 9\n".into())
        );
    }

    #[test]
    fn test_overlong_argument_is_reported() {
        let config = Config {
            limits: Limits {
                max_arg_len: 8,
                ..Limits::default()
            },
            ..Config::default()
        };
        let mut sh = Interpreter::with_launcher(Environment::empty("/"), config, Rc::new(StdLauncher));

        let err = sh
            .execute_line("echo short muchtoolong", &mut Vec::new())
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<LexingError>(),
            Some(&LexingError::ArgumentTooLong { index: 2, limit: 8 })
        );
        assert_eq!(line(&mut sh, "echo short"), (0, "short\n".into()));
    }

    #[test]
    fn test_overlong_line_is_reported() {
        let mut sh = interpreter(Environment::empty("/"));
        let long = format!("echo {}", "x".repeat(2000));
        let err = sh.execute_line(&long, &mut Vec::new()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InputError>(),
            Some(InputError::LineTooLong { limit: 1024, .. })
        ));
    }

    #[test]
    fn test_builtin_wins_over_executable() {
        let base = make_unique_temp_dir("shadow");
        touch(&base.join("echo"), 0o755);
        let mut env = Environment::empty("/");
        env.set_var("PATH", base.display().to_string());
        let mut sh = interpreter(env);

        assert_eq!(line(&mut sh, "type echo"), (0, "echo is a shell builtin\n".into()));
        assert_eq!(line(&mut sh, "echo still builtin"), (0, "still builtin\n".into()));

        let _ = fs::remove_dir_all(base);
    }

    #[test]
    fn test_external_command_exit_code() {
        let mut sh = interpreter(rooted_env());
        assert_eq!(line(&mut sh, "sh -c 'exit 3'"), (3, String::new()));
        assert_eq!(line(&mut sh, "sh -c 'kill -9 $$'"), (137, String::new()));
    }

    #[test]
    fn test_external_sees_context_dir() {
        let base = make_unique_temp_dir("ctxdir");
        let mut env = rooted_env();
        env.current_dir = base.clone();
        let mut sh = interpreter(env);

        let probe = format!("sh -c 'test \"$(pwd -P)\" = {}'", base.display());
        assert_eq!(line(&mut sh, &probe).0, 0);

        let _ = fs::remove_dir_all(base);
    }

    #[test]
    fn test_failed_cd_leaves_pwd_unchanged() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let mut sh = interpreter(Environment::empty(orig.clone()));

        let (_, before) = line(&mut sh, "pwd");
        assert_eq!(
            line(&mut sh, "cd /no/such/minish/dir"),
            (1, "cd: /no/such/minish/dir: No such file or directory\n".into())
        );
        assert_eq!(line(&mut sh, "pwd").1, before);
        assert_eq!(stdenv::current_dir().unwrap(), orig);
    }

    #[test]
    fn test_cd_then_pwd() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let temp = make_unique_temp_dir("cdpwd");
        let mut sh = interpreter(Environment::empty(orig.clone()));

        let cmd = format!("cd {}", temp.display());
        assert_eq!(line(&mut sh, &cmd), (0, String::new()));
        assert_eq!(line(&mut sh, "pwd"), (0, format!("{}\n", temp.display())));

        stdenv::set_current_dir(orig).expect("failed to restore cwd");
        let _ = fs::remove_dir_all(temp);
    }

    #[test]
    fn test_repl_stops_at_exit() {
        let mut sh = interpreter(Environment::empty("/"));
        let (out, prompts) = session(&mut sh, "echo hi\n\ntype cd\nexit 5\necho never\n");

        assert_eq!(out, "hi\ncd is a shell builtin\n");
        assert_eq!(prompts, "$ ".repeat(4));
        assert!(sh.should_exit());
    }

    #[test]
    fn test_repl_ends_gracefully_at_eof() {
        let mut sh = interpreter(Environment::empty("/"));
        let (out, prompts) = session(&mut sh, "echo one\nnope");

        assert_eq!(out, "one\nnope: command not found\n");
        assert_eq!(prompts, "$ ".repeat(3));
        assert!(!sh.should_exit());
    }

    #[test]
    fn test_repl_survives_bad_lines() {
        let mut sh = interpreter(Environment::empty("/"));
        let input = format!("echo {}\ntype\necho after\n", "y".repeat(300));
        let (out, _) = session(&mut sh, &input);

        assert_eq!(out, "type: missing argument\nafter\n");
    }

    /// Replays canned `read_line` results.
    struct Scripted(std::collections::VecDeque<Result<Option<String>, InputError>>);

    impl LineSource for Scripted {
        fn read_line(&mut self, _prompt: &str) -> Result<Option<String>, InputError> {
            self.0.pop_front().unwrap_or(Ok(None))
        }
    }

    fn scripted(items: Vec<Result<Option<&str>, InputError>>) -> Scripted {
        Scripted(
            items
                .into_iter()
                .map(|r| r.map(|l| l.map(str::to_string)))
                .collect(),
        )
    }

    #[test]
    fn test_repl_replaces_invalid_utf8_from_plain_input() {
        let mut sh = interpreter(Environment::empty("/"));
        let mut source =
            ReaderSource::new(Cursor::new(b"echo a\xffb\necho after\n".to_vec()), std::io::sink());
        let mut out = Vec::new();
        sh.repl(&mut source, &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "a\u{fffd}b\nafter\n");
    }

    #[test]
    fn test_repl_skips_undecodable_line() {
        let mut sh = interpreter(Environment::empty("/"));
        let mut source = scripted(vec![
            Ok(Some("echo before")),
            Err(InputError::InvalidEncoding),
            Ok(Some("echo after")),
        ]);
        let mut out = Vec::new();
        sh.repl(&mut source, &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "before\nafter\n");
    }

    #[test]
    fn test_repl_returns_interrupt_and_source_failures() {
        let mut sh = interpreter(Environment::empty("/"));
        let mut source = scripted(vec![
            Ok(Some("echo one")),
            Err(InputError::Interrupted),
            Ok(Some("echo never")),
        ]);
        let mut out = Vec::new();
        let err = sh.repl(&mut source, &mut out).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InputError>(),
            Some(InputError::Interrupted)
        ));
        assert_eq!(out, b"one\n");

        let mut source = scripted(vec![Err(InputError::Io(std::io::Error::other("gone")))]);
        let err = sh.repl(&mut source, &mut Vec::new()).unwrap_err();
        assert!(matches!(err.downcast_ref::<InputError>(), Some(InputError::Io(_))));
    }

    #[test]
    fn test_custom_factories() {
        let mut sh = Interpreter::new(
            Environment::empty("/"),
            Config::default(),
            vec![Box::new(Factory::<crate::builtin::Echo>::default())],
        );
        assert_eq!(line(&mut sh, "echo x"), (0, "x\n".into()));
        assert_eq!(
            line(&mut sh, "pwd"),
            (NOT_FOUND, "pwd: command not found\n".into())
        );
    }
}
