use minish::Interpreter;
use minish::error::InputError;
use minish::input::line_source;
use nix::sys::signal::{Signal, raise};
use std::io::{self, IsTerminal};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    // Silent unless RUST_LOG asks otherwise; logs never share stdout with commands.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off")))
        .init();

    let mut sh = Interpreter::default();
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut source = line_source(interactive, stdin.lock(), io::stdout(), sh.config())?;

    match sh.repl(&mut *source, &mut io::stdout()) {
        Err(e) if matches!(e.downcast_ref::<InputError>(), Some(InputError::Interrupted)) => {
            // The editor caught Ctrl-C; die from it the way an unhandled SIGINT would.
            drop(source);
            raise(Signal::SIGINT)?;
            Ok(())
        }
        res => res,
    }
}
