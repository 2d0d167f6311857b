//! Where input lines come from.

use crate::config::Config;
use crate::error::InputError;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{self, BufRead, Write};
use tracing::debug;

/// A source of input lines, one per prompt.
pub trait LineSource {
    /// Show `prompt` and read one line without its trailing newline.
    ///
    /// Returns `Ok(None)` once input is exhausted.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, InputError>;
}

/// Interactive source backed by rustyline. History is never recorded.
pub struct EditorSource {
    editor: DefaultEditor,
}

impl EditorSource {
    pub fn new(config: &Config) -> Result<Self, InputError> {
        Ok(Self {
            editor: DefaultEditor::with_config(config.editor_config())?,
        })
    }
}

impl LineSource for EditorSource {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, InputError> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Eof) => Ok(None),
            Err(ReadlineError::Interrupted) => {
                debug!("interrupted at prompt");
                Err(InputError::Interrupted)
            }
            Err(ReadlineError::Io(err)) if err.kind() == io::ErrorKind::InvalidData => {
                debug!("undecodable line: {err}");
                Err(InputError::InvalidEncoding)
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Plain buffered source: writes the prompt to `prompt_out`, reads from `reader`.
///
/// Invalid UTF-8 is replaced rather than rejected.
pub struct ReaderSource<R, W> {
    reader: R,
    prompt_out: W,
}

impl<R: BufRead, W: Write> ReaderSource<R, W> {
    pub fn new(reader: R, prompt_out: W) -> Self {
        Self { reader, prompt_out }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.prompt_out)
    }
}

impl<R: BufRead, W: Write> LineSource for ReaderSource<R, W> {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, InputError> {
        self.prompt_out.write_all(prompt.as_bytes())?;
        self.prompt_out.flush()?;

        let mut buf = Vec::new();
        if self.reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }
}

/// Pick the source for a session reading `reader`.
///
/// A terminal gets the line editor. Anything else is read plainly through
/// `reader`, with the prompt written to `prompt_out`, because rustyline stays
/// silent when it is not attached to a terminal.
pub fn line_source<'a, R, W>(
    interactive: bool,
    reader: R,
    prompt_out: W,
    config: &Config,
) -> Result<Box<dyn LineSource + 'a>, InputError>
where
    R: BufRead + 'a,
    W: Write + 'a,
{
    if interactive {
        Ok(Box::new(EditorSource::new(config)?))
    } else {
        Ok(Box::new(ReaderSource::new(reader, prompt_out)))
    }
}
