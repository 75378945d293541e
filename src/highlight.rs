//! Syntax highlighting for fenced code blocks.
//!
//! The renderer only knows the [`CodeHighlighter`] capability. The shipped
//! implementation, [`Pygments`], pipes the code through
//! `pygmentize -l<lang> -fhtml` and returns its standard output.

use std::io::Write;
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HighlightError {
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("I/O error talking to highlighter: {0}")]
    Io(#[from] std::io::Error),
    #[error("`{program}` exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("highlighter output is not UTF-8")]
    InvalidOutput(#[from] std::string::FromUtf8Error),
}

/// Turns source code in a named language into an HTML fragment.
pub trait CodeHighlighter: Send + Sync {
    fn highlight(&self, lang: &str, code: &str) -> Result<String, HighlightError>;
}

/// Pygments command-line highlighter.
pub struct Pygments {
    program: String,
}

impl Pygments {
    pub fn new() -> Self {
        Self::with_program("pygmentize")
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for Pygments {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeHighlighter for Pygments {
    fn highlight(&self, lang: &str, code: &str) -> Result<String, HighlightError> {
        let mut child = Command::new(&self.program)
            .arg(format!("-l{lang}"))
            .arg("-fhtml")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| HighlightError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Write from a separate thread so a large block cannot deadlock
        // against a full stdout pipe.
        let stdin = child.stdin.take();
        let input = code.to_owned();
        let writer = std::thread::spawn(move || -> std::io::Result<()> {
            if let Some(mut stdin) = stdin {
                stdin.write_all(input.as_bytes())?;
            }
            Ok(())
        });

        let output = child.wait_with_output()?;
        let write_result = writer
            .join()
            .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")));

        if !output.status.success() {
            return Err(HighlightError::Failed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        // A highlighter may exit successfully without draining stdin.
        match write_result {
            Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => return Err(e.into()),
            _ => {}
        }
        Ok(String::from_utf8(output.stdout)?)
    }
}
