//! Console sinks

use std::io::{self, Stdout, Write};

use crossterm::queue;
use crossterm::style::{Print, ResetColor, SetForegroundColor};

use super::ConsoleSink;
use crate::color::Color;

/// Writes ANSI colored lines to a writer, stdout by default
pub struct AnsiConsole<W: Write + Send = Stdout> {
    out: W,
}

impl AnsiConsole<Stdout> {
    /// Console sink on the process stdout
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl Default for AnsiConsole<Stdout> {
    fn default() -> Self {
        Self::stdout()
    }
}

impl<W: Write + Send> AnsiConsole<W> {
    /// Console sink on any writer
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Get the underlying writer back
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> ConsoleSink for AnsiConsole<W> {
    fn write(&mut self, line: &str, color: Color) -> io::Result<()> {
        queue!(
            self.out,
            SetForegroundColor(color.to_terminal()),
            Print(line),
            Print('\n')
        )
    }

    fn reset(&mut self) -> io::Result<()> {
        queue!(self.out, ResetColor)?;
        self.out.flush()
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullConsole;

impl ConsoleSink for NullConsole {
    fn write(&mut self, _line: &str, _color: Color) -> io::Result<()> {
        Ok(())
    }

    fn reset(&mut self) -> io::Result<()> {
        Ok(())
    }
}
