//! Output sinks
//!
//! The router formats lines and decides what goes where; sinks only move bytes.

mod capture;
mod console;
mod file;

use std::io;
use std::path::Path;

use crate::color::Color;

pub use capture::{CapturedConsole, CapturedFile};
pub use console::{AnsiConsole, NullConsole};
pub use file::AppendFile;

/// Destination for colored console lines
pub trait ConsoleSink: Send {
    /// Write one line in `color`, including the line terminator
    fn write(&mut self, line: &str, color: Color) -> io::Result<()>;

    /// Restore the default color
    fn reset(&mut self) -> io::Result<()>;
}

/// Destination for plain text log lines
pub trait FileSink: Send {
    /// Open `path` for appending, replacing any open file
    fn open(&mut self, path: &Path) -> io::Result<()>;

    /// Append one line plus terminator to the open file
    fn append(&mut self, line: &str) -> io::Result<()>;

    /// Flush buffered lines without closing
    fn flush(&mut self) -> io::Result<()>;

    /// Flush and close the open file, if any
    fn close(&mut self);

    /// Whether a file is currently open
    fn is_open(&self) -> bool;
}
