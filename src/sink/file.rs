//! Append-only file sink

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::FileSink;

/// Buffered append writer for log files
///
/// Lines are not flushed individually; the buffer is flushed when the file is closed,
/// rotated, explicitly flushed or dropped.
#[derive(Debug, Default)]
pub struct AppendFile {
    writer: Option<BufWriter<File>>,
    path: Option<PathBuf>,
}

impl AppendFile {
    /// Create a sink with no file open
    pub fn new() -> Self {
        Self::default()
    }

    /// Path of the open file
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl FileSink for AppendFile {
    fn open(&mut self, path: &Path) -> io::Result<()> {
        self.close();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        self.writer = Some(BufWriter::new(file));
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    fn append(&mut self, line: &str) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writeln!(writer, "{}", line),
            None => Err(io::Error::new(io::ErrorKind::NotConnected, "no log file open")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }

    fn close(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.flush() {
                tracing::warn!("Failed to flush log file on close: {}", e);
            }
        }
        self.path = None;
    }

    fn is_open(&self) -> bool {
        self.writer.is_some()
    }
}

impl Drop for AppendFile {
    fn drop(&mut self) {
        self.close();
    }
}
