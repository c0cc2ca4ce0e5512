//! In-memory sinks for embedding and tests
//!
//! Both sinks share their state between clones: hand one clone to the router and
//! inspect the other.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{ConsoleSink, FileSink};
use crate::color::Color;

/// Console sink that records lines with their colors
#[derive(Debug, Clone, Default)]
pub struct CapturedConsole {
    state: Arc<Mutex<ConsoleState>>,
}

#[derive(Debug, Default)]
struct ConsoleState {
    lines: Vec<(String, Color)>,
    resets: usize,
    fail_writes: bool,
}

impl CapturedConsole {
    /// Create an empty capture
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ConsoleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lines written so far
    pub fn lines(&self) -> Vec<String> {
        self.state().lines.iter().map(|(l, _)| l.clone()).collect()
    }

    /// Lines written so far with their colors
    pub fn colored_lines(&self) -> Vec<(String, Color)> {
        self.state().lines.clone()
    }

    /// Number of color resets
    pub fn resets(&self) -> usize {
        self.state().resets
    }

    /// Make every subsequent write fail
    pub fn fail_writes(&self, fail: bool) {
        self.state().fail_writes = fail;
    }
}

impl ConsoleSink for CapturedConsole {
    fn write(&mut self, line: &str, color: Color) -> io::Result<()> {
        let mut state = self.state();
        if state.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "console closed"));
        }
        state.lines.push((line.to_string(), color));
        Ok(())
    }

    fn reset(&mut self) -> io::Result<()> {
        self.state().resets += 1;
        Ok(())
    }
}

/// File sink that records lines per path instead of touching the disk
#[derive(Debug, Clone, Default)]
pub struct CapturedFile {
    state: Arc<Mutex<FileState>>,
}

#[derive(Debug, Default)]
struct FileState {
    open: Option<PathBuf>,
    opens: Vec<PathBuf>,
    lines: Vec<(PathBuf, String)>,
    pending: usize,
    flushes: usize,
    fail_open: bool,
}

impl CapturedFile {
    /// Create an empty capture
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FileState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every subsequent open fail
    pub fn fail_open(&self, fail: bool) {
        self.state().fail_open = fail;
    }

    /// Every path opened, in order, including failed attempts
    pub fn opened(&self) -> Vec<PathBuf> {
        self.state().opens.clone()
    }

    /// All lines written to `path`
    pub fn lines_for(&self, path: &Path) -> Vec<String> {
        self.state()
            .lines
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, l)| l.clone())
            .collect()
    }

    /// All lines regardless of path
    pub fn lines(&self) -> Vec<String> {
        self.state().lines.iter().map(|(_, l)| l.clone()).collect()
    }

    /// Number of times buffered lines were flushed
    pub fn flushes(&self) -> usize {
        self.state().flushes
    }
}

impl FileSink for CapturedFile {
    fn open(&mut self, path: &Path) -> io::Result<()> {
        self.close();
        let mut state = self.state();
        state.opens.push(path.to_path_buf());
        if state.fail_open {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "permission denied",
            ));
        }
        state.open = Some(path.to_path_buf());
        Ok(())
    }

    fn append(&mut self, line: &str) -> io::Result<()> {
        let mut state = self.state();
        let path = state
            .open
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "no log file open"))?;
        state.lines.push((path, line.to_string()));
        state.pending += 1;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self.state();
        if state.pending > 0 {
            state.pending = 0;
            state.flushes += 1;
        }
        Ok(())
    }

    fn close(&mut self) {
        let _ = self.flush();
        self.state().open = None;
    }

    fn is_open(&self) -> bool {
        self.state().open.is_some()
    }
}
