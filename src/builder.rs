//! Incremental message construction
//!
//! A [`MessageBuilder`] collects fragments and logs them as one event when it goes out
//! of scope. Nothing is formatted when the level is disabled.

use std::fmt::{self, Display, Write};
use std::mem;

use crate::level::Level;
use crate::logger::RouterAccess;

/// Accumulates a message and logs it on drop
pub struct MessageBuilder<A: RouterAccess> {
    access: A,
    level: Level,
    enabled: bool,
    buffer: String,
}

impl<A: RouterAccess> MessageBuilder<A> {
    /// Start an empty message at `level`
    pub fn new(access: A, level: Level) -> Self {
        let enabled = access.with_router(|router| router.enabled(level));
        Self {
            access,
            level,
            enabled,
            buffer: String::new(),
        }
    }

    /// Append the display form of `value`
    pub fn push(mut self, value: impl Display) -> Self {
        if self.enabled {
            let _ = write!(self.buffer, "{}", value);
        }
        self
    }

    /// Text collected so far
    pub fn as_str(&self) -> &str {
        &self.buffer
    }
}

impl<A: RouterAccess> Write for MessageBuilder<A> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.enabled {
            self.buffer.push_str(s);
        }
        Ok(())
    }
}

impl<A: RouterAccess> Drop for MessageBuilder<A> {
    fn drop(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let text = mem::take(&mut self.buffer);
        let level = self.level;
        self.access.with_router(|router| router.log(level, text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::LocalLogger;
    use crate::router::EventRouter;
    use crate::sink::{CapturedConsole, CapturedFile};

    fn logger() -> (LocalLogger, CapturedConsole) {
        let console = CapturedConsole::new();
        let router = EventRouter::new()
            .with_console(console.clone())
            .with_file_sink(CapturedFile::new());
        (LocalLogger::new(router), console)
    }

    #[test]
    fn test_fragments_become_one_event() {
        let (logger, console) = logger();
        logger
            .message(Level::Warn)
            .push("retrying in ")
            .push(3)
            .push("s");

        let lines = console.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("[WARN]\tretrying in 3s"));
    }

    #[test]
    fn test_fmt_write() {
        let (logger, _console) = logger();
        {
            let mut message = logger.message(Level::Info);
            write!(message, "{} of {}", 2, 5).unwrap();
            assert_eq!(message.as_str(), "2 of 5");
        }
        assert_eq!(logger.history(Level::Info)[0].text, "2 of 5");
    }

    #[test]
    fn test_empty_message_logs_nothing() {
        let (logger, console) = logger();
        drop(logger.message(Level::Error));
        assert!(console.lines().is_empty());
        assert!(logger.history(Level::Trace).is_empty());
    }

    #[test]
    fn test_disabled_level_skips_formatting() {
        let (logger, console) = logger();
        let message = logger.message(Level::Debug).push("hidden");
        assert_eq!(message.as_str(), "");
        drop(message);
        assert!(console.lines().is_empty());
    }
}
