//! Severity levels
//!
//! Levels are totally ordered from `Trace` to `Fatal`. `Off` sorts above every real
//! level and is only meaningful as a threshold: a sink whose threshold is `Off`
//! receives nothing.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Log severity
#[repr(u8)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    /// Detailed information, useful during development
    Trace = 0,
    /// Diagnostic information
    Debug = 1,
    /// General runtime information
    Info = 2,
    /// Potential issues that are not errors
    Warn = 3,
    /// Errors that affect an operation
    Error = 4,
    /// Critical issues, the program may not be able to continue
    Fatal = 5,
    /// Threshold sentinel that disables a sink
    Off = 0xff,
}

impl Level {
    /// The six levels an event can be logged at, lowest first
    pub const REAL: [Level; 6] = [
        Level::Trace,
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
    ];

    /// Get the display name for this level
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
            Level::Off => "OFF",
        }
    }

    /// Position in [`Level::REAL`], `None` for `Off`
    pub const fn index(self) -> Option<usize> {
        match self {
            Level::Off => None,
            level => Some(level as usize),
        }
    }

    /// Whether events can be logged at this level
    pub const fn is_real(self) -> bool {
        !matches!(self, Level::Off)
    }

    /// Clamp into `[Trace, Fatal]`
    pub const fn clamp_real(self) -> Level {
        match self {
            Level::Off => Level::Fatal,
            level => level,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "fatal" => Ok(Level::Fatal),
            "off" => Ok(Level::Off),
            _ => Err(Error::UnknownLevel(s.to_string())),
        }
    }
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Level::Trace,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            _ => Level::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::Fatal);
        for level in Level::REAL {
            assert!(level < Level::Off);
        }
    }

    #[test]
    fn test_level_names() {
        let names: Vec<&str> = Level::REAL.iter().map(|l| l.as_str()).collect();
        assert_eq!(names, ["TRACE", "DEBUG", "INFO", "WARN", "ERROR", "FATAL"]);
        assert_eq!(format!("{}", Level::Warn), "WARN");
    }

    #[test]
    fn test_level_index_and_clamp() {
        assert_eq!(Level::Trace.index(), Some(0));
        assert_eq!(Level::Fatal.index(), Some(5));
        assert_eq!(Level::Off.index(), None);
        assert_eq!(Level::Off.clamp_real(), Level::Fatal);
        assert_eq!(Level::Debug.clamp_real(), Level::Debug);
    }

    #[test]
    fn test_level_from_str() {
        assert_eq!("warning".parse::<Level>(), Ok(Level::Warn));
        assert_eq!("ERROR".parse::<Level>(), Ok(Level::Error));
        assert_eq!(" info ".parse::<Level>(), Ok(Level::Info));
        assert_eq!(
            "loud".parse::<Level>(),
            Err(Error::UnknownLevel("loud".to_string()))
        );
    }

    #[test]
    fn test_level_from_tracing() {
        assert_eq!(Level::from(tracing::Level::TRACE), Level::Trace);
        assert_eq!(Level::from(tracing::Level::WARN), Level::Warn);
        assert_eq!(Level::from(tracing::Level::ERROR), Level::Error);
    }
}
