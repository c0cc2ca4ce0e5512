//! Error types for stacklog
//!
//! Most failures inside the logger are reported as log events rather than returned,
//! so this enum only covers the few places where a caller can act on the error.

use thiserror::Error;

use crate::level::Level;
use crate::logger::ConcurrencyMode;

/// Errors returned by the stacklog API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The global logger was already created with a different concurrency mode
    #[error("logger already initialized in {active} mode, cannot switch to {requested} mode")]
    ModeLocked {
        /// Mode the global logger is running in
        active: ConcurrencyMode,
        /// Mode that was requested
        requested: ConcurrencyMode,
    },

    /// `OFF` was used where one of the six real levels is required
    #[error("{0} is not a loggable level")]
    NotARealLevel(Level),

    /// A level name could not be parsed
    #[error("unknown log level '{0}'")]
    UnknownLevel(String),

    /// A color name could not be parsed
    #[error("unknown color '{0}'")]
    UnknownColor(String),
}

/// Result alias using the stacklog [`Error`]
pub type Result<T> = std::result::Result<T, Error>;
