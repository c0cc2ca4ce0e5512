//! Stacklog - leveled logger with a bounded event history
//!
//! Routes each event to a colored console, a daily rotated file, an in-memory history
//! and live subscribers, each with its own severity threshold.

mod macros;

pub mod bridge;
pub mod builder;
pub mod clock;
pub mod color;
pub mod config;
pub mod error;
pub mod global;
pub mod history;
pub mod level;
pub mod logger;
pub mod record;
pub mod retention;
pub mod rotation;
pub mod router;
pub mod sink;
pub mod subscriber;
pub mod timed;

pub use bridge::RouterLayer;
pub use builder::MessageBuilder;
pub use color::{Color, LevelColors};
pub use config::LoggerConfig;
pub use error::{Error, Result};
pub use level::Level;
pub use logger::{ConcurrencyMode, LocalLogger, Logger, RouterAccess, SharedLogger};
pub use record::{EventKind, EventRecord, RecordId};
pub use router::EventRouter;
pub use subscriber::LogSubscriber;
pub use timed::TimedEvent;
