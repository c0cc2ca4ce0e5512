//! Configuration file for stacklog
//!
//! A TOML file with the same settings the router exposes through its setters:
//!
//! ```toml
//! stack_size = 500
//! out_file = "%d_service.log"
//! out_path = "~/logs"
//! console_level = "WARN"
//!
//! [level_colors]
//! info = "GREEN"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::level::Level;
use crate::logger::ConcurrencyMode;
use crate::rotation::DEFAULT_PATTERN;
use crate::router::{EventRouter, DEFAULT_LEVEL, DEFAULT_STACK_SIZE};

/// Color overrides per level; unset levels keep their default color
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelColorOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warn: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fatal: Option<Color>,
}

impl LevelColorOverrides {
    /// Overrides that are set, lowest level first
    pub fn iter(&self) -> impl Iterator<Item = (Level, Color)> {
        let slots = [
            (Level::Trace, self.trace),
            (Level::Debug, self.debug),
            (Level::Info, self.info),
            (Level::Warn, self.warn),
            (Level::Error, self.error),
            (Level::Fatal, self.fatal),
        ];
        slots
            .into_iter()
            .filter_map(|(level, color)| color.map(|c| (level, c)))
    }
}

/// Logger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Number of events kept in the history, 0 disables it
    #[serde(default = "default_stack_size")]
    pub stack_size: usize,

    /// File name pattern; `%d` is replaced by the date and enables daily rotation
    #[serde(default = "default_out_file")]
    pub out_file: String,

    /// Directory for log files, empty for the working directory. `~` is expanded
    #[serde(default)]
    pub out_path: String,

    #[serde(default = "default_level")]
    pub console_level: Level,

    #[serde(default = "default_level")]
    pub file_level: Level,

    #[serde(default = "default_level")]
    pub stack_level: Level,

    /// Use the thread-safe global logger
    #[serde(default)]
    pub multi_thread_safe: bool,

    #[serde(default)]
    pub level_colors: LevelColorOverrides,
}

fn default_stack_size() -> usize {
    DEFAULT_STACK_SIZE
}

fn default_out_file() -> String {
    DEFAULT_PATTERN.to_string()
}

fn default_level() -> Level {
    DEFAULT_LEVEL
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            stack_size: default_stack_size(),
            out_file: default_out_file(),
            out_path: String::new(),
            console_level: default_level(),
            file_level: default_level(),
            stack_level: default_level(),
            multi_thread_safe: false,
            level_colors: LevelColorOverrides::default(),
        }
    }
}

impl LoggerConfig {
    /// Load configuration from `path`, or return the default if it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// Load from the per-user config file
    pub fn load_default() -> Result<Self> {
        match config_file_path() {
            Some(path) => Self::load(&path),
            None => {
                tracing::warn!("Could not determine config directory, using default logger config");
                Ok(Self::default())
            }
        }
    }

    /// Save configuration to `path`, creating its directory
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Concurrency mode selected by `multi_thread_safe`
    pub fn concurrency_mode(&self) -> ConcurrencyMode {
        ConcurrencyMode::from_thread_safe(self.multi_thread_safe)
    }

    /// Apply every setting to a router
    ///
    /// `multi_thread_safe` only concerns the global logger and is ignored here.
    pub fn apply_to(&self, router: &mut EventRouter) {
        router.set_stack_size(self.stack_size);
        router.set_stack_level(self.stack_level);
        router.set_console_level(self.console_level);
        router.set_file_level(self.file_level);
        router.set_out_path(&self.out_path);
        router.set_out_file(self.out_file.clone());
        for (level, color) in self.level_colors.iter() {
            router.set_level_color(level, color);
        }
    }

    /// Create a router with this configuration and the default sinks
    pub fn build_router(&self) -> EventRouter {
        let mut router = EventRouter::new();
        self.apply_to(&mut router);
        router
    }
}

/// Per-user configuration directory (`<config dir>/stacklog`)
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("stacklog"))
}

/// Path of the per-user config file
pub fn config_file_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}
