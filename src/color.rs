//! Console colors and the per-level color table

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::level::Level;

/// Foreground color for console output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Color {
    /// Black. Invisible on most dark terminals
    Black,
    White,
    Grey,
    Red,
    LightRed,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
}

impl Color {
    /// Map to the terminal color crossterm emits
    pub fn to_terminal(self) -> crossterm::style::Color {
        use crossterm::style::Color as Term;

        match self {
            Color::Black => Term::Black,
            Color::White => Term::White,
            Color::Grey => Term::DarkGrey,
            Color::Red => Term::DarkRed,
            Color::LightRed => Term::Red,
            Color::Green => Term::DarkGreen,
            Color::Yellow => Term::DarkYellow,
            Color::Blue => Term::DarkBlue,
            Color::Magenta => Term::DarkMagenta,
            Color::Cyan => Term::DarkCyan,
        }
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "black" => Ok(Color::Black),
            "white" => Ok(Color::White),
            "grey" | "gray" => Ok(Color::Grey),
            "red" => Ok(Color::Red),
            "lightred" | "light_red" => Ok(Color::LightRed),
            "green" => Ok(Color::Green),
            "yellow" => Ok(Color::Yellow),
            "blue" => Ok(Color::Blue),
            "magenta" => Ok(Color::Magenta),
            "cyan" => Ok(Color::Cyan),
            _ => Err(Error::UnknownColor(s.to_string())),
        }
    }
}

/// Color used for each of the six real levels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelColors {
    colors: [Color; 6],
}

impl Default for LevelColors {
    fn default() -> Self {
        Self::new([
            Color::Grey,    // TRACE
            Color::White,   // DEBUG
            Color::Cyan,    // INFO
            Color::Yellow,  // WARN
            Color::Red,     // ERROR
            Color::Magenta, // FATAL
        ])
    }
}

impl LevelColors {
    /// Build a table from one color per level, ordered as [`Level::REAL`]
    pub const fn new(colors: [Color; 6]) -> Self {
        Self { colors }
    }

    /// Color for a level. Anything above `Fatal` uses the `Fatal` color
    pub fn get(&self, level: Level) -> Color {
        let index = level.clamp_real().index().unwrap_or(Level::REAL.len() - 1);
        self.colors[index]
    }

    /// Overwrite the color of a single level
    pub fn set(&mut self, level: Level, color: Color) -> crate::Result<()> {
        let index = level.index().ok_or(Error::NotARealLevel(level))?;
        self.colors[index] = color;
        Ok(())
    }
}
