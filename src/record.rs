//! Log event records

use std::borrow::Cow;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::level::Level;

/// Format used for [`EventRecord::display_date`]
pub const DISPLAY_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Separator placed between a finished timed event's text and its duration
pub const DONE_IN_SEPARATOR: &str = "\tDone in: ";

/// Identifier assigned by the history store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RecordId(pub u64);

impl RecordId {
    /// Id carried by records that never enter the history
    pub const TRANSIENT: RecordId = RecordId(0);
}

/// Lifecycle of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventKind {
    /// A plain log line
    Normal,
    /// A timed span that has not finished yet
    TimedRunning,
    /// A timed span with its duration measured
    TimedFinished,
}

/// A single log occurrence
#[derive(Debug, Clone, Serialize)]
pub struct EventRecord {
    /// Store id, [`RecordId::TRANSIENT`] outside the history
    pub id: RecordId,
    /// When the event happened (start time for timed events)
    pub occurred_at: DateTime<Local>,
    /// `occurred_at` pre-formatted for output
    pub display_date: String,
    /// Severity
    pub level: Level,
    /// Message body
    pub text: String,
    /// Lifecycle state
    pub kind: EventKind,
    /// Completion time of a finished timed event
    pub finished_at: Option<DateTime<Local>>,
    /// Human readable duration of a finished timed event
    pub elapsed_text: Option<String>,
}

impl EventRecord {
    /// Create a normal record stamped at `now`
    pub fn new(level: Level, text: impl Into<String>, now: DateTime<Local>) -> Self {
        Self {
            id: RecordId::TRANSIENT,
            occurred_at: now,
            display_date: format_display_date(now),
            level,
            text: text.into(),
            kind: EventKind::Normal,
            finished_at: None,
            elapsed_text: None,
        }
    }

    /// Create an empty running timed record stamped at `now`
    pub fn timed(level: Level, now: DateTime<Local>) -> Self {
        Self {
            kind: EventKind::TimedRunning,
            ..Self::new(level, String::new(), now)
        }
    }

    /// Whether this is a timed span still in flight
    pub fn is_running(&self) -> bool {
        self.kind == EventKind::TimedRunning
    }

    /// Replace text and timestamp
    pub(crate) fn fill(&mut self, text: String, now: DateTime<Local>) {
        self.text = text;
        self.occurred_at = now;
        self.display_date = format_display_date(now);
    }

    /// Mark a timed record finished at `now`
    pub(crate) fn finish(&mut self, now: DateTime<Local>) {
        // Wall clock can step backwards; treat that as zero elapsed
        let elapsed = (now - self.occurred_at).to_std().unwrap_or_default();
        self.kind = EventKind::TimedFinished;
        self.finished_at = Some(now);
        self.elapsed_text = Some(format_elapsed(elapsed));
    }

    /// Text as shown to sinks, with the duration suffix for finished timed events
    pub fn rendered_text(&self) -> Cow<'_, str> {
        match (&self.kind, &self.elapsed_text) {
            (EventKind::TimedFinished, Some(elapsed)) => {
                Cow::Owned(format!("{}{}{}", self.text, DONE_IN_SEPARATOR, elapsed))
            }
            _ => Cow::Borrowed(&self.text),
        }
    }

    /// Full output line without terminator
    pub fn line(&self) -> String {
        format_line(&self.display_date, self.level, &self.rendered_text())
    }
}

/// Format a timestamp the way records display it
pub fn format_display_date(time: DateTime<Local>) -> String {
    time.format(DISPLAY_DATE_FORMAT).to_string()
}

/// Build an output line: `{date} [{LEVEL}]\t{text}`
pub fn format_line(date: &str, level: Level, text: &str) -> String {
    format!("{} [{}]\t{}", date, level.as_str(), text)
}

/// Format a duration as `1h 2' 3" 4ms`
///
/// Units run from largest to smallest. A unit is shown when it is nonzero or a larger
/// unit was already shown; milliseconds only when nonzero.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let millis = elapsed.subsec_millis();

    let mut parts: Vec<String> = Vec::with_capacity(4);
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 || !parts.is_empty() {
        parts.push(format!("{}'", minutes));
    }
    if seconds > 0 || !parts.is_empty() {
        parts.push(format!("{}\"", seconds));
    }
    if millis > 0 {
        parts.push(format!("{}ms", millis));
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 6, 1, h, m, s).unwrap()
    }

    #[test]
    fn test_format_elapsed_all_units() {
        let elapsed = Duration::from_millis(((3600 + 2 * 60 + 3) * 1000) + 4);
        assert_eq!(format_elapsed(elapsed), "1h 2' 3\" 4ms");
    }

    #[test]
    fn test_format_elapsed_zero() {
        assert_eq!(format_elapsed(Duration::ZERO), "");
    }

    #[test]
    fn test_format_elapsed_inclusion_rule() {
        assert_eq!(format_elapsed(Duration::from_millis(250)), "250ms");
        assert_eq!(format_elapsed(Duration::from_secs(5)), "5\"");
        assert_eq!(format_elapsed(Duration::from_secs(3600)), "1h 0' 0\"");
        assert_eq!(format_elapsed(Duration::from_millis(60_007)), "1' 0\" 7ms");
    }

    #[test]
    fn test_new_record_is_normal() {
        let record = EventRecord::new(Level::Info, "hello", at(9, 30, 0));
        assert_eq!(record.kind, EventKind::Normal);
        assert_eq!(record.id, RecordId::TRANSIENT);
        assert!(record.display_date.starts_with("2024-06-01 09:30:00"));
        assert_eq!(record.rendered_text(), "hello");
    }

    #[test]
    fn test_finish_keeps_text_and_renders_suffix() {
        let mut record = EventRecord::timed(Level::Warn, at(10, 0, 0));
        record.fill("building".to_string(), at(10, 0, 0));
        record.finish(at(10, 1, 5));

        assert_eq!(record.kind, EventKind::TimedFinished);
        assert_eq!(record.text, "building");
        assert_eq!(record.elapsed_text.as_deref(), Some("1' 5\""));
        assert_eq!(record.rendered_text(), "building\tDone in: 1' 5\"");
        assert!(record.line().ends_with("[WARN]\tbuilding\tDone in: 1' 5\""));
    }

    #[test]
    fn test_finish_before_start_is_zero() {
        let mut record = EventRecord::timed(Level::Info, at(10, 0, 0));
        record.finish(at(9, 59, 0));
        assert_eq!(record.elapsed_text.as_deref(), Some(""));
    }

    #[test]
    fn test_format_line() {
        assert_eq!(
            format_line("2024-06-01 00:00:00.000", Level::Error, "boom"),
            "2024-06-01 00:00:00.000 [ERROR]\tboom"
        );
    }
}
