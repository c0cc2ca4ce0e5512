//! The event router
//!
//! [`EventRouter`] is the single entry point for log traffic. For every event it checks
//! the per-sink thresholds, writes to the console and file sinks, keeps the event in
//! the bounded history when it qualifies, and fans it out to push subscribers.
//!
//! The router itself does no locking; see [`crate::logger`] for the single-threaded and
//! thread-safe wrappers.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::clock::{Clock, SystemClock};
use crate::color::{Color, LevelColors};
use crate::history::HistoryStore;
use crate::level::Level;
use crate::record::{EventKind, EventRecord, RecordId};
use crate::rotation::RotationPolicy;
use crate::sink::{AnsiConsole, AppendFile, ConsoleSink, FileSink};
use crate::subscriber::{LogSubscriber, SubscriptionRegistry};

/// Default number of events kept in the history
pub const DEFAULT_STACK_SIZE: usize = 1000;

/// Default threshold of the console, file and history sinks
pub const DEFAULT_LEVEL: Level = Level::Info;

/// Everything an event is dispatched to, apart from the history
///
/// Kept separate from the history so a record borrowed from the store can be
/// dispatched while the sinks are mutated.
struct Dispatcher {
    console: Box<dyn ConsoleSink>,
    file: Box<dyn FileSink>,
    colors: LevelColors,
    rotation: RotationPolicy,
    subscriptions: SubscriptionRegistry,
    console_level: Level,
    file_level: Level,
}

impl Dispatcher {
    fn min_level(&self) -> Level {
        self.console_level
            .min(self.file_level)
            .min(self.subscriptions.min_level())
    }

    /// Send a record to console, file and subscribers
    ///
    /// `today` is the current clock date and drives rotation, not the record's own
    /// date. Returns a description of a file open failure, to be logged by the caller
    /// once this dispatch is complete.
    fn dispatch(&mut self, record: &EventRecord, today: NaiveDate) -> Option<String> {
        let level = record.level;
        if !level.is_real() {
            return None;
        }
        let text = record.rendered_text();

        if level >= self.console_level {
            self.write_console(record.line(), level);
        }

        let failure = if level >= self.file_level {
            self.write_file(record.line(), today)
        } else {
            None
        };

        self.subscriptions.notify(&record.display_date, &text, level);
        failure
    }

    fn write_console(&mut self, line: String, level: Level) {
        let color = self.colors.get(level);
        if let Err(e) = self.console.write(&line, color) {
            tracing::debug!("Console write failed: {}", e);
        }
        if let Err(e) = self.console.reset() {
            tracing::debug!("Console color reset failed: {}", e);
        }
    }

    fn write_file(&mut self, line: String, today: NaiveDate) -> Option<String> {
        if self.rotation.check(today) {
            self.file.close();
        }

        if !self.file.is_open() {
            let Some(path) = self.rotation.current_path() else {
                return None;
            };
            if let Err(e) = self.file.open(&path) {
                self.file_level = Level::Off;
                tracing::warn!("Disabling file log output, cannot open {}: {}", path.display(), e);
                return Some(format!(
                    "Cannot open log file '{}': {}. File logging disabled",
                    path.display(),
                    e
                ));
            }
        }

        if let Err(e) = self.file.append(&line) {
            tracing::warn!("Failed to write log line to file: {}", e);
        }
        None
    }

    fn close_file(&mut self) {
        self.file.close();
    }
}

/// The record behind `id`, if it is a timed span still in flight
fn running_mut(history: &mut HistoryStore, id: RecordId) -> Option<&mut EventRecord> {
    history
        .get_mut(id)
        .filter(|record| record.kind == EventKind::TimedRunning)
}

/// Routes log events to console, file, history and subscribers
pub struct EventRouter {
    dispatcher: Dispatcher,
    history: HistoryStore,
    clock: Box<dyn Clock>,
    stack_size: usize,
    /// Stack level as last requested; the effective level is `Off` while `stack_size` is 0
    requested_stack_level: Level,
}

impl std::fmt::Debug for EventRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRouter")
            .field("console_level", &self.dispatcher.console_level)
            .field("file_level", &self.dispatcher.file_level)
            .field("stack_level", &self.stack_level())
            .field("stack_size", &self.stack_size)
            .field("history_len", &self.history.len())
            .field("subscriptions", &self.dispatcher.subscriptions)
            .finish()
    }
}

impl Default for EventRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRouter {
    /// Create a router writing to stdout and to `%d_StreamedLog.log` in the current directory
    pub fn new() -> Self {
        Self {
            dispatcher: Dispatcher {
                console: Box::new(AnsiConsole::stdout()),
                file: Box::new(AppendFile::new()),
                colors: LevelColors::default(),
                rotation: RotationPolicy::default(),
                subscriptions: SubscriptionRegistry::new(),
                console_level: DEFAULT_LEVEL,
                file_level: DEFAULT_LEVEL,
            },
            history: HistoryStore::new(),
            clock: Box::new(SystemClock),
            stack_size: DEFAULT_STACK_SIZE,
            requested_stack_level: DEFAULT_LEVEL,
        }
    }

    /// Replace the console sink
    pub fn with_console(mut self, console: impl ConsoleSink + 'static) -> Self {
        self.dispatcher.console = Box::new(console);
        self
    }

    /// Replace the file sink
    pub fn with_file_sink(mut self, file: impl FileSink + 'static) -> Self {
        self.dispatcher.file.close();
        self.dispatcher.file = Box::new(file);
        self
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    // === Logging ===

    /// Whether an event at `level` would reach any sink
    pub fn enabled(&self, level: Level) -> bool {
        level.is_real() && level >= self.dispatcher.min_level().min(self.stack_level())
    }

    fn retains(&self, level: Level) -> bool {
        self.stack_size > 0 && level.is_real() && level >= self.stack_level()
    }

    /// Log one event
    pub fn log(&mut self, level: Level, text: impl Into<String>) {
        if !self.enabled(level) {
            return;
        }

        let now = self.clock.now();
        let today = now.date_naive();
        let record = EventRecord::new(level, text, now);
        let failure = if self.retains(level) {
            let id = self.history.append(record);
            let failure = match self.history.get(id) {
                Some(stored) => self.dispatcher.dispatch(stored, today),
                None => None,
            };
            self.history.evict_excess(self.stack_size);
            failure
        } else {
            self.dispatcher.dispatch(&record, today)
        };

        self.report_failure(failure);
    }

    fn report_failure(&mut self, failure: Option<String>) {
        // The file sink is already Off, so this cannot fail the same way again
        if let Some(message) = failure {
            self.log(Level::Error, message);
        }
    }

    /// Log a configuration mistake without interrupting the caller
    pub(crate) fn report_misuse(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{}", message);
        self.log(Level::Error, message);
    }

    // === Timed events ===

    /// Insert a running timed record and return its id
    ///
    /// The record is stored whatever the history threshold is, so it stays
    /// addressable until [`EventRouter::finish_timed`]. Counts against the capacity
    /// like any other record.
    pub fn begin_timed(&mut self, level: Level) -> RecordId {
        let record = EventRecord::timed(level, self.clock.now());
        let id = self.history.append(record);
        self.history.evict_excess(self.stack_size);
        id
    }

    /// Set the start text of a timed record and dispatch it
    ///
    /// Ignored unless `id` names a running timed record.
    pub fn start_timed(&mut self, id: RecordId, text: impl Into<String>) {
        let now = self.clock.now();
        let Some(record) = running_mut(&mut self.history, id) else {
            return;
        };
        record.fill(text.into(), now);

        let failure = if record.level >= self.dispatcher.min_level() {
            self.dispatcher.dispatch(record, now.date_naive())
        } else {
            None
        };
        self.report_failure(failure);
    }

    /// Append an extra description line to a timed record without dispatching
    pub fn describe_timed(&mut self, id: RecordId, text: &str) {
        if let Some(record) = running_mut(&mut self.history, id) {
            if !record.text.is_empty() {
                record.text.push('\n');
            }
            record.text.push_str(text);
        }
    }

    /// Finish a timed record: measure it and dispatch it with its duration
    ///
    /// A record finishes once; later calls with the same id do nothing.
    pub fn finish_timed(&mut self, id: RecordId) {
        let now = self.clock.now();
        let Some(record) = running_mut(&mut self.history, id) else {
            return;
        };
        record.finish(now);
        let level = record.level;

        let failure = if level >= self.dispatcher.min_level() {
            self.dispatcher.dispatch(record, now.date_naive())
        } else {
            None
        };

        if !self.retains(level) {
            self.history.remove(id);
        }
        self.history.evict_excess(self.stack_size);
        self.report_failure(failure);
    }

    // === Subscriptions and retrieval ===

    /// Register a push subscriber for events at or above `level`
    pub fn subscribe(&mut self, subscriber: Arc<dyn LogSubscriber>, level: Level) {
        self.dispatcher.subscriptions.register(subscriber, level);
    }

    /// Snapshot of the history at or above `min_level`
    pub fn history(&self, min_level: Level) -> Vec<EventRecord> {
        self.history.query_from(min_level)
    }

    /// Replay the history at or above `min_level` to a subscriber
    pub fn pull_events(&self, min_level: Level, subscriber: &dyn LogSubscriber) {
        replay(&self.history(min_level), subscriber);
    }

    /// Number of records currently held, running timed events included
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    // === Configuration ===

    /// Set the history capacity. 0 disables the history
    pub fn set_stack_size(&mut self, size: usize) {
        self.stack_size = size;
        self.history.evict_excess(size);
    }

    /// Set the console threshold, clamped to `[Trace, Fatal]`
    pub fn set_console_level(&mut self, level: Level) {
        self.dispatcher.console_level = level.clamp_real();
    }

    /// Set the file threshold, clamped to `[Trace, Fatal]`
    pub fn set_file_level(&mut self, level: Level) {
        self.dispatcher.file_level = level.clamp_real();
    }

    /// Set the history threshold, clamped to `[Trace, Fatal]`
    ///
    /// Has no visible effect while the stack size is 0.
    pub fn set_stack_level(&mut self, level: Level) {
        self.requested_stack_level = level.clamp_real();
    }

    /// Change the console color of one level
    pub fn set_level_color(&mut self, level: Level, color: Color) {
        if let Err(e) = self.dispatcher.colors.set(level, color) {
            self.report_misuse(format!("Cannot set log color: {}", e));
        }
    }

    /// Change the file pattern. `%d` in the pattern enables daily rotation
    pub fn set_out_file(&mut self, pattern: impl Into<String>) {
        self.dispatcher.rotation.set_pattern(pattern);
        self.dispatcher.close_file();
    }

    /// Change the directory log files are written to. `~` is expanded
    pub fn set_out_path(&mut self, path: &str) {
        let expanded = shellexpand::tilde(path);
        self.dispatcher
            .rotation
            .set_directory(PathBuf::from(expanded.as_ref()));
        self.dispatcher.close_file();
    }

    /// Flush buffered file output
    pub fn flush(&mut self) -> io::Result<()> {
        self.dispatcher.file.flush()
    }

    /// Delete rotated log files older than `retention_days` from the output directory
    pub fn remove_expired_files(&self, retention_days: u64) -> anyhow::Result<usize> {
        let rotation = &self.dispatcher.rotation;
        let directory = if rotation.directory().as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            rotation.directory().to_path_buf()
        };
        crate::retention::cleanup_old_logs_with_retention(
            &directory,
            rotation.pattern(),
            self.clock.now().date_naive(),
            retention_days,
        )
    }

    // === Accessors ===

    /// Console threshold
    pub fn console_level(&self) -> Level {
        self.dispatcher.console_level
    }

    /// File threshold, `Off` after an open failure
    pub fn file_level(&self) -> Level {
        self.dispatcher.file_level
    }

    /// Effective history threshold, `Off` while the stack size is 0
    pub fn stack_level(&self) -> Level {
        if self.stack_size == 0 {
            Level::Off
        } else {
            self.requested_stack_level
        }
    }

    /// Lowest subscriber threshold, `Off` without subscribers
    pub fn subscriber_level(&self) -> Level {
        self.dispatcher.subscriptions.min_level()
    }

    /// History capacity
    pub fn stack_size(&self) -> usize {
        self.stack_size
    }

    /// Console color of a level
    pub fn level_color(&self, level: Level) -> Color {
        self.dispatcher.colors.get(level)
    }

    /// File the next write goes to, once a write has resolved it
    pub fn current_file(&self) -> Option<PathBuf> {
        self.dispatcher.rotation.current_path()
    }
}

impl Drop for EventRouter {
    fn drop(&mut self) {
        self.dispatcher.close_file();
    }
}

/// Deliver records to a subscriber as if they were happening now
pub(crate) fn replay(records: &[EventRecord], subscriber: &dyn LogSubscriber) {
    for record in records {
        subscriber.on_event(&record.display_date, &record.rendered_text(), record.level);
    }
}
