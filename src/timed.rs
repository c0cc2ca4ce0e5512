//! Timed events
//!
//! A [`TimedEvent`] measures a span of work. The first [`TimedEvent::log`] sets the
//! description and emits it; later calls append lines to it silently. When the handle is
//! dropped the span is emitted again with its duration appended as `\tDone in: ...`.

use crate::level::Level;
use crate::logger::RouterAccess;
use crate::record::RecordId;

/// Handle to an in-flight timed record
#[must_use = "a timed event finishes as soon as it is dropped"]
pub struct TimedEvent<A: RouterAccess> {
    access: A,
    id: RecordId,
    started: bool,
}

impl<A: RouterAccess> TimedEvent<A> {
    /// Insert a running record at `level` and return its handle
    pub fn begin(access: A, level: Level) -> Self {
        let id = access.with_router(|router| router.begin_timed(level));
        Self {
            access,
            id,
            started: false,
        }
    }

    /// Describe the span
    ///
    /// The first call stamps the start time and emits the event; later calls add lines.
    pub fn log(&mut self, text: impl Into<String>) {
        let text = text.into();
        let id = self.id;
        if self.started {
            self.access
                .with_router(|router| router.describe_timed(id, &text));
        } else {
            self.started = true;
            self.access.with_router(|router| router.start_timed(id, text));
        }
    }

    /// Whether the start message was logged
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Id of the backing record
    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Finish now instead of at the end of the scope
    pub fn finish(self) {}
}

impl<A: RouterAccess> Drop for TimedEvent<A> {
    fn drop(&mut self) {
        let id = self.id;
        self.access.with_router(|router| router.finish_timed(id));
    }
}
