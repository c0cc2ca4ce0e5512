//! Logger objects and the concurrency policy
//!
//! A [`Logger`] is an [`EventRouter`] behind an access policy. [`LocalLogger`] keeps the
//! router in a `RefCell` and costs nothing to enter; [`SharedLogger`] serializes every
//! operation through one `Mutex` and can be shared between threads.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::{Arc, Mutex, PoisonError};

use crate::builder::MessageBuilder;
use crate::level::Level;
use crate::record::EventRecord;
use crate::router::{self, EventRouter};
use crate::subscriber::LogSubscriber;
use crate::timed::TimedEvent;

/// How a logger synchronizes access to its router
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConcurrencyMode {
    /// No synchronization, one thread only
    SingleThreaded,
    /// Every operation holds a mutex
    ThreadSafe,
}

impl ConcurrencyMode {
    /// Mode for the `multi_thread_safe` flag
    pub fn from_thread_safe(thread_safe: bool) -> Self {
        if thread_safe {
            ConcurrencyMode::ThreadSafe
        } else {
            ConcurrencyMode::SingleThreaded
        }
    }
}

impl fmt::Display for ConcurrencyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConcurrencyMode::SingleThreaded => write!(f, "single-threaded"),
            ConcurrencyMode::ThreadSafe => write!(f, "thread-safe"),
        }
    }
}

/// Scoped mutable access to a router
///
/// The closure must not call back into the same access, which would deadlock a
/// mutex or panic on a `RefCell`.
pub trait RouterAccess {
    /// Run `f` with exclusive access to the router
    fn with_router<R>(&self, f: impl FnOnce(&mut EventRouter) -> R) -> R;
}

impl RouterAccess for RefCell<EventRouter> {
    fn with_router<R>(&self, f: impl FnOnce(&mut EventRouter) -> R) -> R {
        f(&mut self.borrow_mut())
    }
}

impl RouterAccess for Mutex<EventRouter> {
    fn with_router<R>(&self, f: impl FnOnce(&mut EventRouter) -> R) -> R {
        // A panic while logging leaves the router consistent enough to keep using
        let mut router = self.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut router)
    }
}

impl<T: RouterAccess + ?Sized> RouterAccess for &T {
    fn with_router<R>(&self, f: impl FnOnce(&mut EventRouter) -> R) -> R {
        (**self).with_router(f)
    }
}

impl<T: RouterAccess + ?Sized> RouterAccess for Rc<T> {
    fn with_router<R>(&self, f: impl FnOnce(&mut EventRouter) -> R) -> R {
        (**self).with_router(f)
    }
}

impl<T: RouterAccess + ?Sized> RouterAccess for Arc<T> {
    fn with_router<R>(&self, f: impl FnOnce(&mut EventRouter) -> R) -> R {
        (**self).with_router(f)
    }
}

/// A router behind an access policy
pub struct Logger<C> {
    cell: C,
}

/// Logger for a single thread
pub type LocalLogger = Logger<RefCell<EventRouter>>;

/// Logger shared between threads, usually inside an `Arc`
pub type SharedLogger = Logger<Mutex<EventRouter>>;

impl LocalLogger {
    /// Wrap a configured router
    pub fn new(router: EventRouter) -> Self {
        Self {
            cell: RefCell::new(router),
        }
    }
}

impl SharedLogger {
    /// Wrap a configured router
    pub fn new(router: EventRouter) -> Self {
        Self {
            cell: Mutex::new(router),
        }
    }
}

impl Default for LocalLogger {
    fn default() -> Self {
        Self::new(EventRouter::new())
    }
}

impl Default for SharedLogger {
    fn default() -> Self {
        Self::new(EventRouter::new())
    }
}

impl<C: RouterAccess> fmt::Debug for Logger<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.cell.with_router(|router| f.debug_tuple("Logger").field(&*router).finish())
    }
}

impl<C: RouterAccess> RouterAccess for Logger<C> {
    fn with_router<R>(&self, f: impl FnOnce(&mut EventRouter) -> R) -> R {
        self.cell.with_router(f)
    }
}

impl<C: RouterAccess> Logger<C> {
    /// Log one event
    pub fn log(&self, level: Level, text: impl Into<String>) {
        let text = text.into();
        self.cell.with_router(|router| router.log(level, text));
    }

    /// Whether an event at `level` would reach any sink
    pub fn enabled(&self, level: Level) -> bool {
        self.cell.with_router(|router| router.enabled(level))
    }

    pub fn trace(&self, text: impl Into<String>) {
        self.log(Level::Trace, text);
    }

    pub fn debug(&self, text: impl Into<String>) {
        self.log(Level::Debug, text);
    }

    pub fn info(&self, text: impl Into<String>) {
        self.log(Level::Info, text);
    }

    pub fn warn(&self, text: impl Into<String>) {
        self.log(Level::Warn, text);
    }

    pub fn error(&self, text: impl Into<String>) {
        self.log(Level::Error, text);
    }

    pub fn fatal(&self, text: impl Into<String>) {
        self.log(Level::Fatal, text);
    }

    /// Start a message that is logged when the builder is dropped
    pub fn message(&self, level: Level) -> MessageBuilder<&Self> {
        MessageBuilder::new(self, level)
    }

    /// Start a timed event, finished when the handle is dropped
    pub fn begin_timed(&self, level: Level) -> TimedEvent<&Self> {
        TimedEvent::begin(self, level)
    }

    /// Register a push subscriber
    pub fn subscribe(&self, subscriber: Arc<dyn LogSubscriber>, level: Level) {
        self.cell
            .with_router(|router| router.subscribe(subscriber, level));
    }

    /// Replay the history at or above `min_level` to a subscriber
    ///
    /// The snapshot is taken first and delivered without holding the router, so the
    /// subscriber may log through this logger.
    pub fn pull_events(&self, min_level: Level, subscriber: &dyn LogSubscriber) {
        let snapshot = self.history(min_level);
        router::replay(&snapshot, subscriber);
    }

    /// Snapshot of the history at or above `min_level`
    pub fn history(&self, min_level: Level) -> Vec<EventRecord> {
        self.cell.with_router(|router| router.history(min_level))
    }

    /// Change the router configuration
    pub fn configure<R>(&self, f: impl FnOnce(&mut EventRouter) -> R) -> R {
        self.cell.with_router(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{CapturedConsole, CapturedFile};
    use std::thread;

    fn captured_router() -> (EventRouter, CapturedConsole) {
        let console = CapturedConsole::new();
        let router = EventRouter::new()
            .with_console(console.clone())
            .with_file_sink(CapturedFile::new());
        (router, console)
    }

    #[test]
    fn test_local_logger_level_helpers() {
        let (router, console) = captured_router();
        let logger = LocalLogger::new(router);
        logger.configure(|r| r.set_console_level(Level::Trace));

        logger.trace("t");
        logger.debug("d");
        logger.info("i");
        logger.warn("w");
        logger.error("e");
        logger.fatal("f");

        let levels: Vec<String> = console
            .lines()
            .iter()
            .map(|l| l.split('[').nth(1).unwrap_or("").to_string())
            .collect();
        assert_eq!(levels.len(), 6);
        assert!(levels[0].starts_with("TRACE]"));
        assert!(levels[5].starts_with("FATAL]"));
    }

    #[test]
    fn test_shared_logger_across_threads() {
        let (router, console) = captured_router();
        let logger = Arc::new(SharedLogger::new(router));

        let handles: Vec<_> = (0..4)
            .map(|n| {
                let logger = Arc::clone(&logger);
                thread::spawn(move || {
                    for i in 0..25 {
                        logger.info(format!("thread {} message {}", n, i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(console.lines().len(), 100);
        assert_eq!(logger.history(Level::Trace).len(), 100);
    }

    #[test]
    fn test_pull_subscriber_may_log_back() {
        let (router, _console) = captured_router();
        let logger = Arc::new(SharedLogger::new(router));
        logger.info("first");

        let echo = {
            let logger = Arc::clone(&logger);
            move |_: &str, text: &str, _: Level| logger.info(format!("echo {}", text))
        };
        logger.pull_events(Level::Info, &echo);

        let texts: Vec<String> = logger
            .history(Level::Info)
            .into_iter()
            .map(|r| r.text)
            .collect();
        assert_eq!(texts, ["first", "echo first"]);
    }

    #[test]
    fn test_pull_events_delivers_snapshot() {
        let (router, _console) = captured_router();
        let logger = SharedLogger::new(router);
        logger.warn("kept");
        logger.info("filtered");

        let seen = Mutex::new(Vec::new());
        let collector = |_: &str, text: &str, level: Level| {
            seen.lock().unwrap().push((text.to_string(), level));
        };
        logger.pull_events(Level::Warn, &collector);

        assert_eq!(
            seen.into_inner().unwrap(),
            vec![("kept".to_string(), Level::Warn)]
        );
    }

    #[test]
    fn test_mode_from_flag() {
        assert_eq!(
            ConcurrencyMode::from_thread_safe(true),
            ConcurrencyMode::ThreadSafe
        );
        assert_eq!(
            ConcurrencyMode::from_thread_safe(false),
            ConcurrencyMode::SingleThreaded
        );
        assert_eq!(ConcurrencyMode::ThreadSafe.to_string(), "thread-safe");
    }
}
