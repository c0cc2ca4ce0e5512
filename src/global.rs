//! The process-wide logger
//!
//! The global logger is created on first use. Its concurrency mode can be chosen with
//! [`initialize`] or [`config::set_multi_thread_safe`] before that, and is fixed from then on.
//!
//! In thread-safe mode every thread logs into one router behind a mutex. In
//! single-threaded mode each thread gets its own router, with no locking at all.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use crate::builder::MessageBuilder;
use crate::error::{Error, Result};
use crate::level::Level;
use crate::logger::{ConcurrencyMode, RouterAccess};
use crate::record::EventRecord;
use crate::router::{self, EventRouter};
use crate::subscriber::LogSubscriber;
use crate::timed::TimedEvent;

const THREAD_SAFE_BIT: u8 = 0b01;
const LATCHED_BIT: u8 = 0b10;

/// A concurrency mode that can change until it is first read
#[derive(Debug)]
pub struct ModeLatch {
    state: AtomicU8,
}

impl ModeLatch {
    /// Create an unlatched mode selector
    pub const fn new(mode: ConcurrencyMode) -> Self {
        Self {
            state: AtomicU8::new(mode_bits(mode)),
        }
    }

    /// Ask for `mode`
    ///
    /// Succeeds before the latch closes, or afterwards when `mode` is already active.
    pub fn request(&self, mode: ConcurrencyMode) -> Result<()> {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            if current & LATCHED_BIT != 0 {
                let active = mode_from_bits(current);
                return if active == mode {
                    Ok(())
                } else {
                    Err(Error::ModeLocked {
                        active,
                        requested: mode,
                    })
                };
            }
            match self.state.compare_exchange_weak(
                current,
                mode_bits(mode),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Ok(()),
                Err(actual) => current = actual,
            }
        }
    }

    /// Close the latch and return the mode in effect
    pub fn latch(&self) -> ConcurrencyMode {
        mode_from_bits(self.state.fetch_or(LATCHED_BIT, Ordering::AcqRel))
    }

    /// Whether the mode is fixed
    pub fn is_latched(&self) -> bool {
        self.state.load(Ordering::Acquire) & LATCHED_BIT != 0
    }

    /// Mode currently selected, latched or not
    pub fn mode(&self) -> ConcurrencyMode {
        mode_from_bits(self.state.load(Ordering::Acquire))
    }
}

const fn mode_bits(mode: ConcurrencyMode) -> u8 {
    match mode {
        ConcurrencyMode::SingleThreaded => 0,
        ConcurrencyMode::ThreadSafe => THREAD_SAFE_BIT,
    }
}

fn mode_from_bits(bits: u8) -> ConcurrencyMode {
    ConcurrencyMode::from_thread_safe(bits & THREAD_SAFE_BIT != 0)
}

static MODE: ModeLatch = ModeLatch::new(ConcurrencyMode::SingleThreaded);
static SHARED: OnceLock<Mutex<EventRouter>> = OnceLock::new();

thread_local! {
    static LOCAL: RefCell<EventRouter> = RefCell::new(EventRouter::new());
}

/// Fix the global concurrency mode
///
/// Fails with [`Error::ModeLocked`] when the global logger already runs in another mode.
pub fn initialize(mode: ConcurrencyMode) -> Result<()> {
    MODE.request(mode)?;
    MODE.latch();
    Ok(())
}

/// Whether the global logger has been used or initialized
pub fn is_initialized() -> bool {
    MODE.is_latched()
}

/// Concurrency mode of the global logger
pub fn mode() -> ConcurrencyMode {
    MODE.mode()
}

/// Run `f` with the global router, creating it on first use
pub fn with_router<R>(f: impl FnOnce(&mut EventRouter) -> R) -> R {
    match MODE.latch() {
        ConcurrencyMode::ThreadSafe => SHARED
            .get_or_init(|| Mutex::new(EventRouter::new()))
            .with_router(f),
        ConcurrencyMode::SingleThreaded => LOCAL.with(|cell| cell.with_router(f)),
    }
}

/// Access handle for the global router
#[derive(Debug, Clone, Copy, Default)]
pub struct Global;

impl RouterAccess for Global {
    fn with_router<R>(&self, f: impl FnOnce(&mut EventRouter) -> R) -> R {
        with_router(f)
    }
}

/// Access handle for the global router that stays on the thread that created it
///
/// In single-threaded mode a timed record only exists in the router of the thread
/// that began it, so handles holding its id must not move to another thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadGlobal {
    _not_send: PhantomData<*const ()>,
}

impl RouterAccess for ThreadGlobal {
    fn with_router<R>(&self, f: impl FnOnce(&mut EventRouter) -> R) -> R {
        with_router(f)
    }
}

/// Log one event
pub fn log(level: Level, text: impl Into<String>) {
    let text = text.into();
    with_router(|router| router.log(level, text));
}

/// Whether an event at `level` would reach any sink
pub fn enabled(level: Level) -> bool {
    with_router(|router| router.enabled(level))
}

/// Start a message logged when the builder is dropped
pub fn message(level: Level) -> MessageBuilder<Global> {
    MessageBuilder::new(Global, level)
}

/// Start a timed event, finished when the handle is dropped
///
/// The handle is not `Send`. In thread-safe mode `TimedEvent::begin(Global, level)`
/// gives a handle that may finish on another thread.
pub fn begin_timed(level: Level) -> TimedEvent<ThreadGlobal> {
    TimedEvent::begin(ThreadGlobal::default(), level)
}

/// Register a push subscriber for events at or above `level`
pub fn subscribe_push_events(subscriber: Arc<dyn LogSubscriber>, level: Level) {
    with_router(|router| router.subscribe(subscriber, level));
}

/// Replay the retained history at or above `min_level` to a subscriber
pub fn pull_log_events(min_level: Level, subscriber: &dyn LogSubscriber) {
    let snapshot = history(min_level);
    router::replay(&snapshot, subscriber);
}

/// Snapshot of the retained history at or above `min_level`
pub fn history(min_level: Level) -> Vec<EventRecord> {
    with_router(|router| router.history(min_level))
}

/// Flush the global log file
pub fn flush() -> std::io::Result<()> {
    with_router(|router| router.flush())
}

/// Settings of the global logger
pub mod config {
    use super::{with_router, MODE};
    use crate::color::Color;
    use crate::config::LoggerConfig;
    use crate::level::Level;
    use crate::logger::ConcurrencyMode;

    /// Choose thread-safe or single-threaded mode
    ///
    /// Once the global logger is in use the mode cannot change; trying logs an ERROR event.
    pub fn set_multi_thread_safe(thread_safe: bool) {
        if let Err(e) = MODE.request(ConcurrencyMode::from_thread_safe(thread_safe)) {
            with_router(|router| router.report_misuse(e.to_string()));
        }
    }

    pub fn set_stack_size(size: usize) {
        with_router(|router| router.set_stack_size(size));
    }

    pub fn set_out_file(pattern: &str) {
        with_router(|router| router.set_out_file(pattern));
    }

    pub fn set_out_path(path: &str) {
        with_router(|router| router.set_out_path(path));
    }

    pub fn set_level_color(level: Level, color: Color) {
        with_router(|router| router.set_level_color(level, color));
    }

    pub fn set_console_level(level: Level) {
        with_router(|router| router.set_console_level(level));
    }

    pub fn set_file_level(level: Level) {
        with_router(|router| router.set_file_level(level));
    }

    pub fn set_stack_level(level: Level) {
        with_router(|router| router.set_stack_level(level));
    }

    /// Apply a whole configuration, concurrency mode first
    pub fn apply(config: &LoggerConfig) {
        set_multi_thread_safe(config.multi_thread_safe);
        with_router(|router| config.apply_to(router));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_latch_accepts_changes_until_latched() {
        let latch = ModeLatch::new(ConcurrencyMode::SingleThreaded);
        assert!(latch.request(ConcurrencyMode::ThreadSafe).is_ok());
        assert!(latch.request(ConcurrencyMode::SingleThreaded).is_ok());
        assert!(!latch.is_latched());

        assert_eq!(latch.latch(), ConcurrencyMode::SingleThreaded);
        assert!(latch.is_latched());
    }

    #[test]
    fn test_latch_rejects_other_mode_after_latch() {
        let latch = ModeLatch::new(ConcurrencyMode::ThreadSafe);
        latch.latch();

        assert!(latch.request(ConcurrencyMode::ThreadSafe).is_ok());
        assert_eq!(
            latch.request(ConcurrencyMode::SingleThreaded),
            Err(Error::ModeLocked {
                active: ConcurrencyMode::ThreadSafe,
                requested: ConcurrencyMode::SingleThreaded,
            })
        );
        assert_eq!(latch.mode(), ConcurrencyMode::ThreadSafe);
    }

    struct SendCheck<T: ?Sized>(PhantomData<T>);

    trait NotSend {
        const IS_SEND: bool = false;
    }

    impl<T: ?Sized> NotSend for SendCheck<T> {}

    impl<T: ?Sized + Send> SendCheck<T> {
        const IS_SEND: bool = true;
    }

    #[test]
    fn test_global_timed_handle_stays_on_its_thread() {
        assert!(!SendCheck::<TimedEvent<ThreadGlobal>>::IS_SEND);
        assert!(SendCheck::<TimedEvent<Global>>::IS_SEND);
        assert!(SendCheck::<crate::RouterLayer<Global>>::IS_SEND);
    }

    // The global instance is process-wide, so everything touching it lives in one test
    #[test]
    fn test_global_facade() {
        let dir = TempDir::new().unwrap();
        initialize(ConcurrencyMode::ThreadSafe).unwrap();
        assert!(is_initialized());
        assert_eq!(mode(), ConcurrencyMode::ThreadSafe);

        config::set_out_path(dir.path().to_str().unwrap());
        config::set_out_file("global.log");
        config::set_console_level(Level::Fatal);
        config::set_stack_level(Level::Info);

        let seen = Arc::new(Mutex::new(Vec::<(String, Level)>::new()));
        let sink = Arc::clone(&seen);
        subscribe_push_events(
            Arc::new(move |_: &str, text: &str, level: Level| {
                sink.lock().unwrap().push((text.to_string(), level));
            }),
            Level::Info,
        );

        crate::info!("global marker {}", 42);
        crate::debug!("not delivered {}", 1);
        {
            let mut span = begin_timed(Level::Warn);
            span.log("global span");
        }
        message(Level::Error).push("built ").push("message");

        // Mode changes are refused now and reported as an ERROR event
        assert!(initialize(ConcurrencyMode::SingleThreaded).is_err());
        config::set_multi_thread_safe(false);
        assert_eq!(mode(), ConcurrencyMode::ThreadSafe);

        let texts: Vec<String> = seen.lock().unwrap().iter().map(|(t, _)| t.clone()).collect();
        assert_eq!(texts[0], "global marker 42");
        assert_eq!(texts[1], "global span");
        assert!(texts[2].starts_with("global span\tDone in: "));
        assert_eq!(texts[3], "built message");
        assert!(texts[4].contains("cannot switch"));
        assert_eq!(texts.len(), 5);

        let pulled = Mutex::new(Vec::new());
        pull_log_events(Level::Error, &|_: &str, text: &str, _: Level| {
            pulled.lock().unwrap().push(text.to_string());
        });
        assert_eq!(pulled.into_inner().unwrap().len(), 2);

        flush().unwrap();
        let written = std::fs::read_to_string(dir.path().join("global.log")).unwrap();
        assert!(written.contains("[INFO]\tglobal marker 42"));
        assert!(!written.contains("not delivered"));
    }
}
