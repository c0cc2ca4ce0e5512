// Logging macros for the global logger

/// Log a formatted message at a given level
///
/// The message is only formatted when the level is enabled.
///
/// # Examples
/// ```ignore
/// stacklog::log!(Level::Warn, "queue at {}%", fill);
/// ```
#[macro_export]
macro_rules! log {
    ($level:expr, $($arg:tt)+) => {{
        let level: $crate::Level = $level;
        if $crate::global::enabled(level) {
            $crate::global::log(level, ::std::format!($($arg)+));
        }
    }};
}

/// Log a formatted message with trace severity
#[macro_export]
macro_rules! trace {
    ($($arg:tt)+) => {
        $crate::log!($crate::Level::Trace, $($arg)+)
    };
}

/// Log a formatted message with debug severity
#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => {
        $crate::log!($crate::Level::Debug, $($arg)+)
    };
}

/// Log a formatted message with info severity
///
/// # Examples
/// ```ignore
/// stacklog::info!("listening on {}", addr);
/// ```
#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => {
        $crate::log!($crate::Level::Info, $($arg)+)
    };
}

/// Log a formatted message with warning severity
#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => {
        $crate::log!($crate::Level::Warn, $($arg)+)
    };
}

/// Log a formatted message with error severity
#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => {
        $crate::log!($crate::Level::Error, $($arg)+)
    };
}

/// Log a formatted message with fatal severity
#[macro_export]
macro_rules! fatal {
    ($($arg:tt)+) => {
        $crate::log!($crate::Level::Fatal, $($arg)+)
    };
}
