//! Daily log file rotation
//!
//! A file pattern may contain `%d`, replaced by the current date as `YYYY-MM-DD`.
//! Without the token the pattern is used verbatim and no rotation happens until the
//! pattern is changed.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

/// Token replaced by the date
pub const DATE_TOKEN: &str = "%d";

/// Default file pattern
pub const DEFAULT_PATTERN: &str = "%d_StreamedLog.log";

/// Resolve a pattern for a given day
///
/// Returns the filename and whether the pattern rotates.
pub fn resolve_filename(pattern: &str, today: NaiveDate) -> (String, bool) {
    if pattern.contains(DATE_TOKEN) {
        let date = today.format("%Y-%m-%d").to_string();
        (pattern.replace(DATE_TOKEN, &date), true)
    } else {
        (pattern.to_string(), false)
    }
}

/// Tracks which file the file sink should be writing to
#[derive(Debug, Clone)]
pub struct RotationPolicy {
    pattern: String,
    directory: PathBuf,
    current_filename: Option<String>,
    last_rotation_date: Option<NaiveDate>,
    rotation_enabled: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_PATTERN)
    }
}

impl RotationPolicy {
    /// Create a policy for a pattern in the current directory
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            directory: PathBuf::new(),
            current_filename: None,
            last_rotation_date: None,
            rotation_enabled: true,
        }
    }

    /// Replace the pattern and forget the resolved file
    pub fn set_pattern(&mut self, pattern: impl Into<String>) {
        self.pattern = pattern.into();
        self.reset();
    }

    /// Replace the output directory and forget the resolved file
    pub fn set_directory(&mut self, directory: impl Into<PathBuf>) {
        self.directory = directory.into();
        self.reset();
    }

    fn reset(&mut self) {
        self.current_filename = None;
        self.last_rotation_date = None;
        self.rotation_enabled = true;
    }

    /// Check whether the target file changes on `today`
    ///
    /// Returns `true` when a new filename was resolved; any open file must then be
    /// closed before writing. Repeated calls on the same day return `false`.
    pub fn check(&mut self, today: NaiveDate) -> bool {
        if !self.rotation_enabled || self.last_rotation_date == Some(today) {
            return false;
        }

        let (filename, rotates) = resolve_filename(&self.pattern, today);
        tracing::debug!(
            "Log file rotation on {}: {} -> {}",
            today,
            self.current_filename.as_deref().unwrap_or("<none>"),
            filename
        );
        self.current_filename = Some(filename);
        self.last_rotation_date = Some(today);
        self.rotation_enabled = rotates;
        true
    }

    /// Path the file sink writes to, once resolved
    pub fn current_path(&self) -> Option<PathBuf> {
        self.current_filename
            .as_ref()
            .map(|name| self.directory.join(name))
    }

    /// Configured pattern
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Configured output directory
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Whether a date change can still switch files
    pub fn rotation_enabled(&self) -> bool {
        self.rotation_enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_resolve_filename_with_token() {
        assert_eq!(
            resolve_filename("%d_log.log", day(2024, 6, 1)),
            ("2024-06-01_log.log".to_string(), true)
        );
    }

    #[test]
    fn test_resolve_filename_without_token() {
        assert_eq!(
            resolve_filename("app.log", day(2024, 6, 1)),
            ("app.log".to_string(), false)
        );
    }

    #[test]
    fn test_check_once_per_day() {
        let mut policy = RotationPolicy::new("%d.log");

        assert!(policy.check(day(2024, 6, 1)));
        assert!(!policy.check(day(2024, 6, 1)));
        assert_eq!(policy.current_path(), Some(PathBuf::from("2024-06-01.log")));

        assert!(policy.check(day(2024, 6, 2)));
        assert_eq!(policy.current_path(), Some(PathBuf::from("2024-06-02.log")));
    }

    #[test]
    fn test_static_pattern_never_rotates_again() {
        let mut policy = RotationPolicy::new("app.log");

        assert!(policy.check(day(2024, 6, 1)));
        assert!(!policy.rotation_enabled());
        assert!(!policy.check(day(2024, 6, 2)));
        assert_eq!(policy.current_path(), Some(PathBuf::from("app.log")));
    }

    #[test]
    fn test_set_pattern_resets_tracking() {
        let mut policy = RotationPolicy::new("app.log");
        policy.check(day(2024, 6, 1));

        policy.set_pattern("%d-app.log");
        assert_eq!(policy.current_path(), None);
        assert!(policy.check(day(2024, 6, 1)));
        assert_eq!(
            policy.current_path(),
            Some(PathBuf::from("2024-06-01-app.log"))
        );
    }

    #[test]
    fn test_directory_is_joined() {
        let mut policy = RotationPolicy::new("%d.log");
        policy.set_directory("/var/log/app");
        policy.check(day(2024, 1, 9));
        assert_eq!(
            policy.current_path(),
            Some(PathBuf::from("/var/log/app/2024-01-09.log"))
        );
    }
}
