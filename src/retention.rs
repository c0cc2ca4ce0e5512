//! Log file retention management
//!
//! Handles cleanup of rotated log files based on the date in their name.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};

use crate::rotation::{resolve_filename, DATE_TOKEN};

/// Default retention period in days
pub const DEFAULT_RETENTION_DAYS: u64 = 7;

/// How many days before the cutoff are checked for matching files
const SCAN_LIMIT_DAYS: u64 = 3650;

/// Clean up rotated log files older than the default retention period
///
/// Returns the number of files deleted.
pub fn cleanup_old_logs(logs_dir: &Path, pattern: &str, today: NaiveDate) -> Result<usize> {
    cleanup_old_logs_with_retention(logs_dir, pattern, today, DEFAULT_RETENTION_DAYS)
}

/// Clean up rotated log files dated more than `retention_days` before `today`
///
/// Only files whose name is exactly what `pattern` resolves to for some date are
/// candidates. Patterns without a date token never match anything.
///
/// Returns the number of files deleted.
pub fn cleanup_old_logs_with_retention(
    logs_dir: &Path,
    pattern: &str,
    today: NaiveDate,
    retention_days: u64,
) -> Result<usize> {
    if !logs_dir.exists() || !pattern.contains(DATE_TOKEN) {
        return Ok(0);
    }

    let Some(cutoff) = today.checked_sub_days(Days::new(retention_days)) else {
        return Ok(0);
    };

    // Names of every expired day back to the scan limit
    let expired: HashSet<String> = (1..=SCAN_LIMIT_DAYS)
        .map_while(|n| cutoff.checked_sub_days(Days::new(n)))
        .map(|d| resolve_filename(pattern, d).0)
        .collect();

    let mut deleted_count = 0;

    let entries = fs::read_dir(logs_dir)
        .with_context(|| format!("Failed to read log directory {}", logs_dir.display()))?;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();

        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !expired.contains(name) || !path.is_file() {
            continue;
        }

        match fs::remove_file(&path) {
            Ok(()) => deleted_count += 1,
            Err(e) => tracing::warn!("Failed to delete old log {}: {}", path.display(), e),
        }
    }

    if deleted_count > 0 {
        tracing::debug!(
            "Removed {} log files older than {} in {}",
            deleted_count,
            cutoff,
            logs_dir.display()
        );
    }

    Ok(deleted_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn touch(dir: &Path, name: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        File::create(&path).unwrap().write_all(b"test").unwrap();
        path
    }

    #[test]
    fn test_cleanup_empty_dir() {
        let temp_dir = TempDir::new().unwrap();
        let count = cleanup_old_logs(temp_dir.path(), "%d.log", day(2024, 6, 1)).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_cleanup_nonexistent_dir() {
        let path = Path::new("/nonexistent/path/for/testing");
        let count = cleanup_old_logs(path, "%d.log", day(2024, 6, 1)).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_cleanup_removes_only_expired_matches() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();

        let old = touch(dir, "2024-05-01_StreamedLog.log");
        let edge = touch(dir, "2024-05-25_StreamedLog.log");
        let recent = touch(dir, "2024-05-30_StreamedLog.log");
        let other = touch(dir, "2024-05-01_other.log");
        let notes = touch(dir, "notes.txt");

        let count =
            cleanup_old_logs(dir, "%d_StreamedLog.log", day(2024, 6, 1)).unwrap();

        assert_eq!(count, 1);
        assert!(!old.exists());
        assert!(edge.exists());
        assert!(recent.exists());
        assert!(other.exists());
        assert!(notes.exists());
    }

    #[test]
    fn test_custom_retention() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        touch(dir, "app-2024-05-30.log");
        touch(dir, "app-2024-05-31.log");

        let count =
            cleanup_old_logs_with_retention(dir, "app-%d.log", day(2024, 6, 1), 1).unwrap();
        assert_eq!(count, 1);
        assert!(dir.join("app-2024-05-31.log").exists());
    }

    #[test]
    fn test_static_pattern_deletes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let file = touch(temp_dir.path(), "app.log");

        let count =
            cleanup_old_logs_with_retention(temp_dir.path(), "app.log", day(2030, 1, 1), 0)
                .unwrap();
        assert_eq!(count, 0);
        assert!(file.exists());
    }
}
