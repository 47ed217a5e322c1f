//! Capture-date resolution
//!
//! Produces the best-available "taken" timestamp for an image file:
//! 1. EXIF capture metadata, filtered for plausibility
//! 2. File system timestamps (the earlier of created/modified)
//! 3. Current wall-clock time
//!
//! Resolution is total: metadata errors degrade to the next tier, and the
//! final fallback always produces a value.

pub mod exif;

use chrono::{DateTime, Datelike, Local, NaiveDateTime};
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// Calendar dates cameras commonly reset to after battery loss.
/// Compared on year-month-day only; time of day is ignored.
const SUSPICIOUS_DATES: &[(i32, u32, u32)] = &[
    (1970, 1, 1),
    (1980, 1, 1),
    (2000, 1, 1),
    (2010, 1, 1),
    (2020, 1, 1),
];

/// Capture dates before this year are not trusted
const MIN_PLAUSIBLE_YEAR: i32 = 1995;

/// Where the resolved timestamp came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSource {
    /// Embedded EXIF capture metadata
    Exif,
    /// File system timestamps
    FileSystem,
    /// Wall-clock time at resolution
    CurrentTime,
}

/// A resolved capture timestamp for one file
#[derive(Debug, Clone)]
pub struct ResolvedDate {
    /// The timestamp, second precision
    pub taken: NaiveDateTime,
    /// Which tier produced it
    pub source: DateSource,
}

/// Resolve the capture date for a file. Never fails.
pub fn resolve(path: &Path) -> ResolvedDate {
    let now = Local::now().naive_local();

    match exif::extract_capture_time(path) {
        Ok(taken) => {
            if is_plausible(&taken, &now) {
                debug!(?path, %taken, "Resolved date from EXIF");
                return ResolvedDate {
                    taken,
                    source: DateSource::Exif,
                };
            }
            debug!(?path, %taken, "Rejected implausible EXIF date");
        }
        Err(e) => {
            debug!(?path, error = %e, "No EXIF date, trying file system timestamps");
        }
    }

    if let Some(taken) = filesystem_time(path, &now) {
        debug!(?path, %taken, "Resolved date from file system timestamps");
        return ResolvedDate {
            taken,
            source: DateSource::FileSystem,
        };
    }

    warn!(?path, "No usable timestamp found, using current time");
    ResolvedDate {
        taken: now,
        source: DateSource::CurrentTime,
    }
}

/// Plausibility filter for metadata timestamps.
///
/// Rejects timestamps in the future, on a known camera-reset calendar date,
/// or before [`MIN_PLAUSIBLE_YEAR`]. A rejected timestamp is discarded
/// entirely rather than partially trusted.
fn is_plausible(taken: &NaiveDateTime, now: &NaiveDateTime) -> bool {
    if taken > now {
        return false;
    }
    if taken.year() < MIN_PLAUSIBLE_YEAR {
        return false;
    }
    let date = taken.date();
    !SUSPICIOUS_DATES
        .iter()
        .any(|&(y, m, d)| date.year() == y && date.month() == m && date.day() == d)
}

/// The earlier of the file's creation and modification timestamps.
///
/// A file touched after its true creation should not appear newer than its
/// original date. Epoch-zero and future timestamps count as unavailable;
/// with neither timestamp usable this returns None.
fn filesystem_time(path: &Path, now: &NaiveDateTime) -> Option<NaiveDateTime> {
    let metadata = fs::metadata(path).ok()?;

    let created = metadata.created().ok().and_then(to_local_naive);
    let modified = metadata.modified().ok().and_then(to_local_naive);

    let taken = match (created, modified) {
        (Some(c), Some(m)) => Some(c.min(m)),
        (Some(c), None) => Some(c),
        (None, Some(m)) => Some(m),
        (None, None) => None,
    }?;

    if taken > *now {
        debug!(?path, %taken, "Discarding future file system timestamp");
        return None;
    }

    Some(taken)
}

/// Convert a system time to a local naive timestamp; epoch zero is unset
fn to_local_naive(time: SystemTime) -> Option<NaiveDateTime> {
    match time.duration_since(UNIX_EPOCH) {
        Ok(elapsed) if !elapsed.is_zero() => {
            let datetime: DateTime<Local> = time.into();
            Some(datetime.naive_local())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, minute, second)
            .unwrap()
    }

    #[test]
    fn test_plausible_ordinary_date() {
        let now = ts(2026, 8, 6, 12, 0, 0);
        assert!(is_plausible(&ts(2024, 6, 15, 14, 30, 0), &now));
        assert!(is_plausible(&ts(1995, 1, 1, 0, 0, 0), &now));
    }

    #[test]
    fn test_rejects_future_dates() {
        let now = ts(2026, 8, 6, 12, 0, 0);
        assert!(!is_plausible(&ts(2027, 8, 6, 12, 0, 0), &now));
        // One second ahead is still the future
        assert!(!is_plausible(&ts(2026, 8, 6, 12, 0, 1), &now));
        assert!(is_plausible(&ts(2026, 8, 6, 12, 0, 0), &now));
    }

    #[test]
    fn test_rejects_suspicious_reset_dates() {
        let now = ts(2026, 8, 6, 12, 0, 0);
        // Time of day is irrelevant, only the calendar date matters
        assert!(!is_plausible(&ts(2000, 1, 1, 0, 0, 0), &now));
        assert!(!is_plausible(&ts(2000, 1, 1, 17, 45, 12), &now));
        assert!(!is_plausible(&ts(2010, 1, 1, 8, 0, 0), &now));
        assert!(!is_plausible(&ts(2020, 1, 1, 23, 59, 59), &now));
        // Adjacent days are fine
        assert!(is_plausible(&ts(2000, 1, 2, 0, 0, 0), &now));
        assert!(is_plausible(&ts(2019, 12, 31, 23, 59, 59), &now));
    }

    #[test]
    fn test_rejects_dates_before_floor() {
        let now = ts(2026, 8, 6, 12, 0, 0);
        assert!(!is_plausible(&ts(1994, 12, 31, 23, 59, 59), &now));
        assert!(!is_plausible(&ts(1990, 6, 1, 10, 0, 0), &now));
    }

    #[test]
    fn test_filesystem_tier_prefers_earlier_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        std::fs::write(&path, b"data").unwrap();

        // Push the modification time well into the past; creation stays "now",
        // so the earlier (modification) timestamp must win.
        let past = filetime::FileTime::from_unix_time(1_600_000_000, 0);
        filetime::set_file_mtime(&path, past).unwrap();

        let now = Local::now().naive_local();
        let taken = filesystem_time(&path, &now).unwrap();
        let expected = to_local_naive(
            UNIX_EPOCH + std::time::Duration::from_secs(1_600_000_000),
        )
        .unwrap();
        assert_eq!(taken, expected);
    }

    #[test]
    fn test_resolve_is_total_for_exifless_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.jpg");
        std::fs::write(&path, b"no exif here").unwrap();

        let resolved = resolve(&path);
        // Freshly written file: the file system tier must produce a value
        assert_eq!(resolved.source, DateSource::FileSystem);
        assert!(resolved.taken <= Local::now().naive_local());
    }

    #[test]
    fn test_epoch_zero_counts_as_unset() {
        assert!(to_local_naive(UNIX_EPOCH).is_none());
        assert!(to_local_naive(UNIX_EPOCH + std::time::Duration::from_secs(1)).is_some());
    }
}
