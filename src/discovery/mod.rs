//! Recording discovery
//!
//! Walks the recordings directory and produces the snapshot of [`FileTask`]s a run
//! works on. The snapshot is taken once; files appearing later are not picked up.
//!
//! ```text
//! root/                       since = 2024-11-17
//! ├── a.dem   (2024-11-16)    → skipped (too old)
//! ├── b.dem   (2024-11-18)    → FileTask #2
//! ├── notes.txt               → skipped (suffix)
//! └── season/
//!     └── c.dem (2024-11-17)  → FileTask #1
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use ignore::WalkBuilder;
use tracing::{debug, warn};

use crate::error::SetupError;

/// A discovered recording and the modification time it was selected by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    pub path: PathBuf,
    pub modified_at: DateTime<Utc>,
}

impl FileTask {
    pub fn new(path: impl Into<PathBuf>, modified_at: DateTime<Utc>) -> Self {
        Self {
            path: path.into(),
            modified_at,
        }
    }

    /// Base name of the recording, as shown in the report.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }

    /// Modification date rendered as `YYYY-MM-DD` (UTC).
    pub fn date_label(&self) -> String {
        self.modified_at.format("%Y-%m-%d").to_string()
    }
}

/// Normalize a suffix filter so that `dem` and `.dem` select the same files.
pub fn normalize_suffix(suffix: &str) -> String {
    let trimmed = suffix.trim();
    if trimmed.starts_with('.') {
        trimmed.to_string()
    } else {
        format!(".{trimmed}")
    }
}

fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().ends_with(suffix))
        .unwrap_or(false)
}

/// Collect every regular file under `root` whose name ends with `suffix` and whose
/// modification time is at or after `since`, ordered by modification time.
///
/// Only a failure to read `root` itself is fatal. Entries that cannot be read
/// during the walk are logged and skipped.
pub fn discover(
    root: &Path,
    suffix: &str,
    since: Option<DateTime<Utc>>,
) -> Result<Vec<FileTask>, SetupError> {
    std::fs::read_dir(root).map_err(|source| SetupError::RootUnreadable {
        path: root.to_path_buf(),
        source,
    })?;

    let suffix = normalize_suffix(suffix);
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut tasks = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        if !has_suffix(entry.path(), &suffix) {
            continue;
        }

        let modified = match entry.metadata().map(|meta| meta.modified()) {
            Ok(Ok(modified)) => DateTime::<Utc>::from(modified),
            Ok(Err(e)) => {
                warn!(path = %entry.path().display(), error = %e, "no modification time, skipping");
                continue;
            }
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "cannot stat entry, skipping");
                continue;
            }
        };

        if since.is_some_and(|since| modified < since) {
            debug!(path = %entry.path().display(), %modified, "older than filter date");
            continue;
        }

        tasks.push(FileTask::new(entry.into_path(), modified));
    }

    // Stable: equal timestamps keep traversal order.
    tasks.sort_by_key(|task| task.modified_at);
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone};
    use std::fs;
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.from_utc_datetime(
            &NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        )
    }

    fn write_with_mtime(path: &Path, at: DateTime<Utc>) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"recording").unwrap();
        let file = fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::from(at)).unwrap();
    }

    fn names(tasks: &[FileTask]) -> Vec<String> {
        tasks.iter().map(FileTask::file_name).collect()
    }

    #[test]
    fn test_filters_by_date_and_orders_ascending() {
        let temp_dir = TempDir::new().unwrap();
        write_with_mtime(&temp_dir.path().join("c.dem"), day(2024, 11, 18));
        write_with_mtime(&temp_dir.path().join("a.dem"), day(2024, 11, 16));
        write_with_mtime(&temp_dir.path().join("b.dem"), day(2024, 11, 17) + Duration::hours(5));

        let tasks = discover(temp_dir.path(), ".dem", Some(day(2024, 11, 17))).unwrap();

        assert_eq!(names(&tasks), vec!["b.dem", "c.dem"]);
        assert_eq!(tasks[0].date_label(), "2024-11-17");
        assert_eq!(tasks[1].date_label(), "2024-11-18");
    }

    #[test]
    fn test_since_boundary_is_inclusive() {
        let temp_dir = TempDir::new().unwrap();
        let since = day(2024, 11, 17);
        write_with_mtime(&temp_dir.path().join("exact.dem"), since);
        write_with_mtime(
            &temp_dir.path().join("early.dem"),
            since - Duration::milliseconds(1),
        );

        let tasks = discover(temp_dir.path(), ".dem", Some(since)).unwrap();
        assert_eq!(names(&tasks), vec!["exact.dem"]);
    }

    #[test]
    fn test_suffix_is_case_sensitive_and_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let at = day(2024, 11, 20);
        write_with_mtime(&temp_dir.path().join("match.dem"), at);
        write_with_mtime(&temp_dir.path().join("upper.DEM"), at);
        write_with_mtime(&temp_dir.path().join("notes.txt"), at);
        write_with_mtime(&temp_dir.path().join("season/deep/nested.dem"), at);
        write_with_mtime(&temp_dir.path().join(".hidden.dem"), at);
        fs::create_dir(temp_dir.path().join("folder.dem")).unwrap();

        let mut found = names(&discover(temp_dir.path(), "dem", None).unwrap());
        found.sort();
        assert_eq!(found, vec![".hidden.dem", "match.dem", "nested.dem"]);
    }

    #[test]
    fn test_equal_timestamps_keep_traversal_order() {
        let temp_dir = TempDir::new().unwrap();
        let at = day(2024, 11, 20);
        for name in ["d.dem", "b.dem", "a.dem", "c.dem"] {
            write_with_mtime(&temp_dir.path().join(name), at);
        }

        let tasks = discover(temp_dir.path(), ".dem", None).unwrap();
        assert_eq!(names(&tasks), vec!["a.dem", "b.dem", "c.dem", "d.dem"]);
    }

    #[test]
    fn test_discovery_is_deterministic() {
        let temp_dir = TempDir::new().unwrap();
        for (i, name) in ["x.dem", "y.dem", "z.dem", "sub/w.dem"].iter().enumerate() {
            write_with_mtime(&temp_dir.path().join(name), day(2024, 11, 10 + (i as u32 % 2)));
        }

        let first = discover(temp_dir.path(), ".dem", None).unwrap();
        let second = discover(temp_dir.path(), ".dem", None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_directory_is_not_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let tasks = discover(temp_dir.path(), ".dem", None).unwrap();
        assert!(tasks.is_empty());
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("gone");

        let err = discover(&missing, ".dem", None).unwrap_err();
        assert!(matches!(err, SetupError::RootUnreadable { ref path, .. } if path == &missing));
    }

    #[test]
    fn test_normalize_suffix() {
        assert_eq!(normalize_suffix("dem"), ".dem");
        assert_eq!(normalize_suffix(".dem"), ".dem");
        assert_eq!(normalize_suffix(" .dem "), ".dem");
    }
}
