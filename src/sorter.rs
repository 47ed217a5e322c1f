//! Sort run orchestration
//!
//! Drives one run: validates the configuration, enumerates eligible image
//! files, resolves a capture date and plans a destination per file, performs
//! the copy or move, and emits lifecycle events. Files are processed one at
//! a time in enumeration order; a per-file failure is reported and the run
//! continues with the next file.

use crate::config::Config;
use crate::date;
use crate::error::{Error, Result};
use crate::events::{EventSender, SortEvent, SortSummary};
use crate::plan;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// Result of processing a single file
#[derive(Debug, Clone)]
pub struct FileOutcome {
    /// Source file path
    pub source: PathBuf,
    /// Destination path (planned or actual)
    pub destination: Option<PathBuf>,
    /// Processing status
    pub status: OutcomeStatus,
    /// Error message when status is Failed
    pub error: Option<String>,
}

/// Status of file processing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// File was copied or moved to its destination
    Sorted,
    /// Dry run - destination was planned, nothing was touched
    DryRun,
    /// Processing failed; the run continued
    Failed,
}

/// Cooperative cancellation flag, checked once per file boundary
#[derive(Clone, Default)]
pub struct CancelFlag {
    inner: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; takes effect at the next file boundary
    pub fn cancel(&self) {
        self.inner.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.load(Ordering::Relaxed)
    }
}

/// RAII guard over the "sorting in progress" flag.
///
/// Acquiring while another run holds the flag fails immediately instead of
/// queuing; dropping the guard releases the flag.
struct RunGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::SortInProgress)?;
        Ok(Self { flag })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Orchestrates sort runs for one configuration
pub struct Sorter {
    config: Config,
    running: AtomicBool,
}

impl Sorter {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            running: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run one sort pass.
    ///
    /// Emits `Started`, one `Sorted`/`Failed` per file, and a terminal
    /// `Completed` or `Cancelled` on `events`. Returns the per-file outcomes
    /// in processing order. Starting a second run while one is active fails
    /// with [`Error::SortInProgress`] without mutating anything.
    pub fn run(&self, events: &EventSender, cancel: &CancelFlag) -> Result<Vec<FileOutcome>> {
        let _guard = RunGuard::acquire(&self.running)?;

        self.validate()?;

        info!(source = %self.config.source_dir.display(), "Scanning source directory");
        let files = self.collect_files()?;
        info!(count = files.len(), "Found image files");

        if !self.config.dry_run {
            fs::create_dir_all(&self.config.target_dir)?;
        }

        events.send(SortEvent::Started { total: files.len() });

        let mut outcomes = Vec::with_capacity(files.len());
        let mut summary = SortSummary {
            total: files.len(),
            ..SortSummary::default()
        };

        // Destinations planned earlier in this run count as taken during
        // collision probing, which keeps dry runs faithful to real runs.
        let mut planned = HashSet::new();

        for (index, path) in files.iter().enumerate() {
            if cancel.is_cancelled() {
                warn!(processed = outcomes.len(), "Run cancelled");
                events.send(SortEvent::Cancelled { summary });
                return Ok(outcomes);
            }

            let outcome = self.process_file(path, &mut planned);
            match outcome.status {
                OutcomeStatus::Sorted | OutcomeStatus::DryRun => {
                    summary.sorted += 1;
                    let destination = outcome
                        .destination
                        .clone()
                        .unwrap_or_default();
                    events.send(SortEvent::Sorted {
                        source: outcome.source.clone(),
                        destination,
                        percent: progress_percent(index + 1, files.len()),
                    });
                }
                OutcomeStatus::Failed => {
                    summary.failed += 1;
                    events.send(SortEvent::Failed {
                        source: outcome.source.clone(),
                        message: outcome.error.clone().unwrap_or_default(),
                    });
                }
            }
            outcomes.push(outcome);
        }

        info!(
            total = summary.total,
            sorted = summary.sorted,
            failed = summary.failed,
            "Sort run complete"
        );
        events.send(SortEvent::Completed { summary });

        Ok(outcomes)
    }

    /// Fatal configuration checks, performed before any processing
    fn validate(&self) -> Result<()> {
        if !self.config.source_dir.is_dir() {
            return Err(Error::SourceNotFound(self.config.source_dir.clone()));
        }
        Ok(())
    }

    /// Collect eligible files from the source tree, in enumeration order
    fn collect_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.config.source_dir).follow_links(true) {
            let entry = entry?;
            let path = entry.path();
            if path.is_file()
                && let Some(name) = path.file_name().and_then(|n| n.to_str())
            {
                let (_, ext) = plan::split_name(name);
                if self.config.is_supported(ext) {
                    files.push(path.to_path_buf());
                }
            }
        }

        Ok(files)
    }

    /// Resolve, plan and execute one file. Failures are contained here.
    fn process_file(&self, path: &Path, planned: &mut HashSet<PathBuf>) -> FileOutcome {
        match self.sort_one(path, planned) {
            Ok((destination, status)) => {
                debug!(source = ?path, ?destination, "Processed file");
                FileOutcome {
                    source: path.to_path_buf(),
                    destination: Some(destination),
                    status,
                    error: None,
                }
            }
            Err(e) => {
                error!(source = ?path, error = %e, "Failed to process file");
                FileOutcome {
                    source: path.to_path_buf(),
                    destination: None,
                    status: OutcomeStatus::Failed,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    fn sort_one(
        &self,
        path: &Path,
        planned: &mut HashSet<PathBuf>,
    ) -> Result<(PathBuf, OutcomeStatus)> {
        let resolved = date::resolve(path);
        let destination = plan::plan(&self.config, path, &resolved.taken)?;

        let mut dest_path = destination.full_path();
        if !self.config.overwrite {
            dest_path = plan::resolve_collision(dest_path, planned)?;
        }

        if self.config.dry_run {
            info!(source = ?path, destination = ?dest_path, "Would sort file");
            return Ok((dest_path, OutcomeStatus::DryRun));
        }

        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Read before the operation; a move leaves no source to ask
        let source_mtime = fs::metadata(path).ok().and_then(|m| m.modified().ok());

        if self.config.keep_original {
            copy_file(path, &dest_path)?;
        } else {
            // Rename is cheap on the same filesystem; fall back to
            // copy + delete for cross-filesystem moves
            if fs::rename(path, &dest_path).is_err() {
                copy_file(path, &dest_path)?;
                fs::remove_file(path)?;
            }
        }

        if let Some(mtime) = source_mtime {
            let _ = filetime::set_file_mtime(&dest_path, filetime::FileTime::from_system_time(mtime));
        }

        Ok((dest_path, OutcomeStatus::Sorted))
    }
}

fn progress_percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    (done * 100 / total) as u8
}

/// Copy file with buffered I/O
fn copy_file(source: &Path, dest: &Path) -> Result<()> {
    let src_file = File::open(source)?;
    let dest_file = File::create(dest)?;

    let mut reader = BufReader::with_capacity(256 * 1024, src_file);
    let mut writer = BufWriter::with_capacity(256 * 1024, dest_file);

    let mut buffer = vec![0u8; 256 * 1024];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        writer.write_all(&buffer[..bytes_read])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events;

    #[test]
    fn test_run_guard_blocks_second_acquire() {
        let flag = AtomicBool::new(false);

        let guard = RunGuard::acquire(&flag).unwrap();
        assert!(matches!(
            RunGuard::acquire(&flag),
            Err(Error::SortInProgress)
        ));

        drop(guard);
        assert!(RunGuard::acquire(&flag).is_ok());
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(1, 4), 25);
        assert_eq!(progress_percent(4, 4), 100);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(0, 0), 100);
    }

    #[test]
    fn test_collect_files_filters_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("b.TIFF"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::write(dir.path().join("clip.mp4"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested/c.webp"), b"x").unwrap();

        let config = Config {
            source_dir: dir.path().to_path_buf(),
            target_dir: dir.path().join("out"),
            ..Config::default()
        };
        let sorter = Sorter::new(config);
        let files = sorter.collect_files().unwrap();

        let mut names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(names, ["a.jpg", "b.TIFF", "c.webp"]);
    }

    #[test]
    fn test_missing_source_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            source_dir: dir.path().join("does-not-exist"),
            target_dir: dir.path().join("out"),
            ..Config::default()
        };
        let sorter = Sorter::new(config);
        let result = sorter.run(&events::null_sender(), &CancelFlag::new());
        assert!(matches!(result, Err(Error::SourceNotFound(_))));
    }
}
