use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Outcome of a best-effort removal. Failures never stop the walk; they are
/// collected so callers can report what was left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub removed: usize,
    pub failed: Vec<PathBuf>,
}

impl CleanReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn merge(&mut self, other: CleanReport) {
        self.removed += other.removed;
        self.failed.extend(other.failed);
    }
}

enum Visit {
    Enter(PathBuf),
    Leave(PathBuf),
}

/// Removes `path` and everything below it, children before parents. Missing
/// paths are skipped, so calling this twice is harmless. Symbolic links are
/// removed as links and never followed.
pub fn remove_path(path: &Path) -> CleanReport {
    let mut report = CleanReport::default();
    let mut stack = vec![Visit::Enter(path.to_path_buf())];

    while let Some(visit) = stack.pop() {
        match visit {
            Visit::Enter(current) => {
                let metadata = match fs::symlink_metadata(&current) {
                    Ok(metadata) => metadata,
                    Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                    Err(err) => {
                        record_failure(&mut report, &current, &err);
                        continue;
                    }
                };

                if !metadata.is_dir() {
                    remove_one(&mut report, &current, fs::remove_file(&current));
                    continue;
                }

                stack.push(Visit::Leave(current.clone()));
                match fs::read_dir(&current) {
                    Ok(entries) => {
                        for entry in entries {
                            match entry {
                                Ok(entry) => stack.push(Visit::Enter(entry.path())),
                                Err(err) => record_failure(&mut report, &current, &err),
                            }
                        }
                    }
                    Err(err) => record_failure(&mut report, &current, &err),
                }
            }
            Visit::Leave(current) => {
                remove_one(&mut report, &current, fs::remove_dir(&current));
            }
        }
    }

    if !report.is_clean() {
        tracing::warn!(
            path = %path.display(),
            failed = report.failed.len(),
            "some paths could not be removed"
        );
    }
    report
}

fn remove_one(report: &mut CleanReport, path: &Path, result: io::Result<()>) {
    match result {
        Ok(()) => {
            tracing::trace!(path = %path.display(), "removed");
            report.removed += 1;
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => record_failure(report, path, &err),
    }
}

fn record_failure(report: &mut CleanReport, path: &Path, err: &io::Error) {
    tracing::debug!(path = %path.display(), error = %err, "failed to remove");
    if !report.failed.iter().any(|failed| failed == path) {
        report.failed.push(path.to_path_buf());
    }
}
