//src/dispatch.rs

use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::error::{Read2ArrayError, Result};

/// A file whose processing failed, with enough identity to retry it alone.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: Read2ArrayError,
}

/// Outcome of a dispatch: every file lands in exactly one of the two lists.
#[derive(Debug)]
pub struct DispatchReport<T> {
    pub completed: Vec<(PathBuf, T)>,
    pub failures: Vec<FileFailure>,
}

impl<T> Default for DispatchReport<T> {
    fn default() -> Self {
        Self {
            completed: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl<T> DispatchReport<T> {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed_paths(&self) -> Vec<&Path> {
        self.failures.iter().map(|f| f.path.as_path()).collect()
    }
}

/// Runs `process_one` on every file across a pool of `worker_count` threads.
///
/// Each file is a single task, so a worker handles whole files one after
/// another and nothing is shared between them. A failing file is recorded
/// and the remaining files still run; nothing is retried. Both lists in the
/// report keep the input order.
pub fn run<T, F>(files: &[PathBuf], worker_count: usize, process_one: F) -> Result<DispatchReport<T>>
where
    T: Send,
    F: Fn(&Path) -> Result<T> + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(worker_count.max(1))
        .build()
        .map_err(|e| Read2ArrayError::Configuration(format!("cannot start worker pool: {e}")))?;

    let report = pool.install(|| {
        files
            .par_iter()
            .with_max_len(1)
            .fold(DispatchReport::default, |mut acc, path| {
                match process_one(path) {
                    Ok(value) => acc.completed.push((path.clone(), value)),
                    Err(error) => {
                        log::error!("failed to process {}: {}", path.display(), error);
                        acc.failures.push(FileFailure {
                            path: path.clone(),
                            error,
                        });
                    }
                }
                acc
            })
            .reduce(DispatchReport::default, merge_partial_reports)
    });

    Ok(report)
}

/// Merges two partial reports from different workers.
fn merge_partial_reports<T>(mut a: DispatchReport<T>, mut b: DispatchReport<T>) -> DispatchReport<T> {
    a.completed.append(&mut b.completed);
    a.failures.append(&mut b.failures);
    a
}
