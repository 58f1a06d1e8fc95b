//src/config.rs

use std::path::PathBuf;

use crate::error::{Read2ArrayError, Result};
use crate::gaf::GafMethod;

pub const DEFAULT_KMER_LENGTH: usize = 50;
pub const DEFAULT_WORKERS: usize = 1;

/// What to do with a read shorter than the k-mer length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShortReadPolicy {
    /// Log a warning and write no image. The read still uses up its ordinal index.
    #[default]
    Skip,
    /// Fail the whole file.
    Error,
}

/// Settings for one pipeline run.
#[derive(Debug, Clone)]
pub struct Config {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub kmer_length: usize,
    pub workers: usize,
    pub method: GafMethod,
    pub short_reads: ShortReadPolicy,
}

impl Config {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(input_dir: P, output_dir: Q) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            kmer_length: DEFAULT_KMER_LENGTH,
            workers: DEFAULT_WORKERS,
            method: GafMethod::default(),
            short_reads: ShortReadPolicy::default(),
        }
    }

    pub fn with_kmer_length(mut self, kmer_length: usize) -> Self {
        self.kmer_length = kmer_length;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_method(mut self, method: GafMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_short_reads(mut self, policy: ShortReadPolicy) -> Self {
        self.short_reads = policy;
        self
    }

    /// Checks everything that can be known before touching any input file.
    pub fn validate(&self) -> Result<()> {
        if self.kmer_length == 0 {
            return Err(Read2ArrayError::Configuration(
                "kmer_length must be at least 1".to_string(),
            ));
        }
        if self.workers == 0 {
            return Err(Read2ArrayError::Configuration(
                "worker count must be at least 1".to_string(),
            ));
        }
        if !self.input_dir.is_dir() {
            return Err(Read2ArrayError::Configuration(format!(
                "input directory {} does not exist or is not a directory",
                self.input_dir.display()
            )));
        }
        Ok(())
    }
}
