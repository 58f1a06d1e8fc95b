//src/error.rs

use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, Read2ArrayError>;

/// Every failure the read-to-image pipeline can report.
#[derive(thiserror::Error, Debug)]
pub enum Read2ArrayError {
    /// A sequence file could not be parsed.
    #[error("{}:{line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Invalid settings, colliding species names, or reads unusable with the chosen k.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Reading input or writing output failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A `.npy` payload did not match the layout we write.
    #[error("invalid npy data: {0}")]
    Npy(String),

    /// One file holds more distinct k-mers than a `u32` id can number.
    #[error("k-mer id space exhausted: more than 2^32 distinct k-mers in one file")]
    KmerIdsExhausted,
}

impl Read2ArrayError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn parse(path: impl AsRef<Path>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.as_ref().to_path_buf(),
            line,
            message: message.into(),
        }
    }
}
