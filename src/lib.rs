// src/lib.rs
pub mod types;
pub mod error;
pub mod config;
pub mod fasta;
pub mod kmer;
pub mod gaf;
pub mod npy;
pub mod store;
pub mod dispatch;
pub mod pipeline;

pub use crate::config::{Config, ShortReadPolicy};
pub use crate::error::{Read2ArrayError, Result};
pub use crate::gaf::GafMethod;
pub use crate::kmer::KmerCache;
pub use crate::pipeline::{run, run_pipeline, FileSummary, RunReport};
pub use crate::store::{ImageStore, MemoryStore, NpyStore};
pub use crate::types::{Image, Read, Series};

/// Turns one read into its image, threading the file's k-mer cache through.
///
/// Returns `None` for a read shorter than `k`, with the cache unchanged.
pub fn read_to_image(
    read: &[u8],
    k: usize,
    method: GafMethod,
    cache: KmerCache,
) -> Result<(Option<Image>, KmerCache)> {
    if k == 0 || read.len() < k {
        return Ok((None, cache));
    }
    let (series, cache) = kmer::encode(read, k, cache)?;
    Ok((Some(gaf::transform_with(&series, method)), cache))
}
