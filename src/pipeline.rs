//src/pipeline.rs

use ahash::AHashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{Config, ShortReadPolicy};
use crate::dispatch::{self, FileFailure};
use crate::error::{Read2ArrayError, Result};
use crate::fasta::open_fasta;
use crate::gaf::transform_with;
use crate::kmer::{encode, KmerCache};
use crate::store::{ImageStore, NpyStore};

/// Extensions recognised as FASTA input, optionally followed by `.gz`.
pub const READ_FILE_EXTENSIONS: &[&str] = &["fa", "fasta", "fna"];

/// Reads between two progress lines within one file.
pub const PROGRESS_INTERVAL: usize = 5000;

/// What happened to one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub path: PathBuf,
    pub species: String,
    /// Records seen, including skipped ones.
    pub reads: usize,
    pub images: usize,
    pub skipped: usize,
}

/// Outcome of a whole run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub files: Vec<FileSummary>,
    pub failures: Vec<FileFailure>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn images_written(&self) -> usize {
        self.files.iter().map(|f| f.images).sum()
    }
}

/// Species of a read file: its file name up to the first `.`.
pub fn species_name<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            Read2ArrayError::Configuration(format!("{} has no usable file name", path.display()))
        })?;

    match name.split('.').next() {
        Some(species) if !species.is_empty() => Ok(species.to_string()),
        _ => Err(Read2ArrayError::Configuration(format!(
            "cannot derive a species name from {}",
            path.display()
        ))),
    }
}

/// True for `*.fa`, `*.fasta`, `*.fna` and their `.gz` variants.
pub fn is_read_file(path: &Path) -> bool {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(n) => n.to_lowercase(),
        None => return false,
    };
    let name = name.strip_suffix(".gz").unwrap_or(&name);
    READ_FILE_EXTENSIONS
        .iter()
        .any(|ext| name.strip_suffix(ext).is_some_and(|stem| stem.ends_with('.')))
}

/// Lists the read files directly inside `dir`, sorted by name.
pub fn discover_read_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|e| Read2ArrayError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| Read2ArrayError::io(dir, e))?.path();
        if path.is_file() && is_read_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Pairs each file with its species, failing if two files share one.
pub fn assign_species(files: &[PathBuf]) -> Result<Vec<(PathBuf, String)>> {
    let mut seen: AHashMap<String, &PathBuf> = AHashMap::with_capacity(files.len());
    let mut assigned = Vec::with_capacity(files.len());

    for path in files {
        let species = species_name(path)?;
        if let Some(previous) = seen.insert(species.clone(), path) {
            return Err(Read2ArrayError::Configuration(format!(
                "{} and {} both map to species '{}'",
                previous.display(),
                path.display(),
                species
            )));
        }
        assigned.push((path.clone(), species));
    }
    Ok(assigned)
}

/// True when `reads_seen` records, skipped ones included, call for a progress line.
fn at_progress_point(reads_seen: usize) -> bool {
    reads_seen > 0 && reads_seen % PROGRESS_INTERVAL == 0
}

/// Encodes every read of one file and saves its image.
///
/// A fresh k-mer cache is created here and dropped when the file is done.
/// Reads are handled in file order; the ordinal index names the output.
pub fn process_file<S: ImageStore + ?Sized>(
    path: &Path,
    species: &str,
    config: &Config,
    store: &S,
) -> Result<FileSummary> {
    let k = config.kmer_length;
    let mut cache = KmerCache::new();
    let mut summary = FileSummary {
        path: path.to_path_buf(),
        species: species.to_string(),
        reads: 0,
        images: 0,
        skipped: 0,
    };

    for (index, record) in open_fasta(path)?.enumerate() {
        let read = record?;
        summary.reads += 1;
        if at_progress_point(summary.reads) {
            log::info!("processed {} reads in {}", summary.reads, species);
        }

        if read.len() < k {
            match config.short_reads {
                ShortReadPolicy::Skip => {
                    log::warn!(
                        "skipping read {} ({}) in {}: {} bases is shorter than k = {}",
                        index,
                        read.id,
                        path.display(),
                        read.len(),
                        k
                    );
                    summary.skipped += 1;
                    continue;
                }
                ShortReadPolicy::Error => {
                    return Err(Read2ArrayError::Configuration(format!(
                        "read {} ({}) in {} has {} bases, shorter than k = {}",
                        index,
                        read.id,
                        path.display(),
                        read.len(),
                        k
                    )));
                }
            }
        }

        let (series, updated) = encode(&read.seq, k, cache)?;
        cache = updated;

        let image = transform_with(&series, config.method);
        store.save(&image, species, index)?;
        summary.images += 1;
    }

    if summary.reads == 0 {
        log::warn!("no reads found in {}", path.display());
    } else if summary.images == 0 {
        return Err(Read2ArrayError::Configuration(format!(
            "every read in {} is shorter than k = {}",
            path.display(),
            k
        )));
    }

    log::debug!(
        "{}: {} images, {} distinct k-mers",
        species,
        summary.images,
        cache.len()
    );
    Ok(summary)
}

/// Runs the whole pipeline over `config.input_dir`, saving through `store`.
///
/// Configuration problems, species collisions included, fail before any file
/// is read. After that, per-file errors are collected in the report.
pub fn run_pipeline<S: ImageStore + ?Sized>(config: &Config, store: &S) -> Result<RunReport> {
    config.validate()?;

    let files = discover_read_files(&config.input_dir)?;
    let assigned = assign_species(&files)?;
    let species_of: AHashMap<PathBuf, String> = assigned.into_iter().collect();

    if files.is_empty() {
        log::info!("no read files found in {}", config.input_dir.display());
        return Ok(RunReport::default());
    }

    log::info!(
        "processing {} read files with k = {} on {} workers",
        files.len(),
        config.kmer_length,
        config.workers
    );

    let report = dispatch::run(&files, config.workers, |path| {
        let species = species_of
            .get(path)
            .ok_or_else(|| Read2ArrayError::Configuration(format!("unknown file {}", path.display())))?;
        let summary = process_file(path, species, config, store)?;
        log::info!(
            "finished {}: {} images, {} reads skipped",
            species,
            summary.images,
            summary.skipped
        );
        Ok(summary)
    })?;

    Ok(RunReport {
        files: report.completed.into_iter().map(|(_, summary)| summary).collect(),
        failures: report.failures,
    })
}

/// Runs the pipeline writing `.npy` images under `config.output_dir`.
pub fn run(config: &Config) -> Result<RunReport> {
    let store = NpyStore::new(&config.output_dir);
    run_pipeline(config, &store)
}
