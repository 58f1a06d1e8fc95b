//src/store.rs

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::{Read2ArrayError, Result};
use crate::npy::write_npy;
use crate::types::Image;

/// Extension of every image written by [`NpyStore`].
pub const IMAGE_EXTENSION: &str = "npy";

/// Output key of one read: `{species}_read-{read_index}`.
pub fn image_key(species: &str, read_index: usize) -> String {
    format!("{species}_read-{read_index}")
}

/// Destination for finished images.
///
/// Saving the same key twice overwrites silently. Workers call `save`
/// concurrently, but never with the same key within one run.
pub trait ImageStore: Send + Sync {
    fn save(&self, image: &Image, species: &str, read_index: usize) -> Result<()>;
}

/// Writes images as `.npy` files under `<root>/<species>/<key>.npy`.
#[derive(Debug, Clone)]
pub struct NpyStore {
    root: PathBuf,
}

impl NpyStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn species_dir(&self, species: &str) -> PathBuf {
        self.root.join(species)
    }

    pub fn path_for(&self, species: &str, read_index: usize) -> PathBuf {
        self.species_dir(species)
            .join(format!("{}.{IMAGE_EXTENSION}", image_key(species, read_index)))
    }
}

impl ImageStore for NpyStore {
    fn save(&self, image: &Image, species: &str, read_index: usize) -> Result<()> {
        let dir = self.species_dir(species);
        fs::create_dir_all(&dir).map_err(|e| Read2ArrayError::io(&dir, e))?;

        let path = self.path_for(species, read_index);
        // Write beside the target and rename, so readers never see a partial file.
        let tmp = dir.join(format!(".{}.tmp", image_key(species, read_index)));
        let file = File::create(&tmp).map_err(|e| Read2ArrayError::io(&tmp, e))?;
        if let Err(e) = write_npy(BufWriter::new(file), image) {
            let _ = fs::remove_file(&tmp);
            return Err(Read2ArrayError::io(&tmp, e));
        }
        fs::rename(&tmp, &path).map_err(|e| Read2ArrayError::io(&path, e))
    }
}

/// Keeps images in memory, keyed by [`image_key`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    images: Mutex<BTreeMap<String, Image>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Image> {
        self.images.lock().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.images.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.images.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.lock().is_empty()
    }
}

impl ImageStore for MemoryStore {
    fn save(&self, image: &Image, species: &str, read_index: usize) -> Result<()> {
        self.images
            .lock()
            .insert(image_key(species, read_index), image.clone());
        Ok(())
    }
}
