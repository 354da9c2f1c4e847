use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageReader};
use tracing::debug;

use crate::error::{Result, SchemaError};
use crate::paths;

/// Decoded page images for one application, keyed by page number.
///
/// Each page is decoded on first use and kept until the cache is dropped,
/// which happens when the compile or replay call that owns it returns.
#[derive(Debug)]
pub struct PageImages {
    pages_dir: PathBuf,
    extension: String,
    cache: HashMap<String, DynamicImage>,
}

impl PageImages {
    pub fn new(base_dir: &Path, application: &str, extension: &str) -> Self {
        Self {
            pages_dir: base_dir.join(application),
            extension: extension.to_string(),
            cache: HashMap::new(),
        }
    }

    pub fn path_for(&self, page_number: &str) -> PathBuf {
        paths::page_image_path(&self.pages_dir, page_number, &self.extension)
    }

    pub fn get(&mut self, page_number: &str) -> Result<&DynamicImage> {
        if !self.cache.contains_key(page_number) {
            let image = self.load(page_number)?;
            self.cache.insert(page_number.to_string(), image);
        }
        Ok(&self.cache[page_number])
    }

    pub fn loaded_pages(&self) -> usize {
        self.cache.len()
    }

    fn load(&self, page_number: &str) -> Result<DynamicImage> {
        let path = self.path_for(page_number);
        if !path.is_file() {
            return Err(SchemaError::MissingImageSource { path });
        }
        debug!("pages: decoding page {} ({})", page_number, path.display());
        let reader = ImageReader::open(&path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|source| SchemaError::io(&path, source))?;
        reader
            .decode()
            .map_err(|source| SchemaError::ImageDecode { path, source })
    }
}
