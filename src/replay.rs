//! Crops every schema region out of its page image for visual inspection.

use std::fs;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use tracing::info;

use crate::error::{Result, SchemaError};
use crate::imaging::PageImages;
use crate::paths;
use crate::schema::FieldRecord;

pub const DEFAULT_FOLDERS: [&str; 3] = ["OCR_WORD", "OCR_CHAR", "CHECKBOX"];

#[derive(Debug, Clone, Default)]
pub struct ReplayReport {
    pub crops: Vec<PathBuf>,
}

/// Creates `output_dir` and the per-type folders, then empties every
/// sub-folder so crops from an earlier run do not linger.
pub fn prepare_output_dir(output_dir: &Path, folders: &[String]) -> Result<()> {
    for folder in folders {
        let dir = output_dir.join(folder);
        fs::create_dir_all(&dir).map_err(|source| SchemaError::io(&dir, source))?;
    }
    fs::create_dir_all(output_dir).map_err(|source| SchemaError::io(output_dir, source))?;

    let entries = fs::read_dir(output_dir).map_err(|source| SchemaError::io(output_dir, source))?;
    for entry in entries {
        let entry = entry.map_err(|source| SchemaError::io(output_dir, source))?;
        let folder = entry.path();
        if !folder.is_dir() {
            continue;
        }
        let files = fs::read_dir(&folder).map_err(|source| SchemaError::io(&folder, source))?;
        for file in files {
            let file = file.map_err(|source| SchemaError::io(&folder, source))?.path();
            if file.is_file() {
                fs::remove_file(&file).map_err(|source| SchemaError::io(&file, source))?;
            }
        }
    }
    Ok(())
}

/// Saves one JPEG per region as `<output>/<type>/<name>_<index>.jpg`.
pub fn replay_schema(
    fields: &[FieldRecord],
    pages: &mut PageImages,
    output_dir: &Path,
) -> Result<ReplayReport> {
    let mut report = ReplayReport::default();
    for field in fields {
        if field.regions.is_empty() {
            continue;
        }
        let type_dir = output_dir.join(&field.field_type);
        fs::create_dir_all(&type_dir).map_err(|source| SchemaError::io(&type_dir, source))?;

        let image = pages.get(&field.page_number)?;
        for region in &field.regions {
            let rect = region.region;
            rect.checked_within(image.width(), image.height())?;
            let cropped = image.crop_imm(rect.left, rect.top, rect.width, rect.height);
            let path = paths::crop_path(output_dir, &field.field_type, &field.name, region.index);
            DynamicImage::ImageRgb8(cropped.to_rgb8())
                .save(&path)
                .map_err(|source| SchemaError::ImageWrite {
                    path: path.clone(),
                    source,
                })?;
            report.crops.push(path);
        }
    }
    info!(
        "replay: wrote {} crops to {}",
        report.crops.len(),
        output_dir.display()
    );
    Ok(report)
}
