use std::path::{Path, PathBuf};

const SCHEMA_SUFFIX: &str = "-schema.json";

/// `<pages_dir>/<page_number>.<extension>`
pub(crate) fn page_image_path(pages_dir: &Path, page_number: &str, extension: &str) -> PathBuf {
    let extension = extension.trim_start_matches('.');
    pages_dir.join(format!("{}.{}", page_number.trim(), extension))
}

/// `<schemas_dir>/<application>-schema.json`
pub fn schema_path(schemas_dir: &Path, application: &str) -> PathBuf {
    schemas_dir.join(format!("{}{}", application, SCHEMA_SUFFIX))
}

/// `<output_dir>/<field_type>/<field_name>_<index>.jpg`
pub(crate) fn crop_path(
    output_dir: &Path,
    field_type: &str,
    field_name: &str,
    index: usize,
) -> PathBuf {
    output_dir
        .join(field_type)
        .join(format!("{}_{}.jpg", field_name, index))
}
