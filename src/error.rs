use std::path::PathBuf;

use thiserror::Error;

use crate::imaging::Rect;

pub type Result<T> = std::result::Result<T, SchemaError>;

/// Fatal conditions that abort a compile or replay.
///
/// Malformed region lines are not listed here: they are reported as
/// [`crate::schema::Diagnostic`]s and parsing continues.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("line {line}: malformed field header ({reason}): {raw}")]
    MalformedFieldHeader {
        line: usize,
        raw: String,
        reason: &'static str,
    },

    #[error("invalid region {rect:?} for a {image_width}x{image_height} image")]
    InvalidRegion {
        rect: Rect,
        image_width: u32,
        image_height: u32,
    },

    #[error("page image not found: {}", path.display())]
    MissingImageSource { path: PathBuf },

    #[error("failed to decode page image {}: {source}", path.display())]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to write {}: {source}", path.display())]
    ImageWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchemaError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SchemaError::Io {
            path: path.into(),
            source,
        }
    }
}
