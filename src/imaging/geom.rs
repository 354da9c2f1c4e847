use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};

/// Pixel rectangle on a page image.
///
/// Serialized as `[left, top, width, height]`, the layout used by schema
/// documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u32; 4]", into = "[u32; 4]")]
pub struct Rect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn fits_within(&self, image_width: u32, image_height: u32) -> bool {
        let right = u64::from(self.left) + u64::from(self.width);
        let bottom = u64::from(self.top) + u64::from(self.height);
        right <= u64::from(image_width) && bottom <= u64::from(image_height)
    }

    /// Fails with `InvalidRegion` unless the rectangle is non-empty and lies
    /// fully inside an image of the given size.
    pub fn checked_within(&self, image_width: u32, image_height: u32) -> Result<()> {
        if self.is_degenerate() || !self.fits_within(image_width, image_height) {
            return Err(SchemaError::InvalidRegion {
                rect: *self,
                image_width,
                image_height,
            });
        }
        Ok(())
    }
}

impl From<[u32; 4]> for Rect {
    fn from(value: [u32; 4]) -> Self {
        let [left, top, width, height] = value;
        Rect::new(left, top, width, height)
    }
}

impl From<Rect> for [u32; 4] {
    fn from(rect: Rect) -> Self {
        [rect.left, rect.top, rect.width, rect.height]
    }
}
