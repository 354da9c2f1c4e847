mod brightness;
mod geom;
mod pages;

pub use brightness::{average_brightness, luma_histogram, to_luma};
pub use geom::Rect;
pub use pages::PageImages;
