#[cfg(test)]
pub(crate) fn write_solid_page(
    base_dir: &std::path::Path,
    application: &str,
    page_number: &str,
    width: u32,
    height: u32,
    value: u8,
) -> std::path::PathBuf {
    let dir = base_dir.join(application);
    std::fs::create_dir_all(&dir).expect("create page dir");
    let path = dir.join(format!("{}.jpg", page_number));
    image::RgbImage::from_pixel(width, height, image::Rgb([value; 3]))
        .save(&path)
        .expect("write page image");
    path
}
