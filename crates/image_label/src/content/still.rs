use image::RgbaImage;

use super::Intrinsic;

/// Single decoded raster.
#[derive(Debug)]
pub struct StaticImage {
    raster: RgbaImage,
    pub(crate) intrinsic: Intrinsic,
}

impl StaticImage {
    pub(crate) fn new(raster: RgbaImage, intrinsic: Intrinsic) -> Self {
        Self { raster, intrinsic }
    }

    pub fn raster(&self) -> &RgbaImage {
        &self.raster
    }
}
