pub mod animation;
pub mod still;

use std::fmt;

use image::RgbaImage;

use crate::geometry::size::PixelSize;

use animation::AnimatedSequence;
use still::StaticImage;

/// Decoded image or animation, independent of how it is currently scaled.
#[derive(Debug)]
pub enum Content {
    Static(StaticImage),
    Animated(AnimatedSequence),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentKind {
    Static,
    Animated,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Static => f.write_str("static image"),
            ContentKind::Animated => f.write_str("animation"),
        }
    }
}

impl Content {
    pub fn kind(&self) -> ContentKind {
        match self {
            Content::Static(_) => ContentKind::Static,
            Content::Animated(_) => ContentKind::Animated,
        }
    }

    /// Unscaled size, taken from the first frame.
    pub fn original_size(&self) -> PixelSize {
        self.intrinsic().size
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.intrinsic().aspect
    }

    pub fn frame_count(&self) -> usize {
        match self {
            Content::Static(_) => 1,
            Content::Animated(sequence) => sequence.frame_count(),
        }
    }

    /// Raster that is currently on display, at its original size.
    pub fn current_frame(&self) -> &RgbaImage {
        match self {
            Content::Static(image) => image.raster(),
            Content::Animated(sequence) => sequence.current_frame(),
        }
    }

    fn intrinsic(&self) -> Intrinsic {
        match self {
            Content::Static(image) => image.intrinsic,
            Content::Animated(sequence) => sequence.intrinsic,
        }
    }
}

/// Size and proportions fixed when content is loaded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Intrinsic {
    pub size: PixelSize,
    pub aspect: f64,
}

impl Intrinsic {
    pub fn of(raster: &RgbaImage) -> Option<Self> {
        let size = PixelSize::from(raster.dimensions());
        if size.is_empty() {
            return None;
        }

        Some(Self { size, aspect: f64::from(size.width) / f64::from(size.height) })
    }
}
