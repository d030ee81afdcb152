mod content;
mod geometry;
mod loader;
mod surface;
#[cfg(test)]
mod testing;

use std::fmt;
use std::time::Duration;

use image::imageops::FilterType;

pub use content::{
    animation::{AnimatedSequence, AnimationFrame},
    still::StaticImage,
    Content, ContentKind,
};
pub use geometry::{
    fit::{fit, should_refit},
    size::{PixelSize, Placement, Size},
};
pub use loader::{
    frames::{FrameSource, ImageFrames},
    ResourceLoader, Source,
};
pub use surface::{
    sink::{CanvasSink, RenderSink},
    timer::{FrameTimer, ManualTimer},
    DisplaySurface,
};

/// Delay used for animation frames that carry no timing information.
pub const FALLBACK_FRAME_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to decode {origin}: {reason}")]
    Decode {
        origin: String,
        #[source]
        reason: DecodeFailure,
    },
    #[error("unsupported image data in {origin}: {source}")]
    UnsupportedFormat { origin: String, source: image::ImageError },
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeFailure {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("no decodable frames")]
    NoFrames,
    #[error("first frame has zero width or height")]
    ZeroArea,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Decode,
    UnsupportedFormat,
}

impl LoadError {
    pub(crate) fn decode(origin: impl fmt::Display, reason: impl Into<DecodeFailure>) -> Self {
        Self::Decode { origin: origin.to_string(), reason: reason.into() }
    }

    /// Classify an error reported by the `image` crate.
    ///
    /// I/O failures mean the source could not be read; everything else means the decoder
    /// refused the data.
    pub(crate) fn from_image(origin: impl fmt::Display, err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(err) => Self::decode(origin, err),
            source => Self::UnsupportedFormat { origin: origin.to_string(), source },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Decode { .. } => ErrorKind::Decode,
            Self::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
        }
    }

    /// Description of the source that failed to load.
    pub fn origin(&self) -> &str {
        match self {
            Self::Decode { origin, .. } | Self::UnsupportedFormat { origin, .. } => origin,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct LabelOptions {
    /// Resampling filter used when scaling content to its fitted size.
    pub filter: FilterType,
    /// Delay used for animation frames with a zero delay.
    pub fallback_frame_delay: Duration,
}

impl Default for LabelOptions {
    fn default() -> Self {
        Self { filter: FilterType::CatmullRom, fallback_frame_delay: FALLBACK_FRAME_DELAY }
    }
}
