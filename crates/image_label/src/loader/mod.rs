pub mod frames;

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::{fmt, fs, io};

use log::{debug, warn};

use crate::content::animation::AnimatedSequence;
use crate::content::still::StaticImage;
use crate::content::{Content, Intrinsic};
use crate::geometry::size::PixelSize;
use crate::{DecodeFailure, LoadError};

use frames::{FrameSource, ImageFrames};

/// Where content is read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Memory(Vec<u8>),
}

impl Source {
    fn read(&self) -> io::Result<Cow<'_, [u8]>> {
        match self {
            Source::Path(path) => fs::read(path).map(Cow::Owned),
            Source::Memory(bytes) => Ok(Cow::Borrowed(bytes)),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Path(path) => write!(f, "{}", path.display()),
            Source::Memory(bytes) => write!(f, "<{} bytes in memory>", bytes.len()),
        }
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Source::Path(path)
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Source::Path(path.to_path_buf())
    }
}

impl From<&str> for Source {
    fn from(path: &str) -> Self {
        Source::Path(PathBuf::from(path))
    }
}

impl From<Vec<u8>> for Source {
    fn from(bytes: Vec<u8>) -> Self {
        Source::Memory(bytes)
    }
}

impl From<&[u8]> for Source {
    fn from(bytes: &[u8]) -> Self {
        Source::Memory(bytes.to_vec())
    }
}

/// Turns sources into [`Content`], deciding between a static image and an animation.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResourceLoader;

impl ResourceLoader {
    pub fn load(&self, source: impl Into<Source>) -> Result<Content, LoadError> {
        let source = source.into();
        let bytes = source.read().map_err(|err| LoadError::decode(&source, err))?;
        if bytes.is_empty() {
            return Err(LoadError::decode(&source, DecodeFailure::NoFrames));
        }

        let frames =
            ImageFrames::decode(&bytes).map_err(|err| LoadError::from_image(&source, err))?;
        self.load_from(&source, frames)
    }

    /// Classify the frames of any decoder.
    ///
    /// The first frame fixes the content's size. More than one frame makes an animation;
    /// later frames of a different size are skipped and a decode failure past the first
    /// frame ends the animation with the frames read so far.
    pub fn load_from<F: FrameSource>(
        &self,
        origin: impl fmt::Display,
        mut frames: F,
    ) -> Result<Content, LoadError> {
        let count = frames.frame_count();
        if count == 0 {
            return Err(LoadError::decode(&origin, DecodeFailure::NoFrames));
        }

        let first = match frames.next_frame() {
            None => return Err(LoadError::decode(&origin, DecodeFailure::NoFrames)),
            Some(Err(err)) => return Err(LoadError::from_image(&origin, err)),
            Some(Ok(frame)) => frame,
        };

        let Some(intrinsic) = Intrinsic::of(&first.image) else {
            return Err(LoadError::decode(&origin, DecodeFailure::ZeroArea));
        };

        if count == 1 {
            debug!("loaded static image {} from {origin}", intrinsic.size);
            return Ok(Content::Static(StaticImage::new(first.image, intrinsic)));
        }

        let mut sequence = Vec::with_capacity(count);
        sequence.push(first);
        while let Some(frame) = frames.next_frame() {
            match frame {
                Ok(frame) if PixelSize::from(frame.image.dimensions()) == intrinsic.size => {
                    sequence.push(frame);
                },
                Ok(frame) => {
                    let (width, height) = frame.image.dimensions();
                    warn!(
                        "skipping {width}x{height} frame in {origin}, expected {}",
                        intrinsic.size
                    );
                },
                Err(err) => {
                    warn!("keeping the first {} frames of {origin}: {err}", sequence.len());
                    break;
                },
            }
        }

        if sequence.len() < 2 {
            debug!("only one usable frame in {origin}, treating it as a static image");
            let frame = sequence.swap_remove(0);
            return Ok(Content::Static(StaticImage::new(frame.image, intrinsic)));
        }

        debug!("loaded {} frame animation {} from {origin}", sequence.len(), intrinsic.size);
        Ok(Content::Animated(AnimatedSequence::new(sequence, intrinsic)))
    }
}
