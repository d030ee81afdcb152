use std::collections::VecDeque;
use std::io::Cursor;
use std::time::Duration;

use image::codecs::gif::GifDecoder;
use image::codecs::png::PngDecoder;
use image::codecs::webp::WebPDecoder;
use image::{AnimationDecoder, Frames, ImageError, ImageFormat, ImageResult};
use log::debug;

use crate::content::animation::AnimationFrame;

/// Decoder capability the loader classifies content with.
pub trait FrameSource {
    /// Number of frames that decoded successfully.
    fn frame_count(&self) -> usize;

    /// Next frame in display order, or `None` once the source is exhausted.
    fn next_frame(&mut self) -> Option<ImageResult<AnimationFrame>>;
}

/// Frames decoded with the `image` crate.
///
/// GIF, APNG and animated WebP data go through the animation decoders, with every frame
/// composited onto the full canvas. Everything else decodes to a single frame.
pub struct ImageFrames {
    frames: VecDeque<AnimationFrame>,
    trailing_error: Option<ImageError>,
}

impl ImageFrames {
    pub fn decode(bytes: &[u8]) -> ImageResult<Self> {
        match image::guess_format(bytes)? {
            ImageFormat::Gif => {
                let decoder = GifDecoder::new(Cursor::new(bytes))?;
                Self::collect("GIF", decoder.into_frames())
            },
            ImageFormat::Png => {
                let decoder = PngDecoder::new(Cursor::new(bytes))?;
                if decoder.is_apng() {
                    Self::collect("APNG", decoder.apng().into_frames())
                } else {
                    Self::single(bytes, ImageFormat::Png)
                }
            },
            ImageFormat::WebP => {
                let decoder = WebPDecoder::new(Cursor::new(bytes))?;
                if decoder.has_animation() {
                    Self::collect("WebP", decoder.into_frames())
                } else {
                    Self::single(bytes, ImageFormat::WebP)
                }
            },
            format => Self::single(bytes, format),
        }
    }

    fn single(bytes: &[u8], format: ImageFormat) -> ImageResult<Self> {
        let image = image::load_from_memory_with_format(bytes, format)?;
        let frame = AnimationFrame { image: image.into_rgba8(), delay: Duration::ZERO };
        Ok(Self { frames: VecDeque::from([frame]), trailing_error: None })
    }

    fn collect(format: &str, decoded: Frames<'_>) -> ImageResult<Self> {
        let mut frames = VecDeque::new();
        let mut trailing_error = None;

        for frame in decoded {
            match frame {
                Ok(frame) => {
                    let delay = Duration::from(frame.delay());
                    frames.push_back(AnimationFrame { image: frame.into_buffer(), delay });
                },
                Err(err) if frames.is_empty() => return Err(err),
                Err(err) => {
                    trailing_error = Some(err);
                    break;
                },
            }
        }

        debug!("decoded {} {format} frames", frames.len());
        Ok(Self { frames, trailing_error })
    }
}

impl FrameSource for ImageFrames {
    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn next_frame(&mut self) -> Option<ImageResult<AnimationFrame>> {
        match self.frames.pop_front() {
            Some(frame) => Some(Ok(frame)),
            None => self.trailing_error.take().map(Err),
        }
    }
}
