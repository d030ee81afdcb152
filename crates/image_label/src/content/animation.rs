use std::time::Duration;

use image::RgbaImage;

use super::Intrinsic;

#[derive(Clone, Debug)]
pub struct AnimationFrame {
    pub image: RgbaImage,
    /// How long the frame stays on screen. Zero when the source carries no timing.
    pub delay: Duration,
}

/// Decoded frames plus the playback position within them.
#[derive(Debug)]
pub struct AnimatedSequence {
    frames: Vec<AnimationFrame>,
    current_frame_index: usize,
    pub(crate) intrinsic: Intrinsic,
}

impl AnimatedSequence {
    /// Callers guarantee at least one frame, all sized like `intrinsic`.
    pub(crate) fn new(frames: Vec<AnimationFrame>, intrinsic: Intrinsic) -> Self {
        debug_assert!(!frames.is_empty());
        Self { frames, current_frame_index: 0, intrinsic }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[AnimationFrame] {
        &self.frames
    }

    pub fn current_frame_index(&self) -> usize {
        self.current_frame_index
    }

    pub fn current_frame(&self) -> &RgbaImage {
        &self.frames[self.current_frame_index].image
    }

    /// Delay of the current frame, substituting `fallback` for frames without timing.
    pub fn current_delay(&self, fallback: Duration) -> Duration {
        let delay = self.frames[self.current_frame_index].delay;
        if delay.is_zero() {
            fallback
        } else {
            delay
        }
    }

    /// Step to the next frame, wrapping around at the end.
    pub(crate) fn advance(&mut self) -> usize {
        if self.frames.len() > 1 {
            self.current_frame_index = (self.current_frame_index + 1) % self.frames.len();
        }
        self.current_frame_index
    }
}
