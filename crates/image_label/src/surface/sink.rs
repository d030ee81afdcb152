use image::imageops;
use image::{Rgba, RgbaImage};

use crate::geometry::size::Placement;

/// Receives frames that are ready for display.
pub trait RenderSink {
    /// Show `frame`, already scaled to `placement.size`, at its place in the container.
    fn present(&mut self, frame: &RgbaImage, placement: Placement);

    /// Remove whatever is currently shown.
    fn clear(&mut self);
}

/// Off-screen sink compositing frames onto a canvas the size of the container.
///
/// Letterbox and pillarbox bars stay transparent.
#[derive(Debug)]
pub struct CanvasSink {
    canvas: RgbaImage,
    presented: usize,
}

impl CanvasSink {
    pub fn new() -> Self {
        Self { canvas: RgbaImage::new(0, 0), presented: 0 }
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    /// Number of frames presented so far.
    pub fn presented(&self) -> usize {
        self.presented
    }
}

impl Default for CanvasSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSink for CanvasSink {
    fn present(&mut self, frame: &RgbaImage, placement: Placement) {
        let container = placement.container;
        if self.canvas.dimensions() == (container.width, container.height) {
            self.clear();
        } else {
            self.canvas = RgbaImage::new(container.width, container.height);
        }

        imageops::replace(&mut self.canvas, frame, i64::from(placement.x), i64::from(placement.y));
        self.presented += 1;
    }

    fn clear(&mut self) {
        for pixel in self.canvas.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }
}
