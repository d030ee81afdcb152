use std::fmt;

/// Logical size of a container or of fitted content.
///
/// Fitting is done in floating point so that it is exact; whole pixels are only produced
/// when a frame is presented, see [`Size::to_pixels`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Size = Size { width: 0.0, height: 0.0 };

    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether this size covers no area. NaN dimensions count as empty.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.width / self.height)
        }
    }

    /// Round to whole pixels, half away from zero.
    pub fn to_pixels(self) -> PixelSize {
        PixelSize::new(round_pixels(self.width), round_pixels(self.height))
    }
}

impl From<PixelSize> for Size {
    fn from(size: PixelSize) -> Self {
        Self::new(f64::from(size.width), f64::from(size.height))
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        PixelSize::new(width, height).into()
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}x{:.2}", self.width, self.height)
    }
}

fn round_pixels(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

/// Dimensions of a raster in whole pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl From<(u32, u32)> for PixelSize {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width, height)
    }
}

impl fmt::Display for PixelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Pixel rectangle a rendered frame occupies inside its container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Placement {
    pub container: PixelSize,
    pub x: u32,
    pub y: u32,
    pub size: PixelSize,
}

impl Placement {
    /// Center `rendered` inside `container`, leaving letterbox or pillarbox bars.
    pub fn centered(container: Size, rendered: Size) -> Self {
        let container = container.to_pixels();
        let size = rendered.to_pixels();
        Self {
            container,
            x: container.width.saturating_sub(size.width) / 2,
            y: container.height.saturating_sub(size.height) / 2,
            size,
        }
    }
}
