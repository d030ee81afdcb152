pub mod sink;
pub mod timer;

use image::imageops;
use image::RgbaImage;
use log::{debug, trace};

use crate::content::Content;
use crate::geometry::fit::{fit, should_refit};
use crate::geometry::size::{Placement, Size};
use crate::loader::{ResourceLoader, Source};
use crate::{LabelOptions, LoadError};

use sink::RenderSink;
use timer::FrameTimer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Presentation {
    /// Scale into the current container.
    Fit,
    /// Resize the container to the content at 1:1.
    Natural,
}

/// Last resampled frame, reused while neither the frame nor its pixel size changes.
struct ScaledFrame {
    index: usize,
    image: RgbaImage,
}

impl ScaledFrame {
    fn shows(&self, index: usize, width: u32, height: u32) -> bool {
        self.index == index && self.image.dimensions() == (width, height)
    }
}

/// Container that owns the displayed content and keeps it fitted to its size.
pub struct DisplaySurface<S: RenderSink, T: FrameTimer> {
    sink: S,
    timer: T,
    loader: ResourceLoader,
    options: LabelOptions,
    content: Option<Content>,
    container: Size,
    rendered: Size,
    scaled: Option<ScaledFrame>,
}

impl<S: RenderSink, T: FrameTimer> DisplaySurface<S, T> {
    pub fn new(sink: S, timer: T, container: Size) -> Self {
        Self::with_options(sink, timer, container, LabelOptions::default())
    }

    pub fn with_options(sink: S, timer: T, container: Size, options: LabelOptions) -> Self {
        Self {
            sink,
            timer,
            loader: ResourceLoader,
            options,
            content: None,
            container,
            rendered: Size::ZERO,
            scaled: None,
        }
    }

    /// Load `source` and display it.
    ///
    /// With `adapt_size` the content is fitted into the current container, otherwise the
    /// container takes the content's natural size. A failed load leaves the surface exactly
    /// as it was.
    pub fn load(&mut self, source: impl Into<Source>, adapt_size: bool) -> Result<(), LoadError> {
        let content = self.loader.load(source)?;
        let presentation = if adapt_size { Presentation::Fit } else { Presentation::Natural };
        self.install(content, presentation);
        Ok(())
    }

    /// Replace the current content, fitting it into the container.
    pub fn set_content(&mut self, content: Content) {
        self.install(content, Presentation::Fit);
    }

    /// Commit a loader result, keeping the current content when it is an error.
    pub fn try_set_content(
        &mut self,
        content: Result<Content, LoadError>,
    ) -> Result<(), LoadError> {
        match content {
            Ok(content) => {
                self.set_content(content);
                Ok(())
            },
            Err(err) => {
                debug!("keeping current content after failed load: {err}");
                Err(err)
            },
        }
    }

    /// Container resize notification from the windowing layer.
    ///
    /// Content is only fitted again when the resize affects its bounding side. It is still
    /// presented again whenever its placement in the container moves.
    pub fn on_resize(&mut self, size: Size) {
        let previous = self.placement();
        self.container = size;

        let Some(content) = &self.content else {
            return;
        };

        if should_refit(self.rendered, size) {
            self.rendered = fit(content.aspect_ratio(), size);
            debug!("refit {} to {} in {size}", content.kind(), self.rendered);
        } else {
            trace!("resize to {size} keeps fit {}", self.rendered);
        }

        if self.placement() != previous {
            self.render();
        }
    }

    /// Resize the container to the content's natural size and show it unscaled.
    pub fn adjust_to_content(&mut self) {
        let Some(content) = &self.content else {
            return;
        };

        let natural = Size::from(content.original_size());
        self.container = natural;
        self.rendered = natural;
        self.render();
    }

    /// Timer callback: advance the animation by one frame and schedule the next one.
    ///
    /// Returns `false` when there is nothing to animate.
    pub fn on_timer(&mut self) -> bool {
        let Some(Content::Animated(sequence)) = &mut self.content else {
            return false;
        };

        sequence.advance();
        let delay = sequence.current_delay(self.options.fallback_frame_delay);
        self.render();
        self.timer.schedule(delay);
        true
    }

    pub fn content(&self) -> Option<&Content> {
        self.content.as_ref()
    }

    pub fn container_size(&self) -> Size {
        self.container
    }

    pub fn rendered_size(&self) -> Size {
        self.rendered
    }

    /// Where the current content sits inside the container.
    pub fn placement(&self) -> Placement {
        Placement::centered(self.container, self.rendered)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    fn install(&mut self, content: Content, presentation: Presentation) {
        self.release();

        self.rendered = match presentation {
            Presentation::Fit => fit(content.aspect_ratio(), self.container),
            Presentation::Natural => {
                self.container = Size::from(content.original_size());
                self.container
            },
        };
        debug!(
            "showing {} {} at {} in {}",
            content.kind(),
            content.original_size(),
            self.rendered,
            self.container
        );
        self.content = Some(content);

        self.render();
        self.start_playback();
    }

    fn release(&mut self) {
        self.timer.cancel();
        self.content = None;
        self.scaled = None;
    }

    /// Schedule the first frame advance. Only called once frame 0 is on screen.
    fn start_playback(&mut self) {
        if let Some(Content::Animated(sequence)) = &self.content {
            if sequence.frame_count() > 1 {
                self.timer.schedule(sequence.current_delay(self.options.fallback_frame_delay));
            }
        }
    }

    fn render(&mut self) {
        let Some(content) = &self.content else {
            self.sink.clear();
            return;
        };

        let placement = Placement::centered(self.container, self.rendered);
        if placement.size.is_empty() {
            self.sink.clear();
            return;
        }

        let (raster, index) = match content {
            Content::Static(image) => (image.raster(), 0),
            Content::Animated(sequence) => {
                (sequence.current_frame(), sequence.current_frame_index())
            },
        };

        let (width, height) = (placement.size.width, placement.size.height);
        if raster.dimensions() == (width, height) {
            self.sink.present(raster, placement);
            return;
        }

        let scaled = match self.scaled.take() {
            Some(cached) if cached.shows(index, width, height) => cached,
            _ => ScaledFrame {
                index,
                image: imageops::resize(raster, width, height, self.options.filter),
            },
        };
        self.sink.present(&scaled.image, placement);
        self.scaled = Some(scaled);
    }
}

impl<S: RenderSink, T: FrameTimer> Drop for DisplaySurface<S, T> {
    fn drop(&mut self) {
        self.timer.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    use super::timer::ManualTimer;
    use super::*;
    use crate::content::ContentKind;
    use crate::geometry::size::PixelSize;
    use crate::testing::{gif_bytes, png_bytes};
    use crate::ErrorKind;

    #[derive(Default)]
    struct RecordingSink {
        presented: Vec<(PixelSize, Placement)>,
        clears: usize,
    }

    impl RenderSink for RecordingSink {
        fn present(&mut self, frame: &RgbaImage, placement: Placement) {
            self.presented.push((PixelSize::from(frame.dimensions()), placement));
        }

        fn clear(&mut self) {
            self.clears += 1;
        }
    }

    /// Timer whose state outlives the surface owning it.
    #[derive(Clone, Default)]
    struct SharedTimer(Rc<Cell<Option<Duration>>>);

    impl FrameTimer for SharedTimer {
        fn schedule(&mut self, delay: Duration) {
            self.0.set(Some(delay));
        }

        fn cancel(&mut self) {
            self.0.set(None);
        }
    }

    fn surface(width: f64, height: f64) -> DisplaySurface<RecordingSink, ManualTimer> {
        DisplaySurface::new(RecordingSink::default(), ManualTimer::new(), Size::new(width, height))
    }

    fn frame_index<S: RenderSink, T: FrameTimer>(surface: &DisplaySurface<S, T>) -> usize {
        match surface.content() {
            Some(Content::Animated(sequence)) => sequence.current_frame_index(),
            _ => panic!("surface is not showing an animation"),
        }
    }

    fn last_presented(
        surface: &DisplaySurface<RecordingSink, ManualTimer>,
    ) -> (PixelSize, Placement) {
        *surface.sink().presented.last().expect("nothing presented")
    }

    #[test]
    fn fits_static_content_into_the_container() {
        let mut surface = surface(800.0, 600.0);
        surface.load(png_bytes(160, 90), true).unwrap();

        assert_eq!(surface.content().map(Content::kind), Some(ContentKind::Static));
        assert_eq!(surface.rendered_size(), Size::new(800.0, 450.0));
        let (frame, placement) = last_presented(&surface);
        assert_eq!(frame, PixelSize::new(800, 450));
        assert_eq!((placement.x, placement.y), (0, 75));
        assert_eq!(surface.timer().pending(), None);
        assert!(!surface.on_timer());
    }

    #[test]
    fn natural_size_load_resizes_the_container() {
        let mut surface = surface(800.0, 600.0);
        surface.load(png_bytes(40, 30), false).unwrap();

        assert_eq!(surface.container_size(), Size::new(40.0, 30.0));
        assert_eq!(surface.rendered_size(), Size::new(40.0, 30.0));
        let (frame, placement) = last_presented(&surface);
        assert_eq!(frame, PixelSize::new(40, 30));
        assert_eq!(placement.container, PixelSize::new(40, 30));
    }

    #[test]
    fn playback_starts_after_the_first_frame() {
        let mut surface = surface(800.0, 600.0);
        surface.load(gif_bytes(32, 18, 3, 50), true).unwrap();

        assert_eq!(surface.sink().presented.len(), 1);
        assert_eq!(frame_index(&surface), 0);
        assert_eq!(surface.timer().scheduled(), 1);
        assert_eq!(surface.timer().pending(), Some(Duration::from_millis(50)));

        for expected in [1, 2, 0] {
            assert!(surface.timer_mut().fire().is_some());
            assert!(surface.on_timer());
            assert_eq!(frame_index(&surface), expected);
            assert!(surface.timer().pending().is_some());
        }
        assert_eq!(surface.sink().presented.len(), 4);
        assert_eq!(last_presented(&surface).0, PixelSize::new(800, 450));
    }

    #[test]
    fn resize_keeps_the_playback_position() {
        let mut surface = surface(800.0, 600.0);
        surface.load(gif_bytes(32, 18, 3, 50), true).unwrap();
        surface.timer_mut().fire();
        surface.on_timer();

        surface.on_resize(Size::new(400.0, 600.0));
        assert_eq!(frame_index(&surface), 1);
        assert_eq!(surface.timer().pending(), Some(Duration::from_millis(50)));
        assert_eq!(surface.rendered_size(), Size::new(400.0, 225.0));
        assert_eq!(last_presented(&surface).0, PixelSize::new(400, 225));
    }

    #[test]
    fn failed_load_keeps_the_current_content() {
        let mut surface = surface(800.0, 600.0);
        surface.load(png_bytes(160, 90), true).unwrap();
        let rendered = surface.rendered_size();
        let presented = surface.sink().presented.len();

        let err = surface.load(&b"not an image"[..], true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);

        let dir = tempfile::tempdir().unwrap();
        let err = surface.load(dir.path().join("missing.gif"), false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);

        let err = surface.try_set_content(ResourceLoader.load(Vec::<u8>::new())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);

        let content = surface.content().unwrap();
        assert_eq!(content.original_size(), PixelSize::new(160, 90));
        assert_eq!(surface.rendered_size(), rendered);
        assert_eq!(surface.container_size(), Size::new(800.0, 600.0));
        assert_eq!(surface.sink().presented.len(), presented);
        assert_eq!(surface.sink().clears, 0);
    }

    #[test]
    fn failed_load_keeps_a_running_animation() {
        let mut surface = surface(800.0, 600.0);
        surface.load(gif_bytes(32, 18, 3, 50), true).unwrap();
        surface.timer_mut().fire();
        surface.on_timer();
        let scheduled = surface.timer().scheduled();
        let presented = surface.sink().presented.len();

        assert!(surface.load(&b"GIF89a but truncated"[..], true).is_err());
        assert!(surface.try_set_content(ResourceLoader.load(Vec::<u8>::new())).is_err());

        assert_eq!(frame_index(&surface), 1);
        assert_eq!(surface.timer().pending(), Some(Duration::from_millis(50)));
        assert_eq!(surface.timer().scheduled(), scheduled);
        assert_eq!(surface.rendered_size(), Size::new(800.0, 450.0));
        assert_eq!(surface.sink().presented.len(), presented);

        surface.timer_mut().fire();
        assert!(surface.on_timer());
        assert_eq!(frame_index(&surface), 2);
    }

    #[test]
    fn resize_along_the_free_dimension_keeps_an_animation_playing() {
        let mut surface = surface(800.0, 600.0);
        surface.load(gif_bytes(32, 18, 3, 50), true).unwrap();
        surface.timer_mut().fire();
        surface.on_timer();
        let scheduled = surface.timer().scheduled();

        surface.on_resize(Size::new(800.0, 900.0));
        assert_eq!(surface.rendered_size(), Size::new(800.0, 450.0));
        let (frame, placement) = last_presented(&surface);
        assert_eq!(frame, PixelSize::new(800, 450));
        assert_eq!((placement.x, placement.y), (0, 225));

        surface.on_resize(Size::new(1200.0, 450.0));
        assert_eq!(surface.rendered_size(), Size::new(800.0, 450.0));
        assert_eq!(last_presented(&surface).1.x, 200);

        assert_eq!(frame_index(&surface), 1);
        assert_eq!(surface.timer().pending(), Some(Duration::from_millis(50)));
        assert_eq!(surface.timer().scheduled(), scheduled);
    }

    #[test]
    fn try_set_content_commits_successful_loads() {
        let mut surface = surface(300.0, 300.0);
        surface.try_set_content(ResourceLoader.load(png_bytes(10, 20))).unwrap();
        assert_eq!(surface.rendered_size(), Size::new(150.0, 300.0));
        assert_eq!(last_presented(&surface).1.x, 75);
    }

    #[test]
    fn replacing_an_animation_stops_playback() {
        let mut surface = surface(800.0, 600.0);
        surface.load(gif_bytes(16, 16, 2, 30), true).unwrap();
        assert!(surface.timer().pending().is_some());

        surface.load(png_bytes(16, 16), true).unwrap();
        assert_eq!(surface.timer().pending(), None);
        assert!(!surface.on_timer());
    }

    #[test]
    fn dropping_the_surface_cancels_the_timer() {
        let timer = SharedTimer::default();
        let state = Rc::clone(&timer.0);
        let mut surface =
            DisplaySurface::new(RecordingSink::default(), timer, Size::new(100.0, 100.0));
        surface.load(gif_bytes(8, 8, 2, 20), true).unwrap();
        assert_eq!(state.get(), Some(Duration::from_millis(20)));

        drop(surface);
        assert_eq!(state.get(), None);
    }

    #[test]
    fn zero_area_container_clears_instead_of_presenting() {
        let mut surface = surface(0.0, 0.0);
        surface.load(png_bytes(64, 48), true).unwrap();
        assert_eq!(surface.rendered_size(), Size::ZERO);
        assert!(surface.sink().presented.is_empty());
        assert_eq!(surface.sink().clears, 1);

        surface.on_resize(Size::new(0.0, 480.0));
        assert_eq!(surface.rendered_size(), Size::ZERO);

        surface.on_resize(Size::new(640.0, 480.0));
        assert_eq!(surface.rendered_size(), Size::new(640.0, 480.0));
        assert_eq!(last_presented(&surface).0, PixelSize::new(640, 480));
    }

    #[test]
    fn growing_the_free_dimension_keeps_the_fit() {
        let mut surface = surface(800.0, 600.0);
        surface.load(png_bytes(160, 90), true).unwrap();
        let rendered = surface.rendered_size();

        surface.on_resize(Size::new(800.0, 900.0));
        assert_eq!(surface.rendered_size(), rendered);
        let (frame, placement) = last_presented(&surface);
        assert_eq!(frame, PixelSize::new(800, 450));
        assert_eq!(placement.y, 225);

        // Same pixel placement, nothing to present.
        let presented = surface.sink().presented.len();
        surface.on_resize(Size::new(800.0, 900.0));
        assert_eq!(surface.sink().presented.len(), presented);
    }

    #[test]
    fn resizes_match_unconditional_refits() {
        let mut surface = surface(800.0, 600.0);
        surface.load(png_bytes(1600, 900), true).unwrap();
        let aspect = surface.content().unwrap().aspect_ratio();

        let sizes = [
            (800.0, 900.0),
            (1200.0, 900.0),
            (1200.0, 675.0),
            (1600.0, 675.0),
            (1600.0, 300.0),
            (533.0, 300.0),
            (533.0, 1000.0),
            (320.0, 1000.0),
            (0.0, 1000.0),
            (1920.0, 1080.0),
        ];
        for (width, height) in sizes {
            let size = Size::new(width, height);
            surface.on_resize(size);
            assert_eq!(
                surface.rendered_size().to_pixels(),
                fit(aspect, size).to_pixels(),
                "after resizing to {size}"
            );
        }
    }

    #[test]
    fn adjust_to_content_shows_the_natural_size() {
        let mut surface = surface(800.0, 600.0);
        surface.load(png_bytes(160, 90), true).unwrap();
        surface.adjust_to_content();

        assert_eq!(surface.container_size(), Size::new(160.0, 90.0));
        assert_eq!(surface.rendered_size(), Size::new(160.0, 90.0));
        let (frame, placement) = last_presented(&surface);
        assert_eq!(frame, PixelSize::new(160, 90));
        assert_eq!((placement.x, placement.y), (0, 0));

        surface.on_resize(Size::new(80.0, 90.0));
        assert_eq!(surface.rendered_size(), Size::new(80.0, 45.0));
    }

    #[test]
    fn adjust_without_content_does_nothing() {
        let mut surface = surface(800.0, 600.0);
        surface.adjust_to_content();
        surface.on_resize(Size::new(10.0, 10.0));
        assert_eq!(surface.container_size(), Size::new(10.0, 10.0));
        assert!(surface.sink().presented.is_empty());
    }
}
