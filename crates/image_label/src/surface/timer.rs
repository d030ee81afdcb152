use std::time::Duration;

/// One-shot timer driving animation playback.
///
/// When a scheduled timer fires, the host calls
/// [`DisplaySurface::on_timer`](crate::DisplaySurface::on_timer), which schedules the next
/// frame. Scheduling again replaces any pending timeout.
pub trait FrameTimer {
    fn schedule(&mut self, delay: Duration);
    fn cancel(&mut self);
}

/// Timer that only fires when told to, for headless hosts and tests.
#[derive(Debug, Default)]
pub struct ManualTimer {
    pending: Option<Duration>,
    scheduled: usize,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay of the pending timeout, if any.
    pub fn pending(&self) -> Option<Duration> {
        self.pending
    }

    /// How many times a timeout was scheduled.
    pub fn scheduled(&self) -> usize {
        self.scheduled
    }

    /// Consume the pending timeout, returning the delay that elapsed.
    pub fn fire(&mut self) -> Option<Duration> {
        self.pending.take()
    }
}

impl FrameTimer for ManualTimer {
    fn schedule(&mut self, delay: Duration) {
        self.pending = Some(delay);
        self.scheduled += 1;
    }

    fn cancel(&mut self) {
        self.pending = None;
    }
}
