//! Animated counters
//!
//! Frame-scheduled interpolation from one value to another with a cubic
//! ease-out. Runs at 60 frames per second and can be cancelled at any frame.

use std::time::Duration;
use tokio::sync::watch;

/// Frames per second
pub const FRAME_RATE: u32 = 60;

/// Cubic ease-out over `progress` in `[0, 1]`
pub fn ease_out_cubic(progress: f64) -> f64 {
    1.0 - (1.0 - progress.clamp(0.0, 1.0)).powi(3)
}

/// How a run of the animation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationOutcome {
    Completed,
    Cancelled,
}

/// Interpolation from `from` to `to` over a fixed number of frames
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterAnimation {
    from: f64,
    to: f64,
    total_frames: f64,
}

impl CounterAnimation {
    /// Animate towards `to` over `duration`
    ///
    /// A missing target snaps to zero without animating.
    pub fn new(from: f64, to: Option<f64>, duration: Duration) -> Self {
        match to {
            Some(to) => Self {
                from,
                to,
                total_frames: duration.as_secs_f64() * f64::from(FRAME_RATE),
            },
            None => Self {
                from,
                to: 0.0,
                total_frames: 0.0,
            },
        }
    }

    pub fn target(&self) -> f64 {
        self.to
    }

    /// Number of frames until the target is shown
    pub fn frame_count(&self) -> u32 {
        self.total_frames.ceil().max(1.0) as u32
    }

    /// Delay between frames
    pub fn frame_interval() -> Duration {
        Duration::from_secs(1) / FRAME_RATE
    }

    /// Value shown at `frame` (1-based); the last frame is exactly the target
    pub fn value_at(&self, frame: u32) -> f64 {
        if self.total_frames <= 0.0 {
            return self.to;
        }

        let progress = (f64::from(frame) / self.total_frames).min(1.0);
        if progress >= 1.0 {
            return self.to;
        }
        (self.from + (self.to - self.from) * ease_out_cubic(progress)).floor()
    }

    /// Every frame value in order
    pub fn frames(&self) -> impl Iterator<Item = f64> + '_ {
        (1..=self.frame_count()).map(move |frame| self.value_at(frame))
    }

    /// Drive the animation on a timer, calling `on_frame` with each value
    ///
    /// Stops early once `cancel` reads `true` or its sender is dropped.
    pub async fn run<F>(&self, mut cancel: watch::Receiver<bool>, mut on_frame: F) -> AnimationOutcome
    where
        F: FnMut(f64),
    {
        let mut ticker = tokio::time::interval(Self::frame_interval());
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let total = self.frame_count();
        let mut frame = 0;

        while frame < total {
            if *cancel.borrow() {
                return AnimationOutcome::Cancelled;
            }

            tokio::select! {
                _ = ticker.tick() => {
                    frame += 1;
                    on_frame(self.value_at(frame));
                }
                changed = cancel.changed() => {
                    if changed.is_err() {
                        return AnimationOutcome::Cancelled;
                    }
                }
            }
        }

        AnimationOutcome::Completed
    }
}
