//! Time-limited effects that survive pausing without drift.

/// Duration measured from a start moment.
///
/// Pausing rewrites the start to the pause moment and keeps only the time
/// that was left, so the remaining duration is unaffected by how long the
/// simulation stays paused.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Countdown {
    start: f64,
    remaining: f32,
}

impl Countdown {
    /// Starts a countdown of `duration` seconds at `now`.
    #[must_use]
    pub fn new(now: f64, duration: f32) -> Self {
        Self {
            start: now,
            remaining: duration.max(0.0),
        }
    }

    /// Moment the countdown was started or last rebased.
    #[must_use]
    pub const fn start(&self) -> f64 {
        self.start
    }

    /// Duration measured from [`Countdown::start`].
    #[must_use]
    pub const fn duration(&self) -> f32 {
        self.remaining
    }

    /// Moment the countdown expires.
    #[must_use]
    pub fn end(&self) -> f64 {
        self.start + f64::from(self.remaining)
    }

    /// Seconds left at `now`.
    #[must_use]
    pub fn remaining_at(&self, now: f64) -> f32 {
        (self.end() - now).max(0.0) as f32
    }

    /// Reports whether time is left at `now`.
    #[must_use]
    pub fn is_active(&self, now: f64) -> bool {
        self.end() > now
    }

    /// Freezes the time left at `now`.
    pub fn pause(&mut self, now: f64) {
        self.remaining = self.remaining_at(now);
        self.start = now;
    }

    /// Restarts the frozen remainder from `now`.
    pub fn resume(&mut self, now: f64) {
        self.start = now;
    }
}
