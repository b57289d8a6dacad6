//! Time-based interpolation for step transitions.

use std::time::{Duration, Instant};

use crate::layout::Bounds;

/// Values that can be interpolated.
pub trait Lerp: Copy {
    fn lerp(self, to: Self, t: f32) -> Self;
}

pub(crate) fn lerp_i32(from: i32, to: i32, t: f32) -> i32 {
    (f64::from(from) + (f64::from(to) - f64::from(from)) * f64::from(t)).round() as i32
}

pub(crate) fn lerp_u16(from: u16, to: u16, t: f32) -> u16 {
    lerp_i32(i32::from(from), i32::from(to), t).clamp(0, i32::from(u16::MAX)) as u16
}

impl Lerp for Bounds {
    fn lerp(self, to: Self, t: f32) -> Self {
        Bounds::new(
            lerp_i32(self.x, to.x, t),
            lerp_i32(self.y, to.y, t),
            lerp_u16(self.width, to.width, t),
            lerp_u16(self.height, to.height, t),
        )
    }
}

/// Cubic ease-in-out over `0.0..=1.0`.
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Eased animation of a value from one state to another.
#[derive(Debug, Clone, Copy)]
pub struct Tween<T> {
    from: T,
    to: T,
    started: Instant,
    duration: Duration,
}

impl<T: Lerp> Tween<T> {
    /// A tween already at rest on `value`.
    pub fn settled(value: T, now: Instant) -> Self {
        Self {
            from: value,
            to: value,
            started: now,
            duration: Duration::ZERO,
        }
    }

    /// Start a new animation from wherever the value is at `now`.
    pub fn retarget(&mut self, to: T, now: Instant, started: Instant, duration: Duration) {
        self.from = self.value_at(now);
        self.to = to;
        self.started = started;
        self.duration = duration;
    }

    /// Change the destination without restarting the clock, e.g. when the
    /// anchored view moved mid-transition.
    pub fn update_target(&mut self, to: T) {
        self.to = to;
    }

    pub fn target(&self) -> T {
        self.to
    }

    pub fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    pub fn is_running(&self, now: Instant) -> bool {
        self.progress(now) < 1.0
    }

    pub fn value_at(&self, now: Instant) -> T {
        let progress = self.progress(now);
        if progress >= 1.0 {
            return self.to;
        }
        self.from.lerp(self.to, ease_in_out(progress))
    }
}
