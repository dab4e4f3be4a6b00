use crate::constants::DWELL_STEP_MS;
use glam::Vec2;

/// Continuous-gaze accumulator shared by every dwell-activated entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Dwell {
    elapsed_ms: u32,
}

impl Dwell {
    pub const fn from_ms(elapsed_ms: u32) -> Self {
        Self { elapsed_ms }
    }

    /// One gaze frame: grow while inside, restart the moment gaze leaves.
    #[inline]
    pub fn track(&mut self, inside: bool) {
        if inside {
            self.elapsed_ms = self.elapsed_ms.saturating_add(DWELL_STEP_MS);
        } else {
            self.elapsed_ms = 0;
        }
    }

    #[inline]
    pub fn reached(&self, threshold_ms: u32) -> bool {
        self.elapsed_ms >= threshold_ms
    }

    #[inline]
    pub fn reset(&mut self) {
        self.elapsed_ms = 0;
    }

    #[inline]
    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }

    /// Fraction of `threshold_ms` accumulated, in [0, 1].
    pub fn progress(&self, threshold_ms: u32) -> f32 {
        if threshold_ms == 0 {
            return 1.0;
        }
        (self.elapsed_ms as f32 / threshold_ms as f32).min(1.0)
    }
}

pub trait HitRegion {
    fn contains(&self, point: Vec2) -> bool;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl HitRegion for Circle {
    #[inline]
    fn contains(&self, point: Vec2) -> bool {
        self.center.distance(point) < self.radius
    }
}

/// Axis-aligned box, edges inclusive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl HitRegion for Rect {
    #[inline]
    fn contains(&self, point: Vec2) -> bool {
        let max = self.origin + self.size;
        point.x >= self.origin.x && point.x <= max.x && point.y >= self.origin.y && point.y <= max.y
    }
}
