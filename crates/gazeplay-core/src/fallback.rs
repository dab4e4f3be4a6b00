use crate::constants::{FALLBACK_FIXATION_HELD, FALLBACK_FIXATION_IDLE, FALLBACK_HOLD_MS};
use crate::sample::RawSample;
use glam::Vec2;

/// Pointer-driven stand-in for the tracker stream.
///
/// Pointer moves set the position directly. A press held for at least
/// [`FALLBACK_HOLD_MS`] reports full fixation; otherwise fixation idles at 0.5.
#[derive(Clone, Copy, Debug, Default)]
pub struct PointerFallback {
    position: Option<Vec2>,
    pressed_at_ms: Option<f64>,
}

impl PointerFallback {
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.position = Some(Vec2::new(x, y));
    }

    pub fn pointer_down(&mut self, now_ms: f64) {
        self.pressed_at_ms.get_or_insert(now_ms);
    }

    pub fn pointer_up(&mut self) {
        self.pressed_at_ms = None;
    }

    pub fn fixation(&self, now_ms: f64) -> f32 {
        match self.pressed_at_ms {
            Some(t) if now_ms - t >= FALLBACK_HOLD_MS => FALLBACK_FIXATION_HELD,
            _ => FALLBACK_FIXATION_IDLE,
        }
    }

    /// Latest pointer reading in sample shape, once the pointer has moved.
    pub fn sample(&self, now_ms: f64) -> Option<RawSample> {
        self.position
            .map(|p| RawSample::at(p.x, p.y, self.fixation(now_ms), now_ms))
    }
}
