//! Sample and frame types shared by every stage of the gaze pipeline.
//!
//! These types avoid referencing platform-specific APIs. Coordinates are in
//! page pixels as reported by the source; timestamps are milliseconds on the
//! scheduler clock.

use crate::constants::{CALIBRATION_FRAMES, FIXATING_THRESHOLD};
use glam::Vec2;
use serde::Serialize;

/// One reading from a sample source (tracker stream or pointer fallback).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawSample {
    pub x: f32,
    pub y: f32,
    pub fixation: f32,
    pub calibrating: bool,
    pub calibration_progress: u32,
    pub timestamp_ms: f64,
}

impl RawSample {
    pub fn at(x: f32, y: f32, fixation: f32, timestamp_ms: f64) -> Self {
        Self {
            x,
            y,
            fixation,
            calibrating: false,
            calibration_progress: 0,
            timestamp_ms,
        }
    }

    /// A sample without usable coordinates must not touch any state.
    #[inline]
    pub fn is_well_formed(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GazeHistoryEntry {
    pub x: f32,
    pub y: f32,
    pub fixation: f32,
    pub timestamp_ms: f64,
}

impl From<&RawSample> for GazeHistoryEntry {
    fn from(s: &RawSample) -> Self {
        Self {
            x: s.x,
            y: s.y,
            fixation: s.fixation,
            timestamp_ms: s.timestamp_ms,
        }
    }
}

/// Smoothed output unit, broadcast once per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct GazeFrame {
    pub x: f32,
    pub y: f32,
    pub fixation: f32,
    pub timestamp_ms: f64,
}

impl GazeFrame {
    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn is_fixating(&self) -> bool {
        self.fixation > FIXATING_THRESHOLD
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CalibrationStatus {
    pub active: bool,
    pub progress: u32,
}

impl CalibrationStatus {
    /// Progress as a percentage of the tracker's calibration run.
    pub fn percent(&self) -> f64 {
        self.progress.min(CALIBRATION_FRAMES) as f64 / CALIBRATION_FRAMES as f64 * 100.0
    }
}
