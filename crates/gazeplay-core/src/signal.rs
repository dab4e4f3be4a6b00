//! Smoothing of the raw tracker stream into a stable pointer signal.
//!
//! Samples enter a bounded FIFO history. The output position is a linearly
//! weighted moving average over that history (newest sample weighs most),
//! rounded to whole pixels, then passed through a per-axis dead zone that
//! holds the previous output while movement stays below [`DEAD_ZONE_PX`].

use crate::constants::{CALIBRATION_FRAMES, CALIBRATION_LOG_EVERY, DEAD_ZONE_PX, HISTORY_CAPACITY};
use crate::sample::{CalibrationStatus, GazeFrame, GazeHistoryEntry, RawSample};
use std::collections::VecDeque;

/// What happened to a sample handed to [`GazeSignalProcessor::ingest`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The smoothed estimate moved the output.
    Accepted,
    /// The estimate fell inside the dead zone; the previous output was kept.
    Suppressed,
    /// The sample had no usable coordinates and was dropped untouched.
    Ignored,
}

#[derive(Debug)]
pub struct GazeSignalProcessor {
    history: VecDeque<GazeHistoryEntry>,
    anchor: Option<(f32, f32)>,
    output: GazeFrame,
    calibration: CalibrationStatus,
    calibration_completed: bool,
}

impl Default for GazeSignalProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl GazeSignalProcessor {
    pub fn new() -> Self {
        Self {
            history: VecDeque::with_capacity(HISTORY_CAPACITY + 1),
            anchor: None,
            output: GazeFrame::default(),
            calibration: CalibrationStatus::default(),
            calibration_completed: false,
        }
    }

    pub fn ingest(&mut self, sample: &RawSample) -> IngestOutcome {
        if !sample.is_well_formed() {
            log::trace!("[signal] dropping sample without coordinates");
            return IngestOutcome::Ignored;
        }

        self.history.push_back(GazeHistoryEntry::from(sample));
        while self.history.len() > HISTORY_CAPACITY {
            self.history.pop_front();
        }

        // The history is never empty here, so the averages always exist.
        let x = weighted_average(self.history.iter().map(|e| e.x as f64)).unwrap_or(0.0);
        let y = weighted_average(self.history.iter().map(|e| e.y as f64)).unwrap_or(0.0);
        let fixation =
            weighted_average(self.history.iter().map(|e| e.fixation as f64)).unwrap_or(0.0);
        let estimate = (round_half_up(x) as f32, round_half_up(y) as f32);

        let outcome = match self.anchor {
            Some((ax, ay))
                if !sample.calibrating
                    && (estimate.0 - ax).abs() < DEAD_ZONE_PX
                    && (estimate.1 - ay).abs() < DEAD_ZONE_PX =>
            {
                IngestOutcome::Suppressed
            }
            _ => {
                self.anchor = Some(estimate);
                IngestOutcome::Accepted
            }
        };

        let (out_x, out_y) = self.anchor.unwrap_or(estimate);
        self.output = GazeFrame {
            x: out_x,
            y: out_y,
            fixation: fixation as f32,
            timestamp_ms: sample.timestamp_ms,
        };

        self.update_calibration(sample);
        outcome
    }

    /// Write a sample straight to the output, bypassing history and dead zone.
    ///
    /// Used for the pointer fallback, which is already noise-free.
    pub fn apply_direct(&mut self, sample: &RawSample) {
        if !sample.is_well_formed() {
            return;
        }
        self.output = GazeFrame {
            x: sample.x,
            y: sample.y,
            fixation: sample.fixation,
            timestamp_ms: sample.timestamp_ms,
        };
    }

    #[inline]
    pub fn current(&self) -> GazeFrame {
        self.output
    }

    #[inline]
    pub fn calibration(&self) -> CalibrationStatus {
        self.calibration
    }

    /// One-shot latch: true exactly once after each calibrating → tracking edge.
    pub fn take_calibration_complete(&mut self) -> bool {
        std::mem::take(&mut self.calibration_completed)
    }

    pub fn history(&self) -> impl ExactSizeIterator<Item = &GazeHistoryEntry> {
        self.history.iter()
    }

    fn update_calibration(&mut self, sample: &RawSample) {
        let was_active = self.calibration.active;
        self.calibration = CalibrationStatus {
            active: sample.calibrating,
            progress: sample.calibration_progress,
        };

        if sample.calibrating && sample.calibration_progress % CALIBRATION_LOG_EVERY == 0 {
            log::info!(
                "[calibration] {}/{} ({:.0}%)",
                sample.calibration_progress,
                CALIBRATION_FRAMES,
                self.calibration.percent()
            );
        }
        if was_active && !sample.calibrating {
            log::info!("[calibration] complete, tracking");
            self.calibration_completed = true;
        }
    }
}

/// Linearly weighted mean, oldest value first: weight(i) = i + 1.
pub fn weighted_average<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, total) = values
        .into_iter()
        .enumerate()
        .fold((0.0, 0.0), |(sum, total), (i, v)| {
            let w = (i + 1) as f64;
            (sum + v * w, total + w)
        });
    (total > 0.0).then(|| sum / total)
}

/// Round to the nearest integer with halves going up, as browsers round pixels.
#[inline]
pub fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weighted_average_favours_newest() {
        let avg = weighted_average([0.0, 0.0, 30.0]).unwrap();
        // (0*1 + 0*2 + 30*3) / 6
        assert!((avg - 15.0).abs() < 1e-9);
        assert_eq!(weighted_average(std::iter::empty()), None);
    }

    #[test]
    fn halves_round_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(2.49), 2.0);
    }
}
