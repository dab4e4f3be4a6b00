//! Process-wide gaze state behind an explicit, cloneable handle.
//!
//! The hub owns the single [`GazeSignalProcessor`] and the pointer fallback
//! and knows which of the two sources is live. The connection supervisor
//! flips the source; the broadcaster reads one frame per tick.

use crate::fallback::PointerFallback;
use crate::sample::{CalibrationStatus, GazeFrame, RawSample};
use crate::signal::{GazeSignalProcessor, IngestOutcome};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleSource {
    Stream,
    Fallback,
}

#[derive(Debug)]
struct HubState {
    processor: GazeSignalProcessor,
    fallback: PointerFallback,
    source: SampleSource,
}

#[derive(Clone, Debug)]
pub struct GazeHub {
    inner: Rc<RefCell<HubState>>,
}

impl Default for GazeHub {
    fn default() -> Self {
        Self::new()
    }
}

impl GazeHub {
    /// The fallback starts live: nothing is connected yet.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(HubState {
                processor: GazeSignalProcessor::new(),
                fallback: PointerFallback::default(),
                source: SampleSource::Fallback,
            })),
        }
    }

    pub fn ingest(&self, sample: &RawSample) -> IngestOutcome {
        self.inner.borrow_mut().processor.ingest(sample)
    }

    pub fn activate(&self, source: SampleSource) {
        let mut st = self.inner.borrow_mut();
        if st.source != source {
            log::info!("[gaze] active source: {:?}", source);
            st.source = source;
        }
    }

    pub fn active_source(&self) -> SampleSource {
        self.inner.borrow().source
    }

    /// Pointer input is always tracked so the fallback resumes from the
    /// live pointer; it only reaches frames while the fallback is active.
    pub fn pointer_move(&self, x: f32, y: f32) {
        self.inner.borrow_mut().fallback.pointer_move(x, y);
    }

    pub fn pointer_down(&self, now_ms: f64) {
        self.inner.borrow_mut().fallback.pointer_down(now_ms);
    }

    pub fn pointer_up(&self) {
        self.inner.borrow_mut().fallback.pointer_up();
    }

    /// Current frame for one broadcast tick, stamped with `now_ms`.
    pub fn frame(&self, now_ms: f64) -> GazeFrame {
        let mut st = self.inner.borrow_mut();
        if st.source == SampleSource::Fallback {
            if let Some(sample) = st.fallback.sample(now_ms) {
                st.processor.apply_direct(&sample);
            }
        }
        GazeFrame {
            timestamp_ms: now_ms,
            ..st.processor.current()
        }
    }

    pub fn calibration(&self) -> CalibrationStatus {
        self.inner.borrow().processor.calibration()
    }

    pub fn take_calibration_complete(&self) -> bool {
        self.inner.borrow_mut().processor.take_calibration_complete()
    }

    pub fn history_len(&self) -> usize {
        self.inner.borrow().processor.history().len()
    }
}

/// Calibration change worth showing, as handed to the page.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CalibrationEvent {
    Progress { percent: f64 },
    Complete,
}

/// Turns the hub's calibration status into change events, polled once per
/// broadcast tick.
#[derive(Clone, Copy, Debug, Default)]
pub struct CalibrationMonitor {
    last_progress: Option<u32>,
}

impl CalibrationMonitor {
    pub fn poll(&mut self, hub: &GazeHub) -> Option<CalibrationEvent> {
        if hub.take_calibration_complete() {
            self.last_progress = None;
            return Some(CalibrationEvent::Complete);
        }
        let status = hub.calibration();
        if !status.active || self.last_progress == Some(status.progress) {
            return None;
        }
        self.last_progress = Some(status.progress);
        Some(CalibrationEvent::Progress {
            percent: status.percent(),
        })
    }
}
