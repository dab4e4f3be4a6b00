//! Wire format of the tracker stream.
//!
//! Inbound: JSON objects carrying `x`, `y` and optionally `fixation`,
//! `calibrating` and `calibration_progress`; the tracker also answers pings
//! with `{"type":"pong"}`. Outbound: `{"type":"ping"}`.

use crate::constants::CALIBRATION_FRAMES;
use crate::error::ProtocolError;
use crate::sample::RawSample;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct InboundMessage {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    x: Option<serde_json::Value>,
    #[serde(default)]
    y: Option<serde_json::Value>,
    #[serde(default)]
    fixation: Option<f64>,
    #[serde(default)]
    calibrating: Option<bool>,
    #[serde(default)]
    calibration_progress: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Inbound {
    Gaze(RawSample),
    Pong,
    /// Valid JSON without usable coordinates; ignored.
    Ignored,
}

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Outbound {
    Ping,
}

impl Outbound {
    pub fn to_json(self) -> String {
        // Serializing a unit-variant enum to a string cannot fail.
        serde_json::to_string(&self).unwrap_or_else(|_| String::from(r#"{"type":"ping"}"#))
    }
}

pub fn parse_inbound(text: &str, received_at_ms: f64) -> Result<Inbound, ProtocolError> {
    let msg: InboundMessage = serde_json::from_str(text)?;

    let coord = |v: &Option<serde_json::Value>| v.as_ref().and_then(|v| v.as_f64());
    let (Some(x), Some(y)) = (coord(&msg.x), coord(&msg.y)) else {
        if msg.kind.as_deref() == Some("pong") {
            return Ok(Inbound::Pong);
        }
        return Ok(Inbound::Ignored);
    };

    let progress = msg
        .calibration_progress
        .filter(|p| p.is_finite())
        .map(|p| p.clamp(0.0, CALIBRATION_FRAMES as f64) as u32)
        .unwrap_or(0);

    Ok(Inbound::Gaze(RawSample {
        x: x as f32,
        y: y as f32,
        fixation: msg.fixation.unwrap_or(0.0) as f32,
        calibrating: msg.calibrating.unwrap_or(false),
        calibration_progress: progress,
        timestamp_ms: received_at_ms,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_has_expected_shape() {
        assert_eq!(Outbound::Ping.to_json(), r#"{"type":"ping"}"#);
    }

    #[test]
    fn optional_fields_default() {
        let Inbound::Gaze(s) = parse_inbound(r#"{"x":10,"y":20}"#, 5.0).unwrap() else {
            panic!("expected gaze");
        };
        assert_eq!((s.x, s.y, s.fixation), (10.0, 20.0, 0.0));
        assert!(!s.calibrating);
        assert_eq!(s.calibration_progress, 0);
        assert_eq!(s.timestamp_ms, 5.0);
    }
}
