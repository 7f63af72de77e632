//! Typed device sensor events.
//!
//! Field names serialize in the camelCase spelling the host platform uses,
//! so recorded event logs deserialize directly.

use serde::{Deserialize, Serialize};

/// Three-axis vector; any axis may be unavailable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Axes {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
}

impl Axes {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: Some(z),
        }
    }
}

/// Angular velocity around the three device axes (deg/s).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RotationRate {
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
    pub gamma: Option<f64>,
}

impl RotationRate {
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Self {
        Self {
            alpha: Some(alpha),
            beta: Some(beta),
            gamma: Some(gamma),
        }
    }
}

/// Device orientation in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrientationEvent {
    /// Epoch milliseconds, possibly fractional
    pub timestamp_ms: f64,
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
    pub gamma: Option<f64>,
}

/// Device motion: linear acceleration with and without gravity, rotation rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionEvent {
    /// Epoch milliseconds, possibly fractional
    pub timestamp_ms: f64,
    pub acceleration: Option<Axes>,
    pub acceleration_including_gravity: Option<Axes>,
    pub rotation_rate: Option<RotationRate>,
}

/// Either event kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SensorEvent {
    Orientation(OrientationEvent),
    Motion(MotionEvent),
}

impl SensorEvent {
    pub fn timestamp_ms(&self) -> f64 {
        match self {
            SensorEvent::Orientation(e) => e.timestamp_ms,
            SensorEvent::Motion(e) => e.timestamp_ms,
        }
    }

    /// Short kind name for logs and metric labels
    pub fn kind(&self) -> &'static str {
        match self {
            SensorEvent::Orientation(_) => "orientation",
            SensorEvent::Motion(_) => "motion",
        }
    }
}

impl From<OrientationEvent> for SensorEvent {
    fn from(event: OrientationEvent) -> Self {
        SensorEvent::Orientation(event)
    }
}

impl From<MotionEvent> for SensorEvent {
    fn from(event: MotionEvent) -> Self {
        SensorEvent::Motion(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let event: SensorEvent = serde_json::from_str(
            r#"{"type":"motion","timestampMs":12.5,
                "accelerationIncludingGravity":{"x":0.1,"y":null,"z":9.8},
                "rotationRate":null}"#,
        )
        .unwrap();
        let SensorEvent::Motion(motion) = event else {
            panic!("expected motion event");
        };
        assert_eq!(motion.timestamp_ms, 12.5);
        assert!(motion.acceleration.is_none());
        assert_eq!(motion.acceleration_including_gravity.unwrap().y, None);
        assert_eq!(event.kind(), "motion");
    }
}
