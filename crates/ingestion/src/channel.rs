//! Known sensor channels and their typed field accessors.

use std::fmt;
use std::str::FromStr;

use crate::event::{MotionEvent, OrientationEvent, SensorEvent};

/// Reads one field from one event kind.
#[derive(Clone, Copy)]
enum Accessor {
    Orientation(fn(&OrientationEvent) -> Option<f64>),
    Motion(fn(&MotionEvent) -> Option<f64>),
}

/// One scalar field of a device sensor event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Alpha,
    Beta,
    Gamma,
    AccelerationX,
    AccelerationY,
    AccelerationZ,
    AccelerationIncludingGravityX,
    AccelerationIncludingGravityY,
    AccelerationIncludingGravityZ,
    RotationRateAlpha,
    RotationRateBeta,
    RotationRateGamma,
}

impl ChannelKind {
    pub const ALL: [ChannelKind; 12] = [
        ChannelKind::Alpha,
        ChannelKind::Beta,
        ChannelKind::Gamma,
        ChannelKind::AccelerationX,
        ChannelKind::AccelerationY,
        ChannelKind::AccelerationZ,
        ChannelKind::AccelerationIncludingGravityX,
        ChannelKind::AccelerationIncludingGravityY,
        ChannelKind::AccelerationIncludingGravityZ,
        ChannelKind::RotationRateAlpha,
        ChannelKind::RotationRateBeta,
        ChannelKind::RotationRateGamma,
    ];

    /// Canonical channel name
    pub fn name(self) -> &'static str {
        match self {
            ChannelKind::Alpha => "alpha",
            ChannelKind::Beta => "beta",
            ChannelKind::Gamma => "gamma",
            ChannelKind::AccelerationX => "acceleration.x",
            ChannelKind::AccelerationY => "acceleration.y",
            ChannelKind::AccelerationZ => "acceleration.z",
            ChannelKind::AccelerationIncludingGravityX => "accelerationIncludingGravity.x",
            ChannelKind::AccelerationIncludingGravityY => "accelerationIncludingGravity.y",
            ChannelKind::AccelerationIncludingGravityZ => "accelerationIncludingGravity.z",
            ChannelKind::RotationRateAlpha => "rotationRate.alpha",
            ChannelKind::RotationRateBeta => "rotationRate.beta",
            ChannelKind::RotationRateGamma => "rotationRate.gamma",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    fn accessor(self) -> Accessor {
        use Accessor::{Motion, Orientation};
        match self {
            ChannelKind::Alpha => Orientation(|e| e.alpha),
            ChannelKind::Beta => Orientation(|e| e.beta),
            ChannelKind::Gamma => Orientation(|e| e.gamma),
            ChannelKind::AccelerationX => Motion(|e| e.acceleration?.x),
            ChannelKind::AccelerationY => Motion(|e| e.acceleration?.y),
            ChannelKind::AccelerationZ => Motion(|e| e.acceleration?.z),
            ChannelKind::AccelerationIncludingGravityX => {
                Motion(|e| e.acceleration_including_gravity?.x)
            }
            ChannelKind::AccelerationIncludingGravityY => {
                Motion(|e| e.acceleration_including_gravity?.y)
            }
            ChannelKind::AccelerationIncludingGravityZ => {
                Motion(|e| e.acceleration_including_gravity?.z)
            }
            ChannelKind::RotationRateAlpha => Motion(|e| e.rotation_rate?.alpha),
            ChannelKind::RotationRateBeta => Motion(|e| e.rotation_rate?.beta),
            ChannelKind::RotationRateGamma => Motion(|e| e.rotation_rate?.gamma),
        }
    }

    /// Read this channel's field; `None` for another event kind or an absent field.
    pub fn read(self, event: &SensorEvent) -> Option<f64> {
        match (self.accessor(), event) {
            (Accessor::Orientation(read), SensorEvent::Orientation(e)) => read(e),
            (Accessor::Motion(read), SensorEvent::Motion(e)) => read(e),
            _ => None,
        }
    }

    /// Whether this channel is carried by orientation events
    pub fn is_orientation(self) -> bool {
        matches!(self.accessor(), Accessor::Orientation(_))
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChannelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown sensor channel '{s}'"))
    }
}
