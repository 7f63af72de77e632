//! Mock motion source
//!
//! Synthetic orientation and motion events for running without a device.

use std::f64::consts::TAU;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::error::{IngestionError, Result};
use crate::event::{Axes, MotionEvent, OrientationEvent, RotationRate, SensorEvent};

const GRAVITY: f64 = 9.81;

/// Simulated movement pattern
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Activity {
    /// Device at rest, sensor noise only
    #[default]
    Still,
    /// Periodic gait around 2 Hz
    Walking,
    /// Strong fast oscillation
    Shaking,
}

impl Activity {
    /// (oscillation frequency in Hz, acceleration amplitude in m/s²)
    fn profile(self) -> (f64, f64) {
        match self {
            Activity::Still => (0.3, 0.05),
            Activity::Walking => (1.8, 2.5),
            Activity::Shaking => (6.0, 12.0),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Activity::Still => "still",
            Activity::Walking => "walking",
            Activity::Shaking => "shaking",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Activity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "still" => Ok(Activity::Still),
            "walking" => Ok(Activity::Walking),
            "shaking" => Ok(Activity::Shaking),
            other => Err(format!(
                "unknown activity '{other}' (expected still, walking or shaking)"
            )),
        }
    }
}

/// Mock motion source configuration
#[derive(Debug, Clone)]
pub struct MockMotionConfig {
    /// Source name used in logs
    pub name: String,

    /// Events per second of each kind
    pub frequency_hz: f64,

    pub activity: Activity,

    /// Stop after this many ticks (each tick emits one orientation and one motion event)
    pub max_ticks: Option<u64>,
}

impl Default for MockMotionConfig {
    fn default() -> Self {
        Self {
            name: "mock_motion".to_string(),
            frequency_hz: 50.0,
            activity: Activity::Still,
            max_ticks: None,
        }
    }
}

/// Mock motion source
pub struct MockMotionSource {
    config: MockMotionConfig,
    running: Arc<AtomicBool>,
}

impl MockMotionSource {
    /// # Errors
    /// `InvalidFrequency` unless `frequency_hz` is finite and above zero
    pub fn new(config: MockMotionConfig) -> Result<Self> {
        if !(config.frequency_hz.is_finite() && config.frequency_hz > 0.0) {
            return Err(IngestionError::InvalidFrequency {
                name: config.name,
                frequency_hz: config.frequency_hz,
            });
        }
        Ok(Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn with_activity(activity: Activity, frequency_hz: f64) -> Result<Self> {
        Self::new(MockMotionConfig {
            activity,
            frequency_hz,
            ..Default::default()
        })
    }

    pub fn config(&self) -> &MockMotionConfig {
        &self.config
    }

    /// Spawn the generator task and return the event stream.
    ///
    /// The stream ends when `stop` is called, `max_ticks` is reached or the
    /// receiver is dropped.
    pub fn start(&self, channel_capacity: usize) -> mpsc::Receiver<SensorEvent> {
        let (tx, rx) = mpsc::channel(channel_capacity.max(1));
        let config = self.config.clone();
        let running = self.running.clone();

        running.store(true, Ordering::SeqCst);

        tokio::spawn(async move {
            let period_ms = 1000.0 / config.frequency_hz;
            let interval = Duration::from_secs_f64(period_ms / 1000.0);
            let start_ms = Utc::now().timestamp_millis() as f64;
            let mut tick: u64 = 0;

            debug!(
                source = %config.name,
                activity = %config.activity,
                frequency_hz = config.frequency_hz,
                "mock motion source started"
            );

            while running.load(Ordering::Relaxed) {
                if config.max_ticks.is_some_and(|max| tick >= max) {
                    break;
                }
                let timestamp_ms = start_ms + tick as f64 * period_ms;
                let (orientation, motion) =
                    synthesize(config.activity, tick, timestamp_ms, period_ms);
                tick += 1;

                if tx.send(orientation.into()).await.is_err()
                    || tx.send(motion.into()).await.is_err()
                {
                    debug!(source = %config.name, "mock motion channel closed");
                    break;
                }
                trace!(source = %config.name, tick, timestamp_ms, "mock events sent");

                tokio::time::sleep(interval).await;
            }

            running.store(false, Ordering::SeqCst);
            debug!(source = %config.name, ticks = tick, "mock motion source stopped");
        });

        rx
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

/// Deterministic event pair for one tick.
pub fn synthesize(
    activity: Activity,
    tick: u64,
    timestamp_ms: f64,
    period_ms: f64,
) -> (OrientationEvent, MotionEvent) {
    let (freq_hz, amplitude) = activity.profile();
    let t = tick as f64 * period_ms / 1000.0;
    let phase = TAU * freq_hz * t;
    // cheap aperiodic jitter so still windows are not perfectly flat
    let jitter = 0.02 * ((tick as f64 * 12.9898).sin() * 43_758.545).fract();

    let ax = amplitude * 0.4 * phase.cos() + jitter;
    let ay = amplitude * 0.3 * (phase * 0.5).sin() - jitter;
    let az = amplitude * phase.sin() + jitter;

    let orientation = OrientationEvent {
        timestamp_ms,
        alpha: Some((180.0 + amplitude * 4.0 * (phase * 0.25).sin()).rem_euclid(360.0)),
        beta: Some(amplitude * 3.0 * phase.sin() + jitter),
        gamma: Some(amplitude * 2.0 * phase.cos() - jitter),
    };
    let motion = MotionEvent {
        timestamp_ms,
        acceleration: Some(Axes::new(ax, ay, az)),
        acceleration_including_gravity: Some(Axes::new(ax, ay, az + GRAVITY)),
        rotation_rate: Some(RotationRate::new(
            amplitude * 10.0 * phase.cos(),
            amplitude * 6.0 * phase.sin(),
            amplitude * 3.0 * (phase * 2.0).sin(),
        )),
    };
    (orientation, motion)
}
