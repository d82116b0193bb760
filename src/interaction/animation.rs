use std::time::{Duration, Instant};

use crate::globe::projection::{normalize_angle, shortest_delta, smoothstep};

/// Default fly-to duration
pub const FLY_DURATION: Duration = Duration::from_millis(1000);

/// Eased heading transition toward a target longitude.
///
/// Always takes the short way round and runs for a fixed duration.
#[derive(Clone, Debug, PartialEq)]
pub struct FlyTo {
    start: f64,
    delta: f64,
    started_at: Instant,
    duration: Duration,
}

impl FlyTo {
    /// Heading that puts longitude `lon` (degrees) in front of the camera
    pub fn heading_for(lon: f64) -> f64 {
        normalize_angle(-lon.to_radians())
    }

    /// Start from `current` heading toward the marker longitude `lon` (degrees)
    pub fn toward(current: f64, lon: f64, now: Instant, duration: Duration) -> Self {
        let start = normalize_angle(current);
        let target = Self::heading_for(lon);
        Self {
            start,
            delta: shortest_delta(start, target),
            started_at: now,
            duration,
        }
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn target(&self) -> f64 {
        normalize_angle(self.start + self.delta)
    }

    /// Elapsed fraction clamped to [0, 1]
    pub fn fraction(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Heading at `now`, and whether the transition has finished
    pub fn sample(&self, now: Instant) -> (f64, bool) {
        let t = self.fraction(now);
        let heading = normalize_angle(self.start + self.delta * smoothstep(t));
        (heading, t >= 1.0)
    }
}
