//! Light-intensity animation: a sunrise, hold, sunset envelope.

use serde::{Deserialize, Serialize};

/// Cubic ease `3t² − 2t³` on `t` clamped to `0..=1`.
pub fn ease_light(t: f32) -> f32 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    t * t * (3.0 - 2.0 * t)
}

/// Timeline in seconds: dark for `delay`, eased up over `sunrise`, fully
/// lit for `hold`, eased down over `sunset`, then dark.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightTimeline {
    pub delay: f32,
    pub sunrise: f32,
    pub hold: f32,
    pub sunset: f32,
}

impl Default for LightTimeline {
    fn default() -> Self {
        Self {
            delay: 0.5,
            sunrise: 2.0,
            hold: 3.0,
            sunset: 2.0,
        }
    }
}

impl LightTimeline {
    /// End of the sunset phase.
    pub fn duration(&self) -> f32 {
        self.delay + self.sunrise + self.hold + self.sunset
    }

    /// Eased light intensity at `t` seconds.
    pub fn intensity_at(&self, t: f32) -> f32 {
        let t = t - self.delay;
        if t < 0.0 {
            return 0.0;
        }
        if t < self.sunrise {
            return ease_light(t / self.sunrise);
        }
        let t = t - self.sunrise;
        if t < self.hold {
            return 1.0;
        }
        let t = t - self.hold;
        if t < self.sunset {
            return ease_light(1.0 - t / self.sunset);
        }
        0.0
    }
}
