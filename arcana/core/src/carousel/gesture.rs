//! Pointer gesture tracking

/// Weight kept from the previous velocity estimate on each move
const VELOCITY_RETAIN: f64 = 0.3;

/// Weight given to the instantaneous velocity on each move
const VELOCITY_SAMPLE: f64 = 0.7;

/// Turns pointer start/move/end into an offset and a smoothed velocity
///
/// Positions are in pixels along the carousel axis, timestamps in
/// milliseconds. The velocity is an exponential moving average, which damps
/// the jitter of irregular pointer sampling intervals.
#[derive(Clone, Debug, Default)]
pub struct GestureTracker {
    start_x: f64,
    last_x: f64,
    last_time_ms: f64,
    velocity: f64,
    active: bool,
}

impl GestureTracker {
    /// Create an idle tracker
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a gesture at `x`; velocity resets to zero
    pub fn start(&mut self, x: f64, now_ms: f64) {
        self.start_x = x;
        self.last_x = x;
        self.last_time_ms = now_ms;
        self.velocity = 0.0;
        self.active = true;
    }

    /// Record a pointer move and return the raw offset from the gesture start
    ///
    /// Returns `None` when no gesture is active. Samples with a non-positive
    /// time delta update the position but not the velocity.
    pub fn update(&mut self, x: f64, now_ms: f64) -> Option<f64> {
        if !self.active {
            return None;
        }

        let dt = now_ms - self.last_time_ms;
        if dt > 0.0 {
            let instantaneous = (x - self.last_x) / dt;
            self.velocity = self.velocity * VELOCITY_RETAIN + instantaneous * VELOCITY_SAMPLE;
        }

        self.last_x = x;
        self.last_time_ms = now_ms;

        Some(x - self.start_x)
    }

    /// Finish the gesture and return the release velocity in px/ms
    pub fn end(&mut self) -> Option<f64> {
        if !self.active {
            return None;
        }
        self.active = false;
        Some(self.velocity)
    }

    /// Abandon the gesture without producing a release velocity
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Current smoothed velocity in px/ms
    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Whether a gesture is in progress
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }
}
