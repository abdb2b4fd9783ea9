//! Smoothed pointer position, speed and direction.
//!
//! Input events only record the latest raw position; [`PointerTracker::advance`]
//! runs once per simulated frame and derives everything else, so any number
//! of events within one frame coalesce into a single displacement.

use glam::DVec2;

/// Blend factor for the position follower and the speed follower.
pub const SMOOTHING: f64 = 0.1;
/// Upper bound on the smoothed speed, in surface units per frame.
pub const MAX_SPEED: f64 = 100.0;

/// Pointer state as seen by the simulator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointerTracker {
    /// Latest raw position, relative to the surface origin.
    pub position: DVec2,
    /// Exponentially smoothed follower of `position`.
    pub smoothed_position: DVec2,
    /// Raw position at the previous frame.
    pub last_position: DVec2,
    /// Displacement magnitude over the last frame.
    pub speed: f64,
    /// Smoothed, clamped `speed`.
    pub smoothed_speed: f64,
    /// Direction of the last displacement, radians.
    pub angle: f64,
    /// False until the first input event.
    pub initialized: bool,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an input event at absolute coordinates `absolute`, given the
    /// surface's absolute `origin`.
    ///
    /// The first event seeds the followers at the incoming position so the
    /// smoothing does not sweep in from the surface origin.
    pub fn on_input(&mut self, absolute: DVec2, origin: DVec2) {
        let local = absolute - origin;
        if !local.is_finite() {
            return;
        }
        self.position = local;
        if !self.initialized {
            self.smoothed_position = local;
            self.last_position = local;
            self.initialized = true;
        }
    }

    /// Advances the followers by one frame. Call exactly once per simulated frame.
    pub fn advance(&mut self) {
        self.smoothed_position += (self.position - self.smoothed_position) * SMOOTHING;

        let delta = self.position - self.last_position;
        self.speed = delta.length();
        self.smoothed_speed += (self.speed - self.smoothed_speed) * SMOOTHING;
        self.smoothed_speed = self.smoothed_speed.min(MAX_SPEED);
        self.angle = delta.y.atan2(delta.x);

        self.last_position = self.position;
    }

    /// Forgets in-flight motion after a layout change.
    ///
    /// Speed followers drop to zero and the next frame measures displacement
    /// from the current position. The smoothed position and the initialized
    /// flag survive: the pointer itself has not moved.
    pub fn reset_motion(&mut self) {
        self.speed = 0.0;
        self.smoothed_speed = 0.0;
        self.last_position = self.position;
    }
}
