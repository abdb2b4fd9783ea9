//! Frame cadence and lifecycle.
//!
//! [`AnimationLoop`] is a host-agnostic state machine. The host owns the real
//! timer (a display-refresh callback, a headless tick) behind
//! [`FrameScheduler`] and calls back into the loop:
//!
//! ```text
//! Stopped --start()--> Running --stop()--> Stopped
//!                        |  on_frame(t): too early -> re-request, Dropped
//!                        |               otherwise -> step, draw, re-request
//! ```
//!
//! A loop built without a usable surface is disabled and never runs.
//! Pointer and resize events are only accepted while running; neither ever
//! draws on its own.

use crate::config::WaveConfig;
use crate::engine::WaveEngine;
use crate::surface::Surface;
use glam::DVec2;

/// Handle of one pending frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(pub u64);

/// Host-side source of frame callbacks.
///
/// `request_frame` arms exactly one future call to
/// [`AnimationLoop::on_frame`]; `cancel_frame` disarms it.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameToken;
    fn cancel_frame(&mut self, token: FrameToken);
}

/// What a frame callback did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Simulated and drew one frame.
    Rendered,
    /// Arrived sooner than the frame interval; re-armed without drawing.
    Dropped,
    /// Loop not running, or no request was pending.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Disabled,
    Stopped,
    Running { pending: Option<FrameToken> },
}

/// Drives a [`WaveEngine`] onto a [`Surface`] at a capped frame rate.
pub struct AnimationLoop<S, F> {
    surface: Option<S>,
    scheduler: F,
    engine: WaveEngine,
    state: LoopState,
    last_frame_ms: Option<f64>,
}

impl<S: Surface, F: FrameScheduler> AnimationLoop<S, F> {
    /// Builds a stopped loop.
    ///
    /// A missing or invalid surface yields a disabled loop: `start()` becomes
    /// a no-op and nothing is ever drawn.
    pub fn new(surface: Option<S>, scheduler: F, config: WaveConfig, seed: f64) -> Self {
        let surface = surface.filter(|s| s.is_valid());
        let (state, (width, height)) = match &surface {
            Some(s) => (LoopState::Stopped, s.size()),
            None => {
                tracing::warn!("no usable drawing surface, wave background disabled");
                (LoopState::Disabled, (0.0, 0.0))
            }
        };
        Self {
            engine: WaveEngine::new(config, seed, width, height),
            surface,
            scheduler,
            state,
            last_frame_ms: None,
        }
    }

    /// Stopped -> Running: sizes the lattice to the surface, attaches input
    /// handling and requests the first frame. No-op when running or disabled.
    pub fn start(&mut self) {
        match self.state {
            LoopState::Disabled => {
                tracing::debug!("start ignored, loop is disabled");
            }
            LoopState::Running { .. } => {}
            LoopState::Stopped => {
                if let Some(surface) = &self.surface {
                    let (width, height) = surface.size();
                    self.engine.resize(width, height);
                }
                self.last_frame_ms = None;
                let token = self.scheduler.request_frame();
                self.state = LoopState::Running {
                    pending: Some(token),
                };
                tracing::info!(
                    columns = self.engine.grid().columns(),
                    rows = self.engine.grid().rows(),
                    "wave animation started"
                );
            }
        }
    }

    /// Running -> Stopped: cancels the pending frame and detaches input
    /// handling. Idempotent.
    pub fn stop(&mut self) {
        if let LoopState::Running { pending } = self.state {
            if let Some(token) = pending {
                self.scheduler.cancel_frame(token);
            }
            self.state = LoopState::Stopped;
            tracing::info!("wave animation stopped");
        }
    }

    /// Handles one frame callback at host time `timestamp_ms`.
    pub fn on_frame(&mut self, timestamp_ms: f64) -> FrameOutcome {
        let LoopState::Running { pending: Some(_) } = self.state else {
            return FrameOutcome::Ignored;
        };

        if let Some(last) = self.last_frame_ms {
            if timestamp_ms - last < self.engine.config().frame_interval_ms {
                self.rearm();
                tracing::trace!(timestamp_ms, last, "frame dropped");
                return FrameOutcome::Dropped;
            }
        }

        self.last_frame_ms = Some(timestamp_ms);
        self.engine.step(timestamp_ms);
        if let Some(surface) = self.surface.as_mut() {
            self.engine.draw(surface);
        }
        self.rearm();
        FrameOutcome::Rendered
    }

    /// Pointer or touch move at absolute coordinates. Ignored unless running.
    pub fn on_pointer(&mut self, absolute: DVec2, surface_origin: DVec2) {
        if self.is_running() {
            self.engine.pointer_moved(absolute, surface_origin);
        }
    }

    /// Surface resize. Rebuilds the lattice for the next frame; never draws.
    /// Ignored unless running.
    pub fn on_resize(&mut self, width: f64, height: f64) {
        if self.is_running() {
            self.engine.resize(width, height);
        }
    }

    fn rearm(&mut self) {
        let token = self.scheduler.request_frame();
        self.state = LoopState::Running {
            pending: Some(token),
        };
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, LoopState::Running { .. })
    }

    pub fn is_disabled(&self) -> bool {
        self.state == LoopState::Disabled
    }

    /// Timestamp of the last frame that was simulated and drawn.
    pub fn last_frame_ms(&self) -> Option<f64> {
        self.last_frame_ms
    }

    pub fn engine(&self) -> &WaveEngine {
        &self.engine
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    /// Mutable surface access, e.g. for the host to resize its backing store.
    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut F {
        &mut self.scheduler
    }

    /// Consumes the loop, handing back the surface.
    pub fn into_surface(self) -> Option<S> {
        self.surface
    }
}

/// In-process scheduler for headless hosts and tests: requests queue up
/// until the host fires them.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next: u64,
    pending: Vec<FrameToken>,
    cancelled: usize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns the oldest pending request, if any. The host then
    /// calls [`AnimationLoop::on_frame`].
    pub fn fire(&mut self) -> Option<FrameToken> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Number of requests cancelled so far.
    pub fn cancelled(&self) -> usize {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameToken {
        self.next += 1;
        let token = FrameToken(self.next);
        self.pending.push(token);
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        let before = self.pending.len();
        self.pending.retain(|t| *t != token);
        self.cancelled += before - self.pending.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::recording::{Command, RecordingSurface};
    use serde_json::json;

    type TestLoop = AnimationLoop<RecordingSurface, ManualScheduler>;

    fn running_loop(width: f64, height: f64) -> TestLoop {
        let config = WaveConfig::from_json(&json!({"x_gap": 16, "y_gap": 40}));
        let mut anim = AnimationLoop::new(
            Some(RecordingSurface::new(width, height)),
            ManualScheduler::new(),
            config,
            0.42,
        );
        anim.start();
        anim
    }

    /// Fires the pending request, if any, at `t`.
    fn tick(anim: &mut TestLoop, t: f64) -> FrameOutcome {
        match anim.scheduler_mut().fire() {
            Some(_) => anim.on_frame(t),
            None => FrameOutcome::Ignored,
        }
    }

    fn clears(anim: &TestLoop) -> usize {
        anim.surface()
            .map(|s| s.count(|c| *c == Command::Clear))
            .unwrap_or(0)
    }

    #[test]
    fn start_builds_grid_and_requests_one_frame() {
        let anim = running_loop(320.0, 200.0);
        assert!(anim.is_running());
        assert_eq!(anim.engine().grid().columns(), 34);
        assert_eq!(anim.scheduler().pending(), 1);
    }

    #[test]
    fn start_twice_does_not_double_schedule() {
        let mut anim = running_loop(320.0, 200.0);
        anim.start();
        assert_eq!(anim.scheduler().pending(), 1);
    }

    #[test]
    fn frames_render_and_rearm() {
        let mut anim = running_loop(320.0, 200.0);
        assert_eq!(tick(&mut anim, 0.0), FrameOutcome::Rendered);
        assert_eq!(anim.scheduler().pending(), 1);
        assert_eq!(tick(&mut anim, 20.0), FrameOutcome::Rendered);
        assert_eq!(clears(&anim), 2);
        assert_eq!(anim.last_frame_ms(), Some(20.0));
    }

    #[test]
    fn early_callbacks_are_dropped_without_drawing() {
        let mut anim = running_loop(320.0, 200.0);
        assert_eq!(tick(&mut anim, 100.0), FrameOutcome::Rendered);
        assert_eq!(tick(&mut anim, 105.0), FrameOutcome::Dropped);
        assert_eq!(tick(&mut anim, 110.0), FrameOutcome::Dropped);
        assert_eq!(anim.scheduler().pending(), 1);
        assert_eq!(clears(&anim), 1);
        assert_eq!(tick(&mut anim, 117.0), FrameOutcome::Rendered);
        assert_eq!(anim.last_frame_ms(), Some(117.0));
    }

    #[test]
    fn high_refresh_host_is_capped() {
        let mut anim = running_loop(320.0, 200.0);
        // 144 Hz host for one second against the 60 fps cap.
        let rendered = (0..144)
            .map(|i| tick(&mut anim, i as f64 * 1000.0 / 144.0))
            .filter(|o| *o == FrameOutcome::Rendered)
            .count();
        assert!(rendered <= 61, "rendered {rendered} frames");
        assert!(rendered >= 40, "rendered {rendered} frames");
    }

    #[test]
    fn stop_twice_is_safe_and_halts_frames() {
        let mut anim = running_loop(320.0, 200.0);
        tick(&mut anim, 0.0);
        anim.stop();
        anim.stop();
        assert!(!anim.is_running());
        assert_eq!(anim.scheduler().pending(), 0);
        assert_eq!(anim.scheduler().cancelled(), 1);
        assert_eq!(tick(&mut anim, 50.0), FrameOutcome::Ignored);
        assert_eq!(anim.on_frame(100.0), FrameOutcome::Ignored);
        assert_eq!(clears(&anim), 1);
    }

    #[test]
    fn stale_callback_after_stop_is_ignored() {
        let mut anim = running_loop(320.0, 200.0);
        anim.stop();
        assert_eq!(anim.on_frame(16.0), FrameOutcome::Ignored);
        assert_eq!(clears(&anim), 0);
    }

    #[test]
    fn restart_after_stop_resumes() {
        let mut anim = running_loop(320.0, 200.0);
        tick(&mut anim, 1000.0);
        anim.stop();
        anim.start();
        assert_eq!(anim.last_frame_ms(), None);
        assert_eq!(tick(&mut anim, 5.0), FrameOutcome::Rendered);
    }

    #[test]
    fn missing_surface_disables_loop() {
        let mut anim: TestLoop = AnimationLoop::new(
            None,
            ManualScheduler::new(),
            WaveConfig::default(),
            1.0,
        );
        anim.start();
        assert!(anim.is_disabled());
        assert!(!anim.is_running());
        assert_eq!(anim.scheduler().pending(), 0);
        assert_eq!(anim.on_frame(0.0), FrameOutcome::Ignored);
        anim.stop();
    }

    #[test]
    fn invalid_surface_disables_loop() {
        let mut anim = AnimationLoop::new(
            Some(RecordingSurface::new(f64::NAN, 10.0)),
            ManualScheduler::new(),
            WaveConfig::default(),
            1.0,
        );
        anim.start();
        assert!(anim.is_disabled());
        assert!(anim.surface().is_none());
    }

    #[test]
    fn zero_sized_surface_runs_with_empty_grid() {
        let mut anim = running_loop(0.0, 0.0);
        assert!(anim.is_running());
        assert!(anim.engine().grid().is_empty());
        assert_eq!(tick(&mut anim, 0.0), FrameOutcome::Rendered);
        let surface = anim.surface().unwrap();
        assert_eq!(surface.commands, vec![Command::Clear]);
    }

    #[test]
    fn vanishing_gap_from_params_runs_with_empty_grid() {
        let config = WaveConfig::from_json(&json!({"x_gap": 1e-300}));
        let mut anim = AnimationLoop::new(
            Some(RecordingSurface::new(320.0, 200.0)),
            ManualScheduler::new(),
            config,
            0.42,
        );
        anim.start();
        assert!(anim.is_running());
        assert!(anim.engine().grid().is_empty());
        assert_eq!(tick(&mut anim, 0.0), FrameOutcome::Rendered);
        assert_eq!(anim.surface().unwrap().commands, vec![Command::Clear]);
    }

    #[test]
    fn resize_rebuilds_without_drawing() {
        let mut anim = running_loop(320.0, 200.0);
        anim.on_resize(640.0, 200.0);
        assert_eq!(anim.engine().grid().columns(), 54);
        assert_eq!(clears(&anim), 0);
        assert_eq!(anim.scheduler().pending(), 1);
    }

    #[test]
    fn events_are_ignored_while_stopped() {
        let mut anim = running_loop(320.0, 200.0);
        anim.stop();
        anim.on_pointer(DVec2::new(10.0, 10.0), DVec2::ZERO);
        anim.on_resize(10.0, 10.0);
        assert!(!anim.engine().pointer().initialized);
        assert_eq!(anim.engine().grid().columns(), 34);
    }

    #[test]
    fn pointer_events_reach_the_engine_relative_to_origin() {
        let mut anim = running_loop(320.0, 200.0);
        anim.on_pointer(DVec2::new(210.0, 130.0), DVec2::new(50.0, 30.0));
        assert_eq!(anim.engine().pointer().position, DVec2::new(160.0, 100.0));
    }

    #[test]
    fn into_surface_returns_drawn_surface() {
        let mut anim = running_loop(320.0, 200.0);
        tick(&mut anim, 0.0);
        let surface = anim.into_surface().unwrap();
        assert!(surface.commands.contains(&Command::Stroke));
    }
}
