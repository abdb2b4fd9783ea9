//! The wave engine: everything one animated background owns.
//!
//! [`WaveEngine`] ties the noise field, the lattice and the pointer tracker
//! to one immutable [`WaveConfig`]. It knows nothing about frame timing or
//! host events; [`crate::animation::AnimationLoop`] drives it.

use crate::config::WaveConfig;
use crate::grid::Grid;
use crate::noise::NoiseField;
use crate::pointer::PointerTracker;
use crate::render;
use crate::simulator;
use crate::surface::Surface;
use glam::DVec2;

/// Owned simulation state for one wave field.
#[derive(Debug, Clone)]
pub struct WaveEngine {
    config: WaveConfig,
    noise: NoiseField,
    grid: Grid,
    pointer: PointerTracker,
}

impl WaveEngine {
    /// Creates an engine with a lattice sized for `width x height`.
    pub fn new(config: WaveConfig, seed: f64, width: f64, height: f64) -> Self {
        let grid = Grid::rebuild(width, height, config.x_gap, config.y_gap);
        Self {
            noise: NoiseField::new(seed),
            pointer: PointerTracker::new(),
            grid,
            config,
        }
    }

    /// Rebuilds the lattice for a new surface size and drops in-flight
    /// pointer motion. Does not draw.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.grid = Grid::rebuild(width, height, self.config.x_gap, self.config.y_gap);
        self.pointer.reset_motion();
    }

    /// Records a pointer or touch position in absolute coordinates.
    pub fn pointer_moved(&mut self, absolute: DVec2, origin: DVec2) {
        self.pointer.on_input(absolute, origin);
    }

    /// Replaces the noise tables. Grid and pointer state are untouched.
    pub fn reseed(&mut self, seed: f64) {
        self.noise.seed(seed);
    }

    /// Simulates one frame at `time_ms`: advances the pointer once, then every point.
    pub fn step(&mut self, time_ms: f64) {
        self.pointer.advance();
        simulator::step(
            &mut self.grid,
            &self.pointer,
            &self.noise,
            &self.config,
            time_ms,
        );
    }

    /// Clears `surface` and draws the current lattice.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        render::draw(&self.grid, surface, &self.config.stroke_style());
    }

    pub fn config(&self) -> &WaveConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn pointer(&self) -> &PointerTracker {
        &self.pointer
    }

    pub fn noise(&self) -> &NoiseField {
        &self.noise
    }
}
