//! Per-frame physics for every lattice point.
//!
//! Each point gets two independent displacements:
//! - a wave offset, recomputed from scratch every frame from the noise field
//!   plus a cheap ambient sinusoid;
//! - a cursor offset, integrated over frames as a damped spring that the
//!   pointer kicks when it passes nearby.

use crate::config::WaveConfig;
use crate::grid::Grid;
use crate::noise::NoiseField;
use crate::pointer::PointerTracker;
use glam::DVec2;

/// Gain from a noise sample (about [-1, 1]) to a drift angle in radians.
const NOISE_ANGLE_GAIN: f64 = 12.0;
/// Spatial frequency of the ambient sinusoid.
const AMBIENT_SPATIAL_FREQ: f64 = 0.01;
/// Pointer influence radius when the pointer is slow.
///
/// The radius grows with `smoothed_speed` only above this value, and
/// [`PointerTracker`](crate::pointer::PointerTracker) caps speed at
/// [`MAX_SPEED`](crate::pointer::MAX_SPEED), below it. Through the tracker the
/// radius therefore stays at this minimum; only a hand-set speed widens it.
pub const MIN_INTERACTION_RADIUS: f64 = 175.0;
/// Scales pointer impulses into velocity.
const FORCE: f64 = 0.00065;
/// Rate of the cosine distance falloff.
const FALLOFF_RATE: f64 = 0.001;

/// Advances every point of `grid` by one frame at `time_ms`.
///
/// `pointer` must already have been advanced for this frame. An empty grid
/// is a no-op.
pub fn step(
    grid: &mut Grid,
    pointer: &PointerTracker,
    noise: &NoiseField,
    config: &WaveConfig,
    time_ms: f64,
) {
    let ambient_phase = time_ms * config.ambient_speed;
    let radius = MIN_INTERACTION_RADIUS.max(pointer.smoothed_speed);
    let push = DVec2::new(pointer.angle.cos(), pointer.angle.sin())
        * radius
        * pointer.smoothed_speed
        * FORCE;
    let bound = DVec2::splat(config.max_cursor_move);

    let points = grid
        .base
        .iter()
        .zip(grid.wave.iter_mut())
        .zip(grid.cursor.iter_mut().zip(grid.velocity.iter_mut()));

    for ((&base, wave), (cursor, velocity)) in points {
        let angle = noise.sample(
            (base.x + time_ms * config.wave_speed_x) * config.noise_freq_x,
            (base.y + time_ms * config.wave_speed_y) * config.noise_freq_y,
        ) * NOISE_ANGLE_GAIN;
        let ambient = DVec2::new(
            (ambient_phase + base.y * AMBIENT_SPATIAL_FREQ).sin(),
            (ambient_phase + base.x * AMBIENT_SPATIAL_FREQ).cos(),
        ) * config.ambient_intensity;
        *wave = DVec2::new(
            angle.cos() * config.wave_amp_x,
            angle.sin() * config.wave_amp_y,
        ) + ambient;

        let dist = base.distance(pointer.smoothed_position);
        if dist < radius {
            let falloff = (dist * FALLOFF_RATE).cos() * (1.0 - dist / radius);
            *velocity += push * falloff;
        }

        *velocity += -*cursor * config.tension;
        *velocity *= config.friction;
        *cursor = (*cursor + *velocity).clamp(-bound, bound);
    }
}
