#![deny(unsafe_code)]
//! Core of the driftlines ambient background.
//!
//! A lattice of points drifts on a seedable gradient-noise field and springs
//! away from a moving pointer; each column is drawn as a polyline onto a host
//! [`Surface`]. [`AnimationLoop`] paces frames and handles lifecycle,
//! [`WaveEngine`] owns the simulation state, and [`WaveConfig`] holds the
//! tunable constants.

pub mod animation;
pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod noise;
pub mod pointer;
pub mod render;
pub mod simulator;
pub mod surface;

pub use animation::{AnimationLoop, FrameOutcome, FrameScheduler, FrameToken, ManualScheduler};
pub use color::Srgb;
pub use config::WaveConfig;
pub use engine::WaveEngine;
pub use error::WaveError;
pub use grid::Grid;
pub use noise::NoiseField;
pub use pointer::PointerTracker;
pub use surface::{StrokeStyle, Surface};

pub use glam::DVec2;
