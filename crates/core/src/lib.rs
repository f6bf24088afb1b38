//! Wildfire Sentry simulation core.
//!
//! Couples a stochastic cellular-automaton wildfire model with a fleet of
//! four autonomous aerial sensors that search for, confirm, and hold on
//! incidents using independent belief-grid Monte-Carlo planners.
//!
//! The crate has no rendering surface, no input/event source, and no
//! persistence of its own: a host application owns the driver loop and
//! calls [`Simulation::tick`] at a fixed timestep.

/// A 2D world-space vector or point; positions and motion throughout the
/// sensor fleet and planner are expressed in this type rather than raw
/// tuples.
pub type Vec2 = nalgebra::Vector2<f32>;

pub mod config;
pub mod fire;
pub mod grid;
pub mod incident;
pub mod planner;
pub mod rng;
pub mod sensor;
pub mod simulation;
pub mod summary;

pub use config::{ConfigError, SimConfig};
pub use grid::{CellState, World};
pub use incident::Incident;
pub use sensor::{Sensor, SensorPhase};
pub use simulation::Simulation;
pub use summary::RunSummary;
