//! Pure functions implementing the directional spread law.
//!
//! The law is Rothermel-inspired but deliberately dimensionless: it is
//! tuned for plausible relative behavior (wind/slope bias, fuel and
//! moisture sensitivity), not a physically calibrated reconstruction.
//!
//! ```text
//! R = ros_scale * R0 * (1 + phi_w + phi_s) * fuel * dry
//! ```
//! where `phi_w` and `phi_s` are multiplicative wind and slope factors and
//! `dry` is a fuel-moisture dryness fraction.

use crate::Vec2;
use crate::config::FireConfig;

/// Normalizes `(dx, dy)`; returns the zero vector unchanged.
pub fn unit(dx: f32, dy: f32) -> Vec2 {
    let v = Vec2::new(dx, dy);
    let mag = v.norm();
    if mag <= 0.0 { Vec2::zeros() } else { v / mag }
}

/// Precomputed directional bias shared by every spread-law evaluation this
/// tick: wind and slope unit vectors plus their shape parameters.
#[derive(Debug, Clone, Copy)]
pub struct DirectionalBias {
    pub wind_unit: Vec2,
    pub wind_speed: f32,
    pub c_w: f32,
    pub b_w: f32,
    pub slope_unit: Vec2,
    pub tan_slope: f32,
    pub c_s: f32,
    pub b_s: f32,
}

impl DirectionalBias {
    pub fn from_config(cfg: &FireConfig) -> Self {
        let wind_rad = cfg.wind_dir_deg.to_radians();
        let slope_rad = cfg.slope_dir_deg.to_radians();
        Self {
            wind_unit: Vec2::new(wind_rad.cos(), wind_rad.sin()),
            wind_speed: cfg.wind_speed,
            c_w: cfg.c_w,
            b_w: cfg.b_w,
            slope_unit: Vec2::new(slope_rad.cos(), slope_rad.sin()),
            tan_slope: cfg.slope_deg.to_radians().tan(),
            c_s: cfg.c_s,
            b_s: cfg.b_s,
        }
    }
}

/// Directional rate of spread into a neighbor with the given `fuel`/`moist`.
pub fn rate_of_spread(
    dir: Vec2,
    fuel: f32,
    moist: f32,
    cfg: &FireConfig,
    bias: &DirectionalBias,
) -> f32 {
    let dry = (1.0 - moist / cfg.moist_ext).max(0.0);

    let cos_w = dir.dot(&bias.wind_unit).max(0.0);
    let phi_w = bias.c_w * bias.wind_speed.max(0.0).powf(bias.b_w) * cos_w.powf((bias.b_w / 2.0).max(1.0));

    let cos_s = dir.dot(&bias.slope_unit).max(0.0);
    let phi_s = bias.c_s * bias.tan_slope.powf(bias.b_s) * cos_s.powi(2);

    cfg.ros_scale * cfg.r0 * (1.0 + phi_w + phi_s) * fuel.max(0.0) * dry
}

/// Converts a rate of spread over a distance/timestep into an ignition
/// probability via a Poisson-process approximation.
pub fn ignition_probability(rate: f32, dt: f32, k_ignite: f32, dpx: f32) -> f32 {
    let lambda = k_ignite * rate * dt / dpx;
    1.0 - (-lambda.max(0.0)).exp()
}
