//! Explicit simulation configuration.
//!
//! Every tunable lives on [`SimConfig`]; there is no reflective or
//! environment-backed fallback anywhere in the core. Construction validates
//! every field up front so that a rejected configuration is the only error
//! path the rest of the crate ever has to consider.

use serde::{Deserialize, Serialize};
use std::fmt;

/// World geometry and the fixed cell size of the fire grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub screen_w: f32,
    pub screen_h: f32,
    pub fire_cell_px: f32,
    /// Radius of the central base/recharge station, in world units.
    pub base_radius: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            screen_w: 1280.0,
            screen_h: 720.0,
            fire_cell_px: 8.0,
            base_radius: 48.0,
        }
    }
}

/// Spread-law and terrain-generation parameters for the fire engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FireConfig {
    pub ros_scale: f32,
    pub r0: f32,
    pub k_ignite: f32,
    pub wind_speed: f32,
    pub wind_dir_deg: f32,
    pub c_w: f32,
    pub b_w: f32,
    pub slope_deg: f32,
    pub slope_dir_deg: f32,
    pub c_s: f32,
    pub b_s: f32,
    pub moist_live: f32,
    pub moist_ext: f32,
    pub fuel_mean: f32,
    pub fuel_var: f32,
    pub burn_duration: f32,
    pub barrier_density: f32,
    pub spot_chance: f32,
    pub spot_max_cells: u32,
    pub recover_t: f32,
}

impl Default for FireConfig {
    fn default() -> Self {
        Self {
            ros_scale: 0.5,
            r0: 8.0,
            k_ignite: 0.6,
            wind_speed: 8.0,
            wind_dir_deg: 25.0,
            c_w: 0.045,
            b_w: 1.4,
            slope_deg: 5.0,
            slope_dir_deg: 180.0,
            c_s: 0.08,
            b_s: 2.0,
            moist_live: 0.18,
            moist_ext: 0.35,
            fuel_mean: 1.0,
            fuel_var: 0.25,
            burn_duration: 18.0,
            barrier_density: 0.01,
            spot_chance: 0.0002,
            spot_max_cells: 10,
            recover_t: 25.0,
        }
    }
}

/// Incident merge/monitor/suppression geometry and timing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncidentsConfig {
    pub merge_radius: f32,
    pub monitor_radius: f32,
    pub suppress_radius: f32,
    pub stop_delay: f32,
    pub quench_boost: f32,
}

impl Default for IncidentsConfig {
    fn default() -> Self {
        Self {
            merge_radius: 100.0,
            monitor_radius: 140.0,
            suppress_radius: 90.0,
            stop_delay: 2.0,
            quench_boost: 6.0,
        }
    }
}

/// Per-sensor belief-grid Monte-Carlo planner parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    pub mc_cell_px: f32,
    pub mc_candidates: usize,
    pub mc_replan_seconds: f32,
    pub mc_cost_per_px: f32,
    pub mc_detect_strength: f32,
    pub mc_diffusion: f32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            mc_cell_px: 16.0,
            mc_candidates: 60,
            mc_replan_seconds: 0.7,
            mc_cost_per_px: 0.0008,
            mc_detect_strength: 0.85,
            mc_diffusion: 0.06,
        }
    }
}

/// Motion, footprint, and duty-cycle parameters shared by all four sensors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorsConfig {
    pub speed: f32,
    pub footprint_angle_deg: f32,
    pub altitude: f32,
    pub start_delay: f32,
    pub work_t: f32,
    pub charge_t: f32,
    pub jitter_frac: f32,
    pub return_threshold: f32,
    pub reserve_seconds: f32,
}

impl Default for SensorsConfig {
    fn default() -> Self {
        Self {
            speed: 80.0,
            footprint_angle_deg: 90.0,
            altitude: 90.0,
            start_delay: 2.0,
            work_t: 25.0,
            charge_t: 3.0,
            jitter_frac: 0.25,
            return_threshold: 0.20,
            reserve_seconds: 3.0,
        }
    }
}

/// Detection debounce thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    pub det_min_frac: f32,
    pub det_confirm_time: f32,
    pub det_cooldown_s: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            det_min_frac: 0.010,
            det_confirm_time: 0.50,
            det_cooldown_s: 3.0,
        }
    }
}

/// Real-world unit scale, used only for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleConfig {
    pub meters_per_px: f32,
    pub sim_to_real_min_per_sec: Option<f32>,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            meters_per_px: 1.0,
            sim_to_real_min_per_sec: Some(10.0 / 3.0),
        }
    }
}

/// The complete, explicit configuration for one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub grid: GridConfig,
    pub fire: FireConfig,
    pub incidents: IncidentsConfig,
    pub planner: PlannerConfig,
    pub sensors: SensorsConfig,
    pub detection: DetectionConfig,
    pub scale: ScaleConfig,
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            fire: FireConfig::default(),
            incidents: IncidentsConfig::default(),
            planner: PlannerConfig::default(),
            sensors: SensorsConfig::default(),
            detection: DetectionConfig::default(),
            scale: ScaleConfig::default(),
            seed: 2024,
        }
    }
}

/// A configuration value that was rejected at construction time.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    NonFinite { field: &'static str, value: f64 },
    OutOfRange { field: &'static str, value: f64, reason: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NonFinite { field, value } => {
                write!(f, "field `{field}` is not finite: {value}")
            }
            ConfigError::OutOfRange { field, value, reason } => {
                write!(f, "field `{field}` = {value} is out of range: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { field, value: value as f64 })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value: value as f64, reason: "must be > 0" })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value: value as f64, reason: "must be >= 0" })
    }
}

impl SimConfig {
    /// Validates every field, rejecting non-finite numerics, negative radii,
    /// and a zero cell size before any subsystem is constructed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("grid.screen_w", self.grid.screen_w)?;
        positive("grid.screen_h", self.grid.screen_h)?;
        positive("grid.fire_cell_px", self.grid.fire_cell_px)?;
        non_negative("grid.base_radius", self.grid.base_radius)?;

        non_negative("fire.ros_scale", self.fire.ros_scale)?;
        non_negative("fire.r0", self.fire.r0)?;
        non_negative("fire.k_ignite", self.fire.k_ignite)?;
        non_negative("fire.wind_speed", self.fire.wind_speed)?;
        finite("fire.wind_dir_deg", self.fire.wind_dir_deg)?;
        non_negative("fire.c_w", self.fire.c_w)?;
        non_negative("fire.b_w", self.fire.b_w)?;
        finite("fire.slope_deg", self.fire.slope_deg)?;
        finite("fire.slope_dir_deg", self.fire.slope_dir_deg)?;
        non_negative("fire.c_s", self.fire.c_s)?;
        non_negative("fire.b_s", self.fire.b_s)?;
        non_negative("fire.moist_live", self.fire.moist_live)?;
        positive("fire.moist_ext", self.fire.moist_ext)?;
        non_negative("fire.fuel_mean", self.fire.fuel_mean)?;
        non_negative("fire.fuel_var", self.fire.fuel_var)?;
        positive("fire.burn_duration", self.fire.burn_duration)?;
        non_negative("fire.barrier_density", self.fire.barrier_density)?;
        non_negative("fire.spot_chance", self.fire.spot_chance)?;
        positive("fire.recover_t", self.fire.recover_t)?;

        non_negative("incidents.merge_radius", self.incidents.merge_radius)?;
        non_negative("incidents.monitor_radius", self.incidents.monitor_radius)?;
        non_negative("incidents.suppress_radius", self.incidents.suppress_radius)?;
        non_negative("incidents.stop_delay", self.incidents.stop_delay)?;
        non_negative("incidents.quench_boost", self.incidents.quench_boost)?;

        positive("planner.mc_cell_px", self.planner.mc_cell_px)?;
        if self.planner.mc_candidates == 0 {
            return Err(ConfigError::OutOfRange {
                field: "planner.mc_candidates",
                value: 0.0,
                reason: "must be > 0",
            });
        }
        non_negative("planner.mc_replan_seconds", self.planner.mc_replan_seconds)?;
        non_negative("planner.mc_cost_per_px", self.planner.mc_cost_per_px)?;
        finite("planner.mc_detect_strength", self.planner.mc_detect_strength)?;
        non_negative("planner.mc_diffusion", self.planner.mc_diffusion)?;

        positive("sensors.speed", self.sensors.speed)?;
        positive("sensors.footprint_angle_deg", self.sensors.footprint_angle_deg)?;
        if self.sensors.footprint_angle_deg >= 180.0 {
            return Err(ConfigError::OutOfRange {
                field: "sensors.footprint_angle_deg",
                value: self.sensors.footprint_angle_deg as f64,
                reason: "must be < 180",
            });
        }
        positive("sensors.altitude", self.sensors.altitude)?;
        non_negative("sensors.start_delay", self.sensors.start_delay)?;
        positive("sensors.work_t", self.sensors.work_t)?;
        positive("sensors.charge_t", self.sensors.charge_t)?;
        non_negative("sensors.jitter_frac", self.sensors.jitter_frac)?;
        non_negative("sensors.return_threshold", self.sensors.return_threshold)?;
        non_negative("sensors.reserve_seconds", self.sensors.reserve_seconds)?;

        non_negative("detection.det_min_frac", self.detection.det_min_frac)?;
        positive("detection.det_confirm_time", self.detection.det_confirm_time)?;
        non_negative("detection.det_cooldown_s", self.detection.det_cooldown_s)?;

        positive("scale.meters_per_px", self.scale.meters_per_px)?;
        if let Some(rate) = self.scale.sim_to_real_min_per_sec {
            positive("scale.sim_to_real_min_per_sec", rate)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_cell_size() {
        let mut cfg = SimConfig::default();
        cfg.grid.fire_cell_px = 0.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::OutOfRange { .. })));
    }

    #[test]
    fn rejects_negative_radius() {
        let mut cfg = SimConfig::default();
        cfg.incidents.merge_radius = -1.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::OutOfRange { .. })));
    }

    #[test]
    fn rejects_non_finite() {
        let mut cfg = SimConfig::default();
        cfg.fire.wind_speed = f32::NAN;
        assert!(matches!(cfg.validate(), Err(ConfigError::NonFinite { .. })));
    }
}
