//! The run-end summary: aggregates fire, incident, and fleet statistics
//! into the values a driver reports once a run stops.

use crate::fire::FireEngine;
use crate::sensor::fleet::Fleet;
use serde::Serialize;

/// Snapshot of run-wide outcomes, built once at (or near) the end of a run.
/// Output-only: serializable for a host to log or persist, never
/// deserialized back into a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub sim_time: f32,
    pub fires_detected: u64,
    pub avg_detect_time: f32,
    pub detect_times: Vec<f32>,
    pub detect_areas_m2: Vec<f32>,
    pub final_areas_m2: Vec<f32>,
    pub total_burned_ha: f32,
    pub total_scorched_ever_ha: f32,
    pub biggest_final_m2: f32,
    pub undetected_episodes: u64,
    pub dispatch_events: u64,
    pub extinguished_events: u64,
    pub user_ignitions: u64,
    pub per_sensor_distance: Vec<f32>,
}

impl RunSummary {
    pub fn build(fire: &FireEngine, fleet: &Fleet, dispatch_events: u64, meters_per_px: f32) -> Self {
        let incidents = fire.incidents();
        let metrics = fire.compute_metrics(meters_per_px);

        let avg_detect_time = if incidents.det_times.is_empty() {
            0.0
        } else {
            let total: f32 = incidents
                .iter()
                .map(|inc| inc.detected_t - inc.ignited_t)
                .sum();
            total / incidents.det_times.len() as f32
        };

        let biggest_final_m2 = incidents.final_areas.iter().copied().fold(0.0f32, f32::max);

        Self {
            sim_time: fire.sim_time(),
            fires_detected: incidents.det_times.len() as u64,
            avg_detect_time,
            detect_times: incidents.det_times.clone(),
            detect_areas_m2: incidents.detect_areas.clone(),
            final_areas_m2: incidents.final_areas.clone(),
            total_burned_ha: metrics.footprint_area_ha,
            total_scorched_ever_ha: metrics.scorched_area_ha,
            biggest_final_m2,
            undetected_episodes: fire.undetected_episodes(),
            dispatch_events,
            extinguished_events: incidents.extinguished_count,
            user_ignitions: fire.user_ignitions(),
            per_sensor_distance: fleet.sensors().iter().map(|s| s.distance_accum).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::simulation::Simulation;

    #[test]
    fn empty_run_has_zeroed_summary() {
        let sim = Simulation::new(SimConfig::default()).unwrap();
        let summary = sim.summary();
        assert_eq!(summary.fires_detected, 0);
        assert_eq!(summary.dispatch_events, 0);
        assert_eq!(summary.per_sensor_distance.len(), 4);
    }

    #[test]
    fn ticking_accumulates_sensor_distance() {
        let mut sim = Simulation::new(SimConfig::default()).unwrap();
        for _ in 0..30 {
            sim.tick(0.1);
        }
        let summary = sim.summary();
        assert!(summary.per_sensor_distance.iter().sum::<f32>() > 0.0);
    }
}
