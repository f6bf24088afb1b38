//! The four-sensor fleet: quadrant partitioning, ring spawn placement, and
//! the per-tick parallel-motion / sequential-commit pass.

use super::{footprint_radius, Sensor, TickOutcome};
use crate::Vec2;
use crate::config::{GridConfig, SimConfig};
use crate::fire::FireEngine;
use crate::planner::Rect;
use rayon::prelude::*;

/// Spawn-ring angles, one per sensor index, matching [`quadrants`]'s
/// top-left/top-right/bottom-left/bottom-right order. Angles are standard
/// math convention (0 deg = +x, counter-clockwise) evaluated over a
/// screen-y-down world, so "up" (negative y) is `sin(theta) < 0`: 225 deg
/// points up-left (TL), 315 up-right (TR), 135 down-left (BL), 45
/// down-right (BR).
const RING_ANGLES_DEG: [f32; 4] = [225.0, 315.0, 135.0, 45.0];

/// Spawn ring radius as a fraction of the base radius.
const RING_FRACTION: f32 = 0.66;

/// Splits the world into four quadrants around its screen midpoint, in the
/// same order as [`RING_ANGLES_DEG`]: top-left, top-right, bottom-left,
/// bottom-right.
fn quadrants(grid: &GridConfig) -> [Rect; 4] {
    let mx = grid.screen_w * 0.5;
    let my = grid.screen_h * 0.5;
    [
        Rect { x0: 0.0, y0: 0.0, x1: mx, y1: my },
        Rect { x0: mx, y0: 0.0, x1: grid.screen_w, y1: my },
        Rect { x0: 0.0, y0: my, x1: mx, y1: grid.screen_h },
        Rect { x0: mx, y0: my, x1: grid.screen_w, y1: grid.screen_h },
    ]
}

/// Outcome of one fleet-wide tick, for the caller to fold into a running
/// summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct FleetTickStats {
    pub dispatch_events: u64,
}

pub struct Fleet {
    sensors: Vec<Sensor>,
}

impl Fleet {
    pub fn new(cfg: &SimConfig, seeds: &[u64; 4]) -> Self {
        let base_pos = Vec2::new(cfg.grid.screen_w * 0.5, cfg.grid.screen_h * 0.5);
        let ring_r = RING_FRACTION * cfg.grid.base_radius;
        let sectors = quadrants(&cfg.grid);
        let footprint_r = footprint_radius(&cfg.sensors);
        let screen_rect = Rect { x0: 0.0, y0: 0.0, x1: cfg.grid.screen_w, y1: cfg.grid.screen_h }.inset(footprint_r);
        let sensors = (0..4)
            .map(|i| {
                let angle = RING_ANGLES_DEG[i].to_radians();
                let spawn = base_pos + ring_r * Vec2::new(angle.cos(), angle.sin());
                Sensor::new(i, spawn, base_pos, sectors[i], screen_rect, &cfg.sensors, &cfg.planner, seeds[i])
            })
            .collect();
        Self { sensors }
    }

    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    pub fn total_distance(&self) -> f32 {
        self.sensors.iter().map(|s| s.distance_accum).sum()
    }

    /// Advances every sensor by one tick. Motion and detection are computed
    /// against an immutable snapshot of `fire` in parallel across sensors;
    /// incident registration and release are then committed sequentially in
    /// sensor-index order, so ties (two sensors confirming within
    /// `merge_radius` on the same tick) always resolve to the lower index.
    pub fn advance(&mut self, dt: f32, fire: &mut FireEngine, cfg: &SimConfig) -> FleetTickStats {
        let footprint_r = footprint_radius(&cfg.sensors);

        let outcomes: Vec<TickOutcome> = {
            let fire_ro: &FireEngine = fire;
            self.sensors
                .par_iter_mut()
                .map(|sensor| {
                    sensor.tick_motion(dt, &cfg.sensors, &cfg.planner, &cfg.detection, footprint_r, |pos, r| {
                        let (frac, hotspots) = fire_ro.burning_fraction_in_disc(pos.x, pos.y, r);
                        (frac, hotspots.into_iter().map(|(x, y)| Vec2::new(x, y)).collect())
                    })
                })
                .collect()
        };

        let mut stats = FleetTickStats::default();
        for (i, outcome) in outcomes.into_iter().enumerate() {
            if let TickOutcome::ConfirmDetection { point } = outcome {
                let (id, is_new) = fire.register_incident(point.x, point.y, &cfg.incidents, cfg.scale.meters_per_px);
                if is_new {
                    stats.dispatch_events += 1;
                }
                self.sensors[i].enter_hold(id);
            }
        }

        for i in 0..self.sensors.len() {
            let Some(held_id) = self.sensors[i].held_incident_id else {
                continue;
            };
            if !fire.incident_is_active(held_id, cfg.scale.meters_per_px) {
                let should_return = self.sensors[i].should_return_now(&cfg.sensors);
                self.sensors[i].resume_search_or_return(should_return, &cfg.planner, footprint_r);
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::rng::split_seeds;

    fn fleet_and_fire() -> (Fleet, FireEngine, SimConfig) {
        let cfg = SimConfig::default();
        let seeds = split_seeds(cfg.seed, 5);
        let fire = FireEngine::new(&cfg.grid, &cfg.fire, seeds[0]);
        let sensor_seeds: [u64; 4] = [seeds[1], seeds[2], seeds[3], seeds[4]];
        let fleet = Fleet::new(&cfg, &sensor_seeds);
        (fleet, fire, cfg)
    }

    #[test]
    fn spawns_four_sensors_inside_their_quadrants() {
        let (fleet, _fire, cfg) = fleet_and_fire();
        let quads = quadrants(&cfg.grid);
        for (sensor, quad) in fleet.sensors().iter().zip(quads.iter()) {
            assert!(sensor.position.x >= quad.x0 && sensor.position.x <= quad.x1);
            assert!(sensor.position.y >= quad.y0 && sensor.position.y <= quad.y1);
        }
    }

    #[test]
    fn advance_accumulates_distance_and_never_panics() {
        let (mut fleet, mut fire, cfg) = fleet_and_fire();
        for _ in 0..20 {
            fleet.advance(0.1, &mut fire, &cfg);
        }
        assert!(fleet.total_distance() >= 0.0);
    }

    #[test]
    fn confirmed_detection_sends_sensor_into_hold() {
        let (mut fleet, mut fire, cfg) = fleet_and_fire();
        let (x, y) = fire.world.center_px(fire.world.gw / 2, fire.world.gh / 2);
        fire.ignite(x, y, cfg.incidents.monitor_radius);
        // Force sensor 0 onto the fire so detection confirms immediately.
        {
            let s = &mut fleet.sensors[0];
            s.position = Vec2::new(x, y);
            s.phase = super::super::SensorPhase::Search;
        }
        for _ in 0..200 {
            fire.advance(0.1, &cfg.incidents);
            fleet.advance(0.1, &mut fire, &cfg);
            if fleet.sensors()[0].held_incident_id.is_some() {
                break;
            }
        }
        assert!(fleet.sensors()[0].held_incident_id.is_some());
    }
}
