//! A single autonomous sensor's state machine and motion.

pub mod fleet;

use crate::Vec2;
use crate::config::{DetectionConfig, PlannerConfig, SensorsConfig};
use crate::planner::{Planner, Rect};
use crate::rng::rng_from;
use rand::Rng;
use rand::rngs::StdRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorPhase {
    Approach,
    Search,
    Hold,
    Return,
    Recharge,
}

/// Footprint radius of a sensor's field of view: `altitude * tan(fov / 2)`.
pub fn footprint_radius(cfg: &SensorsConfig) -> f32 {
    cfg.altitude * (cfg.footprint_angle_deg.to_radians() / 2.0).tan()
}

pub struct Sensor {
    pub id: usize,
    pub position: Vec2,
    pub phase: SensorPhase,
    pub target: Vec2,
    pub energy_remaining: f32,
    pub energy_period: f32,
    pub recharge_timer: f32,
    pub held_incident_id: Option<u64>,
    pub det_hold: f32,
    pub det_cooldown: f32,
    pub distance_accum: f32,
    pub start_delay_remaining: f32,

    sector: Rect,
    /// Full arena bounds inset by the footprint radius; APPROACH clamps to
    /// this, not to `sector` — only SEARCH is confined to the sector.
    screen_rect: Rect,
    base_pos: Vec2,
    planner: Planner,
    rng: StdRng,
}

/// Outcome of a sensor's per-tick motion/detection pass, computed against
/// an immutable fire-engine snapshot so it can run in parallel with its
/// siblings. Incident-tracker mutation is deferred to the fleet's
/// sequential pass.
pub enum TickOutcome {
    None,
    ConfirmDetection { point: Vec2 },
}

impl Sensor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: usize,
        spawn_pos: Vec2,
        base_pos: Vec2,
        sector: Rect,
        screen_rect: Rect,
        cfg: &SensorsConfig,
        planner_cfg: &PlannerConfig,
        seed: u64,
    ) -> Self {
        let footprint_r = footprint_radius(cfg);
        let safe_rect = sector.inset(footprint_r);
        Self {
            id,
            position: spawn_pos,
            phase: SensorPhase::Approach,
            target: safe_rect.center(),
            energy_remaining: cfg.work_t,
            energy_period: cfg.work_t,
            recharge_timer: 0.0,
            held_incident_id: None,
            det_hold: 0.0,
            det_cooldown: 0.0,
            distance_accum: 0.0,
            start_delay_remaining: cfg.start_delay,
            sector,
            screen_rect,
            base_pos,
            planner: Planner::new(safe_rect, planner_cfg),
            rng: rng_from(seed),
        }
    }

    pub fn safe_rect(&self) -> Rect {
        self.planner.belief.rect()
    }

    pub fn should_return_now(&self, sensors_cfg: &SensorsConfig) -> bool {
        if matches!(self.phase, SensorPhase::Return | SensorPhase::Recharge) {
            return false;
        }
        if self.energy_period <= 0.0 {
            return true;
        }
        let by_fraction = self.energy_remaining / self.energy_period <= sensors_cfg.return_threshold;
        let dist_to_base = (self.position - self.base_pos).norm();
        let by_reserve = self.energy_remaining <= dist_to_base / sensors_cfg.speed + sensors_cfg.reserve_seconds;
        by_fraction || by_reserve
    }

    /// Advances this sensor's motion, belief, and detection debounce for one
    /// tick against a read-only fire snapshot. Does not mutate shared
    /// incident state; returns a pending detection for the fleet to commit.
    #[allow(clippy::too_many_arguments)]
    pub fn tick_motion(
        &mut self,
        dt: f32,
        sensors_cfg: &SensorsConfig,
        planner_cfg: &PlannerConfig,
        detection_cfg: &DetectionConfig,
        footprint_r: f32,
        burning_fraction_in_disc: impl Fn(Vec2, f32) -> (f32, Vec<Vec2>),
    ) -> TickOutcome {
        if !matches!(self.phase, SensorPhase::Recharge) {
            self.energy_remaining -= dt;
        }

        if self.det_cooldown > 0.0 {
            self.det_cooldown = (self.det_cooldown - dt).max(0.0);
        }

        match self.phase {
            SensorPhase::Recharge => {
                self.recharge_timer -= dt;
                if self.recharge_timer <= 0.0 {
                    let jitter = self.rng.random::<f32>() * 2.0 - 1.0;
                    self.energy_period = (sensors_cfg.work_t * (1.0 + sensors_cfg.jitter_frac * jitter)).max(2.0);
                    self.energy_remaining = self.energy_period;
                    self.phase = SensorPhase::Approach;
                    self.target = self.safe_rect().center();
                }
                TickOutcome::None
            }
            SensorPhase::Return => {
                let step = sensors_cfg.speed * dt;
                let (new_pos, arrived) = step_toward(self.position, self.base_pos, step);
                self.accumulate_distance(new_pos);
                self.position = new_pos;
                if arrived {
                    self.phase = SensorPhase::Recharge;
                    self.recharge_timer = sensors_cfg.charge_t;
                }
                TickOutcome::None
            }
            SensorPhase::Hold => {
                // Position is fixed while holding; energy still drains, but
                // low-energy RTB is deferred until the fleet releases this
                // sensor back to search (confirmed detections take priority).
                TickOutcome::None
            }
            SensorPhase::Approach => {
                let mut remaining_dt = dt;
                if self.start_delay_remaining > 0.0 {
                    if self.start_delay_remaining >= remaining_dt {
                        self.start_delay_remaining -= remaining_dt;
                        return TickOutcome::None;
                    }
                    remaining_dt -= self.start_delay_remaining;
                    self.start_delay_remaining = 0.0;
                }

                let step = sensors_cfg.speed * remaining_dt;
                let (new_pos, _) = step_toward(self.position, self.target, step);
                let clamped = self.screen_rect.clamp_vec(new_pos);
                self.accumulate_distance(clamped);
                self.position = clamped;

                self.planner.belief.observe(self.position.x, self.position.y, footprint_r, planner_cfg.mc_detect_strength, planner_cfg.mc_diffusion);

                if self.safe_rect().clamp_vec(self.position) == self.position {
                    self.phase = SensorPhase::Search;
                    self.target = self.planner.replan(&mut self.rng, planner_cfg, footprint_r, self.position);
                }

                if self.should_return_now(sensors_cfg) {
                    self.phase = SensorPhase::Return;
                    return TickOutcome::None;
                }

                self.detect(dt, footprint_r, detection_cfg, &burning_fraction_in_disc)
            }
            SensorPhase::Search => {
                let step = sensors_cfg.speed * dt;
                let (new_pos, _) = step_toward(self.position, self.target, step);
                let clamped = self.safe_rect().clamp_vec(new_pos);
                self.accumulate_distance(clamped);
                self.position = clamped;

                self.planner.belief.observe(self.position.x, self.position.y, footprint_r, planner_cfg.mc_detect_strength, planner_cfg.mc_diffusion);
                self.planner.replan_timer -= dt;

                if self.planner.should_replan(self.position, self.target, footprint_r) {
                    self.target = self.planner.replan(&mut self.rng, planner_cfg, footprint_r, self.position);
                }

                if self.should_return_now(sensors_cfg) {
                    self.phase = SensorPhase::Return;
                    return TickOutcome::None;
                }

                self.detect(dt, footprint_r, detection_cfg, &burning_fraction_in_disc)
            }
        }
    }

    fn detect(
        &mut self,
        dt: f32,
        footprint_r: f32,
        cfg: &DetectionConfig,
        burning_fraction_in_disc: &impl Fn(Vec2, f32) -> (f32, Vec<Vec2>),
    ) -> TickOutcome {
        if self.det_cooldown > 0.0 {
            return TickOutcome::None;
        }
        let (fraction, hotspots) = burning_fraction_in_disc(self.position, footprint_r);
        if fraction >= cfg.det_min_frac {
            self.det_hold += dt;
        } else {
            self.det_hold = 0.0;
        }

        if self.det_hold >= cfg.det_confirm_time {
            self.det_hold = 0.0;
            self.det_cooldown = cfg.det_cooldown_s;
            let point = centroid(&hotspots).unwrap_or(self.position);
            return TickOutcome::ConfirmDetection { point };
        }
        TickOutcome::None
    }

    /// Called by the fleet after a confirmed detection has been registered
    /// against the incident tracker.
    pub fn enter_hold(&mut self, incident_id: u64) {
        self.phase = SensorPhase::Hold;
        self.held_incident_id = Some(incident_id);
    }

    /// Called by the fleet once the held incident is reported inactive.
    pub fn resume_search_or_return(&mut self, should_return: bool, planner_cfg: &PlannerConfig, footprint_r: f32) {
        self.held_incident_id = None;
        if should_return {
            self.phase = SensorPhase::Return;
        } else {
            self.phase = SensorPhase::Search;
            self.target = self.planner.replan(&mut self.rng, planner_cfg, footprint_r, self.position);
        }
    }

    fn accumulate_distance(&mut self, new_pos: Vec2) {
        self.distance_accum += (new_pos - self.position).norm();
    }
}

/// Steps from `from` toward `to` by at most `max_step`. Returns the new
/// position and whether it reached (or passed) the target this step.
fn step_toward(from: Vec2, to: Vec2, max_step: f32) -> (Vec2, bool) {
    let delta = to - from;
    let d = delta.norm();
    if d <= max_step || d <= 1e-6 {
        (to, true)
    } else {
        (from + delta / d * max_step, false)
    }
}

fn centroid(points: &[Vec2]) -> Option<Vec2> {
    if points.is_empty() {
        return None;
    }
    let sum = points.iter().fold(Vec2::zeros(), |acc, p| acc + p);
    Some(sum / points.len() as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_toward_reaches_when_close() {
        let (pos, reached) = step_toward(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), 5.0);
        assert_eq!(pos, Vec2::new(1.0, 0.0));
        assert!(reached);
    }

    #[test]
    fn step_toward_moves_partially_when_far() {
        let (pos, reached) = step_toward(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), 2.0);
        assert_eq!(pos, Vec2::new(2.0, 0.0));
        assert!(!reached);
    }

    #[test]
    fn centroid_of_empty_is_none() {
        assert!(centroid(&[]).is_none());
    }

    #[test]
    fn centroid_averages_points() {
        let c = centroid(&[Vec2::new(0.0, 0.0), Vec2::new(2.0, 4.0)]).unwrap();
        assert_eq!(c, Vec2::new(1.0, 2.0));
    }

    #[test]
    fn should_return_now_true_when_energy_fraction_low() {
        let cfg = SensorsConfig { return_threshold: 0.2, ..SensorsConfig::default() };
        let sector = Rect { x0: 0.0, y0: 0.0, x1: 100.0, y1: 100.0 };
        let screen_rect = Rect { x0: 0.0, y0: 0.0, x1: 600.0, y1: 600.0 };
        let planner_cfg = PlannerConfig::default();
        let mut sensor = Sensor::new(0, Vec2::new(50.0, 50.0), Vec2::new(500.0, 500.0), sector, screen_rect, &cfg, &planner_cfg, 1);
        sensor.phase = SensorPhase::Search;
        sensor.energy_period = 25.0;
        sensor.energy_remaining = 4.0;
        assert!(sensor.should_return_now(&cfg));
    }

    #[test]
    fn should_return_now_suppressed_during_return_and_recharge() {
        let cfg = SensorsConfig::default();
        let sector = Rect { x0: 0.0, y0: 0.0, x1: 100.0, y1: 100.0 };
        let screen_rect = Rect { x0: 0.0, y0: 0.0, x1: 600.0, y1: 600.0 };
        let planner_cfg = PlannerConfig::default();
        let mut sensor = Sensor::new(0, Vec2::new(50.0, 50.0), Vec2::new(500.0, 500.0), sector, screen_rect, &cfg, &planner_cfg, 1);
        sensor.energy_remaining = 0.0;
        sensor.phase = SensorPhase::Return;
        assert!(!sensor.should_return_now(&cfg));
        sensor.phase = SensorPhase::Recharge;
        assert!(!sensor.should_return_now(&cfg));
    }
}
