//! The fire dynamics engine: ignition, wind/slope-biased spread, ember
//! spotting, burnout, recovery, and the incident tracker it hosts.

pub mod metrics;
pub mod spread;

use crate::config::{FireConfig, GridConfig, IncidentsConfig};
use crate::grid::{CellState, World, NEIGHBORS8};
use crate::incident::{Incident, IncidentTracker};
use crate::rng::rng_from;
use crate::grid::Footprint;
use metrics::{compute_local_metrics, compute_metrics, FireMetrics, LocalMetrics};
use rand::Rng;
use rand::rngs::StdRng;
use rustc_hash::FxHashSet;
use spread::{ignition_probability, rate_of_spread, unit, DirectionalBias};
use tracing::{debug, trace};

/// Amortization window for burned-cell recovery, in sim-seconds.
const RECOVER_BATCH_SECONDS: f32 = 0.25;

pub struct FireEngine {
    pub world: World,
    active: FxHashSet<u32>,
    rng: StdRng,
    sim_t: f32,
    regen_accum: f32,
    user_ignitions: u64,
    random_ignitions: u64,
    fire_cfg: FireConfig,
    bias: DirectionalBias,
    incidents: IncidentTracker,
    episode_active_prev: bool,
    episode_has_incident: bool,
    undetected_episodes: u64,
}

impl FireEngine {
    pub fn new(grid: &GridConfig, fire: &FireConfig, seed: u64) -> Self {
        let mut rng = rng_from(seed);
        let world = World::new(grid, fire, &mut rng);
        let bias = DirectionalBias::from_config(fire);
        debug!(gw = world.gw, gh = world.gh, "fire engine initialized");
        Self {
            world,
            active: FxHashSet::default(),
            rng,
            sim_t: 0.0,
            regen_accum: 0.0,
            user_ignitions: 0,
            random_ignitions: 0,
            fire_cfg: *fire,
            bias,
            incidents: IncidentTracker::new(),
            episode_active_prev: false,
            episode_has_incident: false,
            undetected_episodes: 0,
        }
    }

    pub fn sim_time(&self) -> f32 {
        self.sim_t
    }

    pub fn user_ignitions(&self) -> u64 {
        self.user_ignitions
    }

    pub fn random_ignitions(&self) -> u64 {
        self.random_ignitions
    }

    pub fn undetected_episodes(&self) -> u64 {
        self.undetected_episodes
    }

    pub fn incidents(&self) -> &IncidentTracker {
        &self.incidents
    }

    pub fn get_incident(&self, id: u64) -> Option<&Incident> {
        self.incidents.get(id)
    }

    /// Ignites every UNBURNED cell within `radius` of `(x, y)`. Cells
    /// outside the world are silently ignored. Counts one user ignition
    /// event regardless of how many cells actually ignite.
    pub fn ignite(&mut self, x: f32, y: f32, radius: f32) {
        self.user_ignitions += 1;
        for idx in self.world.indices_in_disc(x, y, radius) {
            if self.ignite_cell_at(idx) {
                self.active.insert(idx as u32);
            }
        }
    }

    /// With probability `lambda * dt`, ignites one uniformly random cell.
    pub fn sample_random_ignition(&mut self, lambda: f32, dt: f32) {
        if self.rng.random::<f32>() >= lambda * dt {
            return;
        }
        self.random_ignitions += 1;
        if self.world.gw == 0 || self.world.gh == 0 {
            return;
        }
        let gx = self.rng.random_range(0..self.world.gw);
        let gy = self.rng.random_range(0..self.world.gh);
        let idx = self.world.idx(gx, gy);
        if self.ignite_cell_at(idx) {
            self.active.insert(idx as u32);
        }
    }

    fn ignite_cell_at(&mut self, idx: usize) -> bool {
        let cell = self.world.cell_mut(idx);
        if cell.state != CellState::Unburned || cell.fuel <= 0.0 {
            return false;
        }
        cell.state = CellState::Burning;
        cell.burn_t = 0.0;
        cell.t_ignited = self.sim_t;
        true
    }

    pub fn burning_fraction_in_disc(&self, x: f32, y: f32, r: f32) -> (f32, Vec<(f32, f32)>) {
        self.world.burning_fraction_in_disc(x, y, r)
    }

    pub fn compute_metrics(&self, meters_per_px: f32) -> FireMetrics {
        compute_metrics(&self.world, meters_per_px)
    }

    pub fn compute_local_metrics(&self, x: f32, y: f32, r: f32, meters_per_px: f32) -> LocalMetrics {
        compute_local_metrics(&self.world, x, y, r, meters_per_px)
    }

    /// Read-only disc footprint query (counts + areas), for host-side
    /// display; the same query incident registration uses internally.
    pub fn footprint_in_disc(&self, x: f32, y: f32, r: f32, meters_per_px: f32) -> Footprint {
        self.world.footprint_in_disc(x, y, r, meters_per_px)
    }

    pub fn cell_area_m2(&self, meters_per_px: f32) -> f32 {
        self.world.cell_area_m2(meters_per_px)
    }

    pub fn px_to_m(&self, px: f32, meters_per_px: f32) -> f32 {
        px * meters_per_px
    }

    pub fn register_incident(&mut self, cx: f32, cy: f32, cfg: &IncidentsConfig, meters_per_px: f32) -> (u64, bool) {
        self.episode_has_incident = true;
        self.incidents.register(&self.world, self.sim_t, cx, cy, cfg, meters_per_px)
    }

    pub fn incident_is_active(&mut self, id: u64, meters_per_px: f32) -> bool {
        self.incidents.is_active(id, &self.world, self.sim_t, meters_per_px)
    }

    pub fn snapshot_finalize_open_incidents(&mut self, meters_per_px: f32) {
        self.incidents.snapshot_finalize_open_incidents(&self.world, self.sim_t, meters_per_px);
    }

    /// Advances the fire by one tick. Must be called exactly once per
    /// simulation step, after ignition injection.
    pub fn advance(&mut self, dt: f32, incidents_cfg: &IncidentsConfig) {
        let active_before = !self.active.is_empty();
        if !active_before && self.episode_active_prev && !self.episode_has_incident {
            self.undetected_episodes += 1;
        }
        if !active_before {
            self.episode_has_incident = false;
        }

        self.incidents.advance(dt, self.sim_t, &mut self.world);
        self.sim_t += dt;

        if self.active.is_empty() {
            self.recover_burned(dt);
            self.episode_active_prev = false;
            return;
        }

        let current: Vec<u32> = self.active.iter().copied().collect();
        let mut next_active: FxHashSet<u32> = FxHashSet::default();

        for idx in current {
            if self.world.cell(idx as usize).state != CellState::Burning {
                continue;
            }
            let tag = self.world.cell(idx as usize).tag;
            let tagged = self.incidents.is_tag_live(tag);
            let boost = if tagged { 1.0 + incidents_cfg.quench_boost } else { 1.0 };

            self.world.cell_mut(idx as usize).burn_t += dt * boost;
            if self.world.cell(idx as usize).burn_t >= self.fire_cfg.burn_duration {
                let cell = self.world.cell_mut(idx as usize);
                cell.state = CellState::Burned;
                cell.ever_burned = true;
                continue;
            }
            next_active.insert(idx);
            if tagged {
                continue;
            }

            self.spread_from(idx, dt, &mut next_active);
            if self.fire_cfg.spot_chance > 0.0 {
                self.attempt_ember_spot(idx, &mut next_active);
            }
        }

        self.active = next_active;
        self.recover_burned(dt);
        self.episode_active_prev = !self.active.is_empty();
        trace!(sim_t = self.sim_t, active = self.active.len(), "fire tick complete");
    }

    fn spread_from(&mut self, idx: u32, dt: f32, next_active: &mut FxHashSet<u32>) {
        let (gx, gy) = self.world.gxgy(idx as usize);
        for (dx, dy, mult) in NEIGHBORS8 {
            let nx = gx as i32 + dx;
            let ny = gy as i32 + dy;
            if nx < 0 || ny < 0 || nx >= self.world.gw as i32 || ny >= self.world.gh as i32 {
                continue;
            }
            let nidx = self.world.idx(nx as usize, ny as usize);
            if self.world.cell(nidx).state != CellState::Unburned {
                continue;
            }
            let dir = unit(dx as f32, dy as f32);
            let neighbor = *self.world.cell(nidx);
            let rate = rate_of_spread(dir, neighbor.fuel, neighbor.moist, &self.fire_cfg, &self.bias);
            let dpx = self.world.cell_px * mult;
            let p = ignition_probability(rate, dt, self.fire_cfg.k_ignite, dpx);
            if self.rng.random::<f32>() < p && self.ignite_cell_at(nidx) {
                next_active.insert(nidx as u32);
            }
        }
    }

    fn attempt_ember_spot(&mut self, idx: u32, next_active: &mut FxHashSet<u32>) {
        if self.rng.random::<f32>() >= self.fire_cfg.spot_chance {
            return;
        }
        let sign = |v: f32| -> i32 {
            if v > 0.2 {
                1
            } else if v < -0.2 {
                -1
            } else {
                0
            }
        };
        let dx = sign(self.bias.wind_unit.x);
        let dy = sign(self.bias.wind_unit.y);
        if dx == 0 && dy == 0 {
            return;
        }
        let max_cells = self.fire_cfg.spot_max_cells.max(1);
        let dist = self.rng.random_range(1..=max_cells) as i32;
        let (gx, gy) = self.world.gxgy(idx as usize);
        let nx = gx as i32 + dist * dx;
        let ny = gy as i32 + dist * dy;
        if nx < 0 || ny < 0 || nx >= self.world.gw as i32 || ny >= self.world.gh as i32 {
            return;
        }
        let nidx = self.world.idx(nx as usize, ny as usize);
        if self.ignite_cell_at(nidx) {
            next_active.insert(nidx as u32);
        }
    }

    fn recover_burned(&mut self, dt: f32) {
        self.regen_accum += dt;
        if self.regen_accum < RECOVER_BATCH_SECONDS {
            return;
        }
        let step = self.regen_accum;
        self.regen_accum = 0.0;

        for idx in 0..self.world.cells.len() {
            if self.world.cells[idx].state != CellState::Burned {
                continue;
            }
            self.world.cells[idx].regen_t += step;
            if self.world.cells[idx].regen_t >= self.fire_cfg.recover_t {
                let jitter = self.rng.random::<f32>() * 2.0 - 1.0;
                let fuel = (self.fire_cfg.fuel_mean + self.fire_cfg.fuel_var * jitter).max(0.1);
                let cell = &mut self.world.cells[idx];
                cell.state = CellState::Unburned;
                cell.fuel = fuel;
                cell.moist = self.fire_cfg.moist_live.clamp(0.0, 1.0);
                cell.burn_t = 0.0;
                cell.regen_t = 0.0;
                cell.tag = 0;
                // ever_burned is cumulative and is never cleared by recovery.
            }
        }
    }
}
