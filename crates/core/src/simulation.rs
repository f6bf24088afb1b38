//! The top-level driver-facing entry point: couples the fire engine and the
//! sensor fleet and enforces the per-tick ordering contract.

use crate::config::{ConfigError, SimConfig};
use crate::fire::FireEngine;
use crate::rng::split_seeds;
use crate::sensor::fleet::Fleet;
use crate::summary::RunSummary;
use tracing::info;

/// One pending externally-requested ignition, queued until the next tick.
struct PendingIgnition {
    x: f32,
    y: f32,
    radius: f32,
}

/// Owns the fire engine and the sensor fleet. The driver constructs one
/// `Simulation` per run and calls [`Simulation::tick`] at a fixed timestep;
/// nothing inside blocks or performs I/O.
pub struct Simulation {
    config: SimConfig,
    fire: FireEngine,
    fleet: Fleet,
    pending_ignitions: Vec<PendingIgnition>,
    dispatch_events: u64,
    stopped: bool,
}

impl Simulation {
    /// Validates `config` and constructs the fire engine and fleet from it.
    /// Every stochastic subsystem derives its own seed from `config.seed` via
    /// a fixed-order split, so reseeding the configuration fully determines
    /// the run's trajectory.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let seeds = split_seeds(config.seed, 5);
        let fire = FireEngine::new(&config.grid, &config.fire, seeds[0]);
        let sensor_seeds: [u64; 4] = [seeds[1], seeds[2], seeds[3], seeds[4]];
        let fleet = Fleet::new(&config, &sensor_seeds);
        info!(seed = config.seed, "simulation initialized");
        Ok(Self {
            config,
            fire,
            fleet,
            pending_ignitions: Vec::new(),
            dispatch_events: 0,
            stopped: false,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn fire(&self) -> &FireEngine {
        &self.fire
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub fn sim_time(&self) -> f32 {
        self.fire.sim_time()
    }

    /// Queues an externally-requested ignition; counted toward user
    /// ignitions and injected at the start of the next [`Simulation::tick`].
    pub fn ignite_at(&mut self, x: f32, y: f32, radius: f32) {
        self.pending_ignitions.push(PendingIgnition { x, y, radius });
    }

    /// Finalizes every still-open incident against the current grid state.
    /// Idempotent; a stopped simulation still accepts `tick` calls, though a
    /// driver should not normally issue any after calling this.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.fire.snapshot_finalize_open_incidents(self.config.scale.meters_per_px);
        self.stopped = true;
        info!(sim_time = self.sim_time(), "simulation stopped");
    }

    /// Advances the whole system by one tick: drains queued ignitions, then
    /// advances the fire engine, then the sensor fleet, in that strict
    /// order. Fire dynamics observe the ignitions injected this tick; the
    /// fleet observes the grid state produced by fire dynamics this tick.
    pub fn tick(&mut self, dt: f32) {
        for pending in self.pending_ignitions.drain(..) {
            self.fire.ignite(pending.x, pending.y, pending.radius);
        }

        self.fire.advance(dt, &self.config.incidents);
        let stats = self.fleet.advance(dt, &mut self.fire, &self.config);
        self.dispatch_events += stats.dispatch_events;
    }

    /// Builds the run-end summary from current fire and fleet state. Does
    /// not itself finalize open incidents; call [`Simulation::stop`] first
    /// if final areas for still-open incidents are needed.
    pub fn summary(&self) -> RunSummary {
        RunSummary::build(&self.fire, &self.fleet, self.dispatch_events, self.config.scale.meters_per_px)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_config() {
        let mut cfg = SimConfig::default();
        cfg.grid.fire_cell_px = 0.0;
        assert!(Simulation::new(cfg).is_err());
    }

    #[test]
    fn ticks_advance_sim_clock() {
        let mut sim = Simulation::new(SimConfig::default()).unwrap();
        sim.tick(0.1);
        sim.tick(0.1);
        assert!((sim.sim_time() - 0.2).abs() < 1e-4);
    }

    #[test]
    fn queued_ignition_is_applied_next_tick() {
        let mut sim = Simulation::new(SimConfig::default()).unwrap();
        let cx = sim.config.grid.screen_w / 2.0;
        let cy = sim.config.grid.screen_h / 2.0;
        sim.ignite_at(cx, cy, 10.0);
        sim.tick(0.1);
        assert!(sim.fire().compute_metrics(1.0).burning_area_ha > 0.0);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut sim = Simulation::new(SimConfig::default()).unwrap();
        sim.tick(0.1);
        sim.stop();
        sim.stop();
    }
}
