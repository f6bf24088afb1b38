//! End-to-end scenario tests exercising the full `Simulation`/`FireEngine`
//! surface rather than individual modules in isolation.

use sentry_core::config::{
    DetectionConfig, FireConfig, GridConfig, IncidentsConfig, PlannerConfig, ScaleConfig,
    SensorsConfig, SimConfig,
};
use sentry_core::fire::FireEngine;
use sentry_core::sensor::{Sensor, SensorPhase};
use sentry_core::planner::Rect;
use sentry_core::simulation::Simulation;
use sentry_core::Vec2;

fn isotropic_grid_fire() -> (GridConfig, FireConfig) {
    let grid = GridConfig { screen_w: 80.0, screen_h: 80.0, fire_cell_px: 8.0, base_radius: 16.0 };
    let fire = FireConfig {
        wind_speed: 0.0,
        slope_deg: 0.0,
        burn_duration: 1e9,
        fuel_mean: 1.0,
        fuel_var: 0.0,
        moist_live: 0.1,
        spot_chance: 0.0,
        barrier_density: 0.0,
        r0: 8.0,
        ..FireConfig::default()
    };
    (grid, fire)
}

/// S1. Isotropic spread: no directional bias, so the four cardinal
/// neighbors of the ignition point should ignite at comparable rates.
#[test]
fn s1_isotropic_spread_is_cardinally_balanced() {
    let incidents_cfg = IncidentsConfig::default();
    let mut cardinal_hits = [0u32; 4]; // east, west, north, south
    let trials = 200u64;

    for seed in 0..trials {
        let (grid, fire) = isotropic_grid_fire();
        let mut engine = FireEngine::new(&grid, &fire, seed);
        let (x, y) = engine.world.center_px(5, 5);
        engine.ignite(x, y, 1.0);
        for _ in 0..10 {
            engine.advance(0.1, &incidents_cfg);
        }
        let offsets = [(6, 5), (4, 5), (5, 4), (5, 6)];
        for (i, (gx, gy)) in offsets.into_iter().enumerate() {
            let idx = engine.world.idx(gx, gy);
            if engine.world.cell(idx).ever_burned {
                cardinal_hits[i] += 1;
            }
        }
    }

    let max = *cardinal_hits.iter().max().unwrap() as f32;
    let min = *cardinal_hits.iter().min().unwrap() as f32;
    if max > 0.0 {
        assert!((max - min) / max <= 0.15, "cardinal ignition counts {cardinal_hits:?} differ by more than 15%");
    }
}

/// S2. Wind bias: a strong eastward wind should make the east neighbor
/// ignite substantially more often than the west neighbor.
#[test]
fn s2_wind_bias_favors_downwind_neighbor() {
    let incidents_cfg = IncidentsConfig::default();
    let mut east_hits = 0u32;
    let mut west_hits = 0u32;
    let trials = 200u64;

    for seed in 0..trials {
        let (grid, mut fire) = isotropic_grid_fire();
        fire.wind_speed = 20.0;
        fire.wind_dir_deg = 0.0;
        fire.c_w = 0.1;
        fire.b_w = 1.0;
        let mut engine = FireEngine::new(&grid, &fire, seed);
        let (x, y) = engine.world.center_px(5, 5);
        engine.ignite(x, y, 1.0);
        for _ in 0..10 {
            engine.advance(0.1, &incidents_cfg);
        }
        if engine.world.cell(engine.world.idx(6, 5)).ever_burned {
            east_hits += 1;
        }
        if engine.world.cell(engine.world.idx(4, 5)).ever_burned {
            west_hits += 1;
        }
    }

    assert!(east_hits as f32 >= 2.0 * (west_hits as f32).max(1.0), "east={east_hits} west={west_hits}");
}

/// S3. Detection debounce: a sensor camped over a persistently burning
/// disc confirms exactly one incident after `det_confirm_time` and enters
/// HOLD.
#[test]
fn s3_detection_confirms_once_after_confirm_time() {
    let grid = GridConfig { screen_w: 400.0, screen_h: 400.0, fire_cell_px: 8.0, base_radius: 16.0 };
    let fire_cfg = FireConfig { burn_duration: 1e9, spot_chance: 0.0, barrier_density: 0.0, ..FireConfig::default() };
    let incidents_cfg = IncidentsConfig::default();
    let detection_cfg = DetectionConfig { det_min_frac: 0.01, det_confirm_time: 0.5, det_cooldown_s: 3.0 };
    let sensors_cfg = SensorsConfig::default();
    let planner_cfg = PlannerConfig::default();

    let mut fire = FireEngine::new(&grid, &fire_cfg, 1);
    let (cx, cy) = fire.world.center_px(20, 20);
    fire.ignite(cx, cy, 60.0);
    for _ in 0..5 {
        fire.advance(0.1, &incidents_cfg);
    }

    let sector = Rect { x0: 0.0, y0: 0.0, x1: 400.0, y1: 400.0 };
    let screen_rect = Rect { x0: 0.0, y0: 0.0, x1: 400.0, y1: 400.0 };
    let mut sensor = Sensor::new(0, Vec2::new(cx, cy), Vec2::new(200.0, 200.0), sector, screen_rect, &sensors_cfg, &planner_cfg, 7);
    sensor.phase = SensorPhase::Search;
    sensor.position = Vec2::new(cx, cy);

    let footprint_r = sentry_core::sensor::footprint_radius(&sensors_cfg);
    let mut confirmed_ticks = 0u32;
    let dt = 0.1;
    let ticks = ((detection_cfg.det_confirm_time / dt).ceil() as u32) + 1;
    for _ in 0..ticks {
        fire.advance(dt, &incidents_cfg);
        let outcome = sensor.tick_motion(dt, &sensors_cfg, &planner_cfg, &detection_cfg, footprint_r, |pos, r| {
            let (frac, hotspots) = fire.burning_fraction_in_disc(pos.x, pos.y, r);
            (frac, hotspots.into_iter().map(|(x, y)| Vec2::new(x, y)).collect())
        });
        if let sentry_core::sensor::TickOutcome::ConfirmDetection { .. } = outcome {
            confirmed_ticks += 1;
            let (id, _) = fire.register_incident(cx, cy, &incidents_cfg, 1.0);
            sensor.enter_hold(id);
        }
    }

    assert_eq!(confirmed_ticks, 1);
    assert_eq!(sensor.phase, SensorPhase::Hold);
}

/// S4. Merge: two registrations within `merge_radius` on the same tick
/// resolve to the same id, with `is_new = (true, false)`.
#[test]
fn s4_registrations_within_merge_radius_collapse_to_one_id() {
    let grid = GridConfig { screen_w: 200.0, screen_h: 200.0, fire_cell_px: 8.0, base_radius: 16.0 };
    let fire_cfg = FireConfig { barrier_density: 0.0, ..FireConfig::default() };
    let incidents_cfg = IncidentsConfig { merge_radius: 50.0, ..IncidentsConfig::default() };

    let mut fire = FireEngine::new(&grid, &fire_cfg, 2);
    let (cx, cy) = fire.world.center_px(10, 10);
    fire.ignite(cx, cy, 30.0);

    let (id1, is_new1) = fire.register_incident(cx, cy, &incidents_cfg, 1.0);
    let (id2, is_new2) = fire.register_incident(cx + 10.0, cy + 10.0, &incidents_cfg, 1.0);

    assert_eq!(id1, id2);
    assert_eq!((is_new1, is_new2), (true, false));
}

/// S5. Suppression gates spread: once an incident's zone goes live, its
/// tagged cluster stops spreading and extinguishes within the expected
/// quench-boosted window.
#[test]
fn s5_suppression_halts_spread_and_extinguishes_within_window() {
    let grid = GridConfig { screen_w: 160.0, screen_h: 160.0, fire_cell_px: 8.0, base_radius: 16.0 };
    let fire_cfg = FireConfig {
        burn_duration: 6.0,
        spot_chance: 0.0,
        barrier_density: 0.0,
        ..FireConfig::default()
    };
    let incidents_cfg = IncidentsConfig { stop_delay: 0.1, quench_boost: 6.0, merge_radius: 0.0, ..IncidentsConfig::default() };

    let mut fire = FireEngine::new(&grid, &fire_cfg, 3);
    let (cx, cy) = fire.world.center_px(10, 10);
    fire.ignite(cx, cy, 1.0);
    let (id, _) = fire.register_incident(cx, cy, &incidents_cfg, 1.0);

    let dt = 0.1;
    let max_ticks = (((fire_cfg.burn_duration / (1.0 + incidents_cfg.quench_boost)) / dt).ceil() as u32) + 5;
    let mut extinguished_at = None;
    for t in 0..max_ticks {
        fire.advance(dt, &incidents_cfg);
        if !fire.incident_is_active(id, 1.0) {
            extinguished_at = Some(t as f32 * dt);
            break;
        }
    }

    assert!(extinguished_at.is_some(), "incident never extinguished within the expected window");
    let expected_max = fire_cfg.burn_duration / (1.0 + incidents_cfg.quench_boost) + dt;
    assert!(extinguished_at.unwrap() <= expected_max + dt, "extinguished at {:?}, expected <= {expected_max}", extinguished_at);
}

/// S6. Low-energy RTB: a sensor whose remaining energy exactly covers the
/// trip home plus half its reserve transitions to RETURN on the next tick.
#[test]
fn s6_low_energy_triggers_return_on_next_tick() {
    let sensors_cfg = SensorsConfig::default();
    let planner_cfg = PlannerConfig::default();
    let sector = Rect { x0: 0.0, y0: 0.0, x1: 400.0, y1: 400.0 };
    let screen_rect = Rect { x0: 0.0, y0: 0.0, x1: 400.0, y1: 400.0 };
    let base = Vec2::new(200.0, 200.0);
    let spawn = Vec2::new(200.0, 200.0 - 120.0);

    let mut sensor = Sensor::new(0, spawn, base, sector, screen_rect, &sensors_cfg, &planner_cfg, 5);
    sensor.phase = SensorPhase::Search;
    sensor.position = spawn;
    let dist = (spawn - base).norm();
    sensor.energy_remaining = dist / sensors_cfg.speed + sensors_cfg.reserve_seconds / 2.0;

    let detection_cfg = DetectionConfig::default();
    let footprint_r = sentry_core::sensor::footprint_radius(&sensors_cfg);
    let _ = sensor.tick_motion(0.1, &sensors_cfg, &planner_cfg, &detection_cfg, footprint_r, |_, _| (0.0, Vec::new()));

    assert_eq!(sensor.phase, SensorPhase::Return);
}

/// Full-stack smoke test: a `Simulation` built from defaults runs for a few
/// seconds of sim-time without panicking and its summary is self-consistent.
#[test]
fn full_simulation_runs_and_summarizes() {
    let cfg = SimConfig { scale: ScaleConfig::default(), ..SimConfig::default() };
    let mut sim = Simulation::new(cfg).unwrap();
    for _ in 0..50 {
        sim.tick(0.1);
    }
    sim.stop();
    let summary = sim.summary();
    assert_eq!(summary.per_sensor_distance.len(), 4);
    assert!(summary.sim_time > 4.9);
}
