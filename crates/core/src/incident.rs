//! Incident registration, suppression, and extinguishment.
//!
//! Conceptually a sub-module of the fire engine: it never holds its own
//! handle back to the grid, so there is no ownership cycle between the two.
//! Every operation that needs grid access receives `&World`/`&mut World` as
//! an argument from the fire engine instead.

use crate::config::IncidentsConfig;
use crate::grid::{CellState, World, NEIGHBORS8};
use rustc_hash::FxHashSet;

/// A detected, merged, suppressed, and eventually extinguished fire event.
#[derive(Debug, Clone)]
pub struct Incident {
    pub id: u64,
    pub cx: f32,
    pub cy: f32,
    pub monitor_r: f32,
    pub delay: f32,
    pub zone_live: bool,
    /// Not yet extinguished. Set false exactly once, at extinguishment.
    pub active: bool,
    pub ignited_t: f32,
    pub detected_t: f32,
    pub suppressed_t: Option<f32>,
    pub extinguished_t: Option<f32>,
    pub detect_area: f32,
    pub final_area: Option<f32>,
    pub announced_suppressed: bool,
    pub announced_extinguished: bool,
}

/// Creates, merges, times, and extinguishes [`Incident`]s.
#[derive(Debug, Default)]
pub struct IncidentTracker {
    incidents: Vec<Incident>,
    next_id: u64,
    live_tags: FxHashSet<u32>,
    pub dispatch_count: u64,
    pub extinguished_count: u64,
    pub det_times: Vec<f32>,
    pub detect_areas: Vec<f32>,
    pub final_areas: Vec<f32>,
}

impl IncidentTracker {
    pub fn new() -> Self {
        Self { next_id: 1, ..Self::default() }
    }

    pub fn get(&self, id: u64) -> Option<&Incident> {
        self.incidents.iter().find(|i| i.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Incident> {
        self.incidents.iter()
    }

    pub fn is_tag_live(&self, tag: u32) -> bool {
        tag != 0 && self.live_tags.contains(&tag)
    }

    /// Registers a detection at `(cx, cy)`. Merges into the first open
    /// incident within `merge_radius`, in iteration order; callers must not
    /// depend on a more specific tie-break.
    pub fn register(
        &mut self,
        world: &World,
        sim_t: f32,
        cx: f32,
        cy: f32,
        cfg: &IncidentsConfig,
        meters_per_px: f32,
    ) -> (u64, bool) {
        if cfg.merge_radius > 0.0 {
            let r2 = cfg.merge_radius * cfg.merge_radius;
            for inc in &self.incidents {
                if !inc.active {
                    continue;
                }
                let d2 = (inc.cx - cx).powi(2) + (inc.cy - cy).powi(2);
                if d2 <= r2 {
                    return (inc.id, false);
                }
            }
        }

        let id = self.next_id;
        self.next_id += 1;

        let ignited_t = world
            .earliest_ignited_in_disc(cx, cy, cfg.monitor_radius)
            .unwrap_or(sim_t);
        let detect_area = world
            .footprint_in_disc(cx, cy, cfg.monitor_radius, meters_per_px)
            .area_m2_total;

        self.incidents.push(Incident {
            id,
            cx,
            cy,
            monitor_r: cfg.monitor_radius,
            delay: cfg.stop_delay,
            zone_live: false,
            active: true,
            ignited_t,
            detected_t: sim_t,
            suppressed_t: None,
            extinguished_t: None,
            detect_area,
            final_area: None,
            announced_suppressed: false,
            announced_extinguished: false,
        });
        self.det_times.push(sim_t);
        self.detect_areas.push(detect_area);

        (id, true)
    }

    /// Counts down pre-live incidents' dispatch delay; on elapse, labels the
    /// burning cluster and marks the incident suppressed (`zone_live`).
    pub fn advance(&mut self, dt: f32, sim_t: f32, world: &mut World) {
        for i in 0..self.incidents.len() {
            if !self.incidents[i].active || self.incidents[i].zone_live {
                continue;
            }
            self.incidents[i].delay -= dt;
            if self.incidents[i].delay <= 0.0 {
                self.incidents[i].zone_live = true;
                self.incidents[i].suppressed_t = Some(sim_t);
                label_cluster(world, &self.incidents[i]);
                self.live_tags.insert(self.incidents[i].id as u32);
                self.dispatch_count += 1;
            }
        }
    }

    /// Queries (and, where the zone is live, updates) an incident's
    /// liveness. Returns `false` for an unknown id; never panics.
    pub fn is_active(&mut self, id: u64, world: &World, sim_t: f32, meters_per_px: f32) -> bool {
        let Some(pos) = self.incidents.iter().position(|i| i.id == id) else {
            return false;
        };
        if !self.incidents[pos].active {
            return false;
        }
        if self.incidents[pos].zone_live {
            let tag = self.incidents[pos].id as u32;
            let any_burning = world.any_burning_with_tag(tag);
            if !any_burning && self.incidents[pos].extinguished_t.is_none() {
                let area = world.tag_footprint_area_m2(tag, meters_per_px);
                self.incidents[pos].extinguished_t = Some(sim_t);
                self.incidents[pos].final_area = Some(area);
                self.incidents[pos].active = false;
                self.final_areas.push(area);
                self.extinguished_count += 1;
                self.live_tags.remove(&tag);
            }
            any_burning
        } else {
            let (frac, _) = world.burning_fraction_in_disc(
                self.incidents[pos].cx,
                self.incidents[pos].cy,
                self.incidents[pos].monitor_r,
            );
            frac > 0.0
        }
    }

    pub fn mark_announced(&mut self, id: u64, suppressed: bool, extinguished: bool) {
        if let Some(inc) = self.incidents.iter_mut().find(|i| i.id == id) {
            if suppressed {
                inc.announced_suppressed = true;
            }
            if extinguished {
                inc.announced_extinguished = true;
            }
        }
    }

    /// Idempotently closes any incident still lacking `final_area`, using
    /// its tag footprint (or monitor-disc footprint if never suppressed).
    pub fn snapshot_finalize_open_incidents(&mut self, world: &World, sim_t: f32, meters_per_px: f32) {
        for i in 0..self.incidents.len() {
            if self.incidents[i].final_area.is_some() {
                continue;
            }
            let area = if self.incidents[i].zone_live {
                world.tag_footprint_area_m2(self.incidents[i].id as u32, meters_per_px)
            } else {
                world
                    .footprint_in_disc(self.incidents[i].cx, self.incidents[i].cy, self.incidents[i].monitor_r, meters_per_px)
                    .area_m2_total
            };
            self.incidents[i].final_area = Some(area);
            self.incidents[i].extinguished_t.get_or_insert(sim_t);
            self.incidents[i].active = false;
            self.final_areas.push(area);
        }
    }
}

/// Seeds from BURNING cells inside the monitor disc (falling back to the
/// single nearest BURNING cell), then floods outward over the 8-connected
/// BURNING region, tagging every reached cell with the incident id.
fn label_cluster(world: &mut World, inc: &Incident) {
    let mut seeds = world.indices_in_disc(inc.cx, inc.cy, inc.monitor_r);
    seeds.retain(|idx| world.cell(*idx).state == CellState::Burning);
    if seeds.is_empty() {
        if let Some(nearest) = world.nearest_burning(inc.cx, inc.cy) {
            seeds.push(nearest);
        }
    }

    let mut visited: FxHashSet<u32> = seeds.iter().map(|&i| i as u32).collect();
    let mut stack: Vec<u32> = seeds.iter().map(|&i| i as u32).collect();

    while let Some(idx) = stack.pop() {
        world.cell_mut(idx as usize).tag = inc.id as u32;
        let (gx, gy) = world.gxgy(idx as usize);
        for (dx, dy, _) in NEIGHBORS8 {
            let nx = gx as i32 + dx;
            let ny = gy as i32 + dy;
            if nx < 0 || ny < 0 || nx >= world.gw as i32 || ny >= world.gh as i32 {
                continue;
            }
            let nidx = world.idx(nx as usize, ny as usize) as u32;
            if visited.contains(&nidx) {
                continue;
            }
            if world.cell(nidx as usize).state == CellState::Burning {
                visited.insert(nidx);
                stack.push(nidx);
            }
        }
    }
}
