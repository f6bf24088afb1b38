//! The fire grid: per-cell state, terrain initialization, and the flat
//! row-major layout shared by the spread law and the incident tracker.

use crate::config::{FireConfig, GridConfig};
use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// The 8-connected neighborhood, `(dx, dy, distance multiplier)`. Diagonal
/// neighbors are `sqrt(2)` cell-widths away.
pub const NEIGHBORS8: [(i32, i32, f32); 8] = [
    (1, 0, 1.0),
    (-1, 0, 1.0),
    (0, 1, 1.0),
    (0, -1, 1.0),
    (1, 1, std::f32::consts::SQRT_2),
    (1, -1, std::f32::consts::SQRT_2),
    (-1, 1, std::f32::consts::SQRT_2),
    (-1, -1, std::f32::consts::SQRT_2),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    Unburned,
    Burning,
    Burned,
    Barrier,
}

/// One cell of the fire grid. `tag` is the owning incident id, or 0.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Cell {
    pub state: CellState,
    pub fuel: f32,
    pub moist: f32,
    pub burn_t: f32,
    pub t_ignited: f32,
    pub regen_t: f32,
    pub tag: u32,
    pub ever_burned: bool,
}

impl Cell {
    fn fresh(fuel: f32, moist: f32) -> Self {
        Self {
            state: CellState::Unburned,
            fuel,
            moist,
            burn_t: 0.0,
            t_ignited: f32::INFINITY,
            regen_t: 0.0,
            tag: 0,
            ever_burned: false,
        }
    }

    fn barrier() -> Self {
        Self {
            state: CellState::Barrier,
            fuel: 0.0,
            moist: 1.0,
            burn_t: 0.0,
            t_ignited: f32::INFINITY,
            regen_t: 0.0,
            tag: 0,
            ever_burned: false,
        }
    }
}

/// The fire grid: fixed dimensions, flat row-major cell storage.
#[derive(Debug, Clone)]
pub struct World {
    pub gw: usize,
    pub gh: usize,
    pub cell_px: f32,
    pub width_px: f32,
    pub height_px: f32,
    pub cells: Vec<Cell>,
}

impl World {
    pub fn new(grid: &GridConfig, fire: &FireConfig, rng: &mut StdRng) -> Self {
        let gw = ((grid.screen_w / grid.fire_cell_px).floor() as usize).max(1);
        let gh = ((grid.screen_h / grid.fire_cell_px).floor() as usize).max(1);
        let mut cells = Vec::with_capacity(gw * gh);
        for _ in 0..gw * gh {
            if rng.random::<f32>() < fire.barrier_density {
                cells.push(Cell::barrier());
            } else {
                let jitter = rng.random::<f32>() * 2.0 - 1.0;
                let fuel = (fire.fuel_mean + fire.fuel_var * jitter).max(0.1);
                cells.push(Cell::fresh(fuel, fire.moist_live.clamp(0.0, 1.0)));
            }
        }
        Self {
            gw,
            gh,
            cell_px: grid.fire_cell_px,
            width_px: gw as f32 * grid.fire_cell_px,
            height_px: gh as f32 * grid.fire_cell_px,
            cells,
        }
    }

    #[inline]
    pub fn idx(&self, gx: usize, gy: usize) -> usize {
        gy * self.gw + gx
    }

    #[inline]
    pub fn gxgy(&self, idx: usize) -> (usize, usize) {
        (idx % self.gw, idx / self.gw)
    }

    pub fn center_px(&self, gx: usize, gy: usize) -> (f32, f32) {
        ((gx as f32 + 0.5) * self.cell_px, (gy as f32 + 0.5) * self.cell_px)
    }

    /// Maps a world-space point to its containing cell, or `None` if the
    /// point lies outside the grid.
    pub fn world_to_cell(&self, x: f32, y: f32) -> Option<(usize, usize)> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let gx = (x / self.cell_px) as usize;
        let gy = (y / self.cell_px) as usize;
        if gx >= self.gw || gy >= self.gh {
            None
        } else {
            Some((gx, gy))
        }
    }

    pub fn cell(&self, idx: usize) -> &Cell {
        &self.cells[idx]
    }

    pub fn cell_mut(&mut self, idx: usize) -> &mut Cell {
        &mut self.cells[idx]
    }

    pub fn cell_area_m2(&self, meters_per_px: f32) -> f32 {
        let side = self.cell_px * meters_per_px;
        side * side
    }

    /// Visits the indices of every in-bounds cell whose center lies within
    /// `r` of `(x, y)`.
    pub fn indices_in_disc(&self, x: f32, y: f32, r: f32) -> Vec<usize> {
        if r < 0.0 {
            return Vec::new();
        }
        let gx0 = (((x - r) / self.cell_px).floor().max(0.0)) as usize;
        let gy0 = (((y - r) / self.cell_px).floor().max(0.0)) as usize;
        let gx1 = ((((x + r) / self.cell_px).ceil()) as usize).min(self.gw.saturating_sub(1));
        let gy1 = ((((y + r) / self.cell_px).ceil()) as usize).min(self.gh.saturating_sub(1));
        let r2 = r * r;
        let mut out = Vec::new();
        if self.gw == 0 || self.gh == 0 {
            return out;
        }
        for gy in gy0..=gy1.max(gy0) {
            for gx in gx0..=gx1.max(gx0) {
                let (cx, cy) = self.center_px(gx, gy);
                let dx = cx - x;
                let dy = cy - y;
                if dx * dx + dy * dy <= r2 {
                    out.push(self.idx(gx, gy));
                }
            }
        }
        out
    }

    /// Fraction of cells inside the disc that are currently BURNING, plus
    /// the centers of those burning cells ("hotspots").
    pub fn burning_fraction_in_disc(&self, x: f32, y: f32, r: f32) -> (f32, Vec<(f32, f32)>) {
        let indices = self.indices_in_disc(x, y, r);
        if indices.is_empty() {
            return (0.0, Vec::new());
        }
        let mut hotspots = Vec::new();
        let mut burning = 0usize;
        for idx in &indices {
            if self.cells[*idx].state == CellState::Burning {
                burning += 1;
                let (gx, gy) = self.gxgy(*idx);
                hotspots.push(self.center_px(gx, gy));
            }
        }
        (burning as f32 / indices.len() as f32, hotspots)
    }

    /// Counts and areas of a disc footprint, in cells and in real-world m².
    pub fn footprint_in_disc(&self, x: f32, y: f32, r: f32, meters_per_px: f32) -> Footprint {
        let indices = self.indices_in_disc(x, y, r);
        let cell_area = self.cell_area_m2(meters_per_px);
        let mut burning = 0usize;
        let mut burned = 0usize;
        for idx in &indices {
            match self.cells[*idx].state {
                CellState::Burning => burning += 1,
                CellState::Burned => burned += 1,
                _ => {}
            }
        }
        Footprint {
            inside_cells: indices.len(),
            burning_cells: burning,
            burned_cells: burned,
            area_m2_burning: burning as f32 * cell_area,
            area_m2_burned: burned as f32 * cell_area,
            area_m2_total: (burning + burned) as f32 * cell_area,
        }
    }

    /// Whether any BURNING cell carries `tag`.
    pub fn any_burning_with_tag(&self, tag: u32) -> bool {
        self.cells
            .iter()
            .any(|c| c.tag == tag && c.state == CellState::Burning)
    }

    /// Total burning+burned area (m²) of cells carrying `tag`.
    pub fn tag_footprint_area_m2(&self, tag: u32, meters_per_px: f32) -> f32 {
        let cell_area = self.cell_area_m2(meters_per_px);
        self.cells
            .iter()
            .filter(|c| c.tag == tag && matches!(c.state, CellState::Burning | CellState::Burned))
            .count() as f32
            * cell_area
    }

    /// Index of the BURNING cell nearest `(x, y)`, if any.
    pub fn nearest_burning(&self, x: f32, y: f32) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for idx in 0..self.cells.len() {
            if self.cells[idx].state != CellState::Burning {
                continue;
            }
            let (gx, gy) = self.gxgy(idx);
            let (cx, cy) = self.center_px(gx, gy);
            let d2 = (cx - x).powi(2) + (cy - y).powi(2);
            let better = match best {
                None => true,
                Some((_, bd2)) => d2 < bd2,
            };
            if better {
                best = Some((idx, d2));
            }
        }
        best.map(|(idx, _)| idx)
    }

    /// Earliest `t_ignited` among BURNING cells inside the disc.
    pub fn earliest_ignited_in_disc(&self, x: f32, y: f32, r: f32) -> Option<f32> {
        self.indices_in_disc(x, y, r)
            .into_iter()
            .filter(|idx| self.cells[*idx].state == CellState::Burning)
            .map(|idx| self.cells[idx].t_ignited)
            .fold(None, |acc, t| match acc {
                None => Some(t),
                Some(a) if t < a => Some(t),
                Some(a) => Some(a),
            })
    }
}

/// A disc footprint query result (see [`World::footprint_in_disc`]).
#[derive(Debug, Clone, Copy, Default)]
pub struct Footprint {
    pub inside_cells: usize,
    pub burning_cells: usize,
    pub burned_cells: usize,
    pub area_m2_burning: f32,
    pub area_m2_burned: f32,
    pub area_m2_total: f32,
}
