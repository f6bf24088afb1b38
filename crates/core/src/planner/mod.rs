//! Per-sensor belief-grid Monte-Carlo search planner.
//!
//! Each sensor owns one [`BeliefGrid`] over its "safe rectangle" (the
//! sector inset so that the full footprint disc stays inside it). The grid
//! is a flat, row-major, nonnegative mass field that always sums to 1.

use crate::Vec2;
use crate::config::PlannerConfig;
use rand::Rng;
use rand::rngs::StdRng;

/// An axis-aligned rectangle in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).max(0.0)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new((self.x0 + self.x1) * 0.5, (self.y0 + self.y1) * 0.5)
    }

    /// A sector shrunk by `margin` on every side, so a disc of that radius
    /// centered anywhere inside stays fully within the sector.
    pub fn inset(&self, margin: f32) -> Rect {
        Rect {
            x0: self.x0 + margin,
            y0: self.y0 + margin,
            x1: (self.x1 - margin).max(self.x0 + margin),
            y1: (self.y1 - margin).max(self.y0 + margin),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.width() <= 1.0 || self.height() <= 1.0
    }

    pub fn clamp_point(&self, x: f32, y: f32) -> (f32, f32) {
        (x.clamp(self.x0, self.x1), y.clamp(self.y0, self.y1))
    }

    pub fn clamp_vec(&self, p: Vec2) -> Vec2 {
        let (x, y) = self.clamp_point(p.x, p.y);
        Vec2::new(x, y)
    }
}

/// A sensor's discretized belief over its safe rectangle.
pub struct BeliefGrid {
    rect: Rect,
    cell_px: f32,
    nx: usize,
    ny: usize,
    mass: Vec<f32>,
}

impl BeliefGrid {
    pub fn new(rect: Rect, cell_px: f32) -> Self {
        let nx = ((rect.width() / cell_px).floor() as usize).max(1);
        let ny = ((rect.height() / cell_px).floor() as usize).max(1);
        let n = nx * ny;
        Self { rect, cell_px, nx, ny, mass: vec![1.0 / n as f32; n] }
    }

    fn idx(&self, i: usize, j: usize) -> usize {
        j * self.nx + i
    }

    fn cell_center(&self, i: usize, j: usize) -> (f32, f32) {
        (
            self.rect.x0 + (i as f32 + 0.5) * self.cell_px,
            self.rect.y0 + (j as f32 + 0.5) * self.cell_px,
        )
    }

    fn renormalize(&mut self) {
        let sum: f32 = self.mass.iter().sum();
        if sum <= 1e-12 {
            let uniform = 1.0 / self.mass.len() as f32;
            self.mass.iter_mut().for_each(|m| *m = uniform);
            tracing::warn!("belief grid mass collapsed; reset to uniform");
        } else {
            let inv = 1.0 / sum;
            self.mass.iter_mut().for_each(|m| *m *= inv);
        }
    }

    /// Applies an observation at `(x, y)` with footprint radius `r`:
    /// multiplies mass inside the disc by `1 - detect_strength`, renormalizes,
    /// then diffuses by `diffusion` over a 5-point stencil and renormalizes
    /// again.
    pub fn observe(&mut self, x: f32, y: f32, r: f32, detect_strength: f32, diffusion: f32) {
        let retain = (1.0 - detect_strength).max(0.0);
        let r2 = r * r;
        for j in 0..self.ny {
            for i in 0..self.nx {
                let (cx, cy) = self.cell_center(i, j);
                if (cx - x).powi(2) + (cy - y).powi(2) <= r2 {
                    let idx = self.idx(i, j);
                    self.mass[idx] *= retain;
                }
            }
        }
        self.renormalize();

        if diffusion > 0.0 {
            let mut next = vec![0.0f32; self.mass.len()];
            for j in 0..self.ny {
                for i in 0..self.nx {
                    let idx = self.idx(i, j);
                    let mut neighbor_sum = self.mass[idx];
                    let mut neighbor_count = 1usize;
                    for (di, dj) in [(-1i32, 0i32), (1, 0), (0, -1), (0, 1)] {
                        let ni = i as i32 + di;
                        let nj = j as i32 + dj;
                        if ni >= 0 && nj >= 0 && (ni as usize) < self.nx && (nj as usize) < self.ny {
                            neighbor_sum += self.mass[self.idx(ni as usize, nj as usize)];
                            neighbor_count += 1;
                        }
                    }
                    let mean = neighbor_sum / neighbor_count as f32;
                    next[idx] = (1.0 - diffusion) * self.mass[idx] + diffusion * mean;
                }
            }
            self.mass = next;
            self.renormalize();
        }
    }

    /// Sum of belief mass inside a disc of radius `r` centered at `(x, y)`.
    pub fn mass_in_disc(&self, x: f32, y: f32, r: f32) -> f32 {
        let r2 = r * r;
        let mut total = 0.0;
        for j in 0..self.ny {
            for i in 0..self.nx {
                let (cx, cy) = self.cell_center(i, j);
                if (cx - x).powi(2) + (cy - y).powi(2) <= r2 {
                    total += self.mass[self.idx(i, j)];
                }
            }
        }
        total
    }

    pub fn sum(&self) -> f32 {
        self.mass.iter().sum()
    }

    pub fn is_uniform(&self, epsilon: f32) -> bool {
        let uniform = 1.0 / self.mass.len() as f32;
        self.mass.iter().all(|m| (m - uniform).abs() <= epsilon)
    }

    /// Monte-Carlo target selection: samples `k` uniform candidates inside
    /// the safe rectangle, scores each by `gain - cost_per_px * distance`,
    /// and returns the argmax. Targets the rectangle center if the sector is
    /// degenerate.
    pub fn select_target(
        &self,
        rng: &mut StdRng,
        k: usize,
        footprint_r: f32,
        cost_per_px: f32,
        current: Vec2,
    ) -> Vec2 {
        if self.rect.is_degenerate() {
            return self.rect.center();
        }
        let mut best: Option<(Vec2, f32)> = None;
        for _ in 0..k.max(1) {
            let x = rng.random_range(self.rect.x0..=self.rect.x1);
            let y = rng.random_range(self.rect.y0..=self.rect.y1);
            let gain = self.mass_in_disc(x, y, footprint_r);
            let candidate = Vec2::new(x, y);
            let dist = (candidate - current).norm();
            let score = gain - cost_per_px * dist;
            let better = match best {
                None => true,
                Some((_, best_score)) => score > best_score,
            };
            if better {
                best = Some((candidate, score));
            }
        }
        best.map(|(pt, _)| pt).unwrap_or_else(|| self.rect.center())
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }
}

/// Bundles a belief grid with its own replan timer, matching
/// [`PlannerConfig::mc_replan_seconds`].
pub struct Planner {
    pub belief: BeliefGrid,
    pub replan_timer: f32,
}

impl Planner {
    pub fn new(rect: Rect, cfg: &PlannerConfig) -> Self {
        Self {
            belief: BeliefGrid::new(rect, cfg.mc_cell_px),
            replan_timer: 0.0,
        }
    }

    /// True when the sensor has arrived at `target` or the replan timer has
    /// expired.
    pub fn should_replan(&self, current: Vec2, target: Vec2, footprint_r: f32) -> bool {
        let arrival_radius = footprint_r.max(2.0);
        let dist2 = (current - target).norm_squared();
        dist2 <= arrival_radius * arrival_radius || self.replan_timer <= 0.0
    }

    pub fn replan(&mut self, rng: &mut StdRng, cfg: &PlannerConfig, footprint_r: f32, current: Vec2) -> Vec2 {
        self.replan_timer = cfg.mc_replan_seconds;
        self.belief.select_target(rng, cfg.mc_candidates, footprint_r, cfg.mc_cost_per_px, current)
    }
}
