//! Read-only grid-wide and local statistics.

use crate::grid::{CellState, World};

/// Grid-wide statistics, areas reported in hectares.
#[derive(Debug, Clone, Copy, Default)]
pub struct FireMetrics {
    pub perimeter_m: f32,
    pub burning_area_ha: f32,
    /// Cumulative area ever burned, including recovered cells.
    pub scorched_area_ha: f32,
    /// Current burning + burned footprint (excludes recovered cells).
    pub footprint_area_ha: f32,
}

/// Statistics scoped to a disc, areas reported in hectares.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalMetrics {
    pub burning_cells: usize,
    pub burned_cells: usize,
    pub burning_area_ha: f32,
    pub burned_area_ha: f32,
}

const M2_PER_HA: f32 = 10_000.0;

pub fn compute_metrics(world: &World, meters_per_px: f32) -> FireMetrics {
    let cell_area = world.cell_area_m2(meters_per_px);
    let mut burning = 0usize;
    let mut burned = 0usize;
    let mut scorched = 0usize;
    let mut perim_edges = 0usize;

    for idx in 0..world.cells.len() {
        let cell = &world.cells[idx];
        if cell.state == CellState::Burning {
            burning += 1;
        }
        if cell.state == CellState::Burned {
            burned += 1;
        }
        if cell.ever_burned {
            scorched += 1;
        }
        if matches!(cell.state, CellState::Burning | CellState::Burned) {
            let (gx, gy) = world.gxgy(idx);
            for (dx, dy, mult) in crate::grid::NEIGHBORS8 {
                if mult != 1.0 {
                    continue;
                }
                let nx = gx as i32 + dx;
                let ny = gy as i32 + dy;
                let is_boundary = if nx < 0 || ny < 0 || nx >= world.gw as i32 || ny >= world.gh as i32 {
                    true
                } else {
                    !matches!(world.cells[world.idx(nx as usize, ny as usize)].state, CellState::Burning | CellState::Burned)
                };
                if is_boundary {
                    perim_edges += 1;
                }
            }
        }
    }

    FireMetrics {
        perimeter_m: perim_edges as f32 * world.cell_px * meters_per_px,
        burning_area_ha: burning as f32 * cell_area / M2_PER_HA,
        scorched_area_ha: scorched as f32 * cell_area / M2_PER_HA,
        footprint_area_ha: (burning + burned) as f32 * cell_area / M2_PER_HA,
    }
}

pub fn compute_local_metrics(world: &World, x: f32, y: f32, r: f32, meters_per_px: f32) -> LocalMetrics {
    let fp = world.footprint_in_disc(x, y, r, meters_per_px);
    LocalMetrics {
        burning_cells: fp.burning_cells,
        burned_cells: fp.burned_cells,
        burning_area_ha: fp.area_m2_burning / M2_PER_HA,
        burned_area_ha: fp.area_m2_burned / M2_PER_HA,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FireConfig, GridConfig};
    use crate::rng::rng_from;

    #[test]
    fn metrics_on_empty_grid_are_zero() {
        let grid = GridConfig { screen_w: 40.0, screen_h: 40.0, fire_cell_px: 8.0, base_radius: 8.0 };
        let fire = FireConfig { barrier_density: 0.0, ..FireConfig::default() };
        let world = World::new(&grid, &fire, &mut rng_from(7));
        let m = compute_metrics(&world, 1.0);
        assert_eq!(m.burning_area_ha, 0.0);
        assert_eq!(m.scorched_area_ha, 0.0);
    }

    #[test]
    fn one_burning_cell_has_perimeter() {
        let grid = GridConfig { screen_w: 40.0, screen_h: 40.0, fire_cell_px: 8.0, base_radius: 8.0 };
        let fire = FireConfig { barrier_density: 0.0, ..FireConfig::default() };
        let mut world = World::new(&grid, &fire, &mut rng_from(7));
        let idx = world.idx(2, 2);
        world.cells[idx].state = CellState::Burning;
        let m = compute_metrics(&world, 1.0);
        assert!(m.perimeter_m > 0.0);
        assert!(m.burning_area_ha > 0.0);
    }
}
