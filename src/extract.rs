//! Regional extraction of grid cells
//!
//! Given the rasterized dataset and one region, isolate the grid cells that
//! belong to that region, flatten the two spatial axes into a single cell
//! axis, and drop cells that cannot contribute to the aggregate: capacity
//! missing or not strictly positive, or any missing capacity-factor value.
//! The capacity and capacity-factor arrays are always filtered in lockstep.

use crate::dataset::{FloatValue, RasterizedDataset};
use crate::errors::{RepresentError, RepresentResult};
use ndarray::{Array1, Array2};

/// Filtered per-cell data for one region
///
/// `capacities[i]` and `capacity_factors.row(i)` refer to the same grid cell;
/// all capacities are strictly positive and all capacity factors finite.
#[derive(Debug, Clone)]
pub struct RegionalCells {
    /// Rated capacity per surviving cell, length n_cells
    pub capacities: Array1<FloatValue>,
    /// Capacity-factor series per surviving cell, shape (n_cells, time)
    pub capacity_factors: Array2<FloatValue>,
}

impl RegionalCells {
    /// Number of surviving cells in the region
    pub fn n_cells(&self) -> usize {
        self.capacities.len()
    }
}

/// Extract the usable grid cells of one region
///
/// Cells outside the region mask, cells with non-positive or missing
/// capacity, and cells with any missing capacity-factor value are dropped.
/// Zero surviving cells make every downstream aggregate undefined, so that
/// case is surfaced as [`EmptyRegion`](RepresentError::EmptyRegion) rather
/// than left to produce NaN output.
pub fn extract_region(
    rasterized: &RasterizedDataset,
    region_index: usize,
) -> RepresentResult<RegionalCells> {
    let region = &rasterized.region_ids()[region_index];
    let grid = rasterized.grid();
    let rasters = rasterized.rasters();

    let n_x = grid.longitude().len();
    let n_y = grid.latitude().len();
    let n_t = grid.n_time_steps();

    let mut capacities = Vec::new();
    let mut factors = Vec::new();

    // Flatten (longitude, latitude) into one cell axis, keeping both arrays
    // aligned cell for cell
    for x in 0..n_x {
        for y in 0..n_y {
            if !rasters[[x, y, region_index]] {
                continue;
            }

            let capacity = grid.capacity()[[x, y]];
            if !(capacity > 0.0) {
                continue;
            }

            let series = grid
                .capacity_factor()
                .slice(ndarray::s![x, y, ..])
                .to_owned();
            if series.iter().any(|v| !v.is_finite()) {
                continue;
            }

            capacities.push(capacity);
            factors.extend(series);
        }
    }

    let n_cells = capacities.len();
    log::debug!("Number of time series in {}: {}", region, n_cells);

    if n_cells == 0 {
        return Err(RepresentError::EmptyRegion {
            region: region.clone(),
        });
    }

    let capacity_factors = Array2::from_shape_vec((n_cells, n_t), factors)
        .map_err(|e| RepresentError::Error(e.to_string()))?;

    Ok(RegionalCells {
        capacities: Array1::from_vec(capacities),
        capacity_factors,
    })
}
