//! Capacity-weighted aggregation of regional cells
//!
//! The reduction rule shared by both representation strategies: total
//! capacity is the sum of cell capacities, and the representative series is
//! the ratio of aggregate power to aggregate capacity at each time step.

use crate::dataset::FloatValue;
use crate::extract::RegionalCells;
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};

/// Aggregate a set of cells into one capacity and one time series
///
/// Returns `C = sum(c_i)` and `p(t) = sum(c_i * f_i(t)) / C`, the
/// capacity-weighted mean of the capacity factors. With `C == 0` the ratio
/// is undefined and NaN propagates, matching the numeric pipeline's
/// NaN-propagation convention; extraction guarantees this cannot happen for
/// a full region, but a caller-selected subset may be degenerate.
pub fn aggregate_cells(cells: &RegionalCells) -> (FloatValue, Array1<FloatValue>) {
    aggregate_subset(
        cells.capacities.view(),
        cells.capacity_factors.view(),
    )
}

/// The same reduction restricted to an arbitrary cell subset
///
/// Building block for per-cluster aggregation: `capacities` and rows of
/// `capacity_factors` must be aligned cell for cell.
pub fn aggregate_subset(
    capacities: ArrayView1<FloatValue>,
    capacity_factors: ArrayView2<FloatValue>,
) -> (FloatValue, Array1<FloatValue>) {
    let capacity_total = capacities.sum();

    // Power per cell and time step, summed over the cell axis
    let mut power_total = Array1::zeros(capacity_factors.len_of(Axis(1)));
    for (capacity, series) in capacities.iter().zip(capacity_factors.rows()) {
        power_total.zip_mut_with(&series, |p, f| *p += capacity * f);
    }

    (capacity_total, power_total / capacity_total)
}
