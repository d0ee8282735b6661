//! Data model for gridded and represented renewable-energy datasets
//!
//! Three dataset stages flow through the crate:
//!
//! - [`GriddedDataset`]: the high-resolution input, one capacity value and one
//!   capacity-factor time series per (longitude, latitude) grid cell
//! - [`RasterizedDataset`]: the gridded dataset extended with a boolean
//!   cell-to-region membership mask over a `region_ids` coordinate
//! - [`RepresentedDataset`]: the reduced output, a small number of
//!   representative time series and capacities per region
//!
//! The rasterized dataset is built once per invocation and read-only
//! thereafter; every region task reads it and produces its own private
//! [`RegionRepresentation`] fragment.

use crate::errors::{RepresentError, RepresentResult};
use indexmap::IndexMap;
use ndarray::{Array1, Array2, Array3};
use serde::{Deserialize, Serialize};

/// Float type used throughout the crate
pub type FloatValue = f64;

/// Configurable dimension, variable and column names
///
/// The gridded input and the polygon set identify their axes and fields by
/// name. The defaults match the common convention for gridded RE datasets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetNames {
    /// Longitude dimension name
    pub longitude: String,
    /// Latitude dimension name
    pub latitude: String,
    /// Time dimension name
    pub time: String,
    /// Capacity variable name
    pub capacity: String,
    /// Capacity-factor variable name
    pub capacity_factor: String,
    /// Region-id column in the polygon set
    pub index_col: String,
    /// Geometry column in the polygon set
    pub geometry_col: String,
}

impl Default for DatasetNames {
    fn default() -> Self {
        Self {
            longitude: "x".to_string(),
            latitude: "y".to_string(),
            time: "time".to_string(),
            capacity: "capacity".to_string(),
            capacity_factor: "capacity factor".to_string(),
            index_col: "region_ids".to_string(),
            geometry_col: "geometry".to_string(),
        }
    }
}

/// Policy for grid cells that fall inside more than one region geometry
///
/// Region geometries are not guaranteed non-overlapping. Under [`Allow`],
/// a cell belonging to several regions is counted in each of them (the
/// historical behaviour); under [`Reject`], building the rasterized dataset
/// fails on the first such cell.
///
/// [`Allow`]: OverlapPolicy::Allow
/// [`Reject`]: OverlapPolicy::Reject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverlapPolicy {
    /// Cells may belong to multiple regions and be double-counted
    #[default]
    Allow,
    /// Fail if any cell belongs to more than one region
    Reject,
}

/// High-resolution gridded RE dataset
///
/// Holds one time-invariant, non-negative `capacity` per grid cell and one
/// `capacity_factor` time series per cell. Capacity-factor values are only
/// meaningful where `capacity > 0`; elsewhere they may be zero or NaN.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GriddedDataset {
    /// Longitude coordinate values
    longitude: Array1<FloatValue>,
    /// Latitude coordinate values
    latitude: Array1<FloatValue>,
    /// Time coordinate values
    time: Array1<FloatValue>,
    /// Rated capacity per cell, shape (longitude, latitude)
    capacity: Array2<FloatValue>,
    /// Capacity factor per cell and time step, shape (longitude, latitude, time)
    capacity_factor: Array3<FloatValue>,
    /// Coordinate reference system descriptor, consumed only by the rasterizer
    crs: String,
    names: DatasetNames,
}

impl GriddedDataset {
    /// Create a gridded dataset, validating array shapes against the
    /// configured dimension names
    pub fn new(
        longitude: Array1<FloatValue>,
        latitude: Array1<FloatValue>,
        time: Array1<FloatValue>,
        capacity: Array2<FloatValue>,
        capacity_factor: Array3<FloatValue>,
        crs: impl Into<String>,
        names: DatasetNames,
    ) -> RepresentResult<Self> {
        let (n_x, n_y, n_t) = (longitude.len(), latitude.len(), time.len());

        if capacity.dim() != (n_x, n_y) {
            return Err(RepresentError::InputShape {
                kind: "variable",
                name: names.capacity.clone(),
                detail: format!(
                    "expected shape ({}, {}) over ({}, {}), got {:?}",
                    n_x,
                    n_y,
                    names.longitude,
                    names.latitude,
                    capacity.dim()
                ),
            });
        }
        if capacity_factor.dim() != (n_x, n_y, n_t) {
            return Err(RepresentError::InputShape {
                kind: "variable",
                name: names.capacity_factor.clone(),
                detail: format!(
                    "expected shape ({}, {}, {}) over ({}, {}, {}), got {:?}",
                    n_x,
                    n_y,
                    n_t,
                    names.longitude,
                    names.latitude,
                    names.time,
                    capacity_factor.dim()
                ),
            });
        }
        if n_t == 0 {
            return Err(RepresentError::InputShape {
                kind: "dimension",
                name: names.time.clone(),
                detail: "time axis is empty".to_string(),
            });
        }

        Ok(Self {
            longitude,
            latitude,
            time,
            capacity,
            capacity_factor,
            crs: crs.into(),
            names,
        })
    }

    pub fn longitude(&self) -> &Array1<FloatValue> {
        &self.longitude
    }

    pub fn latitude(&self) -> &Array1<FloatValue> {
        &self.latitude
    }

    pub fn time(&self) -> &Array1<FloatValue> {
        &self.time
    }

    pub fn capacity(&self) -> &Array2<FloatValue> {
        &self.capacity
    }

    pub fn capacity_factor(&self) -> &Array3<FloatValue> {
        &self.capacity_factor
    }

    pub fn crs(&self) -> &str {
        &self.crs
    }

    pub fn names(&self) -> &DatasetNames {
        &self.names
    }

    /// Number of time steps
    pub fn n_time_steps(&self) -> usize {
        self.time.len()
    }
}

/// Gridded dataset extended with a cell-to-region membership mask
///
/// `rasters[[x, y, r]]` is true when the centre of cell (x, y) falls inside
/// the geometry of region `r`. Built once per invocation (see
/// [`Rasterize`](crate::rasterize::Rasterize)) and read-only thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RasterizedDataset {
    grid: GriddedDataset,
    /// Membership mask, shape (longitude, latitude, region)
    rasters: Array3<bool>,
    /// Region ids, in mask order
    region_ids: Vec<String>,
}

impl RasterizedDataset {
    /// Attach a membership mask to a gridded dataset
    ///
    /// Validates the mask shape against the grid and, under
    /// [`OverlapPolicy::Reject`], that no cell belongs to more than one
    /// region.
    pub fn new(
        grid: GriddedDataset,
        rasters: Array3<bool>,
        region_ids: Vec<String>,
        overlap: OverlapPolicy,
    ) -> RepresentResult<Self> {
        let expected = (grid.longitude.len(), grid.latitude.len(), region_ids.len());
        if rasters.dim() != expected {
            return Err(RepresentError::InputShape {
                kind: "variable",
                name: "rasters".to_string(),
                detail: format!("expected shape {:?}, got {:?}", expected, rasters.dim()),
            });
        }

        if overlap == OverlapPolicy::Reject {
            for x in 0..expected.0 {
                for y in 0..expected.1 {
                    let count = (0..expected.2).filter(|&r| rasters[[x, y, r]]).count();
                    if count > 1 {
                        return Err(RepresentError::OverlappingRegions { x, y, count });
                    }
                }
            }
        }

        Ok(Self {
            grid,
            rasters,
            region_ids,
        })
    }

    pub fn grid(&self) -> &GriddedDataset {
        &self.grid
    }

    pub fn rasters(&self) -> &Array3<bool> {
        &self.rasters
    }

    pub fn region_ids(&self) -> &[String] {
        &self.region_ids
    }

    pub fn n_regions(&self) -> usize {
        self.region_ids.len()
    }
}

/// Representation of one region: per-cluster capacities and time series
///
/// In simple mode there is exactly one series and `ts_ids` is `None`; in
/// clustering mode there are K series labelled `TS_0..TS_{K-1}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionRepresentation {
    /// Aggregate capacity per series, length K
    pub capacities: Array1<FloatValue>,
    /// Representative capacity-factor series, shape (K, time)
    pub capacity_factors: Array2<FloatValue>,
    /// Series labels, present only in clustering mode
    pub ts_ids: Option<Vec<String>>,
}

impl RegionRepresentation {
    /// Number of representative series for this region
    pub fn n_series(&self) -> usize {
        self.capacities.len()
    }

    /// Total capacity across all series
    pub fn total_capacity(&self) -> FloatValue {
        self.capacities.sum()
    }
}

/// Final represented dataset, keyed by region id
///
/// Assembled by a keyed union over per-region fragments; insertion order
/// follows the submitted region order, never task completion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepresentedDataset {
    /// Time coordinate, shared by all regions
    time: Array1<FloatValue>,
    regions: IndexMap<String, RegionRepresentation>,
}

impl RepresentedDataset {
    /// Merge per-region fragments into one dataset
    ///
    /// The merge is a union keyed on region id. Every submitted region must
    /// appear exactly once; a missing or duplicated region is a
    /// [`MergeInconsistency`](RepresentError::MergeInconsistency).
    pub fn from_fragments(
        time: Array1<FloatValue>,
        fragments: Vec<(String, RegionRepresentation)>,
        submitted: &[String],
    ) -> RepresentResult<Self> {
        let mut by_region = IndexMap::with_capacity(fragments.len());
        for (region, fragment) in fragments {
            if by_region.insert(region, fragment).is_some() {
                return Err(RepresentError::MergeInconsistency {
                    expected: submitted.len(),
                    merged: by_region.len(),
                });
            }
        }

        // Re-key in submitted order regardless of arrival order
        let mut regions = IndexMap::with_capacity(submitted.len());
        for region in submitted {
            if let Some(fragment) = by_region.shift_remove(region) {
                regions.insert(region.clone(), fragment);
            }
        }

        if regions.len() != submitted.len() || !by_region.is_empty() {
            return Err(RepresentError::MergeInconsistency {
                expected: submitted.len(),
                merged: regions.len() + by_region.len(),
            });
        }

        Ok(Self { time, regions })
    }

    pub fn time(&self) -> &Array1<FloatValue> {
        &self.time
    }

    /// Region ids present in the output, in submitted order
    pub fn region_ids(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }

    pub fn get(&self, region: &str) -> Option<&RegionRepresentation> {
        self.regions.get(region)
    }

    pub fn n_regions(&self) -> usize {
        self.regions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RegionRepresentation)> {
        self.regions.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2, Array3};

    fn small_grid() -> GriddedDataset {
        GriddedDataset::new(
            array![0.0, 1.0],
            array![0.0],
            array![0.0, 1.0],
            Array2::from_elem((2, 1), 1.0),
            Array3::from_elem((2, 1, 2), 0.5),
            "EPSG:3035",
            DatasetNames::default(),
        )
        .unwrap()
    }

    #[test]
    fn gridded_dataset_shape_mismatch() {
        let result = GriddedDataset::new(
            array![0.0, 1.0],
            array![0.0],
            array![0.0, 1.0],
            Array2::from_elem((3, 1), 1.0), // wrong longitude extent
            Array3::from_elem((2, 1, 2), 0.5),
            "EPSG:3035",
            DatasetNames::default(),
        );
        assert!(matches!(
            result,
            Err(RepresentError::InputShape { name, .. }) if name == "capacity"
        ));
    }

    #[test]
    fn gridded_dataset_empty_time_axis() {
        let result = GriddedDataset::new(
            array![0.0, 1.0],
            array![0.0],
            Array1::zeros(0),
            Array2::from_elem((2, 1), 1.0),
            Array3::from_elem((2, 1, 0), 0.5),
            "EPSG:3035",
            DatasetNames::default(),
        );
        assert!(matches!(
            result,
            Err(RepresentError::InputShape { kind: "dimension", .. })
        ));
    }

    #[test]
    fn rasterized_dataset_mask_shape_checked() {
        let grid = small_grid();
        let result = RasterizedDataset::new(
            grid,
            Array3::from_elem((2, 1, 2), false),
            vec!["A".to_string()], // one id, two mask layers
            OverlapPolicy::Allow,
        );
        assert!(matches!(result, Err(RepresentError::InputShape { .. })));
    }

    #[test]
    fn overlap_rejected_when_configured() {
        let grid = small_grid();
        let mut rasters = Array3::from_elem((2, 1, 2), false);
        rasters[[0, 0, 0]] = true;
        rasters[[0, 0, 1]] = true; // cell (0, 0) in both regions

        let result = RasterizedDataset::new(
            grid.clone(),
            rasters.clone(),
            vec!["A".to_string(), "B".to_string()],
            OverlapPolicy::Reject,
        );
        assert!(matches!(
            result,
            Err(RepresentError::OverlappingRegions { x: 0, y: 0, count: 2 })
        ));

        // Same mask is fine when overlap is allowed
        let result = RasterizedDataset::new(
            grid,
            rasters,
            vec!["A".to_string(), "B".to_string()],
            OverlapPolicy::Allow,
        );
        assert!(result.is_ok());
    }

    fn fragment(capacity: FloatValue) -> RegionRepresentation {
        RegionRepresentation {
            capacities: array![capacity],
            capacity_factors: Array2::from_elem((1, 2), 0.5),
            ts_ids: None,
        }
    }

    #[test]
    fn merge_preserves_submitted_order() {
        let submitted = vec!["A".to_string(), "B".to_string()];
        // Fragments arrive out of order
        let fragments = vec![
            ("B".to_string(), fragment(2.0)),
            ("A".to_string(), fragment(1.0)),
        ];

        let merged =
            RepresentedDataset::from_fragments(array![0.0, 1.0], fragments, &submitted).unwrap();
        let ids: Vec<&str> = merged.region_ids().collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert_eq!(merged.get("A").unwrap().total_capacity(), 1.0);
    }

    #[test]
    fn merge_rejects_missing_region() {
        let submitted = vec!["A".to_string(), "B".to_string()];
        let fragments = vec![("A".to_string(), fragment(1.0))];

        let result = RepresentedDataset::from_fragments(array![0.0, 1.0], fragments, &submitted);
        assert!(matches!(
            result,
            Err(RepresentError::MergeInconsistency {
                expected: 2,
                merged: 1
            })
        ));
    }

    #[test]
    fn merge_rejects_duplicate_region() {
        let submitted = vec!["A".to_string()];
        let fragments = vec![
            ("A".to_string(), fragment(1.0)),
            ("A".to_string(), fragment(2.0)),
        ];

        let result = RepresentedDataset::from_fragments(array![0.0, 1.0], fragments, &submitted);
        assert!(matches!(result, Err(RepresentError::MergeInconsistency { .. })));
    }

    #[test]
    fn represented_dataset_roundtrips_through_serde() {
        let submitted = vec!["A".to_string()];
        let fragments = vec![("A".to_string(), fragment(4.0))];
        let merged =
            RepresentedDataset::from_fragments(array![0.0, 1.0], fragments, &submitted).unwrap();

        let json = serde_json::to_string(&merged).unwrap();
        let restored: RepresentedDataset = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.n_regions(), 1);
        assert_eq!(restored.get("A").unwrap().total_capacity(), 4.0);
    }
}
