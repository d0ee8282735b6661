//! Rasterization seam
//!
//! Converting a vector polygon set into a cell-to-region membership mask is
//! the job of an external collaborator (shapefile reading, CRS reprojection,
//! point-in-polygon tests). The core only consumes the result, so the
//! collaborator is specified as the [`Rasterize`] trait: anything that can
//! turn a [`GriddedDataset`] into a [`RasterizedDataset`].
//!
//! [`BoundingBoxRasterizer`] is the bundled implementation for tests and
//! demos, treating each region geometry as an axis-aligned extent in the
//! grid's own coordinate reference system.

use crate::dataset::{GriddedDataset, OverlapPolicy, RasterizedDataset};
use crate::errors::RepresentResult;
use ndarray::Array3;
use serde::{Deserialize, Serialize};

/// Maps a gridded dataset to one extended with a region membership mask
pub trait Rasterize {
    /// Rasterize the region geometries onto the grid
    ///
    /// A cell belongs to a region when its centre falls inside that region's
    /// geometry. Implementations are responsible for interpreting the grid's
    /// CRS descriptor.
    fn rasterize(
        &self,
        grid: GriddedDataset,
        overlap: OverlapPolicy,
    ) -> RepresentResult<RasterizedDataset>;
}

/// Axis-aligned stand-in for a region polygon
///
/// Bounds are inclusive and expressed in the grid's coordinate reference
/// system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionExtent {
    pub id: String,
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl RegionExtent {
    pub fn new(id: impl Into<String>, min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            id: id.into(),
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// Rasterizer over axis-aligned region extents
///
/// Sufficient for synthetic grids; real shapefile geometries need an
/// external implementation of [`Rasterize`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundingBoxRasterizer {
    regions: Vec<RegionExtent>,
}

impl BoundingBoxRasterizer {
    pub fn new(regions: Vec<RegionExtent>) -> Self {
        Self { regions }
    }
}

impl Rasterize for BoundingBoxRasterizer {
    fn rasterize(
        &self,
        grid: GriddedDataset,
        overlap: OverlapPolicy,
    ) -> RepresentResult<RasterizedDataset> {
        let n_x = grid.longitude().len();
        let n_y = grid.latitude().len();

        let mut rasters = Array3::from_elem((n_x, n_y, self.regions.len()), false);
        for (r, region) in self.regions.iter().enumerate() {
            for x in 0..n_x {
                for y in 0..n_y {
                    if region.contains(grid.longitude()[x], grid.latitude()[y]) {
                        rasters[[x, y, r]] = true;
                    }
                }
            }
        }

        let region_ids = self.regions.iter().map(|r| r.id.clone()).collect();
        RasterizedDataset::new(grid, rasters, region_ids, overlap)
    }
}
