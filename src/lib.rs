//! Reduction of gridded renewable-energy time series to a small number of
//! representative series per planning region, preserving aggregate capacity
//! and power.
//!
//! The input is a high-resolution grid carrying one capacity value and one
//! capacity-factor time series per cell, plus a cell-to-region membership
//! mask produced by a [`rasterize::Rasterize`] collaborator. The entry point
//! [`represent::represent_re_technology`] applies one of two strategies
//! independently to every region in parallel:
//!
//! - simple: one capacity-weighted mean series per region
//! - clustered: agglomerative time-series clustering into K groups, each
//!   aggregated with the same capacity-weighted rule
//!
//! ```rust
//! use ndarray::{array, Array2, Array3};
//! use regionrep::dataset::{DatasetNames, GriddedDataset, OverlapPolicy};
//! use regionrep::rasterize::{BoundingBoxRasterizer, Rasterize, RegionExtent};
//! use regionrep::represent::{represent_re_technology, RepresentationConfig};
//!
//! let grid = GriddedDataset::new(
//!     array![0.0, 1.0],
//!     array![0.0],
//!     array![0.0, 1.0],
//!     Array2::from_elem((2, 1), 1.0),
//!     Array3::from_elem((2, 1, 2), 0.5),
//!     "EPSG:3035",
//!     DatasetNames::default(),
//! )
//! .unwrap();
//!
//! let rasterizer = BoundingBoxRasterizer::new(vec![
//!     RegionExtent::new("all", 0.0, 1.0, 0.0, 0.0),
//! ]);
//! let rasterized = rasterizer.rasterize(grid, OverlapPolicy::Allow).unwrap();
//!
//! let result = represent_re_technology(&rasterized, &RepresentationConfig::simple()).unwrap();
//! assert_eq!(result.get("all").unwrap().total_capacity(), 2.0);
//! ```

pub mod aggregate;
pub mod cluster;
pub mod dataset;
pub mod extract;
pub mod rasterize;
pub mod represent;

pub mod errors;

pub use errors::{RepresentError, RepresentResult};
