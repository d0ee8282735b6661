//! Time-series clustering of regional cells
//!
//! Partitions a region's cells into K groups by similarity of their
//! capacity-factor series, then applies the capacity-weighted reduction
//! independently within each group. Clustering is agglomerative hierarchical:
//! every cell starts as its own cluster and the closest pair is merged until
//! K clusters remain, with inter-cluster distances maintained through
//! Lance-Williams updates for the configured linkage criterion.
//!
//! Distances between cells are Euclidean over the full capacity-factor
//! vectors. The procedure is deterministic for identical inputs: ties on the
//! closest pair are broken towards the smaller combined cluster size and then
//! the smallest cluster index pair, and the final labels 0..K-1 are ordered
//! by each cluster's smallest member cell. The size tie-break keeps a
//! population of identical cells merging pairwise instead of one cluster
//! absorbing cell after cell.

use crate::aggregate::aggregate_subset;
use crate::dataset::{FloatValue, RegionRepresentation};
use crate::errors::{RepresentError, RepresentResult};
use crate::extract::RegionalCells;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Linkage criterion for agglomerative hierarchical clustering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Linkage {
    /// Mean pairwise distance between members of the two clusters
    #[default]
    Average,
    /// Largest pairwise distance between members of the two clusters
    Complete,
    /// Smallest pairwise distance between members of the two clusters
    Single,
}

impl FromStr for Linkage {
    type Err = RepresentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "average" => Ok(Linkage::Average),
            "complete" => Ok(Linkage::Complete),
            "single" => Ok(Linkage::Single),
            other => Err(RepresentError::Error(format!(
                "unknown linkage criterion '{}', expected one of: average, complete, single",
                other
            ))),
        }
    }
}

/// Cluster cells by their capacity-factor series
///
/// Returns one label in `0..n_clusters` per row of `series`, with every
/// label populated by at least one cell. `n_clusters` outside
/// `1..=series.nrows()` cannot produce a valid partition and is rejected
/// upfront as [`ClusterCount`](RepresentError::ClusterCount).
pub fn cluster_series(
    series: ArrayView2<FloatValue>,
    n_clusters: usize,
    linkage: Linkage,
    region: &str,
) -> RepresentResult<Vec<usize>> {
    let n = series.nrows();
    if n_clusters == 0 || n_clusters > n {
        return Err(RepresentError::ClusterCount {
            region: region.to_string(),
            requested: n_clusters,
            available: n,
        });
    }

    // Pairwise Euclidean distances between full time-series vectors
    let mut dist = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = series
                .row(i)
                .iter()
                .zip(series.row(j).iter())
                .map(|(a, b)| (a - b) * (a - b))
                .sum::<FloatValue>()
                .sqrt();
            dist[i][j] = d;
            dist[j][i] = d;
        }
    }

    // Each cell starts as its own cluster; merged clusters keep the smaller
    // index and the larger one is retired
    let mut members: Vec<Option<Vec<usize>>> = (0..n).map(|i| Some(vec![i])).collect();
    let mut n_active = n;

    while n_active > n_clusters {
        // Closest active pair; equal distances prefer the smaller combined
        // cluster size, then the smallest (i, j), so the merge order is
        // deterministic and identical cells pair up instead of piling onto
        // one growing cluster
        let mut best: Option<(usize, usize)> = None;
        let mut best_dist = FloatValue::INFINITY;
        let mut best_size = usize::MAX;
        for i in 0..n {
            let size_i = match members[i].as_ref() {
                Some(cluster) => cluster.len(),
                None => continue,
            };
            for j in (i + 1)..n {
                let size_j = match members[j].as_ref() {
                    Some(cluster) => cluster.len(),
                    None => continue,
                };
                let combined = size_i + size_j;
                if dist[i][j] < best_dist
                    || (dist[i][j] == best_dist && combined < best_size)
                {
                    best_dist = dist[i][j];
                    best_size = combined;
                    best = Some((i, j));
                }
            }
        }
        let (i, j) = match best {
            Some(pair) => pair,
            None => break,
        };

        let size_i = members[i].as_ref().map(Vec::len).unwrap_or(0) as FloatValue;
        let size_j = members[j].as_ref().map(Vec::len).unwrap_or(0) as FloatValue;

        // Lance-Williams update of distances from the merged cluster to every
        // other active cluster
        for m in 0..n {
            if m == i || m == j || members[m].is_none() {
                continue;
            }
            let d_im = dist[i][m];
            let d_jm = dist[j][m];
            let updated = match linkage {
                Linkage::Single => d_im.min(d_jm),
                Linkage::Complete => d_im.max(d_jm),
                Linkage::Average => (size_i * d_im + size_j * d_jm) / (size_i + size_j),
            };
            dist[i][m] = updated;
            dist[m][i] = updated;
        }

        let absorbed = members[j].take().unwrap_or_default();
        if let Some(kept) = members[i].as_mut() {
            kept.extend(absorbed);
        }
        n_active -= 1;
    }

    // Label clusters by their smallest member cell for a stable ordering
    let mut clusters: Vec<Vec<usize>> = members.into_iter().flatten().collect();
    clusters.sort_by_key(|c| c.iter().copied().min().unwrap_or(usize::MAX));

    let mut labels = vec![0usize; n];
    for (label, cluster) in clusters.iter().enumerate() {
        for &cell in cluster {
            labels[cell] = label;
        }
    }
    Ok(labels)
}

/// Cluster a region's cells and aggregate each cluster
///
/// Runs [`cluster_series`] over the cells, then applies the capacity-weighted
/// reduction to each label subset, producing K capacities and K series
/// labelled `TS_0..TS_{K-1}`.
pub fn cluster_and_aggregate(
    cells: &RegionalCells,
    n_clusters: usize,
    linkage: Linkage,
    region: &str,
) -> RepresentResult<RegionRepresentation> {
    let labels = cluster_series(cells.capacity_factors.view(), n_clusters, linkage, region)?;

    let n_t = cells.capacity_factors.len_of(Axis(1));
    let mut capacities = Array1::zeros(n_clusters);
    let mut capacity_factors = Array2::zeros((n_clusters, n_t));

    for label in 0..n_clusters {
        let indices: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, &l)| l == label)
            .map(|(cell, _)| cell)
            .collect();

        let cluster_capacities = cells.capacities.select(Axis(0), &indices);
        let cluster_factors = cells.capacity_factors.select(Axis(0), &indices);
        let (capacity, series) =
            aggregate_subset(cluster_capacities.view(), cluster_factors.view());

        capacities[label] = capacity;
        capacity_factors.row_mut(label).assign(&series);
    }

    let ts_ids = (0..n_clusters).map(|i| format!("TS_{}", i)).collect();

    Ok(RegionRepresentation {
        capacities,
        capacity_factors,
        ts_ids: Some(ts_ids),
    })
}
