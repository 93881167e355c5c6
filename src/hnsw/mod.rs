//! Hierarchical Navigable Small World (HNSW) approximate nearest neighbor
//! search over arbitrary item types.
//!
//! # Algorithm
//!
//! HNSW maintains a multi-layer proximity graph:
//! - **Upper layers**: sparse long-range skeletons for coarse navigation
//! - **Layer 0**: a dense navigable small-world graph spanning every item
//! - **Search**: greedy descent from the entry point, then a bounded
//!   best-first expansion on the bottom layer
//!
//! Construction inserts items one at a time, wiring each new node to a
//! selected neighborhood per layer and pruning the remote side when a list
//! overflows its cap (`2M` on layer 0, `M` above).
//!
//! # Usage
//!
//! ```
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use smallworld::{DistanceMetric, HnswIndex, HnswParams};
//!
//! # fn main() -> Result<(), smallworld::IndexError> {
//! let items: Vec<Vec<f32>> = (0..100)
//!     .map(|i| vec![i as f32 / 100.0, (i % 10) as f32 / 10.0])
//!     .collect();
//!
//! let mut index = HnswIndex::new(DistanceMetric::L2, HnswParams::default())?;
//! let mut rng = StdRng::seed_from_u64(42);
//! index.build(items, &mut rng)?;
//!
//! let hits = index.knn(&vec![0.5, 0.5], 5)?;
//! assert!(hits.len() <= 5);
//! # Ok(())
//! # }
//! ```
//!
//! # References
//!
//! - Malkov & Yashunin (2016): "Efficient and robust approximate nearest
//!   neighbor search using Hierarchical Navigable Small World graphs"

mod cache;
mod construction;
mod costs;
mod graph;
mod heap;
mod node;
mod search;
mod select;
mod serialize;

pub use graph::{GraphStats, HnswIndex, Neighbor};

use serde::{Deserialize, Serialize};

use crate::error::{IndexError, Result};

/// Neighbor selection strategy used during construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NeighborSelection {
    /// Keep the closest candidates, nothing else.
    Simple,
    /// Keep candidates that are closer to the new node than to any neighbor
    /// already kept. Produces more diverse edges and better long-range
    /// navigability (Algorithm 4 of the HNSW paper).
    Heuristic,
}

/// Construction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HnswParams {
    /// Target degree on layers above 0. Layer 0 allows `2 * m`.
    pub m: usize,
    /// Scale of the exponential layer distribution. `1 / ln(m)` unless you
    /// know better.
    pub level_lambda: f64,
    /// Candidate-list width during construction. Larger builds a better
    /// graph, slower.
    pub ef_construction: usize,
    /// Which neighbor selection strategy to run.
    pub selection: NeighborSelection,
    /// Top selection back up to full degree with pruned candidates when the
    /// heuristic keeps too few.
    pub keep_pruned_connections: bool,
    /// Widen the heuristic's candidate pool with each candidate's own
    /// neighborhood before selecting.
    pub expand_best_selection: bool,
    /// Cache pairwise distances for the duration of the build.
    pub enable_distance_cache: bool,
}

impl Default for HnswParams {
    fn default() -> Self {
        Self::with_m(10)
    }
}

impl HnswParams {
    /// Parameters for a given target degree, with `level_lambda = 1 / ln(m)`.
    pub fn with_m(m: usize) -> Self {
        Self {
            m,
            level_lambda: 1.0 / (m as f64).ln(),
            ef_construction: 200,
            selection: NeighborSelection::Heuristic,
            keep_pruned_connections: true,
            expand_best_selection: false,
            enable_distance_cache: true,
        }
    }

    /// Hard degree cap at `layer`: `2 * m` at layer 0, `m` above.
    pub(crate) fn m_max(&self, layer: usize) -> usize {
        if layer == 0 {
            2 * self.m
        } else {
            self.m
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.m == 0 {
            return Err(IndexError::InvalidParameter("m must be positive".into()));
        }
        if self.ef_construction == 0 {
            return Err(IndexError::InvalidParameter(
                "ef_construction must be positive".into(),
            ));
        }
        if !(self.level_lambda.is_finite() && self.level_lambda > 0.0) {
            return Err(IndexError::InvalidParameter(
                "level_lambda must be finite and positive".into(),
            ));
        }
        Ok(())
    }
}
