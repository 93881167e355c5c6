//! smallworld: Hierarchical Navigable Small World approximate nearest
//! neighbor search over arbitrary item types.
//!
//! The index answers k-nearest-neighbor queries in sublinear expected time by
//! maintaining a multi-layer proximity graph: sparse long-range skeletons on
//! top, a dense navigable small-world graph spanning every item at the
//! bottom. Items and the distance function are both caller-supplied: any
//! closure `Fn(&P, &P) -> f32` works as the metric, with [`DistanceMetric`]
//! covering the common dense-vector case.
//!
//! # Quick Start
//!
//! ```
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use smallworld::{DistanceMetric, HnswIndex, HnswParams};
//!
//! # fn main() -> Result<(), smallworld::IndexError> {
//! let items: Vec<Vec<f32>> = (0..500)
//!     .map(|i| vec![(i as f32).sin(), (i as f32).cos()])
//!     .collect();
//!
//! let mut index = HnswIndex::new(DistanceMetric::L2, HnswParams::default())?;
//! let mut rng = StdRng::seed_from_u64(42);
//! index.build(items, &mut rng)?;
//!
//! for hit in index.knn(&vec![0.0, 1.0], 10)? {
//!     println!("{} at distance {}", hit.id, hit.distance);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Tuning
//!
//! | Parameter | Effect |
//! |-----------|--------|
//! | `m` | Graph degree. Higher = better recall, more memory. 10–32 typical. |
//! | `ef_construction` | Build-time candidate width. Higher = better graph, slower build. |
//! | `selection` | `Heuristic` (default) keeps diverse edges; `Simple` keeps the closest. |
//!
//! Queries are pure reads of the frozen graph: after `build`, shared
//! references may be used from any number of threads as long as nothing
//! mutates the index.
//!
//! # Limits
//!
//! There is no deletion and no insertion after `build`; rebuild to change the
//! item set. Recall is approximate by construction, with no exactness
//! guarantees.

pub mod distance;
pub mod error;
pub mod hnsw;

pub use distance::{DistanceMetric, Metric};
pub use error::{IndexError, Result};
pub use hnsw::{GraphStats, HnswIndex, HnswParams, Neighbor, NeighborSelection};
