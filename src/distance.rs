//! Distance oracles for the index.
//!
//! The graph core is generic over the item type and only ever sees distances
//! through the [`Metric`] trait. Any closure `Fn(&P, &P) -> f32` is a valid
//! oracle, so callers with exotic item types never need a wrapper type.
//!
//! For the common dense-vector case this module also provides
//! [`DistanceMetric`], a small enum of scalar kernels over `Vec<f32>` items.
//!
//! ## Contract
//!
//! A metric must be nonnegative with `d(x, x) == 0` and should be symmetric.
//! Asymmetry does not crash the index but voids any recall expectations.

/// Distance oracle over an item space `P`.
///
/// Distances are `f32` compared with `total_cmp`, so a metric returning NaN
/// sorts last instead of poisoning the search.
pub trait Metric<P> {
    /// Compute the distance between two items.
    fn distance(&self, a: &P, b: &P) -> f32;
}

impl<P, F> Metric<P> for F
where
    F: Fn(&P, &P) -> f32,
{
    #[inline]
    fn distance(&self, a: &P, b: &P) -> f32 {
        self(a, b)
    }
}

/// Distance metric for dense `Vec<f32>` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DistanceMetric {
    /// Euclidean (L2) distance.
    L2,
    /// Squared Euclidean distance. Same ordering as L2, no square root.
    SquaredL2,
    /// Cosine distance `1 - cos(a, b)`. Computes norms, so inputs need not be
    /// pre-normalized.
    Cosine,
}

impl Metric<Vec<f32>> for DistanceMetric {
    #[inline]
    fn distance(&self, a: &Vec<f32>, b: &Vec<f32>) -> f32 {
        match self {
            DistanceMetric::L2 => l2_distance(a, b),
            DistanceMetric::SquaredL2 => squared_l2_distance(a, b),
            DistanceMetric::Cosine => cosine_distance(a, b),
        }
    }
}

/// L2 (Euclidean) distance.
///
/// If dimensions mismatch, this returns `f32::INFINITY` so the pair is never
/// selected as a nearest neighbor.
#[inline]
#[must_use]
pub fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    squared_l2_distance(a, b).sqrt()
}

/// Squared L2 distance.
#[inline]
#[must_use]
pub fn squared_l2_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Cosine distance `1 - cos(a, b)`.
#[inline]
#[must_use]
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a < 1e-10 || norm_b < 1e-10 {
        return 1.0;
    }
    1.0 - (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Normalize a vector to unit L2 norm. Zero vectors stay zero.
#[inline]
#[must_use]
pub fn normalize(v: &[f32]) -> Vec<f32> {
    let n: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if n < 1e-10 {
        return vec![0.0; v.len()];
    }
    v.iter().map(|x| x / n).collect()
}
