//! Graph core and the public index facade.

use rand::Rng;

use crate::distance::Metric;
use crate::error::{IndexError, Result};
use crate::hnsw::cache::DistanceCache;
use crate::hnsw::construction;
use crate::hnsw::costs::TravelingCosts;
use crate::hnsw::node::Node;
use crate::hnsw::search::search_layer;
use crate::hnsw::HnswParams;

/// Pairwise distances between stored items, served through the build cache
/// when one is enabled.
pub(crate) struct PairwiseDistances<'a, P, M> {
    pub(crate) items: &'a [P],
    pub(crate) metric: &'a M,
    pub(crate) cache: Option<&'a DistanceCache>,
}

impl<P, M: Metric<P>> PairwiseDistances<'_, P, M> {
    pub(crate) fn between(&self, i: usize, j: usize) -> f32 {
        if let Some(cache) = self.cache {
            if let Some(hit) = cache.try_get(i, j) {
                return hit;
            }
            let distance = self.metric.distance(&self.items[i], &self.items[j]);
            cache.set(i, j, distance);
            distance
        } else {
            self.metric.distance(&self.items[i], &self.items[j])
        }
    }
}

/// Owns the items, the layered graph, and everything needed to traverse it.
#[derive(Debug)]
pub(crate) struct GraphCore<P, M> {
    pub(crate) items: Vec<P>,
    pub(crate) nodes: Vec<Node>,
    pub(crate) metric: M,
    pub(crate) params: HnswParams,
    pub(crate) cache: Option<DistanceCache>,
    pub(crate) entry_point: Option<usize>,
}

/// A single k-NN result.
#[derive(Debug, Clone, Copy)]
pub struct Neighbor<'a, P> {
    /// Insertion index of the item.
    pub id: usize,
    /// The stored item.
    pub item: &'a P,
    /// Distance from the query to the item.
    pub distance: f32,
}

/// Shape of a built graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphStats {
    pub items: usize,
    pub entry_point: Option<usize>,
    pub max_layer: usize,
    /// Number of nodes present on each layer, bottom first.
    pub layer_node_counts: Vec<usize>,
    /// Number of directed edges on each layer, bottom first.
    pub layer_edge_counts: Vec<usize>,
}

/// HNSW index over items of type `P` under a caller-supplied metric.
///
/// Lifecycle: [`HnswIndex::new`] validates parameters, [`HnswIndex::build`]
/// consumes the items and wires the graph, queries run against the frozen
/// result. There is no incremental insertion after `build`.
#[derive(Debug)]
pub struct HnswIndex<P, M> {
    core: GraphCore<P, M>,
    built: bool,
}

impl<P, M: Metric<P>> HnswIndex<P, M> {
    /// Create an empty, unbuilt index.
    pub fn new(metric: M, params: HnswParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            core: GraphCore {
                items: Vec::new(),
                nodes: Vec::new(),
                metric,
                params,
                cache: None,
                entry_point: None,
            },
            built: false,
        })
    }

    /// Build the graph over `items`, consuming them.
    ///
    /// Ids are assigned by position in `items` and stay stable for the life
    /// of the index. The RNG drives layer assignment only; two builds with
    /// the same items, parameters, and seed produce identical graphs.
    pub fn build<R: Rng + ?Sized>(&mut self, items: Vec<P>, rng: &mut R) -> Result<()> {
        let cache = if self.core.params.enable_distance_cache && !items.is_empty() {
            Some(DistanceCache::new(items.len())?)
        } else {
            None
        };
        self.core.items = items;
        self.core.cache = cache;
        construction::build_graph(&mut self.core, rng);
        // The cache only serves construction; queries pivot on the query
        // item, which has no id.
        self.core.cache = None;
        self.built = true;
        Ok(())
    }

    /// The `k` approximate nearest neighbors of `query`, nearest first.
    ///
    /// Uses `k` as the bottom-layer candidate width; see
    /// [`HnswIndex::search_with_ef`] to widen the search independently of
    /// `k`.
    pub fn knn(&self, query: &P, k: usize) -> Result<Vec<Neighbor<'_, P>>> {
        self.search_with_ef(query, k, k)
    }

    /// k-NN with an explicit bottom-layer candidate width of `max(ef, k)`.
    pub fn search_with_ef(&self, query: &P, k: usize, ef: usize) -> Result<Vec<Neighbor<'_, P>>> {
        if k == 0 {
            return Err(IndexError::InvalidParameter("k must be positive".into()));
        }
        if !self.built {
            return Err(IndexError::NotBuilt);
        }
        let Some(entry) = self.core.entry_point else {
            return Ok(Vec::new());
        };

        let items = &self.core.items;
        let metric = &self.core.metric;
        let costs = TravelingCosts::for_query(|id| metric.distance(&items[id], query));

        let mut ep = entry;
        for layer in (1..=self.core.nodes[entry].max_layer()).rev() {
            if let Some(&best) = search_layer(&self.core.nodes, ep, &costs, 1, layer).first() {
                ep = best;
            }
        }

        let mut found = search_layer(&self.core.nodes, ep, &costs, ef.max(k), 0);
        found.sort_by(|&a, &b| costs.from(a).total_cmp(&costs.from(b)).then(a.cmp(&b)));
        found.truncate(k);
        Ok(found
            .into_iter()
            .map(|id| Neighbor {
                id,
                item: &items[id],
                distance: costs.from(id),
            })
            .collect())
    }

    /// Number of indexed items.
    pub fn len(&self) -> usize {
        self.core.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.core.items.is_empty()
    }

    /// The stored item for `id`, if in range.
    pub fn item(&self, id: usize) -> Option<&P> {
        self.core.items.get(id)
    }

    /// Id of the node every search starts from.
    pub fn entry_point(&self) -> Option<usize> {
        self.core.entry_point
    }

    /// Top layer of node `id`, if in range.
    pub fn max_layer_of(&self, id: usize) -> Option<usize> {
        self.core.nodes.get(id).map(Node::max_layer)
    }

    /// Neighbor ids of node `id` on `layer`; `None` when the node does not
    /// participate in that layer.
    pub fn neighbors_of(&self, id: usize, layer: usize) -> Option<&[usize]> {
        let node = self.core.nodes.get(id)?;
        if layer > node.max_layer() {
            return None;
        }
        Some(node.neighbors(layer).ids())
    }

    pub fn params(&self) -> &HnswParams {
        &self.core.params
    }

    /// Approximate resident size of the index.
    pub fn size_bytes(&self) -> usize {
        let items = self.core.items.len() * std::mem::size_of::<P>();
        let edges: usize = self
            .core
            .nodes
            .iter()
            .map(|node| {
                (0..=node.max_layer())
                    .map(|layer| node.neighbors(layer).len())
                    .sum::<usize>()
            })
            .sum();
        items + edges * std::mem::size_of::<usize>()
    }

    /// Per-layer node and edge counts of the built graph.
    pub fn stats(&self) -> GraphStats {
        let max_layer = self
            .core
            .entry_point
            .map(|entry| self.core.nodes[entry].max_layer())
            .unwrap_or(0);
        let mut layer_node_counts = vec![0usize; max_layer + 1];
        let mut layer_edge_counts = vec![0usize; max_layer + 1];
        for node in &self.core.nodes {
            for layer in 0..=node.max_layer() {
                layer_node_counts[layer] += 1;
                layer_edge_counts[layer] += node.neighbors(layer).len();
            }
        }
        GraphStats {
            items: self.core.items.len(),
            entry_point: self.core.entry_point,
            max_layer,
            layer_node_counts,
            layer_edge_counts,
        }
    }

    pub(crate) fn core(&self) -> &GraphCore<P, M> {
        &self.core
    }

    pub(crate) fn from_core(core: GraphCore<P, M>) -> Self {
        Self { core, built: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::DistanceMetric;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn line_metric() -> impl Fn(&f32, &f32) -> f32 {
        |a: &f32, b: &f32| (a - b).abs()
    }

    #[test]
    fn knn_before_build_is_rejected() {
        let index = HnswIndex::new(line_metric(), HnswParams::default()).unwrap();
        assert!(matches!(index.knn(&1.0, 1), Err(IndexError::NotBuilt)));
    }

    #[test]
    fn zero_k_is_rejected() {
        let mut index = HnswIndex::new(line_metric(), HnswParams::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        index.build(vec![1.0], &mut rng).unwrap();
        assert!(matches!(
            index.knn(&1.0, 0),
            Err(IndexError::InvalidParameter(_))
        ));
    }

    #[test]
    fn empty_build_yields_empty_results() {
        let mut index = HnswIndex::new(line_metric(), HnswParams::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        index.build(Vec::new(), &mut rng).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.entry_point(), None);
        assert!(index.knn(&0.5, 1).unwrap().is_empty());
    }

    #[test]
    fn singleton_build_answers_itself() {
        let mut index = HnswIndex::new(line_metric(), HnswParams::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        index.build(vec![3.5], &mut rng).unwrap();

        assert_eq!(index.entry_point(), Some(0));
        // At least one layer exists and every list is empty.
        let top = index.max_layer_of(0).unwrap();
        for layer in 0..=top {
            assert!(index.neighbors_of(0, layer).unwrap().is_empty());
        }

        let hits = index.knn(&3.5, 1).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 0);
        assert_eq!(*hits[0].item, 3.5);
        assert_eq!(hits[0].distance, 0.0);
    }

    #[test]
    fn two_points_are_mutual_neighbors() {
        let mut index = HnswIndex::new(line_metric(), HnswParams::with_m(4)).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        index.build(vec![0.0, 1.0], &mut rng).unwrap();

        assert!(index.neighbors_of(0, 0).unwrap().contains(&1));
        assert!(index.neighbors_of(1, 0).unwrap().contains(&0));
    }

    #[test]
    fn results_come_back_nearest_first() {
        let items: Vec<Vec<f32>> = (0..50).map(|i| vec![i as f32, 0.0]).collect();
        let mut index = HnswIndex::new(DistanceMetric::L2, HnswParams::with_m(6)).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        index.build(items, &mut rng).unwrap();

        let hits = index.knn(&vec![20.2, 0.0], 5).unwrap();
        assert_eq!(hits.len(), 5);
        for pair in hits.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
        assert_eq!(hits[0].id, 20);
    }

    #[test]
    fn stats_count_every_layer() {
        let items: Vec<Vec<f32>> = (0..200).map(|i| vec![i as f32]).collect();
        let mut index = HnswIndex::new(DistanceMetric::L2, HnswParams::with_m(4)).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        index.build(items, &mut rng).unwrap();

        let stats = index.stats();
        assert_eq!(stats.items, 200);
        assert_eq!(stats.layer_node_counts[0], 200);
        assert_eq!(stats.layer_node_counts.len(), stats.max_layer + 1);
        // Layers thin out going up.
        for pair in stats.layer_node_counts.windows(2) {
            assert!(pair[1] <= pair[0]);
        }
        assert!(index.size_bytes() > 0);
    }
}
