//! Neighbor selection strategies for construction.

use std::collections::VecDeque;

use crate::distance::Metric;
use crate::hnsw::costs::TravelingCosts;
use crate::hnsw::graph::PairwiseDistances;
use crate::hnsw::node::Node;
use crate::hnsw::{HnswParams, NeighborSelection};

/// Pick the neighbors to connect from `candidates`, per the configured
/// strategy. Returns at most `m_max(layer)` ids.
pub(crate) fn select_neighbors<P, M, F>(
    pair: &PairwiseDistances<'_, P, M>,
    nodes: &[Node],
    params: &HnswParams,
    candidates: &[usize],
    costs: &TravelingCosts<F>,
    layer: usize,
) -> Vec<usize>
where
    M: Metric<P>,
    F: Fn(usize) -> f32,
{
    match params.selection {
        NeighborSelection::Simple => select_simple(params, candidates, costs, layer),
        NeighborSelection::Heuristic => {
            select_heuristic(pair, nodes, params, candidates, costs, layer)
        }
    }
}

/// Candidates deduplicated, pivot dropped, ordered by ascending distance with
/// ascending id as the tie-break. The id tie-break keeps builds reproducible
/// when distances collide.
fn ordered_pool<F: Fn(usize) -> f32>(
    candidates: &[usize],
    costs: &TravelingCosts<F>,
) -> Vec<usize> {
    let mut pool = candidates.to_vec();
    pool.sort_unstable();
    pool.dedup();
    pool.retain(|&id| !costs.is_pivot(id));
    pool.sort_by(|&a, &b| costs.from(a).total_cmp(&costs.from(b)).then(a.cmp(&b)));
    pool
}

/// Algorithm 3: the `m_max(layer)` candidates closest to the pivot.
fn select_simple<F: Fn(usize) -> f32>(
    params: &HnswParams,
    candidates: &[usize],
    costs: &TravelingCosts<F>,
    layer: usize,
) -> Vec<usize> {
    let mut pool = ordered_pool(candidates, costs);
    pool.truncate(params.m_max(layer));
    pool
}

/// Algorithm 4: scan candidates by ascending distance and keep one only if it
/// sits closer to the pivot than to every neighbor already kept.
///
/// With `expand_best_selection` the pool is first widened by each candidate's
/// own neighborhood on this layer. With `keep_pruned_connections` rejected
/// candidates back-fill the result, closest first, until full degree.
fn select_heuristic<P, M, F>(
    pair: &PairwiseDistances<'_, P, M>,
    nodes: &[Node],
    params: &HnswParams,
    candidates: &[usize],
    costs: &TravelingCosts<F>,
    layer: usize,
) -> Vec<usize>
where
    M: Metric<P>,
    F: Fn(usize) -> f32,
{
    let mut pool = candidates.to_vec();
    if params.expand_best_selection {
        for &candidate in candidates {
            for &neighbor in nodes[candidate].neighbors(layer).ids() {
                pool.push(neighbor);
            }
        }
    }
    let pool = ordered_pool(&pool, costs);

    let limit = params.m_max(layer);
    let mut selected: Vec<usize> = Vec::with_capacity(limit);
    let mut pruned: VecDeque<usize> = VecDeque::new();

    for &candidate in &pool {
        if selected.len() >= limit {
            break;
        }
        let to_pivot = costs.from(candidate);
        let dominated = selected
            .iter()
            .any(|&kept| pair.between(candidate, kept) <= to_pivot);
        if dominated {
            if params.keep_pruned_connections {
                pruned.push_back(candidate);
            }
        } else {
            selected.push(candidate);
        }
    }

    if params.keep_pruned_connections {
        while selected.len() < limit {
            match pruned.pop_front() {
                Some(candidate) => selected.push(candidate),
                None => break,
            }
        }
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    static ABS_METRIC: fn(&f32, &f32) -> f32 = |a, b| (a - b).abs();

    fn pair_over(items: &[f32]) -> PairwiseDistances<'_, f32, fn(&f32, &f32) -> f32> {
        PairwiseDistances {
            items,
            metric: &ABS_METRIC,
            cache: None,
        }
    }

    fn params(selection: NeighborSelection, m: usize) -> HnswParams {
        let mut params = HnswParams::with_m(m);
        params.selection = selection;
        params
    }

    #[test]
    fn simple_takes_the_closest() {
        let items = [0.0, 1.0, 2.0, 3.0, 4.0, 10.0];
        let pair = pair_over(&items);
        let costs = TravelingCosts::for_node(0, |id| (items[id] - items[0]).abs());
        let nodes: Vec<Node> = items.iter().map(|_| Node::new(0)).collect();

        let p = params(NeighborSelection::Simple, 2);
        // Layer 1 caps at m = 2.
        let selected = select_neighbors(&pair, &nodes, &p, &[5, 4, 3, 2, 1], &costs, 1);
        assert_eq!(selected, vec![1, 2]);
    }

    #[test]
    fn simple_drops_the_pivot_and_duplicates() {
        let items = [0.0, 1.0, 2.0];
        let pair = pair_over(&items);
        let costs = TravelingCosts::for_node(0, |id| (items[id] - items[0]).abs());
        let nodes: Vec<Node> = items.iter().map(|_| Node::new(0)).collect();

        let p = params(NeighborSelection::Simple, 4);
        let selected = select_neighbors(&pair, &nodes, &p, &[0, 1, 1, 2], &costs, 0);
        assert_eq!(selected, vec![1, 2]);
    }

    #[test]
    fn heuristic_prefers_spread_over_packing() {
        // Pivot at 0. Candidates 1.0 and 1.1 crowd together on one side while
        // -3.0 sits alone on the other. The crowd's second member is closer
        // to the first member than to the pivot, so it loses its slot to the
        // lone candidate on the far side.
        let items = [0.0, 1.0, 1.1, -3.0];
        let pair = pair_over(&items);
        let costs = TravelingCosts::for_node(0, |id| (items[id] - items[0]).abs());
        let nodes: Vec<Node> = items.iter().map(|_| Node::new(0)).collect();

        let mut p = params(NeighborSelection::Heuristic, 2);
        p.keep_pruned_connections = false;
        let selected = select_neighbors(&pair, &nodes, &p, &[1, 2, 3], &costs, 1);
        assert_eq!(selected, vec![1, 3]);
    }

    #[test]
    fn keep_pruned_tops_up_to_full_degree() {
        let items = [0.0, 1.0, 1.1, 1.2];
        let pair = pair_over(&items);
        let costs = TravelingCosts::for_node(0, |id| (items[id] - items[0]).abs());
        let nodes: Vec<Node> = items.iter().map(|_| Node::new(0)).collect();

        let mut p = params(NeighborSelection::Heuristic, 3);
        p.keep_pruned_connections = false;
        let bare = select_neighbors(&pair, &nodes, &p, &[1, 2, 3], &costs, 1);
        assert_eq!(bare, vec![1]);

        p.keep_pruned_connections = true;
        let topped = select_neighbors(&pair, &nodes, &p, &[1, 2, 3], &costs, 1);
        assert_eq!(topped, vec![1, 2, 3]);
    }

    #[test]
    fn expansion_pulls_in_candidate_neighborhoods() {
        // Node 3 is only reachable through node 1's neighbor list.
        let items = [0.0, 2.0, 9.0, 1.0];
        let pair = pair_over(&items);
        let costs = TravelingCosts::for_node(0, |id| (items[id] - items[0]).abs());
        let mut nodes: Vec<Node> = items.iter().map(|_| Node::new(0)).collect();
        nodes[1].neighbors_mut(0).push(3);

        let mut p = params(NeighborSelection::Heuristic, 4);
        p.expand_best_selection = false;
        let narrow = select_neighbors(&pair, &nodes, &p, &[1, 2], &costs, 0);
        assert!(!narrow.contains(&3));

        p.expand_best_selection = true;
        let wide = select_neighbors(&pair, &nodes, &p, &[1, 2], &costs, 0);
        assert!(wide.contains(&3));
    }

    #[test]
    fn result_never_exceeds_the_cap() {
        let items: Vec<f32> = (0..40).map(|i| i as f32).collect();
        let pair = pair_over(&items);
        let costs = TravelingCosts::for_node(0, |id| (items[id] - items[0]).abs());
        let nodes: Vec<Node> = items.iter().map(|_| Node::new(0)).collect();
        let candidates: Vec<usize> = (1..40).collect();

        for selection in [NeighborSelection::Simple, NeighborSelection::Heuristic] {
            let p = params(selection, 4);
            let at_zero = select_neighbors(&pair, &nodes, &p, &candidates, &costs, 0);
            assert!(at_zero.len() <= 8);
            let above = select_neighbors(&pair, &nodes, &p, &candidates, &costs, 2);
            assert!(above.len() <= 4);
        }
    }
}
