//! Graph construction: level assignment and the insertion loop.

use rand::Rng;

use crate::distance::Metric;
use crate::hnsw::costs::TravelingCosts;
use crate::hnsw::graph::{GraphCore, PairwiseDistances};
use crate::hnsw::node::Node;
use crate::hnsw::search::search_layer;
use crate::hnsw::select::select_neighbors;

/// Draw a node's top layer from the exponential distribution
/// `floor(-ln(U) * lambda)` with `U` uniform on `(0, 1]`.
pub(crate) fn assign_level<R: Rng + ?Sized>(rng: &mut R, lambda: f64) -> usize {
    // `random::<f64>()` samples [0, 1); flip it so ln never sees zero.
    let u: f64 = 1.0 - rng.random::<f64>();
    (-u.ln() * lambda).floor() as usize
}

/// Build the layered graph over `core.items` in insertion order.
///
/// Nodes are allocated up front with their levels drawn sequentially from
/// `rng`, so two builds with the same items, parameters, and seed produce
/// identical graphs. Node 0 seeds the entry point; it moves whenever a later
/// node draws a higher top layer.
pub(crate) fn build_graph<P, M, R>(core: &mut GraphCore<P, M>, rng: &mut R)
where
    M: Metric<P>,
    R: Rng + ?Sized,
{
    let n = core.items.len();
    if n == 0 {
        core.nodes = Vec::new();
        core.entry_point = None;
        return;
    }

    core.nodes = (0..n)
        .map(|_| Node::new(assign_level(rng, core.params.level_lambda)))
        .collect();

    let mut entry = 0;
    for id in 1..n {
        entry = insert(core, entry, id);
    }
    core.entry_point = Some(entry);
}

/// Insert node `id` into the graph rooted at `entry`; returns the entry point
/// for the next insertion.
fn insert<P, M: Metric<P>>(core: &mut GraphCore<P, M>, entry: usize, id: usize) -> usize {
    let GraphCore {
        items,
        nodes,
        metric,
        params,
        cache,
        ..
    } = core;
    let pair = PairwiseDistances {
        items: &*items,
        metric: &*metric,
        cache: cache.as_ref(),
    };
    let costs = TravelingCosts::for_node(id, |other| pair.between(other, id));

    let entry_max = nodes[entry].max_layer();
    let node_max = nodes[id].max_layer();
    let mut ep = entry;

    // Zoom in through the layers the new node does not occupy, refining the
    // entry point with a width-1 search per layer.
    for layer in (node_max + 1..=entry_max).rev() {
        if let Some(&best) = search_layer(&*nodes, ep, &costs, 1, layer).first() {
            ep = best;
        }
    }

    // Connect on every shared layer, top down.
    for layer in (0..=node_max.min(entry_max)).rev() {
        let found = search_layer(&*nodes, ep, &costs, params.ef_construction, layer);
        let selected = select_neighbors(&pair, &*nodes, params, &found, &costs, layer);

        for &neighbor in &selected {
            if !nodes[id].neighbors(layer).contains(neighbor) {
                nodes[id].neighbors_mut(layer).push(neighbor);
            }
            if !nodes[neighbor].neighbors(layer).contains(id) {
                nodes[neighbor].neighbors_mut(layer).push(id);
            }

            // The remote list may now exceed its cap; re-select over the full
            // list. This can drop the edge just added, leaving the pair
            // transiently asymmetric (the paper's behavior).
            if nodes[neighbor].neighbors(layer).len() > params.m_max(layer) {
                let remote_costs =
                    TravelingCosts::for_node(neighbor, |other| pair.between(other, neighbor));
                let current = nodes[neighbor].neighbors(layer).ids().to_vec();
                let kept =
                    select_neighbors(&pair, &*nodes, params, &current, &remote_costs, layer);
                nodes[neighbor].neighbors_mut(layer).replace(kept);
            }
        }

        // A connected neighbor strictly closer than the current entry makes a
        // better starting point for the layer below.
        for &neighbor in &selected {
            if costs.from(neighbor) < costs.from(ep) {
                ep = neighbor;
            }
        }
    }

    if node_max > entry_max {
        id
    } else {
        entry
    }
}
