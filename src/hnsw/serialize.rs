//! Binary persistence of the graph structure.
//!
//! Layout, all integers little-endian:
//!
//! ```text
//! magic "SWHN" | format version u32
//! m u32 | ef_construction u32 | level_lambda f64
//! selection u8 | keep_pruned u8 | expand u8 | cache u8
//! node count u64 | entry point u64 (u64::MAX = none)
//! per node: layer count u32
//!   per layer: neighbor count u32, neighbor ids u64 ...
//! ```
//!
//! Items are not persisted. The caller hands the same ordered items back at
//! load time; only the wiring, the entry point, and the parameters travel
//! through bytes.

use crate::distance::Metric;
use crate::error::{IndexError, Result};
use crate::hnsw::graph::{GraphCore, HnswIndex};
use crate::hnsw::node::Node;
use crate::hnsw::{HnswParams, NeighborSelection};

const MAGIC: [u8; 4] = *b"SWHN";
const FORMAT_VERSION: u32 = 1;
const NO_ENTRY: u64 = u64::MAX;

impl<P, M: Metric<P>> HnswIndex<P, M> {
    /// Serialize the graph structure (not the items) to bytes.
    pub fn serialize_graph(&self) -> Vec<u8> {
        let core = self.core();
        let mut out = Vec::with_capacity(64 + core.nodes.len() * 16);

        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());

        let params = &core.params;
        out.extend_from_slice(&(params.m as u32).to_le_bytes());
        out.extend_from_slice(&(params.ef_construction as u32).to_le_bytes());
        out.extend_from_slice(&params.level_lambda.to_le_bytes());
        out.push(match params.selection {
            NeighborSelection::Simple => 0,
            NeighborSelection::Heuristic => 1,
        });
        out.push(params.keep_pruned_connections as u8);
        out.push(params.expand_best_selection as u8);
        out.push(params.enable_distance_cache as u8);

        out.extend_from_slice(&(core.nodes.len() as u64).to_le_bytes());
        out.extend_from_slice(
            &core
                .entry_point
                .map(|entry| entry as u64)
                .unwrap_or(NO_ENTRY)
                .to_le_bytes(),
        );

        for node in &core.nodes {
            out.extend_from_slice(&(node.layer_count() as u32).to_le_bytes());
            for layer in 0..=node.max_layer() {
                let neighbors = node.neighbors(layer).ids();
                out.extend_from_slice(&(neighbors.len() as u32).to_le_bytes());
                for &neighbor in neighbors {
                    out.extend_from_slice(&(neighbor as u64).to_le_bytes());
                }
            }
        }

        out
    }

    /// Rebuild an index from [`HnswIndex::serialize_graph`] bytes and the
    /// same ordered items the graph was built over.
    pub fn deserialize_graph(items: Vec<P>, metric: M, bytes: &[u8]) -> Result<Self> {
        let mut input = bytes;

        let magic = read_array::<4>(&mut input)?;
        if magic != MAGIC {
            return Err(IndexError::Corrupt("bad magic bytes".into()));
        }
        let version = read_u32(&mut input)?;
        if version != FORMAT_VERSION {
            return Err(IndexError::Corrupt(format!(
                "unsupported format version {version}"
            )));
        }

        let m = read_u32(&mut input)? as usize;
        let ef_construction = read_u32(&mut input)? as usize;
        let level_lambda = read_f64(&mut input)?;
        let selection = match read_u8(&mut input)? {
            0 => NeighborSelection::Simple,
            1 => NeighborSelection::Heuristic,
            other => {
                return Err(IndexError::Corrupt(format!(
                    "unknown selection strategy {other}"
                )))
            }
        };
        let params = HnswParams {
            m,
            level_lambda,
            ef_construction,
            selection,
            keep_pruned_connections: read_u8(&mut input)? != 0,
            expand_best_selection: read_u8(&mut input)? != 0,
            enable_distance_cache: read_u8(&mut input)? != 0,
        };
        params.validate()?;

        let node_count = read_u64(&mut input)? as usize;
        if node_count != items.len() {
            return Err(IndexError::Corrupt(format!(
                "graph has {node_count} nodes but {} items were supplied",
                items.len()
            )));
        }

        let entry = read_u64(&mut input)?;
        let entry_point = if entry == NO_ENTRY {
            None
        } else {
            let entry = entry as usize;
            if entry >= node_count {
                return Err(IndexError::Corrupt(format!(
                    "entry point {entry} out of range"
                )));
            }
            Some(entry)
        };
        if entry_point.is_none() && node_count > 0 {
            return Err(IndexError::Corrupt("non-empty graph without entry".into()));
        }

        let mut nodes = Vec::with_capacity(node_count);
        for _ in 0..node_count {
            let layer_count = read_u32(&mut input)? as usize;
            if layer_count == 0 {
                return Err(IndexError::Corrupt("node with zero layers".into()));
            }
            let mut node = Node::new(layer_count - 1);
            for layer in 0..layer_count {
                let neighbor_count = read_u32(&mut input)? as usize;
                for _ in 0..neighbor_count {
                    let neighbor = read_u64(&mut input)? as usize;
                    if neighbor >= node_count {
                        return Err(IndexError::Corrupt(format!(
                            "neighbor id {neighbor} out of range"
                        )));
                    }
                    node.neighbors_mut(layer).push(neighbor);
                }
            }
            nodes.push(node);
        }

        // Every edge must point at a node that participates in the layer.
        for node in &nodes {
            for layer in 0..=node.max_layer() {
                for &neighbor in node.neighbors(layer).ids() {
                    if nodes[neighbor].max_layer() < layer {
                        return Err(IndexError::Corrupt(format!(
                            "neighbor {neighbor} absent from layer {layer}"
                        )));
                    }
                }
            }
        }

        // Searches descend from the entry point's top layer, so it must own
        // the maximum.
        if let Some(entry) = entry_point {
            let entry_top = nodes[entry].max_layer();
            if nodes.iter().any(|node| node.max_layer() > entry_top) {
                return Err(IndexError::Corrupt(
                    "entry point does not own the top layer".into(),
                ));
            }
        }

        Ok(HnswIndex::from_core(GraphCore {
            items,
            nodes,
            metric,
            params,
            cache: None,
            entry_point,
        }))
    }
}

fn read_array<const N: usize>(input: &mut &[u8]) -> Result<[u8; N]> {
    use std::io::Read;
    let mut buf = [0u8; N];
    input.read_exact(&mut buf)?;
    Ok(buf)
}

fn read_u8(input: &mut &[u8]) -> Result<u8> {
    Ok(read_array::<1>(input)?[0])
}

fn read_u32(input: &mut &[u8]) -> Result<u32> {
    Ok(u32::from_le_bytes(read_array::<4>(input)?))
}

fn read_u64(input: &mut &[u8]) -> Result<u64> {
    Ok(u64::from_le_bytes(read_array::<8>(input)?))
}

fn read_f64(input: &mut &[u8]) -> Result<f64> {
    Ok(f64::from_le_bytes(read_array::<8>(input)?))
}
