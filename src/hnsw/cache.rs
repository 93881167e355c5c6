//! Symmetric pairwise distance cache used during construction.
//!
//! Keys are unordered id pairs, so `(i, j)` and `(j, i)` address the same
//! slot (including `i == j`). Two storage strategies exist with identical
//! observable behavior:
//!
//! - a triangular array with a presence bitset, used when the item count fits
//!   16 bits (O(1) lookups, one allocation up front);
//! - a hash map keyed by the normalized pair, used above that.
//!
//! The cache is single-threaded. Interior mutability keeps `set` usable
//! behind the shared borrows that searches hold on the graph; the type is
//! deliberately `!Sync`.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::{IndexError, Result};

/// Largest item count served by the triangular form.
const TRIANGULAR_MAX_ITEMS: usize = u16::MAX as usize;

#[derive(Debug)]
pub(crate) struct DistanceCache {
    store: RefCell<Store>,
}

#[derive(Debug)]
enum Store {
    /// Row-major lower triangle, `values[key(i, j)]`, presence tracked bitwise.
    Triangular { values: Vec<f32>, present: Vec<u64> },
    Map(HashMap<(usize, usize), f32>),
}

/// Triangular index of the unordered pair: `max * (max + 1) / 2 + min`.
#[inline]
fn triangular_key(i: usize, j: usize) -> usize {
    let (lo, hi) = if i <= j { (i, j) } else { (j, i) };
    hi * (hi + 1) / 2 + lo
}

#[inline]
fn pair_key(i: usize, j: usize) -> (usize, usize) {
    if i <= j {
        (i, j)
    } else {
        (j, i)
    }
}

impl DistanceCache {
    /// Create a cache for `items` ids.
    ///
    /// Fails with [`IndexError::CapacityExceeded`] when the triangular
    /// capacity `items * (items + 1) / 2` cannot be addressed on this
    /// platform. The check runs regardless of which form ends up used, so
    /// the error surfaces at build start rather than mid-insert.
    pub(crate) fn new(items: usize) -> Result<Self> {
        let capacity = items
            .checked_mul(items + 1)
            .map(|c| c / 2)
            .ok_or(IndexError::CapacityExceeded { items })?;

        let store = if items <= TRIANGULAR_MAX_ITEMS {
            Store::Triangular {
                values: vec![0.0; capacity],
                present: vec![0u64; capacity.div_ceil(64)],
            }
        } else {
            Store::Map(HashMap::new())
        };
        Ok(Self {
            store: RefCell::new(store),
        })
    }

    /// Look up the cached distance for the unordered pair `{i, j}`.
    pub(crate) fn try_get(&self, i: usize, j: usize) -> Option<f32> {
        match &*self.store.borrow() {
            Store::Triangular { values, present } => {
                let key = triangular_key(i, j);
                if present[key / 64] & (1u64 << (key % 64)) != 0 {
                    Some(values[key])
                } else {
                    None
                }
            }
            Store::Map(map) => map.get(&pair_key(i, j)).copied(),
        }
    }

    /// Store a distance for the unordered pair `{i, j}`, overwriting silently.
    pub(crate) fn set(&self, i: usize, j: usize, value: f32) {
        match &mut *self.store.borrow_mut() {
            Store::Triangular { values, present } => {
                let key = triangular_key(i, j);
                values[key] = value;
                present[key / 64] |= 1u64 << (key % 64);
            }
            Store::Map(map) => {
                map.insert(pair_key(i, j), value);
            }
        }
    }
}
