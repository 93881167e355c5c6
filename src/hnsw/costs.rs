//! Distance-to-pivot ordering for one search.
//!
//! A search compares every candidate against a single pivot: the node being
//! inserted during construction, or the query item during a lookup. Both
//! cases reduce to a function `id -> distance`, so [`TravelingCosts`] wraps
//! one and memoizes it for the duration of the search, so each id's distance
//! is computed at most once no matter how many heap comparisons touch it.
//!
//! Query pivots are curried in by the caller and carry no id, which keeps
//! query items from ever aliasing a node id inside the selector.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::hnsw::heap::Comparer;

pub(crate) struct TravelingCosts<F> {
    to_pivot: F,
    /// Node id of the pivot during construction; `None` for query pivots.
    pivot: Option<usize>,
    memo: RefCell<HashMap<usize, f32>>,
}

impl<F: Fn(usize) -> f32> TravelingCosts<F> {
    /// Costs pivoted on an inserted node.
    pub(crate) fn for_node(pivot: usize, to_pivot: F) -> Self {
        Self {
            to_pivot,
            pivot: Some(pivot),
            memo: RefCell::new(HashMap::new()),
        }
    }

    /// Costs pivoted on a query item that has no id.
    pub(crate) fn for_query(to_pivot: F) -> Self {
        Self {
            to_pivot,
            pivot: None,
            memo: RefCell::new(HashMap::new()),
        }
    }

    /// Distance from `id` to the pivot.
    pub(crate) fn from(&self, id: usize) -> f32 {
        if let Some(&cached) = self.memo.borrow().get(&id) {
            return cached;
        }
        let distance = (self.to_pivot)(id);
        self.memo.borrow_mut().insert(id, distance);
        distance
    }

    /// Whether `id` is the pivot itself.
    pub(crate) fn is_pivot(&self, id: usize) -> bool {
        self.pivot == Some(id)
    }

    /// Ascending-distance order: the greatest element is the farthest.
    pub(crate) fn farther_first(&self) -> DistanceOrder<'_, F> {
        DistanceOrder {
            costs: self,
            reversed: false,
        }
    }

    /// Reversed view: the greatest element is the closest.
    pub(crate) fn closer_first(&self) -> DistanceOrder<'_, F> {
        DistanceOrder {
            costs: self,
            reversed: true,
        }
    }
}

/// Total order on ids by distance to the pivot.
pub(crate) struct DistanceOrder<'a, F> {
    costs: &'a TravelingCosts<F>,
    reversed: bool,
}

impl<F: Fn(usize) -> f32> Comparer<usize> for DistanceOrder<'_, F> {
    fn compare(&self, a: &usize, b: &usize) -> Ordering {
        let ord = self.costs.from(*a).total_cmp(&self.costs.from(*b));
        if self.reversed {
            ord.reverse()
        } else {
            ord
        }
    }
}
