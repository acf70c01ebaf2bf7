//! Consolidation of a root ring
//!
//! After `delete_min` the root ring can hold any number of trees. Consolidation
//! walks it once and links trees of equal degree until at most one root per
//! degree is left. The degree table works like the digits of a binary number:
//! placing a tree of degree `d` into an occupied slot `d` links the two into a
//! tree of degree `d + 1` that carries into the next slot, exactly like
//! ripple-carry addition.
//!
//! With at most one tree per degree and Fibonacci-bounded subtree sizes, the
//! result has O(log n) roots, which is what pays for `delete_min` under the
//! potential `roots + 2 * marked`.

use log::trace;
use sibling_ring::{RingOps, RingStore};
use smallvec::SmallVec;

use crate::storage::{NodeArena, NodeKey};
use crate::traits::KeyOrder;

/// Structural statistics of one consolidation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsolidationStats {
    /// Roots in the ring that was consolidated
    pub input_roots: usize,
    /// Pairwise links performed (each removes one root)
    pub links: usize,
    /// Roots left afterwards, at most one per degree
    pub output_roots: usize,
    /// Highest occupied degree plus one
    pub depth: usize,
}

/// The outcome of consolidating a root ring
pub(crate) struct Consolidated {
    pub(crate) root: Option<NodeKey>,
    pub(crate) min: Option<NodeKey>,
    pub(crate) stats: ConsolidationStats,
}

/// Degree table, kept by the heap so its allocation is reused across passes
///
/// Slots are added on demand when a tree of a degree past the end arrives;
/// 32 inline slots cover heaps far beyond anything that fits in memory
/// before spilling.
pub(crate) struct DigitSlots {
    slots: SmallVec<[Option<NodeKey>; 32]>,
}

impl DigitSlots {
    pub(crate) fn new() -> Self {
        DigitSlots {
            slots: SmallVec::new(),
        }
    }

    /// Consumes the ring at `input` and rebuilds it with one root per degree.
    pub(crate) fn consolidate<K, V, C>(
        &mut self,
        arena: &mut NodeArena<K, V>,
        order: &C,
        input: Option<NodeKey>,
    ) -> Consolidated
    where
        C: KeyOrder<K>,
    {
        debug_assert!(self.slots.iter().all(Option::is_none));

        let ops = RingOps::new();
        let mut stats = ConsolidationStats::default();

        let mut input = input;
        while let Some(root) = input {
            let next = arena.link(root).next();
            input = if ops.cut(arena, root) { None } else { Some(next) };

            stats.input_roots += 1;
            self.carry(arena, order, root, &mut stats);
        }

        stats.depth = self
            .slots
            .iter()
            .rposition(Option::is_some)
            .map_or(0, |top| top + 1);

        let mut ring = None;
        let mut min: Option<NodeKey> = None;

        for root in self.slots.drain(..).flatten() {
            // Splicing before the entry appends, so the ring ends up in degree order
            ring = ops.splice(arena, ring, Some(root));
            stats.output_roots += 1;

            let smaller = match min {
                None => true,
                Some(m) => order.less(&arena.node(root).key, &arena.node(m).key),
            };
            if smaller {
                min = Some(root);
            }
        }

        trace!(
            "consolidated {} roots into {} ({} links, depth {})",
            stats.input_roots,
            stats.output_roots,
            stats.links,
            stats.depth
        );

        Consolidated {
            root: ring,
            min,
            stats,
        }
    }

    /// Adds one tree to the table, linking and carrying until a slot is free.
    fn carry<K, V, C>(
        &mut self,
        arena: &mut NodeArena<K, V>,
        order: &C,
        tree: NodeKey,
        stats: &mut ConsolidationStats,
    ) where
        C: KeyOrder<K>,
    {
        let mut carry = tree;
        let mut digit = arena.node(tree).child_count;

        loop {
            if digit >= self.slots.len() {
                self.slots.resize(digit + 1, None);
            }

            match self.slots[digit].take() {
                None => {
                    self.slots[digit] = Some(carry);
                    return;
                }
                Some(occupant) => {
                    carry = join(arena, order, occupant, carry);
                    stats.links += 1;
                    digit += 1;
                }
            }
        }
    }
}

/// Links two roots of equal degree; the smaller key becomes the parent.
///
/// On a tie `first` stays on top.
fn join<K, V, C>(arena: &mut NodeArena<K, V>, order: &C, first: NodeKey, second: NodeKey) -> NodeKey
where
    C: KeyOrder<K>,
{
    let (parent, child) = if order.less(&arena.node(second).key, &arena.node(first).key) {
        (second, first)
    } else {
        (first, second)
    };

    arena.node_mut(child).marked = false;
    arena.add_child(parent, child);
    parent
}
