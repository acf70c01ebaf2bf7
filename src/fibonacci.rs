//! Fibonacci Heap implementation
//!
//! A Fibonacci heap is a data structure for priority queue operations with:
//! - O(1) amortized insert and decrease_key
//! - O(log n) amortized delete_min
//! - merge that splices root rings in O(1) after moving the smaller heap's
//!   nodes into the larger heap's arena, O(min(n, m)) in total
//!
//! The structure consists of a collection of heap-ordered trees. Roots are linked
//! in a circular doubly linked list, and so are the children of every node. The
//! heap keeps the root with the minimum key at hand.
//!
//! Nodes live in an arena ([`crate::storage`]) and refer to each other by key,
//! so the heap is free of `unsafe` and handles can be checked: a handle that
//! outlived its element, or comes from another heap, is rejected with
//! [`HeapError::InvalidHandle`] instead of corrupting memory.
//!
//! # Algorithm Overview
//!
//! - **Insert**: add a ring-of-one to the root ring, compare with the minimum
//! - **Decrease-key**: lower the key; if it now beats its parent, cut it to the
//!   root ring and walk up the ancestors: an unmarked ancestor gets marked and
//!   the walk stops, a marked one is cut as well (cascading cut)
//! - **Delete-min**: remove the minimum root, promote its children, and
//!   [consolidate](crate::consolidate) the roots to one tree per degree
//! - **Merge**: relocate the smaller arena into the larger one, splice the root
//!   rings and keep the smaller minimum; consolidation waits for the next
//!   delete-min

use log::debug;
use sibling_ring::{RingOps, RingStore};
use std::fmt;

use crate::consolidate::{ConsolidationStats, DigitSlots};
use crate::storage::{ArenaId, Forwarding, NodeArena, NodeKey};
use crate::traits::{Handle, HeapError, KeyOrder, Natural, PriorityQueue};

/// Handle to an element in a Fibonacci heap
///
/// The handle stays valid until its element is removed by `delete_min` or
/// `clear`. Merging carries it along: after `a.merge(b)` handles issued by
/// either `a` or `b` work on `a`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct FibonacciHandle {
    arena: ArenaId,
    node: NodeKey,
}

impl Handle for FibonacciHandle {}

/// A structural rule found broken by [`FibonacciHeap::check_invariants`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A node's neighbours do not point back at it
    BrokenRing,
    /// A child does not name its parent, or a root has a parent
    ParentLink,
    /// `child_count` differs from the length of the child ring
    ChildCount,
    /// A child has a smaller key than its parent
    HeapOrder,
    /// A root carries the mark bit
    MarkedRoot,
    /// The minimum is missing, not a root, or not the smallest root
    Minimum,
    /// The number of reachable nodes differs from the element count
    Count {
        /// Elements the heap reports
        expected: usize,
        /// Nodes reachable from the root ring
        found: usize,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantViolation::BrokenRing => write!(f, "sibling ring is inconsistent"),
            InvariantViolation::ParentLink => write!(f, "parent link is inconsistent"),
            InvariantViolation::ChildCount => write!(f, "child count does not match child ring"),
            InvariantViolation::HeapOrder => write!(f, "child key is smaller than parent key"),
            InvariantViolation::MarkedRoot => write!(f, "root is marked"),
            InvariantViolation::Minimum => write!(f, "minimum root is wrong"),
            InvariantViolation::Count { expected, found } => {
                write!(f, "expected {expected} nodes, found {found}")
            }
        }
    }
}

impl std::error::Error for InvariantViolation {}

/// Fibonacci Heap
///
/// # Example
///
/// ```rust
/// use amortized_heaps::fibonacci::FibonacciHeap;
///
/// let mut heap = FibonacciHeap::new();
/// let handle = heap.insert(5, "item");
/// heap.decrease_key(&handle, 1).unwrap();
/// assert_eq!(heap.find_min(), Some((&1, &"item")));
/// assert_eq!(heap.delete_min(), Some((1, "item")));
/// assert!(heap.is_empty());
/// ```
pub struct FibonacciHeap<K, V, C = Natural> {
    arena: NodeArena<K, V>,
    /// Where handles of arenas absorbed by earlier merges point now
    forwarding: Forwarding<NodeKey>,
    /// Any member of the root ring
    root: Option<NodeKey>,
    min: Option<NodeKey>,
    order: C,
    slots: DigitSlots,
    last_consolidation: ConsolidationStats,
}

impl<K: Ord, V> FibonacciHeap<K, V, Natural> {
    /// Creates an empty heap ordered by `K`'s `Ord`
    pub fn new() -> Self {
        Self::with_order(Natural)
    }
}

impl<K, V, C: KeyOrder<K>> FibonacciHeap<K, V, C> {
    /// Creates an empty heap with a custom key order
    ///
    /// ```rust
    /// use amortized_heaps::fibonacci::FibonacciHeap;
    ///
    /// // A max-heap
    /// let mut heap = FibonacciHeap::with_order(|a: &i32, b: &i32| b.cmp(a));
    /// heap.insert(1, ());
    /// heap.insert(7, ());
    /// assert_eq!(heap.find_min(), Some((&7, &())));
    /// ```
    pub fn with_order(order: C) -> Self {
        Self {
            arena: NodeArena::new(),
            forwarding: Forwarding::default(),
            root: None,
            min: None,
            order,
            slots: DigitSlots::new(),
            last_consolidation: ConsolidationStats::default(),
        }
    }

    /// Number of elements, the heap's `count`
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Whether the heap holds no elements
    pub fn is_empty(&self) -> bool {
        self.min.is_none()
    }

    /// Inserts an element and returns its handle. O(1).
    pub fn insert(&mut self, key: K, value: V) -> FibonacciHandle {
        let node = self.arena.alloc(key, value);
        self.push_root(node);

        match self.min {
            Some(min) if self.is_less(min, node) => {}
            _ => self.min = Some(node),
        }

        self.handle(node)
    }

    /// Handle of the minimum element. O(1).
    pub fn peek_min(&self) -> Option<FibonacciHandle> {
        self.min.map(|node| self.handle(node))
    }

    /// Minimum key and its value. O(1).
    pub fn find_min(&self) -> Option<(&K, &V)> {
        self.min.map(|node| {
            let node = self.arena.node(node);
            (&node.key, &node.value)
        })
    }

    /// Key and value behind a handle, if it is still live in this heap.
    pub fn get(&self, handle: &FibonacciHandle) -> Option<(&K, &V)> {
        let node = self.resolve(handle).ok()?;
        self.arena.get(node).map(|n| (&n.key, &n.value))
    }

    /// Mutable access to the value behind a handle. Keys can only change
    /// through [`decrease_key`](Self::decrease_key).
    pub fn value_mut(&mut self, handle: &FibonacciHandle) -> Option<&mut V> {
        let node = self.resolve(handle).ok()?;
        self.arena.get_mut(node).map(|n| &mut n.value)
    }

    /// Whether the handle names a live element of this heap
    pub fn contains(&self, handle: &FibonacciHandle) -> bool {
        self.resolve(handle).is_ok()
    }

    /// Number of trees in the root ring. O(roots).
    pub fn root_count(&self) -> usize {
        self.root.map_or(0, |r| self.arena.siblings(r).count())
    }

    /// Statistics of the consolidation run by the last `delete_min`
    pub fn last_consolidation(&self) -> ConsolidationStats {
        self.last_consolidation
    }

    /// Lowers the key of an element. O(1) amortized.
    ///
    /// # Errors
    /// - [`HeapError::KeyIncreased`] if `new_key` is greater than the current key
    /// - [`HeapError::InvalidHandle`] if the element was removed or the handle
    ///   belongs to another heap
    ///
    /// The heap is unchanged when an error is returned.
    pub fn decrease_key(&mut self, handle: &FibonacciHandle, new_key: K) -> Result<(), HeapError> {
        let node = self.resolve(handle)?;

        if self.order.less(&self.arena.node(node).key, &new_key) {
            return Err(HeapError::KeyIncreased);
        }

        self.arena.node_mut(node).key = new_key;

        match self.arena.node(node).parent {
            None => {
                if let Some(min) = self.min {
                    if self.is_less(node, min) {
                        self.min = Some(node);
                    }
                }
            }
            Some(parent) => {
                if self.is_less(node, parent) {
                    self.cut(node);
                    self.cascading_cut(parent);
                }
            }
        }

        Ok(())
    }

    /// Removes the minimum element and returns it. O(log n) amortized.
    ///
    /// Does nothing and returns `None` on an empty heap.
    pub fn delete_min(&mut self) -> Option<(K, V)> {
        let min = self.min.take()?;

        self.remove_root(min);
        if let Some(children) = self.arena.detach_children(min) {
            self.root = RingOps::new().splice(&mut self.arena, self.root, Some(children));
        }
        let entry = self.arena.release(min);

        let out = self
            .slots
            .consolidate(&mut self.arena, &self.order, self.root.take());
        self.root = out.root;
        self.min = out.min;
        self.last_consolidation = out.stats;

        entry
    }

    /// Moves every element of `other` into this heap.
    ///
    /// The root rings are spliced and the minimum updated; consolidation is
    /// left to the next `delete_min`. Only the smaller of the two arenas is
    /// relocated, so the cost is O(min(n, m)) and an element moves at most
    /// O(log n) times over any sequence of merges. Handles of both heaps stay
    /// valid on this heap.
    pub fn merge(&mut self, mut other: Self) {
        if other.is_empty() {
            return;
        }

        if self.is_empty() {
            debug!("merge into empty heap: adopting {} nodes", other.len());
            self.arena = other.arena;
            self.forwarding = other.forwarding;
            self.root = other.root;
            self.min = other.min;
            return;
        }

        if self.len() < other.len() {
            std::mem::swap(&mut self.arena, &mut other.arena);
            std::mem::swap(&mut self.forwarding, &mut other.forwarding);
            std::mem::swap(&mut self.root, &mut other.root);
            std::mem::swap(&mut self.min, &mut other.min);
        }

        let moved = other.len();
        let from = other.arena.id();
        let remap = self.arena.absorb(other.arena);
        self.forwarding.adopt(from, &remap, other.forwarding);
        let (Some(root), Some(min)) = (other.root, other.min) else {
            return;
        };
        let (root, min) = (remap[&root], remap[&min]);

        self.root = RingOps::new().splice(&mut self.arena, self.root, Some(root));
        if let Some(current) = self.min {
            if self.is_less(min, current) {
                self.min = Some(min);
            }
        }

        debug!(
            "relocated {} nodes, heap now holds {} ({} forwarded keys)",
            moved,
            self.len(),
            self.forwarding.len()
        );
    }

    /// Removes every element, releasing the nodes depth-first.
    pub fn clear(&mut self) {
        let mut stack: Vec<NodeKey> = match self.root.take() {
            Some(root) => self.arena.siblings(root).collect(),
            None => Vec::new(),
        };

        let mut released = 0usize;
        while let Some(node) = stack.pop() {
            stack.extend(self.arena.children(node));
            self.arena.release(node);
            released += 1;
        }

        debug_assert_eq!(self.arena.len(), 0);
        self.min = None;
        self.forwarding.clear();
        self.last_consolidation = ConsolidationStats::default();
        debug!("cleared {} nodes", released);
    }

    /// Walks the whole structure and checks every heap invariant.
    ///
    /// Intended for tests and debugging; O(n).
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let Some(root) = self.root else {
            return match (self.min, self.len()) {
                (None, 0) => Ok(()),
                (Some(_), _) => Err(InvariantViolation::Minimum),
                (None, n) => Err(InvariantViolation::Count {
                    expected: n,
                    found: 0,
                }),
            };
        };

        let min = self.min.ok_or(InvariantViolation::Minimum)?;
        if !self.arena.contains(min) || !self.arena.node(min).is_root() {
            return Err(InvariantViolation::Minimum);
        }

        let mut found = 0usize;
        let mut stack = Vec::new();

        for r in self.arena.siblings(root) {
            self.check_ring_member(r)?;
            let node = self.arena.node(r);
            if node.parent.is_some() {
                return Err(InvariantViolation::ParentLink);
            }
            if node.marked {
                return Err(InvariantViolation::MarkedRoot);
            }
            if self.is_less(r, min) {
                return Err(InvariantViolation::Minimum);
            }
            stack.push(r);
        }

        while let Some(parent) = stack.pop() {
            found += 1;
            let mut children = 0usize;
            for child in self.arena.children(parent) {
                self.check_ring_member(child)?;
                if self.arena.node(child).parent != Some(parent) {
                    return Err(InvariantViolation::ParentLink);
                }
                if self.is_less(child, parent) {
                    return Err(InvariantViolation::HeapOrder);
                }
                children += 1;
                stack.push(child);
            }
            if children != self.arena.node(parent).child_count {
                return Err(InvariantViolation::ChildCount);
            }
        }

        if found != self.len() {
            return Err(InvariantViolation::Count {
                expected: self.len(),
                found,
            });
        }

        Ok(())
    }

    fn check_ring_member(&self, node: NodeKey) -> Result<(), InvariantViolation> {
        let link = self.arena.link(node);
        if self.arena.link(link.prev()).next() != node || self.arena.link(link.next()).prev() != node {
            return Err(InvariantViolation::BrokenRing);
        }
        Ok(())
    }

    #[inline]
    fn handle(&self, node: NodeKey) -> FibonacciHandle {
        FibonacciHandle {
            arena: self.arena.id(),
            node,
        }
    }

    fn resolve(&self, handle: &FibonacciHandle) -> Result<NodeKey, HeapError> {
        let node = if handle.arena == self.arena.id() {
            Some(handle.node)
        } else {
            self.forwarding.lookup(handle.arena, handle.node)
        };

        match node {
            Some(node) if self.arena.contains(node) => Ok(node),
            _ => Err(HeapError::InvalidHandle),
        }
    }

    #[inline]
    fn is_less(&self, a: NodeKey, b: NodeKey) -> bool {
        self.order.less(&self.arena.node(a).key, &self.arena.node(b).key)
    }

    /// Adds a parentless ring of one to the root ring.
    fn push_root(&mut self, node: NodeKey) {
        self.root = RingOps::new().splice(&mut self.arena, self.root, Some(node));
    }

    /// Takes a root out of the root ring, keeping its children.
    fn remove_root(&mut self, node: NodeKey) {
        let next = self.arena.link(node).next();
        let sole = RingOps::new().cut(&mut self.arena, node);

        if self.root == Some(node) {
            self.root = if sole { None } else { Some(next) };
        }
    }

    /// Moves a non-root node (with its subtree) to the root ring.
    fn cut(&mut self, node: NodeKey) {
        self.arena.cut_from_family(node);
        self.arena.node_mut(node).marked = false;
        self.push_root(node);

        match self.min {
            Some(min) if !self.is_less(node, min) => {}
            _ => self.min = Some(node),
        }
    }

    /// Marks `node`, or cuts it and continues upwards if it was marked already.
    fn cascading_cut(&mut self, mut node: NodeKey) {
        while let Some(parent) = self.arena.node(node).parent {
            let n = self.arena.node_mut(node);
            if !n.marked {
                n.marked = true;
                return;
            }
            self.cut(node);
            node = parent;
        }
    }
}

impl<K: Ord, V> Default for FibonacciHeap<K, V, Natural> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C: KeyOrder<K> + Default> PriorityQueue<K, V> for FibonacciHeap<K, V, C> {
    type Handle = FibonacciHandle;

    fn new() -> Self {
        Self::with_order(C::default())
    }

    fn len(&self) -> usize {
        self.arena.len()
    }

    fn insert(&mut self, key: K, value: V) -> Self::Handle {
        FibonacciHeap::insert(self, key, value)
    }

    fn peek_min(&self) -> Option<Self::Handle> {
        FibonacciHeap::peek_min(self)
    }

    fn find_min(&self) -> Option<(&K, &V)> {
        FibonacciHeap::find_min(self)
    }

    fn get(&self, handle: &Self::Handle) -> Option<(&K, &V)> {
        FibonacciHeap::get(self, handle)
    }

    fn decrease_key(&mut self, handle: &Self::Handle, new_key: K) -> Result<(), HeapError> {
        FibonacciHeap::decrease_key(self, handle, new_key)
    }

    fn delete_min(&mut self) -> Option<(K, V)> {
        FibonacciHeap::delete_min(self)
    }

    fn merge(&mut self, other: Self) {
        FibonacciHeap::merge(self, other)
    }

    fn clear(&mut self) {
        FibonacciHeap::clear(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_of<'a>(heap: &'a FibonacciHeap<i32, &str>, h: Option<FibonacciHandle>) -> Option<&'a i32> {
        h.and_then(|h| heap.get(&h)).map(|(k, _)| k)
    }

    #[test]
    fn test_basic_operations() {
        let mut heap = FibonacciHeap::new();
        assert!(heap.is_empty());
        assert_eq!(heap.len(), 0);

        heap.insert(5, "a");
        heap.insert(3, "b");
        heap.insert(7, "c");

        assert_eq!(heap.len(), 3);
        assert_eq!(heap.find_min(), Some((&3, &"b")));

        assert_eq!(heap.delete_min(), Some((3, "b")));
        assert_eq!(heap.find_min(), Some((&5, &"a")));
        heap.check_invariants().unwrap();
    }

    #[test]
    fn test_empty_operations_are_noops() {
        let mut heap: FibonacciHeap<i32, ()> = FibonacciHeap::new();
        assert_eq!(heap.peek_min(), None);
        assert_eq!(heap.delete_min(), None);
        heap.clear();
        heap.check_invariants().unwrap();
    }

    #[test]
    fn test_walkthrough() {
        let mut heap = FibonacciHeap::new();
        let mut handles = Vec::new();
        for k in [5, 3, 8, 1] {
            handles.push(heap.insert(k, "x"));
        }
        assert_eq!(key_of(&heap, heap.peek_min()), Some(&1));

        heap.delete_min();
        assert_eq!(key_of(&heap, heap.peek_min()), Some(&3));

        heap.decrease_key(&handles[2], 0).unwrap();
        assert_eq!(key_of(&heap, heap.peek_min()), Some(&0));

        assert_eq!(heap.delete_min().map(|(k, _)| k), Some(0));
        assert_eq!(heap.delete_min().map(|(k, _)| k), Some(3));
        assert_eq!(heap.delete_min().map(|(k, _)| k), Some(5));
        assert!(heap.is_empty());
        assert_eq!(heap.peek_min(), None);
    }

    #[test]
    fn test_decrease_key() {
        let mut heap = FibonacciHeap::new();
        heap.insert(10, "a");
        let h2 = heap.insert(20, "b");
        let h3 = heap.insert(30, "c");

        assert_eq!(heap.find_min(), Some((&10, &"a")));

        heap.decrease_key(&h2, 5).unwrap();
        assert_eq!(heap.find_min(), Some((&5, &"b")));

        heap.decrease_key(&h3, 1).unwrap();
        assert_eq!(heap.find_min(), Some((&1, &"c")));
    }

    #[test]
    fn test_increase_is_rejected_without_changes() {
        let mut heap = FibonacciHeap::new();
        let handles: Vec<_> = (0..20).map(|k| heap.insert(k, "v")).collect();
        heap.delete_min();

        let before_min = heap.peek_min();
        let before_roots = heap.root_count();

        assert_eq!(heap.decrease_key(&handles[7], 100), Err(HeapError::KeyIncreased));
        assert_eq!(heap.len(), 19);
        assert_eq!(heap.peek_min(), before_min);
        assert_eq!(heap.root_count(), before_roots);
        assert_eq!(heap.get(&handles[7]), Some((&7, &"v")));

        // Equal keys are allowed and change nothing
        assert_eq!(heap.decrease_key(&handles[7], 7), Ok(()));
        heap.check_invariants().unwrap();
    }

    #[test]
    fn test_invalid_handles() {
        let mut heap = FibonacciHeap::new();
        let mut other = FibonacciHeap::new();
        let h = heap.insert(1, "a");
        let foreign = other.insert(1, "b");

        assert_eq!(heap.decrease_key(&foreign, 0), Err(HeapError::InvalidHandle));
        assert!(!heap.contains(&foreign));

        heap.delete_min();
        assert_eq!(heap.decrease_key(&h, 0), Err(HeapError::InvalidHandle));
        assert_eq!(heap.get(&h), None);
        heap.check_invariants().unwrap();
    }

    #[test]
    fn test_cascading_cut() {
        let mut heap = FibonacciHeap::new();
        let h: Vec<_> = (0..=8).map(|k| heap.insert(k, "v")).collect();

        // One tree: 1 -> [2, 3 -> [4], 5 -> [6, 7 -> [8]]]
        heap.delete_min();
        assert_eq!(heap.root_count(), 1);
        assert_eq!(heap.last_consolidation().depth, 4);
        let node = |i: usize| h[i].node;
        assert_eq!(heap.arena.node(node(8)).parent, Some(node(7)));
        assert_eq!(heap.arena.node(node(7)).parent, Some(node(5)));

        // Cutting 8 marks 7
        heap.decrease_key(&h[8], -8).unwrap();
        assert!(heap.arena.node(node(7)).marked);
        assert_eq!(heap.root_count(), 2);

        // Cutting 6 marks 5
        heap.decrease_key(&h[6], -6).unwrap();
        assert!(heap.arena.node(node(5)).marked);

        // Cutting 7 finds 5 marked: 5 is cut too, 1 is a root so the walk stops
        heap.decrease_key(&h[7], -7).unwrap();
        assert!(heap.arena.node(node(5)).is_root());
        assert!(!heap.arena.node(node(5)).marked);
        assert_eq!(heap.arena.node(node(5)).child_count, 0);
        assert_eq!(heap.arena.node(node(1)).child_count, 2);
        assert_eq!(heap.root_count(), 5);
        heap.check_invariants().unwrap();

        let drained: Vec<i32> = std::iter::from_fn(|| heap.delete_min().map(|(k, _)| k)).collect();
        assert_eq!(drained, vec![-8, -7, -6, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_decrease_without_violation_keeps_shape() {
        let mut heap = FibonacciHeap::new();
        let h: Vec<_> = (0..=4).map(|k| heap.insert(k * 10, "v")).collect();
        heap.delete_min();

        // 40 hangs below 30; 35 still respects the order
        heap.decrease_key(&h[4], 35).unwrap();
        assert_eq!(heap.root_count(), 1);
        assert!(!heap.arena.node(h[3].node).marked);
        heap.check_invariants().unwrap();
    }

    #[test]
    fn test_merge() {
        let mut heap1 = FibonacciHeap::new();
        heap1.insert(5, "a");
        heap1.insert(10, "b");

        let mut heap2 = FibonacciHeap::new();
        heap2.insert(3, "c");
        heap2.insert(7, "d");

        heap1.merge(heap2);
        assert_eq!(heap1.find_min(), Some((&3, &"c")));
        assert_eq!(heap1.len(), 4);
        heap1.check_invariants().unwrap();
    }

    #[test]
    fn test_merge_keeps_own_handles() {
        let mut heap1 = FibonacciHeap::new();
        let own = heap1.insert(50, "own");
        heap1.insert(60, "x");

        let mut heap2 = FibonacciHeap::new();
        let theirs = heap2.insert(1, "theirs");

        heap1.merge(heap2);
        assert!(heap1.contains(&own));
        assert!(heap1.contains(&theirs));
        assert_eq!(heap1.get(&theirs), Some((&1, &"theirs")));

        heap1.decrease_key(&own, 0).unwrap();
        heap1.decrease_key(&theirs, -1).unwrap();
        assert_eq!(heap1.delete_min(), Some((-1, "theirs")));
        assert!(!heap1.contains(&theirs));
        assert_eq!(heap1.decrease_key(&theirs, -2), Err(HeapError::InvalidHandle));
        assert_eq!(heap1.delete_min(), Some((0, "own")));
        heap1.check_invariants().unwrap();
    }

    #[test]
    fn test_merge_smaller_into_larger_keeps_all_handles() {
        let mut small = FibonacciHeap::new();
        let lone = small.insert(500, 0);

        let mut large = FibonacciHeap::new();
        let many: Vec<_> = (0..200).map(|k| large.insert(k + 1000, k)).collect();
        let large_arena = large.arena.id();

        // The receiving heap is the smaller one, so its own arena is relocated
        small.merge(large);
        assert_eq!(small.arena.id(), large_arena);
        assert_eq!(small.len(), 201);

        small.decrease_key(&lone, 10).unwrap();
        small.decrease_key(&many[150], 5).unwrap();
        assert_eq!(small.delete_min(), Some((5, 150)));
        assert_eq!(small.delete_min(), Some((10, 0)));
        assert_eq!(small.get(&many[0]), Some((&1000, &0)));
        small.check_invariants().unwrap();
    }

    #[test]
    fn test_handles_survive_chained_merges() {
        let mut a = FibonacciHeap::new();
        let mut b = FibonacciHeap::new();
        let mut c = FibonacciHeap::new();
        let ha = a.insert(30, "a");
        let hb = b.insert(20, "b");
        b.insert(21, "b2");
        let hc = c.insert(10, "c");

        a.merge(b);
        c.merge(a);

        for (h, key) in [(ha, 3), (hb, 2), (hc, 1)] {
            c.decrease_key(&h, key).unwrap();
        }
        assert_eq!(c.delete_min(), Some((1, "c")));
        assert_eq!(c.delete_min(), Some((2, "b")));
        assert_eq!(c.delete_min(), Some((3, "a")));
        assert_eq!(c.delete_min(), Some((21, "b2")));
        assert!(c.is_empty());
    }

    #[test]
    fn test_merge_into_empty_adopts_handles() {
        let mut empty = FibonacciHeap::new();
        let mut full = FibonacciHeap::new();
        let h = full.insert(4, "a");
        full.insert(2, "b");

        empty.merge(full);
        assert!(empty.contains(&h));
        empty.decrease_key(&h, 1).unwrap();
        assert_eq!(empty.find_min(), Some((&1, &"a")));
    }

    #[test]
    fn test_clear_and_reuse() {
        let mut heap = FibonacciHeap::new();
        let handles: Vec<_> = (0..100).map(|k| heap.insert(k, k)).collect();
        heap.delete_min();
        heap.decrease_key(&handles[50], -1).unwrap();

        assert!(heap.last_consolidation().depth > 0);

        heap.clear();
        assert!(heap.is_empty());
        assert_eq!(heap.len(), 0);
        assert_eq!(heap.last_consolidation(), ConsolidationStats::default());
        assert!(!heap.contains(&handles[10]));
        heap.check_invariants().unwrap();

        heap.insert(3, 3);
        assert_eq!(heap.find_min(), Some((&3, &3)));
    }

    #[test]
    fn test_value_mut() {
        let mut heap = FibonacciHeap::new();
        let h = heap.insert(1, String::from("a"));
        heap.value_mut(&h).unwrap().push('b');
        assert_eq!(heap.delete_min(), Some((1, String::from("ab"))));
        assert_eq!(heap.value_mut(&h), None);
    }

    #[test]
    fn test_custom_order() {
        let mut heap = FibonacciHeap::with_order(|a: &i32, b: &i32| b.cmp(a));
        let low = heap.insert(1, "low");
        heap.insert(5, "mid");
        heap.insert(9, "high");

        assert_eq!(heap.find_min(), Some((&9, &"high")));
        // "Decreasing" in a reversed order means growing
        assert_eq!(heap.decrease_key(&low, 0), Err(HeapError::KeyIncreased));
        heap.decrease_key(&low, 20).unwrap();
        assert_eq!(heap.delete_min(), Some((20, "low")));
    }
}
