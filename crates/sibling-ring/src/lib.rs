//! Index-addressed circular doubly-linked sibling rings.
//!
//! This crate provides the ring bookkeeping used by tree-of-trees heaps, where
//! the roots of the forest and the children of every node each form a circular
//! doubly-linked list. Instead of raw pointers the links are plain keys (slot
//! indices, arena keys, ...) and the nodes live in whatever store the caller
//! owns. The store only has to hand out a [`RingLink`] per key through
//! [`RingStore`].
//!
//! # Circular vs Linear Lists
//!
//! In a circular list:
//! - A single node points to itself (both `next` and `prev`)
//! - There is no head or tail - any node can be the "entry point"
//! - Splicing two rings together is O(1)
//! - Iteration wraps around (must track starting point)
//!
//! Because keys carry no ownership, a node can be moved between rings without
//! touching any allocation, and parent links elsewhere in the node stay
//! non-owning.
//!
//! # Example
//!
//! ```rust
//! use sibling_ring::{RingLink, RingOps, RingStore};
//!
//! struct Links(Vec<RingLink<usize>>);
//!
//! impl RingStore<usize> for Links {
//!     fn link(&self, key: usize) -> &RingLink<usize> {
//!         &self.0[key]
//!     }
//!     fn link_mut(&mut self, key: usize) -> &mut RingLink<usize> {
//!         &mut self.0[key]
//!     }
//! }
//!
//! let mut links = Links((0..3).map(RingLink::singleton).collect());
//! let ops = RingOps::new();
//!
//! ops.insert_before(&mut links, 0, 1);
//! ops.insert_before(&mut links, 0, 2);
//!
//! let order: Vec<_> = ops.siblings(&links, 0).collect();
//! assert_eq!(order, vec![0, 1, 2]);
//!
//! assert!(!ops.cut(&mut links, 1));
//! assert_eq!(ops.count(&links, 0), 2);
//! assert!(ops.is_singleton(&links, 1));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

use core::fmt;
use core::iter::FusedIterator;

// =============================================================================
// RingLink
// =============================================================================

/// The pair of sibling keys embedded in every ring member.
///
/// A link is never "unlinked": a node that has no siblings is a ring of one
/// and both of its keys name the node itself.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RingLink<K> {
    prev: K,
    next: K,
}

impl<K: Copy> RingLink<K> {
    /// Creates the link of a ring of one.
    #[inline]
    pub fn singleton(key: K) -> Self {
        RingLink {
            prev: key,
            next: key,
        }
    }

    /// The left sibling.
    #[inline]
    pub fn prev(&self) -> K {
        self.prev
    }

    /// The right sibling.
    #[inline]
    pub fn next(&self) -> K {
        self.next
    }

    /// Overwrites both sibling keys.
    ///
    /// Only meant for stores that relocate nodes and rewrite keys wholesale;
    /// it does not touch the neighbours.
    #[inline]
    pub fn relink(&mut self, prev: K, next: K) {
        self.prev = prev;
        self.next = next;
    }
}

impl<K: fmt::Debug> fmt::Debug for RingLink<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RingLink({:?} <- * -> {:?})", self.prev, self.next)
    }
}

// =============================================================================
// RingStore
// =============================================================================

/// Storage that can resolve a key to the ring link of its node.
///
/// Implementations may panic when handed a key that does not name a live
/// node; the ring operations only ever pass keys they read from links.
pub trait RingStore<K> {
    /// Returns the link of `key`.
    fn link(&self, key: K) -> &RingLink<K>;

    /// Returns the link of `key` mutably.
    fn link_mut(&mut self, key: K) -> &mut RingLink<K>;
}

// =============================================================================
// RingOps
// =============================================================================

/// Operations for manipulating circular doubly-linked rings.
///
/// All operations are O(1) except [`RingOps::count`] and iteration.
#[derive(Clone, Copy, Default, Debug)]
pub struct RingOps;

impl RingOps {
    /// Creates a new `RingOps`.
    #[inline]
    pub const fn new() -> Self {
        RingOps
    }

    /// Returns true if `key` is the only member of its ring.
    #[inline]
    pub fn is_singleton<K, S>(&self, store: &S, key: K) -> bool
    where
        K: Copy + Eq,
        S: RingStore<K> + ?Sized,
    {
        store.link(key).next == key
    }

    /// Splices the ring headed by `new` immediately before `at`.
    ///
    /// `new` may be a singleton or any member of another ring. Afterwards the
    /// ring reads `... at.prev, new, <rest of new's ring>, at, ...`, so walking
    /// right from `at` reaches the spliced members last.
    ///
    /// `at` and `new` must not already share a ring.
    #[inline]
    pub fn insert_before<K, S>(&self, store: &mut S, at: K, new: K)
    where
        K: Copy + Eq,
        S: RingStore<K> + ?Sized,
    {
        debug_assert!(at != new, "cannot splice a node before itself");

        //   Ring A: ... <-> at_prev <-> at <-> ...
        //   Ring B: ... <-> new_last <-> new <-> ...
        //
        // After:
        //   ... <-> at_prev <-> new <-> ... <-> new_last <-> at <-> ...
        let at_prev = store.link(at).prev;
        let new_last = store.link(new).prev;

        store.link_mut(at_prev).next = new;
        store.link_mut(new).prev = at_prev;

        store.link_mut(new_last).next = at;
        store.link_mut(at).prev = new_last;
    }

    /// Splices two rings together.
    ///
    /// If either is `None`, returns the other. Otherwise `b`'s ring is
    /// inserted before `a` and `a` is returned as the entry point.
    #[inline]
    pub fn splice<K, S>(&self, store: &mut S, a: Option<K>, b: Option<K>) -> Option<K>
    where
        K: Copy + Eq,
        S: RingStore<K> + ?Sized,
    {
        match (a, b) {
            (None, None) => None,
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (Some(a), Some(b)) => {
                self.insert_before(store, a, b);
                Some(a)
            }
        }
    }

    /// Removes `key` from its ring and turns it back into a ring of one.
    ///
    /// Returns `true` if `key` was the only member, in which case nothing
    /// changed. Callers holding an external entry point into the ring (a
    /// parent's first child, a heap's root entry) must move it off `key`
    /// themselves.
    #[inline]
    pub fn cut<K, S>(&self, store: &mut S, key: K) -> bool
    where
        K: Copy + Eq,
        S: RingStore<K> + ?Sized,
    {
        let RingLink { prev, next } = *store.link(key);

        if next == key {
            return true;
        }

        store.link_mut(prev).next = next;
        store.link_mut(next).prev = prev;
        *store.link_mut(key) = RingLink::singleton(key);
        false
    }

    /// Counts the members of the ring containing `start`.
    ///
    /// This is O(n) - use sparingly.
    pub fn count<K, S>(&self, store: &S, start: K) -> usize
    where
        K: Copy + Eq,
        S: RingStore<K> + ?Sized,
    {
        self.siblings(store, start).count()
    }

    /// Walks the ring rightwards, starting (and yielding first) `start`.
    #[inline]
    pub fn siblings<'a, K, S>(&self, store: &'a S, start: K) -> Siblings<'a, K, S>
    where
        K: Copy + Eq,
        S: RingStore<K> + ?Sized,
    {
        Siblings {
            store,
            start,
            cursor: Some(start),
            direction: Direction::Right,
        }
    }

    /// Walks the ring leftwards, starting (and yielding first) `start`.
    #[inline]
    pub fn siblings_reverse<'a, K, S>(&self, store: &'a S, start: K) -> Siblings<'a, K, S>
    where
        K: Copy + Eq,
        S: RingStore<K> + ?Sized,
    {
        Siblings {
            store,
            start,
            cursor: Some(start),
            direction: Direction::Left,
        }
    }
}

// =============================================================================
// Iteration
// =============================================================================

/// Which neighbour an iterator steps to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    /// Follow `prev` links.
    Left,
    /// Follow `next` links.
    Right,
}

/// Lazy walk over one ring, visiting every member exactly once.
///
/// The iterator borrows the store, so the ring cannot change underneath it.
/// Clone it to restart from the same position.
pub struct Siblings<'a, K, S: ?Sized> {
    store: &'a S,
    start: K,
    cursor: Option<K>,
    direction: Direction,
}

impl<'a, K: Copy, S: ?Sized> Clone for Siblings<'a, K, S> {
    fn clone(&self) -> Self {
        Siblings {
            store: self.store,
            start: self.start,
            cursor: self.cursor,
            direction: self.direction,
        }
    }
}

impl<'a, K, S> Siblings<'a, K, S>
where
    K: Copy + Eq,
    S: RingStore<K> + ?Sized,
{
    /// Rewinds the walk to its starting member.
    pub fn restart(&mut self) {
        self.cursor = Some(self.start);
    }
}

impl<'a, K, S> Iterator for Siblings<'a, K, S>
where
    K: Copy + Eq,
    S: RingStore<K> + ?Sized,
{
    type Item = K;

    fn next(&mut self) -> Option<K> {
        let current = self.cursor?;
        let link = self.store.link(current);
        let step = match self.direction {
            Direction::Left => link.prev,
            Direction::Right => link.next,
        };
        self.cursor = if step == self.start { None } else { Some(step) };
        Some(current)
    }
}

impl<'a, K, S> FusedIterator for Siblings<'a, K, S>
where
    K: Copy + Eq,
    S: RingStore<K> + ?Sized,
{
}

// =============================================================================
// Tests
// =============================================================================
