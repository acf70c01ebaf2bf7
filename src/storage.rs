//! Arena storage for tree-of-trees heap nodes
//!
//! Every node of a heap lives in one [`NodeArena`], a `slotmap` keyed by
//! [`NodeKey`]. Parent, child and sibling relations are stored as keys, so the
//! arena is the only owner of node data and cycles in the sibling rings never
//! turn into ownership cycles.
//!
//! # Characteristics
//! - Contiguous memory allocation (better cache locality than boxed nodes)
//! - Generational keys detect stale handles after a node was released
//! - Every arena has a process-unique [`ArenaId`] so handles from one heap are
//!   rejected by another
//! - Node removal is an explicit [`NodeArena::release`] that hands the key and
//!   value back to the caller
//! - Nodes relocated by a merge leave a [`Forwarding`] entry behind, so handles
//!   issued by the absorbed arena keep resolving

use std::sync::atomic::{AtomicU64, Ordering};

use rustc_hash::FxHashMap;
use sibling_ring::{RingLink, RingStore};
use slotmap::{new_key_type, Key, SlotMap};

use crate::tree::Node;

new_key_type! {
    /// Arena key of a heap node
    pub struct NodeKey;
}

/// Identity of one arena, recorded in every handle it gives out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaId(u64);

impl ArenaId {
    /// Returns an id no other arena in this process has.
    pub(crate) fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        ArenaId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Owner of all nodes of one heap
pub(crate) struct NodeArena<K, V> {
    id: ArenaId,
    nodes: SlotMap<NodeKey, Node<K, V>>,
}

impl<K, V> NodeArena<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            id: ArenaId::fresh(),
            nodes: SlotMap::with_key(),
        }
    }

    #[inline]
    pub(crate) fn id(&self) -> ArenaId {
        self.id
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub(crate) fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Allocates a node that is a ring of one, with no parent and no children.
    pub(crate) fn alloc(&mut self, key: K, value: V) -> NodeKey {
        self.nodes.insert_with_key(|this| Node::new(this, key, value))
    }

    /// Frees the slot of `node` and hands back what it stored.
    ///
    /// The caller is responsible for having unlinked the node first.
    pub(crate) fn release(&mut self, node: NodeKey) -> Option<(K, V)> {
        self.nodes.remove(node).map(Node::into_entry)
    }

    #[inline]
    pub(crate) fn get(&self, node: NodeKey) -> Option<&Node<K, V>> {
        self.nodes.get(node)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, node: NodeKey) -> Option<&mut Node<K, V>> {
        self.nodes.get_mut(node)
    }

    /// Access to a node the heap structure references.
    ///
    /// Panics on a dead key: keys read from links always name live nodes.
    #[inline]
    pub(crate) fn node(&self, node: NodeKey) -> &Node<K, V> {
        &self.nodes[node]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, node: NodeKey) -> &mut Node<K, V> {
        &mut self.nodes[node]
    }

    /// Moves every node of `other` into this arena.
    ///
    /// All parent, child and sibling keys of the moved nodes are rewritten to
    /// their new slots. Returns the mapping from old to new keys.
    pub(crate) fn absorb(&mut self, other: NodeArena<K, V>) -> FxHashMap<NodeKey, NodeKey> {
        let mut remap =
            FxHashMap::with_capacity_and_hasher(other.nodes.len(), Default::default());
        let mut moved = Vec::with_capacity(other.nodes.len());

        for (old, node) in other.nodes {
            let new = self.nodes.insert(node);
            remap.insert(old, new);
            moved.push(new);
        }

        for new in moved {
            let node = &mut self.nodes[new];
            node.parent = node.parent.map(|p| remap[&p]);
            node.first_child = node.first_child.map(|c| remap[&c]);
            let (prev, next) = (remap[&node.link.prev()], remap[&node.link.next()]);
            node.link.relink(prev, next);
        }

        remap
    }
}

/// Old `(arena, key)` pairs of relocated entries and the key each moved to
///
/// All targets name slots of the one arena the owning heap currently holds.
/// Entries whose target has since been released are left in place; the
/// generational key of the target is what rejects them.
#[derive(Debug)]
pub(crate) struct Forwarding<T: Key> {
    moved: FxHashMap<(ArenaId, T), T>,
}

impl<T: Key> Default for Forwarding<T> {
    fn default() -> Self {
        Self {
            moved: FxHashMap::default(),
        }
    }
}

impl<T: Key> Forwarding<T> {
    #[inline]
    pub(crate) fn lookup(&self, arena: ArenaId, key: T) -> Option<T> {
        self.moved.get(&(arena, key)).copied()
    }

    /// Takes over the table of a heap whose arena `from` was relocated
    /// through `remap`.
    ///
    /// Entries of `absorbed` led into `from`; they are re-pointed through
    /// `remap`, and dropped when their target was no longer live.
    pub(crate) fn adopt(&mut self, from: ArenaId, remap: &FxHashMap<T, T>, absorbed: Forwarding<T>) {
        self.moved.reserve(remap.len() + absorbed.moved.len());
        for (old, target) in absorbed.moved {
            if let Some(&new) = remap.get(&target) {
                self.moved.insert(old, new);
            }
        }
        for (&old, &new) in remap {
            self.moved.insert((from, old), new);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.moved.len()
    }

    pub(crate) fn clear(&mut self) {
        self.moved.clear();
    }
}

impl<K, V> RingStore<NodeKey> for NodeArena<K, V> {
    #[inline]
    fn link(&self, key: NodeKey) -> &RingLink<NodeKey> {
        &self.nodes[key].link
    }

    #[inline]
    fn link_mut(&mut self, key: NodeKey) -> &mut RingLink<NodeKey> {
        &mut self.nodes[key].link
    }
}
