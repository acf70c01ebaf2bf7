//! Tree nodes of a tree-of-trees heap
//!
//! A [`Node`] extends a sibling ring member with a parent back-reference, a
//! first-child entry into its child ring, a child count and the mark bit used
//! by cascading cuts. Parent links are plain keys and never own anything; the
//! arena owns every node.

use sibling_ring::{RingLink, RingOps, RingStore, Siblings};

use crate::storage::{NodeArena, NodeKey};

pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) parent: Option<NodeKey>,
    pub(crate) first_child: Option<NodeKey>,
    /// Always equals the length of the ring at `first_child`
    pub(crate) child_count: usize,
    /// Lost a child since it last became a child; never set on roots
    pub(crate) marked: bool,
    pub(crate) link: RingLink<NodeKey>,
}

impl<K, V> Node<K, V> {
    pub(crate) fn new(this: NodeKey, key: K, value: V) -> Self {
        Node {
            key,
            value,
            parent: None,
            first_child: None,
            child_count: 0,
            marked: false,
            link: RingLink::singleton(this),
        }
    }

    pub(crate) fn into_entry(self) -> (K, V) {
        (self.key, self.value)
    }

    #[inline]
    pub(crate) fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

impl<K, V> NodeArena<K, V> {
    /// Makes `child` (a ring of one) the last child of `parent`.
    pub(crate) fn add_child(&mut self, parent: NodeKey, child: NodeKey) {
        debug_assert!(RingOps::new().is_singleton(self, child));

        self.node_mut(child).parent = Some(parent);

        let p = self.node_mut(parent);
        p.child_count += 1;
        let first = *p.first_child.get_or_insert(child);

        // Before the first child is the end of the ring
        if first != child {
            RingOps::new().insert_before(self, first, child);
        }
    }

    /// Detaches `node` from its parent's child ring.
    ///
    /// The node's own children stay attached: cutting a node moves its whole
    /// subtree. Afterwards `node` is a parentless ring of one.
    pub(crate) fn cut_from_family(&mut self, node: NodeKey) {
        let Some(parent) = self.node_mut(node).parent.take() else {
            return;
        };
        let right = self.link(node).next();
        let p = self.node_mut(parent);

        if p.child_count == 1 {
            debug_assert_eq!(right, node, "only child must be a ring of one");
            p.first_child = None;
            p.child_count = 0;
            return;
        }

        if p.first_child == Some(node) {
            p.first_child = Some(right);
        }
        p.child_count -= 1;

        RingOps::new().cut(self, node);
    }

    /// Moves the whole child ring of `node` out and returns its entry point.
    ///
    /// The returned nodes have no parent and are unmarked, ready to become
    /// roots.
    pub(crate) fn detach_children(&mut self, node: NodeKey) -> Option<NodeKey> {
        let n = self.node_mut(node);
        let first = n.first_child.take()?;
        n.child_count = 0;

        let mut current = first;
        loop {
            let child = self.node_mut(current);
            child.parent = None;
            child.marked = false;
            current = child.link.next();
            if current == first {
                break;
            }
        }

        Some(first)
    }

    /// Walks the child ring of `node` from its first child.
    pub(crate) fn children(&self, node: NodeKey) -> impl Iterator<Item = NodeKey> + '_ {
        self.node(node)
            .first_child
            .into_iter()
            .flat_map(move |first| self.siblings(first))
    }

    #[inline]
    pub(crate) fn siblings(&self, start: NodeKey) -> Siblings<'_, NodeKey, Self> {
        RingOps::new().siblings(self, start)
    }
}
