//! Indexed Binary Heap implementation
//!
//! An array-backed binary min-heap that tracks the position of every element,
//! so it can hand out handles and support `decrease_key` like the Fibonacci
//! heap does. It is the baseline the trace replay compares against.
//!
//! # Time Complexity
//!
//! | Operation      | Complexity |
//! |----------------|------------|
//! | `insert`       | O(log n)   |
//! | `delete_min`   | O(log n)   |
//! | `peek_min`     | O(1)       |
//! | `decrease_key` | O(log n)   |
//! | `merge`        | O(min(n, m) log(n + m)) |
//!
//! # Example
//!
//! ```rust
//! use amortized_heaps::binary::BinaryHeap;
//!
//! let mut heap = BinaryHeap::new();
//! heap.insert(3, "three");
//! let one = heap.insert(10, "one");
//! heap.insert(2, "two");
//! heap.decrease_key(&one, 1).unwrap();
//!
//! assert_eq!(heap.find_min(), Some((&1, &"one")));
//! assert_eq!(heap.delete_min(), Some((1, "one")));
//! assert_eq!(heap.delete_min(), Some((2, "two")));
//! assert_eq!(heap.delete_min(), Some((3, "three")));
//! assert_eq!(heap.delete_min(), None);
//! ```

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};

use crate::storage::{ArenaId, Forwarding};
use crate::traits::{Handle, HeapError, KeyOrder, Natural, PriorityQueue};

new_key_type! {
    struct EntryKey;
}

/// Handle to an element in a [`BinaryHeap`]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct BinaryHandle {
    heap: ArenaId,
    entry: EntryKey,
}

impl Handle for BinaryHandle {}

struct Entry<K, V> {
    key: K,
    value: V,
    slot: EntryKey,
}

/// A binary min-heap with handles
pub struct BinaryHeap<K, V, C = Natural> {
    id: ArenaId,
    /// Heap-ordered array, minimum at index 0
    data: Vec<Entry<K, V>>,
    /// Current array index of every live entry
    positions: SlotMap<EntryKey, usize>,
    /// Entries pushed here by merges, by the handle they were issued under
    forwarding: Forwarding<EntryKey>,
    order: C,
}

impl<K: Ord, V> BinaryHeap<K, V, Natural> {
    pub fn new() -> Self {
        Self::with_order(Natural)
    }
}

impl<K: Ord, V> Default for BinaryHeap<K, V, Natural> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C: KeyOrder<K>> BinaryHeap<K, V, C> {
    /// Creates an empty heap with a custom key order
    pub fn with_order(order: C) -> Self {
        Self {
            id: ArenaId::fresh(),
            data: Vec::new(),
            positions: SlotMap::with_key(),
            forwarding: Forwarding::default(),
            order,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn insert(&mut self, key: K, value: V) -> BinaryHandle {
        let index = self.data.len();
        let slot = self.positions.insert(index);
        self.data.push(Entry { key, value, slot });
        self.sift_up(index);

        BinaryHandle {
            heap: self.id,
            entry: slot,
        }
    }

    pub fn peek_min(&self) -> Option<BinaryHandle> {
        self.data.first().map(|e| BinaryHandle {
            heap: self.id,
            entry: e.slot,
        })
    }

    pub fn find_min(&self) -> Option<(&K, &V)> {
        self.data.first().map(|e| (&e.key, &e.value))
    }

    pub fn get(&self, handle: &BinaryHandle) -> Option<(&K, &V)> {
        let index = self.resolve(handle).ok()?;
        let e = &self.data[index];
        Some((&e.key, &e.value))
    }

    pub fn decrease_key(&mut self, handle: &BinaryHandle, new_key: K) -> Result<(), HeapError> {
        let index = self.resolve(handle)?;

        if self.order.less(&self.data[index].key, &new_key) {
            return Err(HeapError::KeyIncreased);
        }

        self.data[index].key = new_key;
        self.sift_up(index);
        Ok(())
    }

    pub fn delete_min(&mut self) -> Option<(K, V)> {
        if self.data.is_empty() {
            return None;
        }

        let min = self.data.swap_remove(0);
        self.positions.remove(min.slot);

        if let Some(first) = self.data.first() {
            self.positions[first.slot] = 0;
            self.sift_down(0);
        }

        Some((min.key, min.value))
    }

    /// Pushes the elements of the smaller heap into the larger one.
    ///
    /// Handles of both heaps stay valid on this heap.
    pub fn merge(&mut self, mut other: Self) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            self.id = other.id;
            self.data = other.data;
            self.positions = other.positions;
            self.forwarding = other.forwarding;
            return;
        }

        if self.len() < other.len() {
            std::mem::swap(&mut self.id, &mut other.id);
            std::mem::swap(&mut self.data, &mut other.data);
            std::mem::swap(&mut self.positions, &mut other.positions);
            std::mem::swap(&mut self.forwarding, &mut other.forwarding);
        }

        let mut remap = FxHashMap::with_capacity_and_hasher(other.data.len(), Default::default());
        self.data.reserve(other.data.len());
        for entry in other.data {
            let handle = self.insert(entry.key, entry.value);
            remap.insert(entry.slot, handle.entry);
        }
        self.forwarding.adopt(other.id, &remap, other.forwarding);
    }

    pub fn clear(&mut self) {
        self.data.clear();
        self.positions.clear();
        self.forwarding.clear();
    }

    fn resolve(&self, handle: &BinaryHandle) -> Result<usize, HeapError> {
        let entry = if handle.heap == self.id {
            Some(handle.entry)
        } else {
            self.forwarding.lookup(handle.heap, handle.entry)
        };

        entry
            .and_then(|entry| self.positions.get(entry))
            .copied()
            .ok_or(HeapError::InvalidHandle)
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.data.swap(a, b);
        self.positions[self.data[a].slot] = a;
        self.positions[self.data[b].slot] = b;
    }

    /// Move element at index up to maintain heap property
    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.order.less(&self.data[index].key, &self.data[parent].key) {
                self.swap(index, parent);
                index = parent;
            } else {
                break;
            }
        }
    }

    /// Move element at index down to maintain heap property
    fn sift_down(&mut self, mut index: usize) {
        let len = self.data.len();
        loop {
            let left = 2 * index + 1;
            let right = 2 * index + 2;
            let mut smallest = index;

            if left < len && self.order.less(&self.data[left].key, &self.data[smallest].key) {
                smallest = left;
            }
            if right < len && self.order.less(&self.data[right].key, &self.data[smallest].key) {
                smallest = right;
            }

            if smallest == index {
                break;
            }
            self.swap(index, smallest);
            index = smallest;
        }
    }
}

impl<K, V, C: KeyOrder<K> + Default> PriorityQueue<K, V> for BinaryHeap<K, V, C> {
    type Handle = BinaryHandle;

    fn new() -> Self {
        Self::with_order(C::default())
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn insert(&mut self, key: K, value: V) -> Self::Handle {
        BinaryHeap::insert(self, key, value)
    }

    fn peek_min(&self) -> Option<Self::Handle> {
        BinaryHeap::peek_min(self)
    }

    fn find_min(&self) -> Option<(&K, &V)> {
        BinaryHeap::find_min(self)
    }

    fn get(&self, handle: &Self::Handle) -> Option<(&K, &V)> {
        BinaryHeap::get(self, handle)
    }

    fn decrease_key(&mut self, handle: &Self::Handle, new_key: K) -> Result<(), HeapError> {
        BinaryHeap::decrease_key(self, handle, new_key)
    }

    fn delete_min(&mut self) -> Option<(K, V)> {
        BinaryHeap::delete_min(self)
    }

    fn merge(&mut self, other: Self) {
        BinaryHeap::merge(self, other)
    }

    fn clear(&mut self) {
        BinaryHeap::clear(self)
    }
}
