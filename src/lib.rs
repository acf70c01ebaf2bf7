//! Amortized Mergeable Priority Queues for Rust
//!
//! This crate provides a Fibonacci heap built from arena-allocated tree nodes
//! whose roots and children form circular sibling rings, plus an indexed
//! binary heap that shares its interface.
//!
//! # Features
//!
//! - **Fibonacci Heap**: O(1) amortized insert and decrease_key; O(log n) amortized delete-min;
//!   merge splices root rings after moving the smaller heap's nodes, O(min(n, m))
//! - **Binary Heap**: O(log n) insert, decrease_key and delete-min; the baseline
//! - Checked handles: stale or foreign handles are reported, never dereferenced,
//!   and handles survive merges
//! - Custom key orders through [`KeyOrder`]
//!
//! # Example
//!
//! ```rust
//! use amortized_heaps::fibonacci::FibonacciHeap;
//!
//! let mut heap = FibonacciHeap::new();
//! let handle1 = heap.insert(5, "item1");
//! let handle2 = heap.insert(3, "item2");
//! heap.decrease_key(&handle1, 1).unwrap();
//! assert_eq!(heap.find_min(), Some((&1, &"item1")));
//! assert_eq!(heap.get(&handle2), Some((&3, &"item2")));
//! ```

pub mod binary;
pub mod consolidate;
pub mod fibonacci;
pub mod storage;
pub mod traits;
mod tree;

// Re-export the main trait for convenience
pub use consolidate::ConsolidationStats;
pub use traits::{Handle, HeapError, KeyOrder, Natural, PriorityQueue};
