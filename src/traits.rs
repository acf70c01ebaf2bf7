//! Common traits for the priority queues in this crate
//!
//! - [`PriorityQueue`]: the operations every queue supports, handle-based
//!   `decrease_key` included
//! - [`KeyOrder`]: how keys are compared; [`Natural`] defers to [`Ord`]
//! - [`HeapError`]: the recoverable failures a caller can observe
//!
//! All queues are min-queues: the element with the smallest key (according to
//! the queue's [`KeyOrder`]) is the one returned by `find_min` and removed by
//! `delete_min`.

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;

/// Error type for queue operations
///
/// Every error leaves the queue (or queues) exactly as they were before the
/// call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    /// `decrease_key` was asked to make a key larger
    KeyIncreased,
    /// The handle does not name a live element of this queue
    InvalidHandle,
    /// `try_merge` was given a queue of a different kind
    TypeMismatch,
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapError::KeyIncreased => {
                write!(f, "new key is greater than the current key")
            }
            HeapError::InvalidHandle => {
                write!(f, "handle does not refer to a live element of this queue")
            }
            HeapError::TypeMismatch => {
                write!(f, "can only merge with a queue of the same kind")
            }
        }
    }
}

impl std::error::Error for HeapError {}

/// A handle to an element in a queue, used for `decrease_key` and lookups
///
/// Handles are non-owning. Once the element is removed the handle is stale
/// and every operation taking it reports [`HeapError::InvalidHandle`].
pub trait Handle: Copy + PartialEq + Eq + fmt::Debug {}

/// Total order used to compare keys
///
/// Implemented by [`Natural`] and by any `Fn(&K, &K) -> Ordering`, so a queue
/// can be keyed by types that are not `Ord` or ordered differently than
/// their `Ord` impl.
pub trait KeyOrder<K> {
    /// Compares two keys
    fn compare(&self, a: &K, b: &K) -> Ordering;

    /// `a < b`
    #[inline]
    fn less(&self, a: &K, b: &K) -> bool {
        self.compare(a, b) == Ordering::Less
    }
}

/// Orders keys by their [`Ord`] implementation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Natural;

impl<K: Ord> KeyOrder<K> for Natural {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

impl<K, F> KeyOrder<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self(a, b)
    }
}

/// Mergeable min-priority queue with handle-based `decrease_key`
///
/// # Example
///
/// ```rust
/// use amortized_heaps::fibonacci::FibonacciHeap;
/// use amortized_heaps::PriorityQueue;
///
/// let mut heap = FibonacciHeap::new();
/// let handle = heap.insert(10, "item");
/// heap.decrease_key(&handle, 5).unwrap();
/// assert_eq!(heap.find_min(), Some((&5, &"item")));
/// ```
pub trait PriorityQueue<K, V> {
    /// The handle type for this queue
    type Handle: Handle;

    /// Creates a new empty queue
    fn new() -> Self
    where
        Self: Sized;

    /// Returns the number of elements in the queue
    fn len(&self) -> usize;

    /// Returns true if the queue is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts an element, returning a handle to it
    fn insert(&mut self, key: K, value: V) -> Self::Handle;

    /// Returns a handle to the minimum element without removing it
    fn peek_min(&self) -> Option<Self::Handle>;

    /// Returns the minimum key and its value without removing them
    fn find_min(&self) -> Option<(&K, &V)>;

    /// Looks up the key and value behind a handle
    fn get(&self, handle: &Self::Handle) -> Option<(&K, &V)>;

    /// Lowers the key of the element behind `handle`
    ///
    /// Setting a key equal to the current one is allowed and changes nothing.
    ///
    /// # Errors
    /// - [`HeapError::KeyIncreased`] if `new_key` is greater than the current key
    /// - [`HeapError::InvalidHandle`] if the handle is stale or foreign
    fn decrease_key(&mut self, handle: &Self::Handle, new_key: K) -> Result<(), HeapError>;

    /// Removes the minimum element and returns it; `None` when empty
    fn delete_min(&mut self) -> Option<(K, V)>;

    /// Moves every element of `other` into this queue
    fn merge(&mut self, other: Self)
    where
        Self: Sized;

    /// Removes every element
    fn clear(&mut self);

    /// Merges a queue whose concrete kind is only known at run time
    ///
    /// On success `other` is left empty. On [`HeapError::TypeMismatch`]
    /// neither queue is modified.
    fn try_merge<Q>(&mut self, other: &mut Q) -> Result<(), HeapError>
    where
        Self: Sized + 'static,
        Q: PriorityQueue<K, V> + 'static,
    {
        let other = (other as &mut dyn Any)
            .downcast_mut::<Self>()
            .ok_or(HeapError::TypeMismatch)?;
        let taken = std::mem::replace(other, Self::new());
        self.merge(taken);
        Ok(())
    }
}
