//! Replaying a batch against a fresh queue

use std::fmt;
use std::time::{Duration, Instant};

use amortized_heaps::binary::BinaryHeap;
use amortized_heaps::fibonacci::FibonacciHeap;
use amortized_heaps::{KeyOrder, PriorityQueue};
use clap::ValueEnum;
use log::warn;
use rustc_hash::FxHashMap;

use crate::command::{Batch, Command};

/// A queue that can say how deep its last `delete_min` had to restructure
pub trait Instrumented<K, V>: PriorityQueue<K, V> {
    fn last_delete_depth(&self) -> usize;
}

impl<K, V, C: KeyOrder<K> + Default> Instrumented<K, V> for FibonacciHeap<K, V, C> {
    /// Degree slots in use after the last consolidation
    fn last_delete_depth(&self) -> usize {
        self.last_consolidation().depth
    }
}

impl<K, V, C: KeyOrder<K> + Default> Instrumented<K, V> for BinaryHeap<K, V, C> {
    /// Levels of the array after the last delete, the most a sift-down can walk
    fn last_delete_depth(&self) -> usize {
        (usize::BITS - self.len().leading_zeros()) as usize
    }
}

/// Which queue the batches are replayed against
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum QueueKind {
    Fibonacci,
    Binary,
}

impl QueueKind {
    pub fn replay(self, batch: &Batch) -> BatchReport {
        match self {
            QueueKind::Fibonacci => replay::<FibonacciHeap<i32, u32>>(batch),
            QueueKind::Binary => replay::<BinaryHeap<i32, u32>>(batch),
        }
    }
}

/// Measurements of one replayed batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub elapsed: Duration,
    pub inserts: usize,
    pub deletes: usize,
    /// Delete commands that found the queue empty
    pub empty_deletes: usize,
    pub decreases: usize,
    /// Decrease commands naming a removed element or a larger key
    pub skipped_decreases: usize,
    /// Sum of the depth reported after every successful delete
    pub total_depth: usize,
}

impl BatchReport {
    pub fn average_delete_depth(&self) -> f64 {
        if self.deletes == 0 {
            0.0
        } else {
            self.total_depth as f64 / self.deletes as f64
        }
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.3} sec :: {} inserts :: {}/{:.2} deletes/delete depth average",
            self.elapsed.as_secs_f64(),
            self.inserts,
            self.deletes,
            self.average_delete_depth()
        )
    }
}

/// Runs every command of `batch` against a new `Q`.
///
/// Inserted elements are remembered by id; the id is forgotten again when
/// its element is deleted. Decreases of forgotten ids and decreases to a
/// larger key are skipped and counted.
pub fn replay<Q: Instrumented<i32, u32>>(batch: &Batch) -> BatchReport {
    let start = Instant::now();
    let mut queue = Q::new();
    let mut report = BatchReport::default();

    let expected = batch.ids().min(batch.len());
    let mut nodes: FxHashMap<u32, Q::Handle> =
        FxHashMap::with_capacity_and_hasher(expected, Default::default());

    for command in batch.commands() {
        match *command {
            Command::Insert { id, key } => {
                let handle = queue.insert(key, id);
                if nodes.insert(id, handle).is_some() {
                    warn!("id {} inserted again while still live", id);
                }
                report.inserts += 1;
            }
            Command::DeleteMin => {
                let Some(min) = queue.peek_min() else {
                    report.empty_deletes += 1;
                    continue;
                };
                if let Some((_, id)) = queue.delete_min() {
                    // A re-used id may already point at a newer element
                    if nodes.get(&id) == Some(&min) {
                        nodes.remove(&id);
                    }
                }
                report.deletes += 1;
                report.total_depth += queue.last_delete_depth();
            }
            Command::DecreaseKey { id, key } => {
                let applied = match nodes.get(&id) {
                    Some(handle) => queue.decrease_key(handle, key).is_ok(),
                    None => false,
                };
                if applied {
                    report.decreases += 1;
                } else {
                    report.skipped_decreases += 1;
                }
            }
        }
    }

    report.elapsed = start.elapsed();
    report
}
