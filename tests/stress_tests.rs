//! Stress tests for priority queue implementations
//!
//! These tests perform large numbers of operations to find edge cases
//! and verify correctness under heavy load.

use amortized_heaps::binary::BinaryHeap;
use amortized_heaps::fibonacci::FibonacciHeap;
use amortized_heaps::PriorityQueue;

/// Small deterministic generator so every run sees the same workload
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, bound: u64) -> u64 {
        self.next() % bound
    }
}

fn test_massive_operations<H: PriorityQueue<i32, i32>>() {
    let mut heap = H::new();
    let count = 10_000;

    for i in 0..count {
        heap.insert(i, i);
    }
    assert_eq!(heap.len(), count as usize);

    for i in 0..count {
        assert_eq!(heap.delete_min(), Some((i, i)));
    }
    assert!(heap.is_empty());
}

fn test_many_decrease_keys<H: PriorityQueue<i32, usize>>() {
    let mut heap = H::new();
    let count = 2_000;

    let handles: Vec<_> = (0..count).map(|i| heap.insert(count as i32 + i as i32, i)).collect();

    // Every element gets lowered several times, from the back
    for round in 1..=4 {
        for (i, h) in handles.iter().enumerate().rev() {
            let key = i as i32 - round * count as i32;
            assert!(heap.decrease_key(h, key).is_ok());
        }
    }

    for i in 0..count {
        assert_eq!(heap.delete_min(), Some((i as i32 - 4 * count as i32, i)));
    }
}

fn test_alternating_ops<H: PriorityQueue<i32, i32>>() {
    let mut heap = H::new();
    let mut rng = Lcg(7);
    let mut model: Vec<i32> = Vec::new();

    for _ in 0..5_000 {
        if model.is_empty() || rng.below(3) != 0 {
            let key = rng.below(10_000) as i32;
            heap.insert(key, key);
            model.push(key);
        } else {
            let (key, value) = heap.delete_min().expect("model is non-empty");
            assert_eq!(key, value);
            let pos = model
                .iter()
                .enumerate()
                .min_by_key(|(_, k)| **k)
                .map(|(i, _)| i)
                .unwrap();
            assert_eq!(model.swap_remove(pos), key);
        }
        assert_eq!(heap.len(), model.len());
    }
}

fn test_large_merge<H: PriorityQueue<i32, i32>>() {
    let mut heap1 = H::new();
    let mut heap2 = H::new();

    for i in 0..5_000 {
        heap1.insert(i * 2, i);
        heap2.insert(i * 2 + 1, i);
    }

    heap1.merge(heap2);
    assert_eq!(heap1.len(), 10_000);

    for i in 0..10_000 {
        assert_eq!(heap1.delete_min().map(|(k, _)| k), Some(i));
    }
}

fn test_decrease_interleaved_with_deletes<H: PriorityQueue<i32, usize>>() {
    let mut heap = H::new();
    let mut rng = Lcg(42);
    let mut keys: Vec<Option<i32>> = Vec::new();
    let mut handles = Vec::new();

    for i in 0..3_000usize {
        let key = 1_000_000 + rng.below(1_000_000) as i32;
        handles.push(heap.insert(key, i));
        keys.push(Some(key));

        if i % 3 == 2 {
            let (key, id) = heap.delete_min().unwrap();
            assert_eq!(keys[id], Some(key));
            let expected = keys.iter().flatten().min().copied();
            assert_eq!(Some(key), expected);
            keys[id] = None;
        }

        let target = rng.below(handles.len() as u64) as usize;
        if let Some(current) = keys[target] {
            let lowered = current - rng.below(500_000) as i32;
            heap.decrease_key(&handles[target], lowered).unwrap();
            keys[target] = Some(lowered);
        }
    }

    let mut remaining: Vec<i32> = keys.iter().flatten().copied().collect();
    remaining.sort_unstable();
    let mut drained = Vec::new();
    while let Some((key, _)) = heap.delete_min() {
        drained.push(key);
    }
    assert_eq!(drained, remaining);
}

fn test_large_priorities<H: PriorityQueue<i64, i64>>() {
    let mut heap = H::new();

    heap.insert(i64::MAX, 1);
    heap.insert(i64::MIN, 2);
    heap.insert(0, 3);
    heap.insert(i64::MAX - 1, 4);
    heap.insert(i64::MIN + 1, 5);

    assert_eq!(heap.delete_min(), Some((i64::MIN, 2)));
    assert_eq!(heap.delete_min(), Some((i64::MIN + 1, 5)));
    assert_eq!(heap.delete_min(), Some((0, 3)));
    assert_eq!(heap.delete_min(), Some((i64::MAX - 1, 4)));
    assert_eq!(heap.delete_min(), Some((i64::MAX, 1)));
}

fn test_rapid_fire<H: PriorityQueue<i32, i32>>() {
    let mut heap = H::new();

    for i in 0..1_000 {
        heap.insert(i, i);
        heap.insert(-i, -i);
        assert_eq!(heap.delete_min(), Some((-i, -i)));
    }

    assert_eq!(heap.len(), 1_000);
    heap.clear();
    assert!(heap.is_empty());
    assert_eq!(heap.delete_min(), None);
}

#[test]
fn test_fibonacci_massive() {
    test_massive_operations::<FibonacciHeap<i32, i32>>();
}

#[test]
fn test_fibonacci_many_decrease_keys() {
    test_many_decrease_keys::<FibonacciHeap<i32, usize>>();
}

#[test]
fn test_fibonacci_alternating() {
    test_alternating_ops::<FibonacciHeap<i32, i32>>();
}

#[test]
fn test_fibonacci_large_merge() {
    test_large_merge::<FibonacciHeap<i32, i32>>();
}

#[test]
fn test_fibonacci_decrease_interleaved() {
    test_decrease_interleaved_with_deletes::<FibonacciHeap<i32, usize>>();
}

#[test]
fn test_fibonacci_large_priorities() {
    test_large_priorities::<FibonacciHeap<i64, i64>>();
}

#[test]
fn test_fibonacci_rapid_fire() {
    test_rapid_fire::<FibonacciHeap<i32, i32>>();
}

#[test]
fn test_fibonacci_structure_after_churn() {
    let mut heap = FibonacciHeap::new();
    let mut rng = Lcg(1234);
    let handles: Vec<_> = (0..1_024).map(|i| heap.insert(10_000 + i, i)).collect();

    // First delete-min builds binomial-shaped trees; later decreases cut them apart
    heap.delete_min();
    heap.check_invariants().unwrap();

    for _ in 0..2_000 {
        let h = &handles[rng.below(handles.len() as u64) as usize];
        if let Some((&key, _)) = heap.get(h) {
            heap.decrease_key(h, key - rng.below(5_000) as i32).unwrap();
        }
        if rng.below(10) == 0 {
            heap.delete_min();
        }
    }
    heap.check_invariants().unwrap();

    // Depth stays logarithmic for 1k elements
    heap.delete_min();
    assert!(heap.last_consolidation().depth <= 16);
    heap.check_invariants().unwrap();
}

#[test]
fn test_binary_massive() {
    test_massive_operations::<BinaryHeap<i32, i32>>();
}

#[test]
fn test_binary_many_decrease_keys() {
    test_many_decrease_keys::<BinaryHeap<i32, usize>>();
}

#[test]
fn test_binary_alternating() {
    test_alternating_ops::<BinaryHeap<i32, i32>>();
}

#[test]
fn test_binary_large_merge() {
    test_large_merge::<BinaryHeap<i32, i32>>();
}

#[test]
fn test_binary_decrease_interleaved() {
    test_decrease_interleaved_with_deletes::<BinaryHeap<i32, usize>>();
}

#[test]
fn test_binary_large_priorities() {
    test_large_priorities::<BinaryHeap<i64, i64>>();
}

#[test]
fn test_binary_rapid_fire() {
    test_rapid_fire::<BinaryHeap<i32, i32>>();
}
