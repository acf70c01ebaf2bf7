//! Bounded hand-off between the trace parser and the replay workers

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender};

/// A bounded multi-consumer queue with a shared cancellation flag
///
/// The producer blocks while the buffer is full, so parsing never runs
/// further ahead of the workers than the buffer capacity.
pub struct BatchBuffer<T> {
    sender: Sender<T>,
    receiver: Receiver<T>,
    cancelled: Arc<AtomicBool>,
}

impl<T> BatchBuffer<T> {
    /// Creates a buffer holding at most `capacity` items (at least one)
    pub fn bounded(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity.max(1));
        BatchBuffer {
            sender,
            receiver,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn split(self) -> (Producer<T>, Consumer<T>) {
        let producer = Producer {
            sender: self.sender,
            cancelled: Arc::clone(&self.cancelled),
        };
        let consumer = Consumer {
            receiver: self.receiver,
            cancelled: self.cancelled,
        };
        (producer, consumer)
    }
}

/// Sending half; dropping it tells the consumers no more items will come
pub struct Producer<T> {
    sender: Sender<T>,
    cancelled: Arc<AtomicBool>,
}

impl<T> Producer<T> {
    /// Queues an item, blocking while the buffer is full.
    ///
    /// Hands the item back if the run was cancelled or every consumer is gone.
    pub fn push(&self, item: T) -> Result<(), T> {
        if self.is_cancelled() {
            return Err(item);
        }
        self.sender.send(item).map_err(|e| e.into_inner())
    }

    /// Stops the run: consumers discard whatever is still queued.
    pub fn cancel(self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Receiving half, cloned once per worker
pub struct Consumer<T> {
    receiver: Receiver<T>,
    cancelled: Arc<AtomicBool>,
}

impl<T> Clone for Consumer<T> {
    fn clone(&self) -> Self {
        Consumer {
            receiver: self.receiver.clone(),
            cancelled: Arc::clone(&self.cancelled),
        }
    }
}

impl<T> Consumer<T> {
    /// Items queued and not yet taken by any worker
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl<T> Iterator for Consumer<T> {
    type Item = T;

    /// Blocks for the next item; `None` once the producer is gone and the
    /// queue is empty, or right after cancellation.
    fn next(&mut self) -> Option<T> {
        loop {
            let item = self.receiver.recv().ok()?;
            if !self.is_cancelled() {
                return Some(item);
            }
            // Cancelled: keep draining so the producer never blocks on a full buffer
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_items_flow_in_order() {
        let (producer, consumer) = BatchBuffer::bounded(2).split();

        let worker = thread::spawn(move || consumer.collect::<Vec<u32>>());
        for i in 0..10 {
            producer.push(i).unwrap();
        }
        drop(producer);

        assert_eq!(worker.join().unwrap(), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_workers_share_items() {
        let (producer, consumer) = BatchBuffer::bounded(4).split();

        let workers: Vec<_> = (0..3)
            .map(|_| {
                let consumer = consumer.clone();
                thread::spawn(move || consumer.collect::<Vec<u32>>())
            })
            .collect();
        drop(consumer);

        for i in 0..100 {
            producer.push(i).unwrap();
        }
        drop(producer);

        let mut all: Vec<u32> = workers.into_iter().flat_map(|w| w.join().unwrap()).collect();
        all.sort_unstable();
        assert_eq!(all, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_cancel_discards_queued() {
        let (producer, mut consumer) = BatchBuffer::bounded(8).split();
        producer.push(1).unwrap();
        producer.push(2).unwrap();
        assert_eq!(consumer.pending(), 2);

        producer.cancel();
        assert!(consumer.is_cancelled());
        assert_eq!(consumer.next(), None);
        assert_eq!(consumer.pending(), 0);
    }

    #[test]
    fn test_push_without_consumers() {
        let (producer, consumer) = BatchBuffer::bounded(1).split();
        drop(consumer);
        assert_eq!(producer.push(5), Err(5));
    }
}
