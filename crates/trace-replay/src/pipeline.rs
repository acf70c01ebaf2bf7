//! One parser thread feeding a pool of replay workers

use std::io::BufRead;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use log::{debug, info, warn};

use crate::buffer::BatchBuffer;
use crate::command::Batch;
use crate::replay::QueueKind;
use crate::report::Summary;
use crate::trace::{TraceError, TraceReader};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    /// Replay threads; every queue lives and dies on one of them
    pub workers: usize,
    /// Parsed batches allowed to wait for a worker
    pub buffer: usize,
    pub queue: QueueKind,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            workers: 2,
            buffer: 4,
            queue: QueueKind::Fibonacci,
        }
    }
}

/// Parses `trace` on the calling thread and replays its batches on
/// `config.workers` threads.
///
/// The first trace error cancels the run: queued batches are discarded,
/// the workers exit and the error is returned instead of a summary.
pub fn run<R: BufRead>(trace: TraceReader<R>, config: &RunConfig) -> Result<Summary, TraceError> {
    let workers = config.workers.max(1);
    let queue = config.queue;
    let done = AtomicUsize::new(0);

    info!("starting {} workers replaying into {:?} queues", workers, queue);
    let (producer, consumer) = BatchBuffer::<Batch>::bounded(config.buffer).split();

    thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                let mut batches = consumer.clone();
                let done = &done;
                scope.spawn(move || {
                    let mut reports = Vec::new();
                    while let Some(batch) = batches.next() {
                        let report = queue.replay(&batch);
                        let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                        info!("{}/{} done/waiting :: {}", finished, batches.pending(), report);
                        reports.push(report);
                    }
                    debug!("worker {} finished", worker);
                    reports
                })
            })
            .collect();
        drop(consumer);

        let mut failure = None;
        for batch in trace {
            match batch {
                Ok(batch) => {
                    if producer.push(batch).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        if let Some(err) = &failure {
            warn!("cancelling run: {}", err);
            producer.cancel();
        } else {
            drop(producer);
        }

        let mut summary = Summary::new();
        for handle in handles {
            match handle.join() {
                Ok(reports) => summary.extend(reports),
                Err(panic) => std::panic::resume_unwind(panic),
            }
        }

        match failure {
            Some(err) => Err(err),
            None => Ok(summary),
        }
    })
}
