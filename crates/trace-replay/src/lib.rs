//! Trace replay for the amortized heaps
//!
//! Reads operation traces (from a file or a generator process), replays each
//! batch against a fresh queue on a pool of worker threads, and collects the
//! average consolidation depth per batch.
//!
//! ```rust
//! use trace_replay::{run, RunConfig, TraceReader};
//!
//! let trace = "# 3\nINS 0 5\nINS 1 3\nINS 2 8\nDEL\nDEL\n";
//! let summary = run(TraceReader::new(trace.as_bytes()), &RunConfig::default()).unwrap();
//! assert_eq!(summary.to_string(), "2:1.500\n");
//! ```

pub mod buffer;
pub mod command;
pub mod generator;
pub mod pipeline;
pub mod replay;
pub mod report;
pub mod trace;

pub use command::{Batch, Command};
pub use generator::{Generator, Mode};
pub use pipeline::{run, RunConfig};
pub use replay::{replay, BatchReport, Instrumented, QueueKind};
pub use report::Summary;
pub use trace::{TraceError, TraceReader};
