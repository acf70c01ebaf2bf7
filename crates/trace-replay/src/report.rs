//! Results of a whole run, keyed by delete count

use std::collections::BTreeMap;
use std::fmt;

use crate::replay::BatchReport;

/// Average delete depth of every batch, ordered by the batch's delete count
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    results: BTreeMap<usize, Vec<f64>>,
    batches: usize,
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, report: &BatchReport) {
        self.results
            .entry(report.deletes)
            .or_default()
            .push(report.average_delete_depth());
        self.batches += 1;
    }

    /// Number of batches recorded
    pub fn len(&self) -> usize {
        self.batches
    }

    pub fn is_empty(&self) -> bool {
        self.batches == 0
    }

    /// `(deletes, average depth)` pairs in delete-count order
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.results
            .iter()
            .flat_map(|(&deletes, depths)| depths.iter().map(move |&d| (deletes, d)))
    }
}

impl Extend<BatchReport> for Summary {
    fn extend<I: IntoIterator<Item = BatchReport>>(&mut self, iter: I) {
        for report in iter {
            self.record(&report);
        }
    }
}

impl fmt::Display for Summary {
    /// One `deletes:average_depth` line per batch
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (deletes, depth) in self.iter() {
            writeln!(f, "{}:{:.3}", deletes, depth)?;
        }
        Ok(())
    }
}
