//! Line-oriented trace parsing
//!
//! A trace is a sequence of batches. Each batch starts with a header line
//! `# <n>` announcing an insert-id table of `n` entries, followed by command
//! lines:
//!
//! ```text
//! # 3
//! INS 0 15
//! INS 1 4
//! DEC 0 2
//! DEL
//! ```
//!
//! Blank lines are ignored. Batches without commands are dropped.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use crate::command::{Batch, Command};

/// Everything that can stop a trace from being read
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("line {line}: command before the first batch header")]
    MissingHeader { line: usize },

    #[error("line {line}: id {id} outside the batch id table of {ids} entries")]
    IdOutOfRange { line: usize, id: u32, ids: usize },

    #[error("failed to start generator {}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("generator exited with {status}")]
    GeneratorFailed { status: ExitStatus },

    #[error("failed to read trace")]
    Io(#[from] io::Error),
}

/// Iterator over the batches of a trace
///
/// Stops for good after the first error.
pub struct TraceReader<R> {
    reader: R,
    line: String,
    line_no: usize,
    current: Option<Batch>,
    done: bool,
}

impl<R: BufRead> TraceReader<R> {
    pub fn new(reader: R) -> Self {
        TraceReader {
            reader,
            line: String::new(),
            line_no: 0,
            current: None,
            done: false,
        }
    }

    /// Number of lines consumed so far
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    fn next_batch(&mut self) -> Result<Option<Batch>, TraceError> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(self.current.take().filter(|b| !b.is_empty()));
            }
            self.line_no += 1;

            match parse_line(&self.line, self.line_no)? {
                Line::Blank => {}
                Line::Header(ids) => {
                    let finished = self.current.replace(Batch::new(ids));
                    if let Some(batch) = finished.filter(|b| !b.is_empty()) {
                        return Ok(Some(batch));
                    }
                }
                Line::Command(command) => {
                    let Some(batch) = self.current.as_mut() else {
                        return Err(TraceError::MissingHeader { line: self.line_no });
                    };
                    if let Command::Insert { id, .. } | Command::DecreaseKey { id, .. } = command {
                        if id as usize >= batch.ids() {
                            return Err(TraceError::IdOutOfRange {
                                line: self.line_no,
                                id,
                                ids: batch.ids(),
                            });
                        }
                    }
                    batch.push(command);
                }
            }
        }
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<Batch, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.next_batch() {
            Ok(Some(batch)) => Some(Ok(batch)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl<R: BufRead> std::iter::FusedIterator for TraceReader<R> {}

enum Line {
    Blank,
    Header(usize),
    Command(Command),
}

fn parse_line(text: &str, line: usize) -> Result<Line, TraceError> {
    let parse_err = |reason: String| TraceError::Parse { line, reason };

    let mut fields = text.split_whitespace();
    let Some(tag) = fields.next() else {
        return Ok(Line::Blank);
    };

    let parsed = match tag {
        "#" => Line::Header(field(&mut fields, "id table size").map_err(parse_err)?),
        "INS" => Line::Command(Command::Insert {
            id: field(&mut fields, "id").map_err(parse_err)?,
            key: field(&mut fields, "key").map_err(parse_err)?,
        }),
        "DEL" => Line::Command(Command::DeleteMin),
        "DEC" => Line::Command(Command::DecreaseKey {
            id: field(&mut fields, "id").map_err(parse_err)?,
            key: field(&mut fields, "key").map_err(parse_err)?,
        }),
        other => return Err(parse_err(format!("unknown command `{}`", other))),
    };

    if let Some(extra) = fields.next() {
        return Err(parse_err(format!("unexpected trailing `{}`", extra)));
    }
    Ok(parsed)
}

fn field<'a, T: std::str::FromStr>(
    fields: &mut impl Iterator<Item = &'a str>,
    name: &str,
) -> Result<T, String> {
    let raw = fields.next().ok_or_else(|| format!("missing {}", name))?;
    raw.parse().map_err(|_| format!("invalid {} `{}`", name, raw))
}
