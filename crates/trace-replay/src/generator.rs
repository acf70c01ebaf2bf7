//! External trace generator process

use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use clap::ValueEnum;
use log::{info, warn};

use crate::trace::TraceError;

/// Shape of the workload the generator emits
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum Mode {
    /// Random operations
    Balanced,
    /// Long insert runs followed by delete runs
    Imbalanced,
    /// Sequences built to maximise consolidation work
    Malicious,
}

impl Mode {
    /// The generator's command-line switch for this mode
    pub fn flag(self) -> &'static str {
        match self {
            Mode::Balanced => "-r",
            Mode::Imbalanced => "-b",
            Mode::Malicious => "-x",
        }
    }
}

/// A running generator whose standard output is the trace
pub struct Generator {
    program: PathBuf,
    child: Child,
    output: Option<BufReader<ChildStdout>>,
}

impl Generator {
    /// Starts `program -s <seed> <mode flag>` with its stdout piped back
    pub fn spawn(program: &Path, seed: u64, mode: Mode) -> Result<Self, TraceError> {
        let mut child = Command::new(program)
            .arg("-s")
            .arg(seed.to_string())
            .arg(mode.flag())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|source| TraceError::Spawn {
                program: program.to_path_buf(),
                source,
            })?;

        info!("started {} -s {} {}", program.display(), seed, mode.flag());
        let output = child.stdout.take().map(BufReader::new);

        Ok(Generator {
            program: program.to_path_buf(),
            child,
            output,
        })
    }

    /// Takes the trace stream; `None` if it was already taken
    pub fn take_output(&mut self) -> Option<BufReader<ChildStdout>> {
        self.output.take()
    }

    /// Waits for the process and reports a non-zero exit status as an error.
    pub fn finish(mut self) -> Result<(), TraceError> {
        // Close our end first so a generator still writing sees a broken pipe
        drop(self.output.take());
        let status = self.child.wait()?;
        if !status.success() {
            return Err(TraceError::GeneratorFailed { status });
        }
        info!("{} finished", self.program.display());
        Ok(())
    }

    /// Kills the process after a failed run.
    pub fn abort(mut self) {
        drop(self.output.take());
        if let Err(err) = self.child.kill() {
            warn!("could not kill {}: {}", self.program.display(), err);
        }
        let _ = self.child.wait();
    }
}
