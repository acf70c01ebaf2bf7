use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use trace_replay::{run, Generator, Mode, QueueKind, RunConfig, TraceReader};

/// Replays priority-queue traces and reports the average delete depth per batch
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Trace file; stdin is read when neither this nor a generator is given
    #[arg(short, long, value_parser = clap::value_parser!(PathBuf), conflicts_with = "generator")]
    input: Option<PathBuf>,

    /// Generator executable whose output is replayed
    #[arg(short, long, value_parser = clap::value_parser!(PathBuf))]
    generator: Option<PathBuf>,

    /// Generator seed
    #[arg(short, long, default_value_t = 82)]
    seed: u64,

    /// Generator workload
    #[arg(short, long, value_enum, default_value_t = Mode::Balanced)]
    mode: Mode,

    /// Replay threads
    #[arg(short, long, default_value_t = 2)]
    workers: usize,

    /// Queue to replay against
    #[arg(short, long, value_enum, default_value_t = QueueKind::Fibonacci)]
    queue: QueueKind,

    /// Parsed batches waiting for a worker
    #[arg(short, long, default_value_t = 4)]
    buffer: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Args::parse();
    let config = RunConfig {
        workers: cli.workers,
        buffer: cli.buffer,
        queue: cli.queue,
    };

    let started = Instant::now();
    let summary = match (cli.generator, cli.input) {
        (Some(program), _) => {
            let mut generator = Generator::spawn(&program, cli.seed, cli.mode)?;
            let output = generator
                .take_output()
                .context("generator has no output stream")?;
            match run(TraceReader::new(output), &config) {
                Ok(summary) => {
                    generator.finish()?;
                    summary
                }
                Err(err) => {
                    generator.abort();
                    return Err(err).context("replay of generator output failed");
                }
            }
        }
        (None, Some(path)) => {
            let file = File::open(&path)
                .with_context(|| format!("cannot open trace {}", path.display()))?;
            run(TraceReader::new(BufReader::new(file)), &config)
                .with_context(|| format!("replay of {} failed", path.display()))?
        }
        (None, None) => run(TraceReader::new(io::stdin().lock()), &config)
            .context("replay of stdin failed")?,
    };

    info!("{} batches replayed in {:.3?}", summary.len(), started.elapsed());
    print!("{}", summary);
    Ok(())
}
