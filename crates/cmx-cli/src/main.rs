//! # cmx CLI Entry Point
//!
//! Squares the demo permutation matrix on the parallel multiplier and prints
//! the result, optionally recording span lifecycle events to a trace file.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use cmx_cli::{demo, TraceSession};
use cmx_matrix::{Matrix, MultiplierConfig, ParallelMultiplier, TracingSink};

/// Parallel complex matrix multiplication demo.
#[derive(Parser, Debug)]
#[command(name = "cmx", version, about)]
struct Cli {
    /// Write multiply and row span events to this file.
    #[arg(long, value_name = "PATH")]
    trace_out: Option<PathBuf>,

    /// Worker thread count. Defaults to the available hardware parallelism.
    #[arg(long, env = "CMX_THREADS")]
    threads: Option<usize>,

    /// How to print the result.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

impl Cli {
    fn multiplier_config(&self) -> MultiplierConfig {
        let mut config = MultiplierConfig::new();
        config.threads = self.threads;
        config
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    /// One bracketed row per line.
    Text,
    /// Rust debug representation of the rows.
    Debug,
}

fn multiply(config: &MultiplierConfig, sink: TracingSink, m: &Matrix) -> anyhow::Result<Matrix> {
    let mm = ParallelMultiplier::with_sink(config, sink).context("building multiplier")?;
    tracing::info!(threads = mm.threads(), shape = %m.shape(), "squaring demo matrix");
    demo::square(m, &mm).context("multiplying")
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = cli.multiplier_config();

    let m = demo::permutation()?;
    let result = match &cli.trace_out {
        Some(path) => {
            let session = TraceSession::create(path)?;
            let result = session.run(|sink| multiply(&config, sink, &m));
            session.close()?;
            tracing::info!(path = %path.display(), "trace written");
            result?
        }
        None => multiply(&config, TracingSink::new(), &m)?,
    };

    match cli.format {
        Format::Text => println!("{}", result),
        Format::Debug => println!("{:?}", result.to_rows()),
    }

    Ok(())
}
