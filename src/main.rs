use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use treechurn::{Benchmark, ChurnConfig};

#[derive(Parser, Debug)]
#[command(name = "treechurn", about = "Binary-trees allocation benchmark with bounded parallelism")]
struct Cli {
    /// Problem size (max tree depth). Missing or unparseable values mean 0.
    #[arg(allow_hyphen_values = true)]
    n: Option<String>,

    /// Maximum units running at once (default: number of CPUs).
    #[arg(long, short = 'j')]
    jobs: Option<usize>,

    /// Print a blake3 fingerprint of the output to stderr.
    #[arg(long)]
    fingerprint: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let n = problem_size(cli.n.as_deref());

    let mut config = ChurnConfig::for_problem_size(n);
    if let Some(jobs) = cli.jobs {
        config = config.with_concurrency(jobs);
    }

    let report = Benchmark::new(config)
        .run()
        .with_context(|| format!("benchmark run failed for n={}", n))?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    report.write_to(&mut out).context("failed to write results")?;
    out.flush().context("failed to flush results")?;

    if cli.fingerprint {
        eprintln!("fingerprint: {}", report.fingerprint());
    }

    Ok(())
}

fn problem_size(arg: Option<&str>) -> u32 {
    match arg {
        None => 0,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(value = raw, "unparseable problem size, using 0");
            0
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_size_defaults() {
        assert_eq!(problem_size(None), 0);
        assert_eq!(problem_size(Some("21")), 21);
        assert_eq!(problem_size(Some(" 7 ")), 7);
        assert_eq!(problem_size(Some("deep")), 0);
        assert_eq!(problem_size(Some("-3")), 0);
    }
}
