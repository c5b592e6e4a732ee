use std::time::Instant;

use anyhow::{Context as _, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use primer::{ConstellationKind, PrimeSieve, Settings, SEGMENT_BYTES};

/// Count or print primes and prime k-tuplets with a segmented wheel-30 sieve.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Lower bound (inclusive). With a single number, sieve [0, N].
    #[arg(value_name = "START")]
    first: u64,

    /// Upper bound (inclusive)
    #[arg(value_name = "STOP")]
    second: Option<u64>,

    /// Count primes and/or constellations: primes, twins, triplets, ... (repeatable)
    #[arg(short, long = "count", value_name = "WHAT")]
    count: Vec<String>,

    /// Print primes or one constellation kind, one per line
    #[arg(short, long, value_name = "WHAT")]
    print: Option<String>,

    /// Segment size in KiB [s=32]
    #[arg(short, long, default_value_t = SEGMENT_BYTES / 1024, hide_default_value = true)]
    sieve_size: usize,

    /// Number of threads for counting [t=1]
    #[arg(short, long, default_value_t = 1, hide_default_value = true)]
    threads: usize,

    /// Log progress while sieving
    #[arg(long)]
    status: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let (start, stop) = match args.second {
        Some(stop) => (args.first, stop),
        None => (0, args.first),
    };
    anyhow::ensure!(start <= stop, "START ({}) must be ≤ STOP ({})", start, stop);
    anyhow::ensure!(args.threads >= 1, "threads must be ≥ 1");

    let mut settings = Settings::new()
        .sieve_size(segment_bytes(args.sieve_size)?)
        .threads(args.threads)
        .status(args.status);

    for what in &args.count {
        settings = match what.as_str() {
            "primes" | "1" => settings.count_primes(),
            other => settings.count(parse_kind(other)?),
        };
    }
    if let Some(what) = &args.print {
        settings = match what.as_str() {
            "primes" | "1" => settings.print_primes(),
            other => settings.print_constellations(parse_kind(other)?),
        };
    }
    if args.count.is_empty() && args.print.is_none() {
        settings = settings.count_primes();
    }

    let sieve = PrimeSieve::new(settings)?;
    let timer = Instant::now();
    let counts = sieve.sieve(start, stop)?;
    let elapsed = timer.elapsed();

    let count = &sieve.settings().count;
    if count.primes() {
        println!("Prime count: {}", counts.primes());
    }
    for kind in count.kinds() {
        println!("{} count: {}", kind.label(), counts.constellations(kind));
    }
    if sieve.settings().is_count() {
        println!("Time elapsed: {:?}", elapsed);
    }
    Ok(())
}

fn segment_bytes(kib: usize) -> Result<usize> {
    kib.checked_mul(1024)
        .with_context(|| format!("sieve size {} KiB is too large", kib))
}

fn parse_kind(what: &str) -> Result<ConstellationKind> {
    what.parse::<ConstellationKind>()
        .with_context(|| format!("expected primes, twins, triplets, ... septuplets; got '{}'", what))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_bytes() {
        assert_eq!(segment_bytes(32).unwrap(), 32 * 1024);
        assert!(segment_bytes(usize::MAX).is_err());
        assert!(segment_bytes(usize::MAX / 1024 + 1).is_err());
    }

    #[test]
    fn test_huge_sieve_size_rejected() {
        let kib = usize::MAX.to_string();
        let args = Args::try_parse_from(["primer", "100", "-s", kib.as_str()]).unwrap();
        assert!(segment_bytes(args.sieve_size).is_err());
    }
}
