//! Prime Counting Benchmark Harness
//! Compares: primer segment analysis vs `primal` crate vs `primes` crate,
//! plus the carry-save popcount against a plain `count_ones` loop.
//!
//! Usage: cargo run --release --bin primer-bench

use std::fmt;
use std::time::{Duration, Instant};

use primer::{popcount, ConstellationKind, PrimeSieve, Settings};

// ─── Contenders ────────────────────────────────────────────────────────────

fn primer_count(n: u64) -> u64 {
    primer::count_primes(0, n).unwrap_or(0)
}

fn primer_count_threaded(n: u64) -> u64 {
    let threads = std::thread::available_parallelism().map_or(1, |t| t.get());
    PrimeSieve::new(Settings::new().count_primes().threads(threads))
        .and_then(|s| s.sieve(0, n))
        .map_or(0, |c| c.primes())
}

fn primes_crate_count(n: u64) -> u64 {
    use primes::{PrimeSet, Sieve};
    let mut sieve = Sieve::new();
    sieve.iter().take_while(|&p| p <= n).count() as u64
}

fn primal_crate_count(n: u64) -> u64 {
    primal::StreamingSieve::prime_pi(n as usize) as u64
}

fn primer_twins(n: u64) -> u64 {
    primer::count_constellations(ConstellationKind::Twins, 0, n).unwrap_or(0)
}

fn primal_twins(n: u64) -> u64 {
    let sieve = primal::Sieve::new(n as usize);
    sieve
        .primes_from(0)
        .take_while(|&p| p + 2 <= n as usize)
        .filter(|&p| sieve.is_prime(p + 2))
        .count() as u64
}

// ─── Benchmarking machinery ────────────────────────────────────────────────

struct BenchResult {
    name: String,
    count: u64,
    times: Vec<Duration>,
}

impl BenchResult {
    fn median(&self) -> Duration {
        let mut sorted: Vec<Duration> = self.times.clone();
        sorted.sort();
        sorted[sorted.len() / 2]
    }

    fn min(&self) -> Duration {
        self.times.iter().min().copied().unwrap_or_default()
    }

    fn max(&self) -> Duration {
        self.times.iter().max().copied().unwrap_or_default()
    }

    fn mean(&self) -> Duration {
        let total: Duration = self.times.iter().sum();
        total / self.times.len() as u32
    }
}

impl fmt::Display for BenchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<26} │ {:>10} │ {:>10} │ {:>10} │ {:>10} │ {:>12}",
            self.name,
            format_duration(self.min()),
            format_duration(self.median()),
            format_duration(self.mean()),
            format_duration(self.max()),
            format_with_commas(self.count),
        )
    }
}

fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos < 1_000 {
        format!("{} ns", nanos)
    } else if nanos < 1_000_000 {
        format!("{:.1} µs", nanos as f64 / 1_000.0)
    } else if nanos < 1_000_000_000 {
        format!("{:.2} ms", nanos as f64 / 1_000_000.0)
    } else {
        format!("{:.2} s", nanos as f64 / 1_000_000_000.0)
    }
}

fn format_with_commas(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

fn bench<F>(name: &str, n: u64, iterations: usize, f: F) -> BenchResult
where
    F: Fn(u64) -> u64,
{
    // Warmup
    let _ = f(n);

    let mut times = Vec::with_capacity(iterations);
    let mut count = 0;
    for _ in 0..iterations {
        let start = Instant::now();
        count = std::hint::black_box(f(n));
        times.push(start.elapsed());
    }
    BenchResult { name: name.to_string(), count, times }
}

fn print_header() {
    println!("{:<26} │ {:>10} │ {:>10} │ {:>10} │ {:>10} │ {:>12}",
        "Implementation", "Min", "Median", "Mean", "Max", "Count");
    println!("{}", "─".repeat(96));
}

fn print_summary(results: &[BenchResult]) {
    let fastest = results.iter().map(|r| r.median()).min().unwrap_or_default();
    for r in results {
        let ratio = r.median().as_nanos() as f64 / fastest.as_nanos().max(1) as f64;
        if ratio <= 1.01 {
            println!("│  {:<24} : fastest 🏆", r.name);
        } else {
            println!("│  {:<24} : {:.2}x slower", r.name, ratio);
        }
    }
}

fn main() {
    println!("🦀 Prime Counting Benchmark 🦀");
    println!("{}", "━".repeat(96));
    println!();

    let iterations = 15;
    for &n in &[100_000u64, 1_000_000, 10_000_000, 100_000_000] {
        println!("┌─ π(n), n = {} ({} iterations)", format_with_commas(n), iterations);
        print_header();

        let mut results = vec![
            bench("primer (1 thread)", n, iterations, primer_count),
            bench("primer (all threads)", n, iterations, primer_count_threaded),
            bench("primal (StreamingSieve)", n, iterations, primal_crate_count),
        ];
        // primes crate is painfully slow past 1M
        if n <= 1_000_000 {
            results.push(bench("primes crate (iter)", n, iterations, primes_crate_count));
        }
        for r in &results {
            println!("{}", r);
        }
        for r in &results[1..] {
            assert_eq!(results[0].count, r.count,
                "MISMATCH at n={}: {}={} vs {}={}", n, results[0].name, results[0].count, r.name, r.count);
        }
        println!("│");
        print_summary(&results);
        println!("└{}", "─".repeat(95));
        println!();
    }

    let n = 10_000_000u64;
    println!("┌─ twin primes, n = {}", format_with_commas(n));
    print_header();
    let results = vec![
        bench("primer (lookup tables)", n, iterations, primer_twins),
        bench("primal (sieve + filter)", n, iterations, primal_twins),
    ];
    for r in &results {
        println!("{}", r);
    }
    assert_eq!(results[0].count, results[1].count, "twin count MISMATCH");
    println!("│");
    print_summary(&results);
    println!("└{}", "─".repeat(95));
    println!();

    let buffer: Vec<u8> = (0..(1u32 << 24)).map(|i| (i.wrapping_mul(2_654_435_761) >> 13) as u8).collect();
    println!("┌─ popcount over {} MB", buffer.len() >> 20);
    print_header();
    let results = vec![
        bench("primer (carry-save)", 0, iterations, |_| popcount(&buffer)),
        bench("count_ones per byte", 0, iterations, |_| {
            buffer.iter().map(|b| b.count_ones() as u64).sum()
        }),
    ];
    for r in &results {
        println!("{}", r);
    }
    assert_eq!(results[0].count, results[1].count, "popcount MISMATCH");
    println!("│");
    print_summary(&results);
    println!("└{}", "─".repeat(95));
    println!();
    println!("✓ Benchmark complete!");
}
