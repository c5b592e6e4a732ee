use std::sync::Arc;

use parking_lot::Mutex;
use primer::{
    count_constellations, count_primes, generate_primes, ConstellationKind, Error, Output, PrimeSieve, PrimeSink,
    Settings,
};

/// Brute-force constellation count over the offset patterns that fit inside
/// one wheel byte (plus the small tuples below it).
fn brute_force_constellations(kind: ConstellationKind, start: u64, stop: u64) -> u64 {
    let patterns: &[&[u64]] = match kind {
        ConstellationKind::Twins => &[&[0, 2]],
        ConstellationKind::Triplets => &[&[0, 2, 6], &[0, 4, 6]],
        ConstellationKind::Quadruplets => &[&[0, 2, 6, 8]],
        ConstellationKind::Quintuplets => &[&[0, 2, 6, 8, 12], &[0, 4, 6, 10, 12]],
        ConstellationKind::Sextuplets => &[&[0, 4, 6, 10, 12, 16]],
        // (0, 2, 8, 12, 14, 18, 20) always straddles two bytes and is not counted.
        ConstellationKind::Septuplets => &[&[0, 2, 6, 8, 12, 18, 20]],
    };
    let mut n = 0;
    for p in start..=stop {
        for pattern in patterns {
            let last = p + pattern[pattern.len() - 1];
            if last <= stop && pattern.iter().all(|&o| primes::is_prime(p + o)) {
                n += 1;
            }
        }
    }
    n
}

#[test]
fn prime_counts_match_primal() {
    for n in [10u64, 100, 1_000, 65_536, 1_000_000, 3_000_000] {
        let expected = primal::StreamingSieve::prime_pi(n as usize) as u64;
        assert_eq!(count_primes(0, n).unwrap(), expected, "Mismatch at n={}", n);
    }
}

#[test]
fn offset_ranges_match_primal() {
    let sieve = primal::Sieve::new(2_000_000);
    for (start, stop) in [(0, 0), (2, 3), (4, 6), (7, 7), (8, 30), (1_000_003, 1_999_999), (123_456, 654_321)] {
        let expected = sieve.primes_from(start as usize).take_while(|&p| p <= stop as usize).count() as u64;
        assert_eq!(count_primes(start, stop).unwrap(), expected, "start={} stop={}", start, stop);
    }
}

#[test]
fn constellation_counts_match_brute_force() {
    for kind in ConstellationKind::ALL {
        for (start, stop) in [(0, 100_000), (4, 2_000), (11, 50_000), (97, 12_345)] {
            assert_eq!(
                count_constellations(kind, start, stop).unwrap(),
                brute_force_constellations(kind, start, stop),
                "kind={} start={} stop={}",
                kind,
                start,
                stop
            );
        }
    }
}

#[test]
fn threaded_counts_match_single_thread() {
    let settings = ConstellationKind::ALL
        .into_iter()
        .fold(Settings::new().count_primes().sieve_size(1024), |s, k| s.count(k));
    let single = PrimeSieve::new(settings.clone()).unwrap().sieve(1_000, 5_000_000).unwrap();
    for threads in [2, 3, 7] {
        let multi = PrimeSieve::new(settings.clone().threads(threads)).unwrap().sieve(1_000, 5_000_000).unwrap();
        assert_eq!(multi, single, "threads={}", threads);
    }
}

#[test]
fn generated_primes_ascending_and_complete() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink_seen = seen.clone();
    generate_primes(0, 200_000, move |p| {
        sink_seen.lock().push(p);
        Ok(())
    })
    .unwrap();

    let expected: Vec<u64> = primal::Primes::all().take_while(|&p| p <= 200_000).map(|p| p as u64).collect();
    assert_eq!(*seen.lock(), expected);
}

#[test]
fn print_constellations_text() {
    let (out, captured) = Output::buffer();
    let sieve = PrimeSieve::new(
        Settings::new()
            .print_constellations(ConstellationKind::Quadruplets)
            .output(out),
    )
    .unwrap();
    sieve.sieve(0, 200).unwrap();
    assert_eq!(captured.contents(), "(5, 7, 11, 13)\n(11, 13, 17, 19)\n(101, 103, 107, 109)\n(191, 193, 197, 199)\n");
}

#[test]
fn callback_error_aborts_run() {
    let sink = PrimeSink::callback64(|p| if p > 1_000 { Err(format!("stop at {}", p).into()) } else { Ok(()) });
    let sieve = PrimeSieve::new(Settings::new().callback(sink).sieve_size(64)).unwrap();
    let err = sieve.sieve(0, 100_000).unwrap_err();
    assert!(matches!(err, Error::Sink(_)));
    assert_eq!(err.to_string(), "callback sink failed: stop at 1009");
}

#[test]
fn status_reaches_full_span() {
    let settings = Settings::new().count_primes().status(true).sieve_size(256);
    let counts = PrimeSieve::new(settings).unwrap().sieve(0, 1_000_000).unwrap();
    assert_eq!(counts.primes(), 78_498);
}
