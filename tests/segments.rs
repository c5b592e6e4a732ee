use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use primer::{Analysis, ConstellationKind, Counts, Output, PrimeSink, Segment, SegmentAnalyzer, Settings};

fn pseudo_random_segment(len: usize, seed: u64) -> Vec<u8> {
    let mut x = seed | 1;
    (0..len)
        .map(|_| {
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            (x >> 24) as u8
        })
        .collect()
}

fn counting_settings() -> Settings {
    ConstellationKind::ALL
        .into_iter()
        .fold(Settings::new().count_primes(), |s, k| s.count(k))
        .output(Output::buffer().0)
}

#[test]
fn single_twin_byte_end_to_end() {
    let analysis = Analysis::new(&Settings::new().count_primes().count(ConstellationKind::Twins)).unwrap();
    let mut analyzer = SegmentAnalyzer::new(analysis);
    let mut bytes = vec![0u8; 4096];
    bytes[0] = 0x06;
    analyzer.on_segment_ready(&Segment::spanning(&bytes, 0)).unwrap();

    let counts = analyzer.into_counts();
    assert_eq!(counts.primes(), 2);
    assert_eq!(counts.constellations(ConstellationKind::Twins), 1);
    assert_eq!(counts.constellations(ConstellationKind::Triplets), 0);
}

#[test]
fn print_sink_exact_output() {
    let (out, captured) = Output::buffer();
    let analysis = Analysis::new(&Settings::new().print_primes().output(out.clone())).unwrap();
    let mut analyzer = SegmentAnalyzer::new(analysis);
    analyzer.on_segment_ready(&Segment::spanning(&[0x1E, 0x00], 0)).unwrap();
    out.flush().unwrap();
    assert_eq!(captured.contents(), "11\n13\n17\n19\n");
}

#[test]
fn concurrent_counting_matches_sequential() {
    let segments: Vec<Vec<u8>> = (0..16).map(|i| pseudo_random_segment(3_000 + i * 17, i as u64 + 1)).collect();
    let analysis = Analysis::new(&counting_settings()).unwrap();

    let mut sequential = SegmentAnalyzer::new(analysis.clone());
    for (i, bytes) in segments.iter().enumerate() {
        sequential.on_segment_ready(&Segment::spanning(bytes, i as u64 * 300_000)).unwrap();
    }
    let sequential = sequential.into_counts();

    for workers in [2, 3, 8] {
        let partials: Vec<Counts> = thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|w| {
                    let analysis = analysis.clone();
                    let segments = &segments;
                    scope.spawn(move || {
                        let mut analyzer = SegmentAnalyzer::new(analysis);
                        for (i, bytes) in segments.iter().enumerate().skip(w).step_by(workers) {
                            analyzer.on_segment_ready(&Segment::spanning(bytes, i as u64 * 300_000)).unwrap();
                        }
                        analyzer.into_counts()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        let total: Counts = partials.into_iter().sum();
        assert_eq!(total, sequential, "workers={}", workers);
    }
}

#[test]
fn concurrent_generation_never_interleaves_segments() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink_seen = seen.clone();
    let sink = PrimeSink::callback64(move |p| {
        sink_seen.lock().push(p);
        Ok(())
    });
    let analysis = Analysis::new(&Settings::new().callback(sink).output(Output::buffer().0)).unwrap();

    let bytes = vec![0xFFu8; 64];
    thread::scope(|scope| {
        for w in 0..4u64 {
            let analysis = analysis.clone();
            let bytes = &bytes;
            scope.spawn(move || {
                let mut analyzer = SegmentAnalyzer::new(analysis);
                analyzer.on_segment_ready(&Segment::spanning(bytes, w * 30_000)).unwrap();
            });
        }
    });

    // Each segment's 512 values arrive as one ascending run.
    let seen = seen.lock();
    assert_eq!(seen.len(), 4 * 512);
    for run in seen.chunks(512) {
        assert!(run.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(run[0] / 30_000, run[511] / 30_000);
    }
}
