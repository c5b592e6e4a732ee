//! Runs a whole sieve: small values below the wheel, then the segment
//! producer feeding one analyzer per worker.

use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;

use crate::analyzer::{Analysis, SegmentAnalyzer};
use crate::config::{Generate, Settings};
use crate::constellation::ConstellationKind;
use crate::counts::{Counts, PRIMES};
use crate::error::{Error, Result};
use crate::sieve::{SegmentSieve, MAX_STOP, WHEEL_START};
use crate::sink::{CallbackResult, PrimeSink};
use crate::status::{Status, StatusReporter};
use crate::wheel::NUMBERS_PER_BYTE;

// ─── Values below the wheel ────────────────────────────────────────────────

/// A prime or constellation involving 2, 3 or 5, which the wheel-30 layout
/// cannot represent.
struct SmallValue {
    slot: usize,
    values: &'static [u64],
}

impl SmallValue {
    fn first(&self) -> u64 {
        self.values[0]
    }

    fn last(&self) -> u64 {
        self.values[self.values.len() - 1]
    }
}

const SMALL_VALUES: [SmallValue; 8] = [
    SmallValue { slot: PRIMES, values: &[2] },
    SmallValue { slot: PRIMES, values: &[3] },
    SmallValue { slot: PRIMES, values: &[5] },
    SmallValue { slot: 1, values: &[3, 5] },
    SmallValue { slot: 1, values: &[5, 7] },
    SmallValue { slot: 2, values: &[5, 7, 11] },
    SmallValue { slot: 3, values: &[5, 7, 11, 13] },
    SmallValue { slot: 4, values: &[5, 7, 11, 13, 17] },
];

// ─── Driver ────────────────────────────────────────────────────────────────

/// Counts and/or generates primes and constellations over `[start, stop]`.
#[derive(Debug, Clone)]
pub struct PrimeSieve {
    settings: Settings,
}

impl PrimeSieve {
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;
        Ok(PrimeSieve { settings })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Sieve `[start, stop]`. Generation output is flushed before returning.
    ///
    /// When any generation mode is active the range is processed by a single
    /// worker so output stays ascending; counting-only runs are split across
    /// `threads` workers whose partial counts are summed at the end.
    pub fn sieve(&self, start: u64, stop: u64) -> Result<Counts> {
        self.check_range(start, stop)?;
        let timer = Instant::now();

        let threads = if self.settings.generate.is_active() { 1 } else { self.settings.threads };
        tracing::info!(
            start,
            stop,
            threads,
            sieve_size = self.settings.sieve_size,
            generate = %self.settings.generate,
            "sieving"
        );

        let status = self
            .settings
            .status
            .then(|| Arc::new(Status::new(stop - start + 1)) as Arc<dyn StatusReporter>);
        let analysis = Analysis::with_status(&self.settings, status)?;

        let mut counts = self.small_values(&analysis, start, stop)?;
        let wheel_start = start.max(WHEEL_START);
        if wheel_start <= stop {
            let chunks = split_range(wheel_start, stop, threads);
            counts += if chunks.len() == 1 {
                sieve_chunk(&analysis, chunks[0], self.settings.sieve_size)?
            } else {
                let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
                let partials: Vec<Counts> = pool.install(|| {
                    chunks
                        .par_iter()
                        .map(|&chunk| sieve_chunk(&analysis, chunk, self.settings.sieve_size))
                        .collect::<Result<Vec<Counts>>>()
                })?;
                partials.into_iter().sum()
            };
        }

        if self.settings.generate.is_active() {
            analysis.output().flush()?;
        }
        tracing::info!(elapsed = ?timer.elapsed(), primes = counts.primes(), "done");
        Ok(counts)
    }

    fn check_range(&self, start: u64, stop: u64) -> Result<()> {
        if start > stop {
            return Err(Error::InvalidConfig(format!("start {} > stop {}", start, stop)));
        }
        if stop > MAX_STOP {
            return Err(Error::InvalidConfig(format!("stop {} > maximum {}", stop, MAX_STOP)));
        }
        if let Generate::Primes(sink) = &self.settings.generate {
            if sink.is_32bit() && stop > u32::MAX as u64 {
                return Err(Error::InvalidConfig(format!(
                    "stop {} exceeds the 32-bit callback range",
                    stop
                )));
            }
        }
        Ok(())
    }

    /// Count and generate the entries of `SMALL_VALUES` inside the range,
    /// ahead of any segment output.
    fn small_values(&self, analysis: &Analysis, start: u64, stop: u64) -> Result<Counts> {
        let mut counts = Counts::default();
        for small in SMALL_VALUES.iter().filter(|s| start <= s.first() && s.last() <= stop) {
            let counted = match small.slot {
                PRIMES => self.settings.count.primes(),
                slot => ConstellationKind::try_from(slot as u8)
                    .map(|k| self.settings.count.contains(k))?,
            };
            if counted {
                counts.add(small.slot, 1);
            }
            match &self.settings.generate {
                Generate::Primes(sink) if small.slot == PRIMES => {
                    analysis.emit_primes(sink, small.values)?
                }
                Generate::Constellations(kind) if kind.index() == small.slot => {
                    analysis.print_tuple(small.values)?
                }
                _ => {}
            }
        }
        Ok(counts)
    }
}

/// Split `[start, stop]` into at most `parts` contiguous chunks. Inner
/// boundaries sit at `30k + 7` so no wheel byte straddles two chunks.
fn split_range(start: u64, stop: u64, parts: usize) -> Vec<(u64, u64)> {
    let base = (start - WHEEL_START) / NUMBERS_PER_BYTE * NUMBERS_PER_BYTE + WHEEL_START;
    let span = stop - base + 1;
    let per = span.div_ceil(parts as u64).next_multiple_of(NUMBERS_PER_BYTE);

    let mut chunks = Vec::with_capacity(parts);
    let mut lo = start;
    while lo <= stop {
        let aligned = (lo - WHEEL_START) / NUMBERS_PER_BYTE * NUMBERS_PER_BYTE + WHEEL_START;
        let hi = (aligned + per - 1).min(stop);
        chunks.push((lo, hi));
        if hi == stop {
            break;
        }
        lo = hi + 1;
    }
    chunks
}

fn sieve_chunk(analysis: &Arc<Analysis>, (lo, hi): (u64, u64), sieve_size: usize) -> Result<Counts> {
    let mut analyzer = SegmentAnalyzer::new(analysis.clone());
    SegmentSieve::new(lo, hi, sieve_size).run(|seg| analyzer.on_segment_ready(seg))?;
    tracing::debug!(lo, hi, "chunk done");
    Ok(analyzer.into_counts())
}

// ─── Convenience entry points ──────────────────────────────────────────────

/// Number of primes in `[start, stop]`.
pub fn count_primes(start: u64, stop: u64) -> Result<u64> {
    let counts = PrimeSieve::new(Settings::new().count_primes())?.sieve(start, stop)?;
    Ok(counts.primes())
}

/// Number of `kind` constellations lying entirely inside `[start, stop]`.
pub fn count_constellations(kind: ConstellationKind, start: u64, stop: u64) -> Result<u64> {
    let counts = PrimeSieve::new(Settings::new().count(kind))?.sieve(start, stop)?;
    Ok(counts.constellations(kind))
}

/// Call `f` with every prime in `[start, stop]`, ascending.
pub fn generate_primes<F>(start: u64, stop: u64, f: F) -> Result<()>
where
    F: Fn(u64) -> CallbackResult + Send + Sync + 'static,
{
    PrimeSieve::new(Settings::new().callback(PrimeSink::callback64(f)))?.sieve(start, stop)?;
    Ok(())
}
