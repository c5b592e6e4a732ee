//! Consumes finished segments: counts primes and constellations, and decodes
//! them into values for the configured sink.

use std::fmt::Write as _;
use std::io::Write;
use std::sync::Arc;

use crate::config::{CountSet, Generate, Settings};
use crate::constellation::{ConstellationKind, ConstellationTable};
use crate::counts::{Counts, PRIMES};
use crate::error::{Error, Result};
use crate::popcount::popcount;
use crate::segment::Segment;
use crate::sink::{Output, PrimeSink};
use crate::status::StatusReporter;
use crate::wheel;

/// Read-only state shared by every analyzer of one run.
///
/// Constellation tables are built here, once, for the counted kinds only, and
/// never mutated afterwards.
pub struct Analysis {
    count: CountSet,
    tables: Vec<ConstellationTable>,
    generate: Generate,
    output: Output,
    status: Option<Arc<dyn StatusReporter>>,
}

impl Analysis {
    pub fn new(settings: &Settings) -> Result<Arc<Self>> {
        Analysis::with_status(settings, None)
    }

    pub fn with_status(
        settings: &Settings,
        status: Option<Arc<dyn StatusReporter>>,
    ) -> Result<Arc<Self>> {
        settings.validate()?;
        let tables = settings.count.kinds().map(ConstellationTable::build).collect();
        Ok(Arc::new(Analysis {
            count: settings.count,
            tables,
            generate: settings.generate.clone(),
            output: settings.output.clone(),
            status: if settings.status { status } else { None },
        }))
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    /// Emit every prime of `source` while holding the output lock, so a
    /// whole batch reaches the sink uninterrupted.
    pub(crate) fn emit_primes<S: PrimeSource + ?Sized>(&self, sink: &PrimeSink, source: &S) -> Result<()> {
        let mut out = self.output.lock();
        match sink {
            PrimeSink::Print => source.for_each_prime(|p| {
                writeln!(out, "{}", p)?;
                Ok(())
            }),
            PrimeSink::Callback32(f) => {
                source.for_each_prime(|p| f(narrow(p)?).map_err(Error::Sink))
            }
            PrimeSink::Callback64(f) => source.for_each_prime(|p| f(p).map_err(Error::Sink)),
            PrimeSink::Callback32WithContext(f, ctx) => {
                source.for_each_prime(|p| f(narrow(p)?, ctx).map_err(Error::Sink))
            }
            PrimeSink::Callback64WithContext(f, ctx) => {
                source.for_each_prime(|p| f(p, ctx).map_err(Error::Sink))
            }
        }
    }

    /// Print `(a, b, ...)` for every `kind` instance. Mask matching per byte
    /// is slower than prime generation; fine for a text stream.
    pub(crate) fn print_constellations(&self, kind: ConstellationKind, segment: &Segment) -> Result<()> {
        let low = segment.low();
        let mut out = self.output.lock();
        let mut line = String::with_capacity(64);

        for (j, &byte) in segment.bytes().iter().enumerate() {
            for &mask in kind.bitmasks().iter().take_while(|&&m| m <= byte) {
                if byte & mask != mask {
                    continue;
                }
                line.clear();
                line.push('(');
                let mut bits = mask as u64;
                while bits != 0 {
                    let p = wheel::next_prime(low, j, &mut bits);
                    let sep = if bits != 0 { ", " } else { ")\n" };
                    let _ = write!(line, "{}{}", p, sep);
                }
                out.write_all(line.as_bytes())?;
            }
        }
        Ok(())
    }

    /// Print one precomputed tuple, e.g. `(5, 7)`.
    pub(crate) fn print_tuple(&self, values: &[u64]) -> Result<()> {
        let text: Vec<String> = values.iter().map(u64::to_string).collect();
        writeln!(self.output.lock(), "({})", text.join(", "))?;
        Ok(())
    }
}

/// Per-worker segment consumer. Counts are private to the analyzer and
/// collected with [`SegmentAnalyzer::into_counts`] once the worker is done.
pub struct SegmentAnalyzer {
    analysis: Arc<Analysis>,
    counts: Counts,
}

impl SegmentAnalyzer {
    pub fn new(analysis: Arc<Analysis>) -> Self {
        SegmentAnalyzer {
            analysis,
            counts: Counts::default(),
        }
    }

    /// Process one finished segment.
    ///
    /// On error the remainder of the segment is abandoned and this analyzer's
    /// counts must be discarded.
    pub fn on_segment_ready(&mut self, segment: &Segment) -> Result<()> {
        if !self.analysis.count.is_empty() {
            self.count(segment);
        }
        match &self.analysis.generate {
            Generate::Nothing => {}
            Generate::Primes(sink) => self.analysis.emit_primes(sink, segment)?,
            Generate::Constellations(kind) => self.analysis.print_constellations(*kind, segment)?,
        }
        if let Some(status) = &self.analysis.status {
            status.update(segment.span());
        }
        Ok(())
    }

    pub fn counts(&self) -> &Counts {
        &self.counts
    }

    pub fn into_counts(self) -> Counts {
        self.counts
    }

    fn count(&mut self, segment: &Segment) {
        let bytes = segment.bytes();
        if self.analysis.count.primes() {
            self.counts.add(PRIMES, popcount(bytes));
        }
        for table in &self.analysis.tables {
            self.counts.add(table.kind().index(), table.count(bytes));
        }
    }
}

/// Ascending run of primes that can be pushed into a sink.
pub(crate) trait PrimeSource {
    fn for_each_prime<F>(&self, f: F) -> Result<()>
    where
        F: FnMut(u64) -> Result<()>;
}

impl PrimeSource for Segment<'_> {
    #[inline]
    fn for_each_prime<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(u64) -> Result<()>,
    {
        let low = self.low();
        for (j, &byte) in self.bytes().iter().enumerate() {
            let mut bits = byte as u64;
            while bits != 0 {
                f(wheel::next_prime(low, j, &mut bits))?;
            }
        }
        Ok(())
    }
}

impl PrimeSource for [u64] {
    fn for_each_prime<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(u64) -> Result<()>,
    {
        self.iter().try_for_each(|&p| f(p))
    }
}

#[inline]
fn narrow(p: u64) -> Result<u32> {
    u32::try_from(p).map_err(|_| Error::ValueOutOfRange(p))
}
