//! Run configuration, built once before any segment is processed.

use std::fmt;

use crate::constellation::ConstellationKind;
use crate::error::{Error, Result};
use crate::sink::{Output, PrimeSink};

// ─── Tuning ────────────────────────────────────────────────────────────────

/// Default segment size in bytes. 32KB is safe for virtually all x86/ARM L1d
/// caches; with the wheel-30 layout one segment covers 983,040 integers.
pub const SEGMENT_BYTES: usize = 32 * 1024;

/// Largest accepted segment size in bytes.
pub const MAX_SEGMENT_BYTES: usize = 4096 * 1024;

// ─── Counting ──────────────────────────────────────────────────────────────

/// What to count: plain primes and/or any subset of constellation kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountSet {
    primes: bool,
    kinds: u8,
}

impl CountSet {
    pub fn with_primes(mut self) -> Self {
        self.primes = true;
        self
    }

    pub fn with(mut self, kind: ConstellationKind) -> Self {
        self.kinds |= 1 << kind.index();
        self
    }

    pub fn primes(&self) -> bool {
        self.primes
    }

    pub fn contains(&self, kind: ConstellationKind) -> bool {
        self.kinds & (1 << kind.index()) != 0
    }

    pub fn kinds(&self) -> impl Iterator<Item = ConstellationKind> + '_ {
        ConstellationKind::ALL.into_iter().filter(|&k| self.contains(k))
    }

    pub fn is_empty(&self) -> bool {
        !self.primes && self.kinds == 0
    }
}

// ─── Generation ────────────────────────────────────────────────────────────

/// At most one generation mode is active per run.
#[derive(Debug, Clone, Default)]
pub enum Generate {
    #[default]
    Nothing,
    /// Decode every prime and hand it to the sink.
    Primes(PrimeSink),
    /// Print every constellation of this kind as `(a, b, ...)`.
    Constellations(ConstellationKind),
}

impl Generate {
    pub fn is_active(&self) -> bool {
        !matches!(self, Generate::Nothing)
    }
}

impl fmt::Display for Generate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Generate::Nothing => f.write_str("nothing"),
            Generate::Primes(sink) => write!(f, "primes ({:?})", sink),
            Generate::Constellations(kind) => write!(f, "{}", kind),
        }
    }
}

// ─── Settings ──────────────────────────────────────────────────────────────

/// Immutable run configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub count: CountSet,
    pub generate: Generate,
    pub status: bool,
    /// Segment size in bytes.
    pub sieve_size: usize,
    pub threads: usize,
    pub output: Output,
    conflict: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            count: CountSet::default(),
            generate: Generate::Nothing,
            status: false,
            sieve_size: SEGMENT_BYTES,
            threads: 1,
            output: Output::stdout(),
            conflict: None,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Settings::default()
    }

    pub fn count_primes(mut self) -> Self {
        self.count = self.count.with_primes();
        self
    }

    pub fn count(mut self, kind: ConstellationKind) -> Self {
        self.count = self.count.with(kind);
        self
    }

    /// Select the generation mode. Selecting a second active mode is
    /// reported by [`Settings::validate`].
    pub fn generate(mut self, mode: Generate) -> Self {
        if self.generate.is_active() && mode.is_active() && self.conflict.is_none() {
            self.conflict = Some(format!(
                "conflicting generation modes: {} and {}",
                self.generate, mode
            ));
        }
        self.generate = mode;
        self
    }

    pub fn print_primes(self) -> Self {
        self.generate(Generate::Primes(PrimeSink::Print))
    }

    pub fn callback(self, sink: PrimeSink) -> Self {
        self.generate(Generate::Primes(sink))
    }

    pub fn print_constellations(self, kind: ConstellationKind) -> Self {
        self.generate(Generate::Constellations(kind))
    }

    pub fn status(mut self, enabled: bool) -> Self {
        self.status = enabled;
        self
    }

    pub fn sieve_size(mut self, bytes: usize) -> Self {
        self.sieve_size = bytes;
        self
    }

    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn output(mut self, output: Output) -> Self {
        self.output = output;
        self
    }

    pub fn is_count(&self) -> bool {
        !self.count.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(msg) = &self.conflict {
            return Err(Error::InvalidConfig(msg.clone()));
        }
        if self.sieve_size == 0 || self.sieve_size > MAX_SEGMENT_BYTES {
            return Err(Error::InvalidConfig(format!(
                "sieve size {} bytes outside 1..={}",
                self.sieve_size, MAX_SEGMENT_BYTES
            )));
        }
        if self.threads == 0 {
            return Err(Error::InvalidConfig("threads must be >= 1".into()));
        }
        Ok(())
    }
}
