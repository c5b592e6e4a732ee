//! Segment analysis for a wheel-30 segmented Sieve of Eratosthenes.
//!
//! A producer hands finished bit-packed segments to a [`SegmentAnalyzer`],
//! which counts primes with a carry-save popcount, counts prime k-tuplets
//! with per-byte lookup tables, and decodes set bits back into values for a
//! print or callback sink. [`PrimeSieve`] wires a reference producer, the
//! small values below the wheel and a pool of analyzers together.

pub mod analyzer;
pub mod config;
pub mod constellation;
pub mod counts;
pub mod driver;
pub mod error;
pub mod popcount;
pub mod segment;
pub mod sieve;
pub mod sink;
pub mod status;
pub mod wheel;

pub use analyzer::{Analysis, SegmentAnalyzer};
pub use config::{CountSet, Generate, Settings, SEGMENT_BYTES};
pub use constellation::{ConstellationKind, ConstellationTable};
pub use counts::Counts;
pub use driver::{count_constellations, count_primes, generate_primes, PrimeSieve};
pub use error::{CallbackError, Error, Result};
pub use popcount::popcount;
pub use segment::Segment;
pub use sink::{Context, Output, PrimeSink};
pub use status::{Status, StatusReporter};
