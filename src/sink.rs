//! Where generated primes go.
//!
//! All generation output funnels through one [`Output`]: a text stream behind
//! a `parking_lot::Mutex`. The analyzer holds that lock for a whole segment
//! while it emits primes, whichever [`PrimeSink`] is active, so two segments'
//! worth of output never interleave.

use std::any::Any;
use std::fmt;
use std::io::{self, BufWriter, Write};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::error::CallbackError;

pub type CallbackResult = std::result::Result<(), CallbackError>;

/// Opaque user value handed back to context callbacks.
pub type Context = Arc<dyn Any + Send + Sync>;

pub type Callback32 = Arc<dyn Fn(u32) -> CallbackResult + Send + Sync>;
pub type Callback64 = Arc<dyn Fn(u64) -> CallbackResult + Send + Sync>;
pub type Callback32WithContext = Arc<dyn Fn(u32, &Context) -> CallbackResult + Send + Sync>;
pub type Callback64WithContext = Arc<dyn Fn(u64, &Context) -> CallbackResult + Send + Sync>;

/// Destination of single-prime generation. Exactly one is active per run.
#[derive(Clone)]
pub enum PrimeSink {
    /// Decimal value and newline on the shared [`Output`].
    Print,
    Callback32(Callback32),
    Callback64(Callback64),
    Callback32WithContext(Callback32WithContext, Context),
    Callback64WithContext(Callback64WithContext, Context),
}

impl PrimeSink {
    pub fn callback32<F>(f: F) -> Self
    where
        F: Fn(u32) -> CallbackResult + Send + Sync + 'static,
    {
        PrimeSink::Callback32(Arc::new(f))
    }

    pub fn callback64<F>(f: F) -> Self
    where
        F: Fn(u64) -> CallbackResult + Send + Sync + 'static,
    {
        PrimeSink::Callback64(Arc::new(f))
    }

    pub fn callback32_with_context<F>(f: F, context: Context) -> Self
    where
        F: Fn(u32, &Context) -> CallbackResult + Send + Sync + 'static,
    {
        PrimeSink::Callback32WithContext(Arc::new(f), context)
    }

    pub fn callback64_with_context<F>(f: F, context: Context) -> Self
    where
        F: Fn(u64, &Context) -> CallbackResult + Send + Sync + 'static,
    {
        PrimeSink::Callback64WithContext(Arc::new(f), context)
    }

    /// Whether values are truncated to 32 bits on the way out.
    pub fn is_32bit(&self) -> bool {
        matches!(
            self,
            PrimeSink::Callback32(_) | PrimeSink::Callback32WithContext(..)
        )
    }
}

impl fmt::Debug for PrimeSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrimeSink::Print => "Print",
            PrimeSink::Callback32(_) => "Callback32",
            PrimeSink::Callback64(_) => "Callback64",
            PrimeSink::Callback32WithContext(..) => "Callback32WithContext",
            PrimeSink::Callback64WithContext(..) => "Callback64WithContext",
        };
        f.write_str(name)
    }
}

// ─── Shared text output ────────────────────────────────────────────────────

type Writer = Box<dyn Write + Send>;

/// Shared, lock-protected text stream. Cloning shares the same stream.
#[derive(Clone)]
pub struct Output {
    inner: Arc<Mutex<Writer>>,
}

impl Output {
    pub fn from_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Output {
            inner: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Buffered standard output.
    pub fn stdout() -> Self {
        Output::from_writer(BufWriter::new(io::stdout()))
    }

    /// In-memory output plus a handle to read back what was written.
    pub fn buffer() -> (Self, Captured) {
        let captured = Captured::default();
        (Output::from_writer(captured.clone()), captured)
    }

    /// Acquire the generation lock.
    pub fn lock(&self) -> MutexGuard<'_, Writer> {
        self.inner.lock()
    }

    pub fn flush(&self) -> io::Result<()> {
        self.inner.lock().flush()
    }
}

impl Default for Output {
    fn default() -> Self {
        Output::stdout()
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output").finish_non_exhaustive()
    }
}

/// Byte buffer written through an [`Output`].
#[derive(Clone, Default)]
pub struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_buffer_captures_writes() {
        let (out, captured) = Output::buffer();
        writeln!(out.lock(), "7").unwrap();
        write!(out.clone().lock(), "11\n").unwrap();
        out.flush().unwrap();
        assert_eq!(captured.contents(), "7\n11\n");
    }

    #[test]
    fn test_lock_keeps_batches_whole() {
        let (out, captured) = Output::buffer();
        let handles: Vec<_> = (0..4u32)
            .map(|t| {
                let out = out.clone();
                thread::spawn(move || {
                    let mut w = out.lock();
                    for i in 0..100 {
                        writeln!(w, "{} {}", t, i).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let text = captured.contents();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 400);
        for batch in lines.chunks(100) {
            let owner = batch[0].split(' ').next().unwrap();
            assert!(batch.iter().all(|l| l.starts_with(owner)), "interleaved batch");
        }
    }

    #[test]
    fn test_sink_width() {
        assert!(PrimeSink::callback32(|_| Ok(())).is_32bit());
        assert!(!PrimeSink::callback64(|_| Ok(())).is_32bit());
        assert!(!PrimeSink::Print.is_32bit());
        let ctx: Context = Arc::new(5u32);
        assert!(PrimeSink::callback32_with_context(|_, _| Ok(()), ctx).is_32bit());
    }
}
