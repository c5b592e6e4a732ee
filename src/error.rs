use thiserror::Error;

/// Error returned by a user callback sink.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid constellation kind index: {0} (expected 1..=6)")]
    InvalidKind(u8),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("value {0} does not fit in a 32-bit callback")]
    ValueOutOfRange(u64),

    #[error("callback sink failed: {0}")]
    Sink(#[source] CallbackError),

    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
