//! Interface to the external container cache.

use std::fmt;

/// Raster size a container is transcoded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl TargetSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Identifies one transcoded container: a source asset at a raster size.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub source: String,
    pub size: TargetSize,
}

impl CacheKey {
    pub fn new(source: impl Into<String>, size: TargetSize) -> Self {
        Self {
            source: source.into(),
            size,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}x{}", self.source, self.size.width, self.size.height)
    }
}

/// Errors reported by a cache implementation.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source {0} is unavailable")]
    Unavailable(String),
    #[error("Transcoding failed: {0}")]
    Transcode(String),
}

/// Storage and production of transcoded containers.
///
/// Both methods may block on disk or network I/O; the decoder only calls
/// them from its setup thread. Retry policy belongs to the implementation.
pub trait ContainerCache: Send + Sync {
    /// Bytes of a previously transcoded container, or `None` on a miss.
    fn load(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheError>;

    /// Fetch the source asset, transcode it at `key.size` and persist the
    /// result so that a following [`ContainerCache::load`] finds it.
    fn fetch_and_transcode(&self, key: &CacheKey) -> Result<(), CacheError>;
}
