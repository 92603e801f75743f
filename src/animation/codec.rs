//! Decompression backends for frame record payloads.

use serde::{Deserialize, Serialize};

/// Compression applied to every frame record of a container.
///
/// The default is part of the format and does not depend on which backends
/// are compiled in; see [`CompressionType::is_available`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionType {
    /// Payload is the raw delta.
    Stored,
    /// LZ4 block format without a size prefix.
    #[default]
    Lz4,
}

impl CompressionType {
    /// Whether a backend for this compression is compiled in.
    pub fn is_available(self) -> bool {
        match self {
            CompressionType::Stored => true,
            CompressionType::Lz4 => cfg!(feature = "lz4"),
        }
    }

    /// Backend decoding this compression.
    pub fn decompressor(self) -> Box<dyn Decompressor> {
        match self {
            CompressionType::Stored => Box::new(StoredDecompressor),
            CompressionType::Lz4 => Box::new(Lz4Decompressor),
        }
    }
}

/// Errors reported by a decompression backend.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[cfg(feature = "lz4")]
    #[error("Corrupt LZ4 block: {0}")]
    Lz4(#[from] lz4_flex::block::DecompressError),
    #[error("Payload of {payload} bytes does not fit a {capacity} byte frame")]
    Overflow { payload: usize, capacity: usize },
    #[error("{0:?} decompression is not compiled into this build")]
    Unavailable(CompressionType),
}

/// A byte-oriented decompressor writing into caller-owned buffers.
///
/// Implementations must not allocate in [`Decompressor::decompress`]; any
/// workspace they need is requested once through
/// [`Decompressor::scratch_size`] and handed back on every call.
pub trait Decompressor: Send + Sync {
    /// Bytes of scratch workspace required per call.
    fn scratch_size(&self) -> usize;

    /// Decompress `src` into `dst`, returning the number of bytes written.
    fn decompress(&self, src: &[u8], dst: &mut [u8], scratch: &mut [u8])
    -> Result<usize, CodecError>;
}

/// Copies the payload verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoredDecompressor;

impl Decompressor for StoredDecompressor {
    fn scratch_size(&self) -> usize {
        0
    }

    fn decompress(
        &self,
        src: &[u8],
        dst: &mut [u8],
        _scratch: &mut [u8],
    ) -> Result<usize, CodecError> {
        if src.len() > dst.len() {
            return Err(CodecError::Overflow {
                payload: src.len(),
                capacity: dst.len(),
            });
        }
        dst[..src.len()].copy_from_slice(src);
        Ok(src.len())
    }
}

/// LZ4 block decoder backed by `lz4_flex`.
///
/// The block format keeps its match window inside `dst`, so no scratch
/// workspace is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lz4Decompressor;

impl Decompressor for Lz4Decompressor {
    fn scratch_size(&self) -> usize {
        0
    }

    #[cfg(feature = "lz4")]
    fn decompress(
        &self,
        src: &[u8],
        dst: &mut [u8],
        _scratch: &mut [u8],
    ) -> Result<usize, CodecError> {
        Ok(lz4_flex::block::decompress_into(src, dst)?)
    }

    #[cfg(not(feature = "lz4"))]
    fn decompress(
        &self,
        _src: &[u8],
        _dst: &mut [u8],
        _scratch: &mut [u8],
    ) -> Result<usize, CodecError> {
        Err(CodecError::Unavailable(CompressionType::Lz4))
    }
}
