//! Binary layout of the animation container.

use std::time::Duration;

use super::player::Stall;

/// Size of the container header in bytes: five little-endian `i32` fields.
pub const HEADER_SIZE: usize = 20;

/// Size of the length prefix in front of every frame record.
pub const RECORD_PREFIX_SIZE: usize = 4;

/// Logical layout of the bytes in a decoded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// Premultiplied ARGB rows of `bytes_per_row` bytes.
    #[default]
    Argb,
}

/// Fixed-size container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Playback rate in frames per second.
    pub frame_rate: i32,
    /// Number of frames in one loop. Informational; the end of the loop is
    /// found structurally.
    pub frame_count: i32,
    /// Raster width in pixels.
    pub width: i32,
    /// Raster height in pixels.
    pub height: i32,
    /// Row stride in bytes.
    pub bytes_per_row: i32,
}

impl Header {
    /// Size of one decoded frame in bytes, or `None` if a field is negative
    /// or the product overflows.
    pub fn frame_size(&self) -> Option<usize> {
        let stride = usize::try_from(self.bytes_per_row).ok()?;
        let rows = usize::try_from(self.height).ok()?;
        stride.checked_mul(rows)
    }

    /// Display time of one frame.
    pub fn frame_duration(&self) -> Duration {
        if self.frame_rate > 0 {
            Duration::from_secs_f64(1.0 / self.frame_rate as f64)
        } else {
            Duration::ZERO
        }
    }

    /// Check that buffers can be sized from this header.
    pub fn validate(&self, max_frame_bytes: usize) -> Result<usize, FormatError> {
        if self.frame_rate <= 0 {
            return Err(FormatError::InvalidFrameRate(self.frame_rate));
        }
        if self.width <= 0 || self.height <= 0 || self.bytes_per_row <= 0 {
            return Err(FormatError::InvalidGeometry {
                width: self.width,
                height: self.height,
                bytes_per_row: self.bytes_per_row,
            });
        }
        match self.frame_size() {
            Some(size) if size <= max_frame_bytes => Ok(size),
            _ => Err(FormatError::FrameTooLarge {
                bytes_per_row: self.bytes_per_row,
                height: self.height,
                limit: max_frame_bytes,
            }),
        }
    }
}

/// Errors raised while interpreting a container.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("Container holds {len} bytes, header needs 20")]
    TruncatedHeader { len: usize },
    #[error("Frame rate must be positive, got {0}")]
    InvalidFrameRate(i32),
    #[error("Invalid geometry {width}x{height} with stride {bytes_per_row}")]
    InvalidGeometry {
        width: i32,
        height: i32,
        bytes_per_row: i32,
    },
    #[error("Frame of {bytes_per_row} x {height} bytes exceeds limit of {limit}")]
    FrameTooLarge {
        bytes_per_row: i32,
        height: i32,
        limit: usize,
    },
}

#[inline]
fn read_i32(bytes: &[u8], offset: usize) -> i32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[offset..offset + 4]);
    i32::from_le_bytes(word)
}

/// Parse the five header fields from the start of `bytes`.
pub fn parse_header(bytes: &[u8]) -> Result<Header, FormatError> {
    if bytes.len() < HEADER_SIZE {
        return Err(FormatError::TruncatedHeader { len: bytes.len() });
    }
    Ok(Header {
        frame_rate: read_i32(bytes, 0),
        frame_count: read_i32(bytes, 4),
        width: read_i32(bytes, 8),
        height: read_i32(bytes, 12),
        bytes_per_row: read_i32(bytes, 16),
    })
}

/// A located frame record: the compressed payload span inside the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRecord {
    /// Offset of the length prefix.
    pub offset: usize,
    /// Payload length in bytes.
    pub len: usize,
}

impl FrameRecord {
    /// Offset of the first payload byte.
    pub fn payload_start(&self) -> usize {
        self.offset + RECORD_PREFIX_SIZE
    }

    /// Offset just past this record, where the next one begins.
    pub fn end(&self) -> usize {
        self.payload_start() + self.len
    }
}

/// Immutable container bytes together with their parsed header.
#[derive(Debug, Clone)]
pub struct Container {
    bytes: Box<[u8]>,
    header: Header,
}

impl Container {
    /// Take ownership of `bytes` and parse the header.
    pub fn new(bytes: impl Into<Box<[u8]>>) -> Result<Self, FormatError> {
        let bytes = bytes.into();
        let header = parse_header(&bytes)?;
        Ok(Self { bytes, header })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false: a container holds at least its header.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Locate the frame record starting at `offset`.
    ///
    /// Bounds are checked before anything is read.
    pub fn record_at(&self, offset: usize) -> Result<FrameRecord, Stall> {
        let available = self.bytes.len();
        if offset.saturating_add(RECORD_PREFIX_SIZE) > available {
            return Err(Stall::Exhausted { offset, available });
        }
        let declared = read_i32(&self.bytes, offset);
        let truncated = Stall::TruncatedRecord {
            offset,
            declared,
            available,
        };
        let Ok(len) = usize::try_from(declared) else {
            return Err(truncated);
        };
        let record = FrameRecord { offset, len };
        match record.payload_start().checked_add(len) {
            Some(end) if end <= available => Ok(record),
            _ => Err(truncated),
        }
    }

    /// Compressed payload bytes of `record`.
    pub fn payload(&self, record: &FrameRecord) -> &[u8] {
        &self.bytes[record.payload_start()..record.end()]
    }
}
