//! Decoding of delta-compressed looping animations.
//!
//! A container is decoded strictly in order: each frame record is
//! decompressed and XOR-merged into the previous frame. After the last record
//! playback wraps to the first one against a blank base.
//!
//! # File Format
//!
//! All integers are little-endian `i32`.
//!
//! ```text
//! Header (20 bytes):
//!   Frame rate (frames per second)
//!   Frame count
//!   Width (pixels)
//!   Height (pixels)
//!   Bytes per row
//!
//! Frame records (variable, repeated until the end of the container):
//!   Length: i32
//!   Payload: `Length` bytes, decompressing to bytes_per_row * height
//!            bytes of XOR delta against the previous frame
//! ```

mod codec;
mod delta;
mod format;
mod pacer;
mod player;

#[cfg(test)]
pub(crate) mod testing;

pub use codec::{
    CodecError, CompressionType, Decompressor, Lz4Decompressor, StoredDecompressor,
};
pub use delta::{FrameBuffer, merge};
pub use format::{
    Container, FormatError, FrameRecord, HEADER_SIZE, Header, PixelFormat, RECORD_PREFIX_SIZE,
    parse_header,
};
pub use pacer::FramePacer;
pub use player::{AnimationPlayer, Frame, OwnedFrame, PlaybackStats, Stall};
