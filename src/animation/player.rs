//! Playback cursor over a loaded container.

use std::fmt;
use std::time::Duration;

use super::codec::{CodecError, Decompressor};
use super::delta::{FrameBuffer, merge};
use super::format::{Container, FormatError, HEADER_SIZE, Header, PixelFormat};
use crate::schema::{DecoderConfig, ShortfallPolicy};

/// Reason a call produced no frame.
///
/// A stall leaves the cursor and the frame accumulator untouched, except
/// for [`Stall::Exhausted`] which may rewind to the first frame (see
/// [`DecoderConfig::rewind_on_exhausted`]).
#[derive(Debug, thiserror::Error)]
pub enum Stall {
    #[error("No frame record at offset {offset} in a {available} byte container")]
    Exhausted { offset: usize, available: usize },
    #[error(
        "Frame record at offset {offset} declares {declared} bytes, past the end of a {available} byte container"
    )]
    TruncatedRecord {
        offset: usize,
        declared: i32,
        available: usize,
    },
    #[error("Frame record at offset {offset} failed to decompress: {source}")]
    Codec {
        offset: usize,
        #[source]
        source: CodecError,
    },
    #[error("Frame record at offset {offset} produced {produced} of {expected} bytes")]
    Shortfall {
        offset: usize,
        produced: usize,
        expected: usize,
    },
}

/// A decoded frame borrowed from the player's buffers.
///
/// Valid until the next call that mutates the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    pub pixels: &'a [u8],
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    pub bytes_per_row: u32,
    /// 0-based position of this frame within the loop.
    pub index: u32,
    /// Frame count declared by the container header.
    pub total_frames: u32,
    pub is_last_frame: bool,
    pub duration: Duration,
}

impl Frame<'_> {
    /// Copy the pixels out so the frame can outlive the player borrow.
    pub fn to_owned_frame(&self) -> OwnedFrame {
        OwnedFrame {
            pixels: self.pixels.to_vec(),
            format: self.format,
            width: self.width,
            height: self.height,
            bytes_per_row: self.bytes_per_row,
            index: self.index,
            total_frames: self.total_frames,
            is_last_frame: self.is_last_frame,
            duration: self.duration,
        }
    }
}

/// A decoded frame that owns its pixels, e.g. for handing to a renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedFrame {
    pub pixels: Vec<u8>,
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    pub bytes_per_row: u32,
    pub index: u32,
    pub total_frames: u32,
    pub is_last_frame: bool,
    pub duration: Duration,
}

/// Counters collected during playback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackStats {
    /// Frames reconstructed and emitted.
    pub frames_decoded: u64,
    /// Times playback wrapped past the last frame.
    pub loops_completed: u64,
    /// Calls that produced no frame.
    pub stalls: u64,
    /// Records that decompressed to less than a full frame.
    pub shortfalls: u64,
}

impl fmt::Display for PlaybackStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} frames, {} loops, {} stalls, {} short decodes",
            self.frames_decoded, self.loops_completed, self.stalls, self.shortfalls
        )
    }
}

/// Sequential, looping frame cursor over one container.
///
/// Owns every buffer it decodes into; they are sized once from the header
/// and never reallocated. All mutation goes through `&mut self`, so one
/// player can only ever be advanced by one caller at a time.
pub struct AnimationPlayer {
    container: Container,
    decompressor: Box<dyn Decompressor>,
    shortfall: ShortfallPolicy,
    rewind_on_exhausted: bool,
    scratch: Box<[u8]>,
    decode_buffer: FrameBuffer,
    frame_accumulator: FrameBuffer,
    /// Holds the last frame of a loop while the accumulator is blanked.
    spare: FrameBuffer,
    offset: usize,
    frame_index: u32,
    initial_offset: usize,
    geometry: Geometry,
    stats: PlaybackStats,
}

#[derive(Debug, Clone, Copy)]
struct Geometry {
    width: u32,
    height: u32,
    bytes_per_row: u32,
    total_frames: u32,
    duration: Duration,
}

impl AnimationPlayer {
    /// Validate the header and allocate decode buffers.
    pub fn new(container: Container, config: &DecoderConfig) -> Result<Self, FormatError> {
        let header = *container.header();
        let frame_size = header.validate(config.max_frame_bytes)?;
        let decompressor = config.compression.decompressor();
        let scratch = vec![0u8; decompressor.scratch_size()].into_boxed_slice();

        // validate() guarantees positive geometry
        let geometry = Geometry {
            width: header.width as u32,
            height: header.height as u32,
            bytes_per_row: header.bytes_per_row as u32,
            total_frames: u32::try_from(header.frame_count).unwrap_or(0),
            duration: header.frame_duration(),
        };

        log::debug!(
            "player ready: {}x{} stride {} at {} fps, {} byte frames, {} byte container",
            header.width,
            header.height,
            header.bytes_per_row,
            header.frame_rate,
            frame_size,
            container.len()
        );

        Ok(Self {
            container,
            decompressor,
            shortfall: config.shortfall,
            rewind_on_exhausted: config.rewind_on_exhausted,
            scratch,
            decode_buffer: FrameBuffer::zeroed(frame_size),
            frame_accumulator: FrameBuffer::zeroed(frame_size),
            spare: FrameBuffer::zeroed(frame_size),
            offset: HEADER_SIZE,
            frame_index: 0,
            initial_offset: HEADER_SIZE,
            geometry,
            stats: PlaybackStats::default(),
        })
    }

    pub fn header(&self) -> &Header {
        self.container.header()
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Byte offset of the next frame record.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// 0-based index of the next frame to be decoded.
    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }

    /// Size of one decoded frame in bytes.
    pub fn frame_size(&self) -> usize {
        self.frame_accumulator.len()
    }

    /// The base the next delta will be merged into.
    pub fn accumulator(&self) -> &[u8] {
        self.frame_accumulator.as_bytes()
    }

    pub fn stats(&self) -> PlaybackStats {
        self.stats
    }

    /// Rewind to the first frame with a blank base.
    pub fn reset(&mut self) {
        self.offset = self.initial_offset;
        self.frame_index = 0;
        self.frame_accumulator.clear();
    }

    /// Decode the next frame, wrapping to the first after the last.
    pub fn advance(&mut self) -> Result<Frame<'_>, Stall> {
        let record = match self.container.record_at(self.offset) {
            Ok(record) => record,
            Err(stall) => {
                self.stats.stalls += 1;
                if matches!(stall, Stall::Exhausted { .. }) && self.rewind_on_exhausted {
                    if self.offset != self.initial_offset {
                        log::warn!("{stall}; rewinding to the first frame");
                    }
                    self.reset();
                } else {
                    log::debug!("{stall}");
                }
                return Err(stall);
            }
        };

        let expected = self.decode_buffer.len();
        let produced = match self.decompressor.decompress(
            self.container.payload(&record),
            self.decode_buffer.as_bytes_mut(),
            &mut self.scratch,
        ) {
            Ok(produced) => produced,
            Err(source) => {
                self.stats.stalls += 1;
                let stall = Stall::Codec {
                    offset: record.offset,
                    source,
                };
                log::warn!("{stall}");
                return Err(stall);
            }
        };

        if produced < expected {
            let stall = Stall::Shortfall {
                offset: record.offset,
                produced,
                expected,
            };
            match self.shortfall {
                ShortfallPolicy::Strict => {
                    self.stats.stalls += 1;
                    log::warn!("{stall}");
                    return Err(stall);
                }
                ShortfallPolicy::Lenient => {
                    self.stats.shortfalls += 1;
                    log::warn!("{stall}; merging the partial delta");
                    merge(
                        &mut self.frame_accumulator.as_bytes_mut()[..produced],
                        &self.decode_buffer.as_bytes()[..produced],
                    );
                }
            }
        } else {
            self.frame_accumulator.merge_from(&self.decode_buffer);
        }

        let index = self.frame_index;
        self.offset = record.end();
        self.frame_index += 1;
        self.stats.frames_decoded += 1;

        let is_last_frame = self.offset == self.container.len();
        if is_last_frame {
            std::mem::swap(&mut self.frame_accumulator, &mut self.spare);
            self.reset();
            self.stats.loops_completed += 1;
            log::debug!("loop complete after {} frames", index + 1);
        }

        let pixels = if is_last_frame {
            self.spare.as_bytes()
        } else {
            self.frame_accumulator.as_bytes()
        };
        let geometry = self.geometry;
        Ok(Frame {
            pixels,
            format: PixelFormat::Argb,
            width: geometry.width,
            height: geometry.height,
            bytes_per_row: geometry.bytes_per_row,
            index,
            total_frames: geometry.total_frames,
            is_last_frame,
            duration: geometry.duration,
        })
    }
}

impl fmt::Debug for AnimationPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationPlayer")
            .field("header", self.container.header())
            .field("offset", &self.offset)
            .field("frame_index", &self.frame_index)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
