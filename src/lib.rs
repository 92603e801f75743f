//! Sticker Frames - Streaming decoder for delta-compressed looping animations.
//!
//! A container holds a small header followed by frame records, each the
//! compressed XOR delta against the previous frame. This crate loads a
//! container through an injected cache, then hands out one reconstructed
//! frame per call, looping forever, without allocating on the playback path.
//!
//! # Architecture
//!
//! - `animation`: container format, decompression, delta merge, and the
//!   looping playback cursor
//! - `bridge`: background setup through a [`ContainerCache`] and the
//!   readiness handoff to the playback context
//! - `schema`: decoder configuration
//!
//! # Example
//!
//! ```rust,no_run
//! use sticker_frames::{
//!     animation::{AnimationPlayer, Container},
//!     schema::DecoderConfig,
//! };
//!
//! let bytes = std::fs::read("sticker.anim").unwrap();
//! let container = Container::new(bytes).unwrap();
//! let mut player = AnimationPlayer::new(container, &DecoderConfig::default()).unwrap();
//!
//! while let Ok(frame) = player.advance() {
//!     println!("frame {} ({} bytes)", frame.index, frame.pixels.len());
//!     if frame.is_last_frame {
//!         break;
//!     }
//! }
//! ```

pub mod animation;
pub mod bridge;
pub mod schema;

// Re-export commonly used types
pub use animation::{AnimationPlayer, Container, Frame, FramePacer, Header, Stall};
pub use bridge::{AnimationDecoder, CacheKey, ContainerCache, PlaybackContext, TargetSize};
pub use schema::{DecoderConfig, ShortfallPolicy};
