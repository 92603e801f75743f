//! Bridge between the container cache and playback.
//!
//! Setup (cache lookup, transcoding, header parse, buffer allocation) runs
//! on a background thread. The playback context only ever sees a finished
//! player, handed over once through a oneshot channel.

mod cache;
mod context;
mod decoder;

pub use cache::{CacheError, CacheKey, ContainerCache, TargetSize};
pub use context::PlaybackContext;
pub use decoder::{AnimationDecoder, SetupError};
