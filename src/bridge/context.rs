//! Capability token for the playback execution context.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Proof that the caller is on a playback context.
///
/// Each token has a unique id and cannot be sent to another thread. A
/// decoder binds to the first token it sees and refuses frames to any
/// other, so all playback calls for one decoder stay on one context.
#[derive(Debug)]
pub struct PlaybackContext {
    id: u64,
    _not_send: PhantomData<*const ()>,
}

impl PlaybackContext {
    pub fn new() -> Self {
        Self {
            id: NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed),
            _not_send: PhantomData,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Default for PlaybackContext {
    fn default() -> Self {
        Self::new()
    }
}
