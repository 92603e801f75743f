//! Decoder handle: background setup, readiness and frame delivery.

use std::fmt;
use std::sync::Arc;
use std::thread;

use futures_channel::oneshot;

use super::cache::{CacheError, CacheKey, ContainerCache};
use super::context::PlaybackContext;
use crate::animation::{AnimationPlayer, Container, FormatError, Frame};
use crate::schema::{ConfigError, DecoderConfig};

/// Why a decoder failed to become ready.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("Container for {0} still missing after transcoding")]
    MissingAfterTranscode(CacheKey),
    #[error("Malformed container: {0}")]
    Format(#[from] FormatError),
    #[error("Invalid decoder configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Failed to start setup thread: {0}")]
    Spawn(std::io::Error),
    #[error("Setup thread ended without a result")]
    Aborted,
    #[error("Decoder dropped during setup")]
    Canceled,
}

type SetupResult = Result<AnimationPlayer, SetupError>;

enum DecoderState {
    Idle,
    Pending(oneshot::Receiver<SetupResult>),
    Ready(AnimationPlayer),
    Failed(SetupError),
}

/// Loads a container through a [`ContainerCache`] and plays it back.
///
/// Setup runs on its own thread. The playback side polls for readiness and
/// pulls frames without blocking; it never takes a lock.
///
/// Usage:
/// ```ignore
/// let mut decoder = AnimationDecoder::new(DecoderConfig::default());
/// if decoder.prepare(cache, CacheKey::new(url, TargetSize::new(512, 512))).await {
///     let ctx = PlaybackContext::new();
///     while let Some(frame) = decoder.take_frame(&ctx) {
///         // draw frame.pixels
///     }
/// }
/// ```
pub struct AnimationDecoder {
    config: DecoderConfig,
    state: DecoderState,
    bound_context: Option<u64>,
}

impl AnimationDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            config,
            state: DecoderState::Idle,
            bound_context: None,
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Start loading `key` on a background thread and return immediately.
    ///
    /// Any previously loaded container is released, and so is the binding to
    /// a playback context: the next [`AnimationDecoder::take_frame`] binds
    /// afresh.
    pub fn start_prepare(&mut self, cache: Arc<dyn ContainerCache>, key: CacheKey) {
        self.bound_context = None;
        let (sender, receiver) = oneshot::channel();
        let config = self.config.clone();
        log::debug!("preparing {key}");

        let spawned = thread::Builder::new()
            .name("sticker-setup".into())
            .spawn(move || {
                let result = run_setup(cache.as_ref(), &key, &config, &sender);
                if let Err(SetupError::Canceled) = result {
                    log::debug!("setup for {key} abandoned");
                    return;
                }
                if sender.send(result).is_err() {
                    log::debug!("decoder for {key} dropped before setup finished");
                }
            });

        self.state = match spawned {
            Ok(_) => DecoderState::Pending(receiver),
            Err(e) => {
                log::warn!("could not spawn setup thread: {e}");
                DecoderState::Failed(SetupError::Spawn(e))
            }
        };
    }

    /// Load `key` and resolve to whether the decoder is ready to play.
    pub async fn prepare(&mut self, cache: Arc<dyn ContainerCache>, key: CacheKey) -> bool {
        self.start_prepare(cache, key);
        let DecoderState::Pending(receiver) = &mut self.state else {
            return self.is_ready();
        };
        let result = receiver.await.unwrap_or(Err(SetupError::Aborted));
        self.install(result);
        self.is_ready()
    }

    /// Install a finished setup if one is waiting. Never blocks.
    pub fn poll_ready(&mut self) -> bool {
        if let DecoderState::Pending(receiver) = &mut self.state {
            let finished = match receiver.try_recv() {
                Ok(Some(result)) => Some(result),
                Ok(None) => None,
                Err(oneshot::Canceled) => Some(Err(SetupError::Aborted)),
            };
            if let Some(result) = finished {
                self.install(result);
            }
        }
        self.is_ready()
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, DecoderState::Ready(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, DecoderState::Pending(_))
    }

    /// The error from the last failed setup.
    pub fn setup_error(&self) -> Option<&SetupError> {
        match &self.state {
            DecoderState::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn player(&self) -> Option<&AnimationPlayer> {
        match &self.state {
            DecoderState::Ready(player) => Some(player),
            _ => None,
        }
    }

    pub fn player_mut(&mut self) -> Option<&mut AnimationPlayer> {
        match &mut self.state {
            DecoderState::Ready(player) => Some(player),
            _ => None,
        }
    }

    /// Decode the next frame.
    ///
    /// Returns `None` while not ready, when the cursor stalls, or when `ctx`
    /// is not the playback context this decoder is bound to.
    pub fn take_frame(&mut self, ctx: &PlaybackContext) -> Option<Frame<'_>> {
        match self.bound_context {
            None => self.bound_context = Some(ctx.id()),
            Some(bound) if bound != ctx.id() => {
                log::warn!(
                    "frame requested from playback context {} but decoder is bound to {bound}",
                    ctx.id()
                );
                return None;
            }
            Some(_) => {}
        }

        if !self.poll_ready() {
            return None;
        }
        let DecoderState::Ready(player) = &mut self.state else {
            return None;
        };
        player.advance().ok()
    }

    fn install(&mut self, result: SetupResult) {
        self.state = match result {
            Ok(player) => {
                log::debug!("decoder ready: {:?}", player.header());
                DecoderState::Ready(player)
            }
            Err(e) => {
                log::warn!("decoder setup failed: {e}");
                DecoderState::Failed(e)
            }
        };
    }
}

impl fmt::Debug for AnimationDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            DecoderState::Idle => "idle",
            DecoderState::Pending(_) => "pending",
            DecoderState::Ready(_) => "ready",
            DecoderState::Failed(_) => "failed",
        };
        f.debug_struct("AnimationDecoder")
            .field("state", &state)
            .field("bound_context", &self.bound_context)
            .finish_non_exhaustive()
    }
}

fn run_setup(
    cache: &dyn ContainerCache,
    key: &CacheKey,
    config: &DecoderConfig,
    sender: &oneshot::Sender<SetupResult>,
) -> SetupResult {
    config.validate()?;

    let bytes = match cache.load(key)? {
        Some(bytes) => bytes,
        None => {
            if sender.is_canceled() {
                return Err(SetupError::Canceled);
            }
            log::debug!("cache miss for {key}, transcoding");
            cache.fetch_and_transcode(key)?;
            if sender.is_canceled() {
                return Err(SetupError::Canceled);
            }
            cache
                .load(key)?
                .ok_or_else(|| SetupError::MissingAfterTranscode(key.clone()))?
        }
    };

    let container = Container::new(bytes)?;
    Ok(AnimationPlayer::new(container, config)?)
}
