//! Configuration types for decoder behavior.

use serde::{Deserialize, Serialize};

use crate::animation::CompressionType;

/// Default upper bound on one decoded frame (64 MiB).
pub const DEFAULT_MAX_FRAME_BYTES: usize = 64 * 1024 * 1024;

fn default_rewind() -> bool {
    true
}

fn default_max_frame_bytes() -> usize {
    DEFAULT_MAX_FRAME_BYTES
}

/// How the player treats a frame record that decompresses to fewer bytes
/// than one full frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortfallPolicy {
    /// Merge the bytes that were produced and keep playing.
    #[default]
    Lenient,
    /// Refuse the record: the call stalls and no state changes.
    Strict,
}

/// Top-level decoder configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Compression used by every frame record in the container.
    #[serde(default)]
    pub compression: CompressionType,
    /// Behavior on short decompression output.
    #[serde(default)]
    pub shortfall: ShortfallPolicy,
    /// Rewind to the first frame when fewer than four bytes remain after
    /// the cursor (a malformed tail on a complete container).
    #[serde(default = "default_rewind")]
    pub rewind_on_exhausted: bool,
    /// Largest decoded frame the setup step will allocate buffers for.
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            compression: CompressionType::default(),
            shortfall: ShortfallPolicy::default(),
            rewind_on_exhausted: true,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }
}

impl DecoderConfig {
    /// Parse and validate a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_frame_bytes == 0 {
            return Err(ConfigError::InvalidFrameLimit);
        }
        if !self.compression.is_available() {
            return Err(ConfigError::CompressionUnavailable(self.compression));
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Maximum frame size must be non-zero")]
    InvalidFrameLimit,
    #[error("Compression {0:?} is not compiled into this build")]
    CompressionUnavailable(CompressionType),
    #[error("Malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "lz4")]
    #[test]
    fn test_default_is_valid() {
        let config = DecoderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.shortfall, ShortfallPolicy::Lenient);
        assert!(config.rewind_on_exhausted);
    }

    #[cfg(not(feature = "lz4"))]
    #[test]
    fn test_default_rejected_without_lz4() {
        let err = DecoderConfig::default().validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::CompressionUnavailable(CompressionType::Lz4)
        ));
    }

    #[cfg(feature = "lz4")]
    #[test]
    fn test_from_json_fills_defaults() {
        let config = DecoderConfig::from_json(r#"{ "shortfall": "strict" }"#).unwrap();
        assert_eq!(config.shortfall, ShortfallPolicy::Strict);
        assert_eq!(config.max_frame_bytes, DEFAULT_MAX_FRAME_BYTES);
        assert_eq!(config.compression, CompressionType::default());
    }

    #[test]
    fn test_from_json_rejects_zero_limit() {
        let err = DecoderConfig::from_json(r#"{ "max_frame_bytes": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFrameLimit));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = DecoderConfig::from_json("not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_stored_compression_roundtrips() {
        let config = DecoderConfig {
            compression: CompressionType::Stored,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(DecoderConfig::from_json(&json).unwrap(), config);
    }
}
