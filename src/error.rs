use thiserror::Error;

/// Invalid playback request parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("carrier frequency must be a positive number of Hz, got {0}")]
    InvalidCarrier(f64),
    #[error("volume must lie within [0, 1], got {0}")]
    InvalidVolume(f64),
    #[error("binaural beat offset must be a positive number of Hz, got {0}")]
    InvalidBeatOffset(f64),
    #[error("pulse frequency must be a positive number of Hz, got {0}")]
    InvalidPulseFrequency(f64),
}

/// Failure to acquire the output graph. Leaves the engine disabled.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(
        "unsupported sample rate {0} Hz (expected {min}..={max})",
        min = crate::dsp::graph::MIN_SAMPLE_RATE,
        max = crate::dsp::graph::MAX_SAMPLE_RATE
    )]
    UnsupportedSampleRate(f64),
}

/// Failures while rendering audio to a WAV buffer.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot render {0} seconds of audio")]
    InvalidDuration(f64),
    #[error(
        "{frames} frames exceed the WAV limit of {max} frames",
        max = crate::dsp::renderer::MAX_WAV_FRAMES
    )]
    TooLong { frames: u64 },
    #[error("failed to encode WAV: {0}")]
    Wav(#[from] hound::Error),
}

/// Errors raised by a single tone generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeneratorError {
    #[error("generator already stopped")]
    AlreadyStopped,
}

/// Persistence errors for user-authored protocols.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access protocol store at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed protocol store at {path}: {source}")]
    Format {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Rejected custom protocol drafts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DraftError {
    #[error("protocol name must not be empty")]
    EmptyName,
    #[error("carrier frequency {0} Hz is outside 30..=1000 Hz")]
    CarrierOutOfRange(f64),
    #[error("modulation frequency {0} Hz is outside 0.1..=30 Hz")]
    ModulationOutOfRange(f64),
}

/// Errors returned by the library's protocol operations.
#[derive(Debug, Error)]
pub enum OmegaError {
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Draft(#[from] DraftError),
    #[error("unknown protocol '{0}'")]
    UnknownProtocol(String),
    #[error("protocol '{0}' is built in and cannot be removed")]
    BuiltinProtocol(String),
    #[error("protocol '{0}' has no carrier frequency")]
    NoCarrier(String),
    #[error(transparent)]
    Render(#[from] RenderError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_error_messages_name_the_value() {
        let msg = RequestError::InvalidVolume(1.5).to_string();
        assert!(msg.contains("1.5"), "got {msg}");
    }

    #[test]
    fn omega_error_wraps_request_error() {
        let err: OmegaError = RequestError::InvalidCarrier(-1.0).into();
        assert!(matches!(err, OmegaError::Request(RequestError::InvalidCarrier(_))));
        assert_eq!(
            err.to_string(),
            "carrier frequency must be a positive number of Hz, got -1"
        );
    }

    #[test]
    fn engine_error_mentions_supported_range() {
        let msg = EngineError::UnsupportedSampleRate(0.0).to_string();
        assert!(msg.contains("3000"), "got {msg}");
    }

    #[test]
    fn render_error_surfaces_through_omega_error() {
        let err: OmegaError = RenderError::InvalidDuration(f64::INFINITY).into();
        assert!(matches!(err, OmegaError::Render(RenderError::InvalidDuration(_))));
        assert_eq!(err.to_string(), "cannot render inf seconds of audio");
    }
}
