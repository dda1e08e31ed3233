//! Error handling for Breathwork
//!
//! Illegal lifecycle calls on the session engine are never errors: they are
//! logged and ignored. The variants here cover the fallible construction
//! paths (presets, configuration, voice factories, the shared output).

use thiserror::Error;

/// Result type alias for Breathwork operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Main error type for Breathwork operations
#[derive(Error, Debug)]
pub enum SessionError {
    // Preset Errors
    #[error("Invalid preset: {reason}")]
    InvalidPreset { reason: String },

    #[error("Unknown voice type: {voice_type}")]
    UnknownVoiceType { voice_type: String },

    #[error("Invalid parameters for {voice_type} voice: {source}")]
    InvalidVoiceParams {
        voice_type: String,
        #[source]
        source: serde_json::Error,
    },

    // Output / Voice Errors
    #[error("Audio output unavailable: {reason}")]
    OutputUnavailable { reason: String },

    #[error("Voice is already disconnected")]
    AlreadyDisconnected,

    #[error("Voice failure: {reason}")]
    VoiceFailure { reason: String },

    // Configuration Errors
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SessionError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            SessionError::InvalidPreset { .. } => "INVALID_PRESET",
            SessionError::UnknownVoiceType { .. } => "UNKNOWN_VOICE_TYPE",
            SessionError::InvalidVoiceParams { .. } => "INVALID_VOICE_PARAMS",
            SessionError::OutputUnavailable { .. } => "OUTPUT_UNAVAILABLE",
            SessionError::AlreadyDisconnected => "ALREADY_DISCONNECTED",
            SessionError::VoiceFailure { .. } => "VOICE_FAILURE",
            SessionError::InvalidConfig { .. } => "INVALID_CONFIG",
            SessionError::Io(_) => "IO_ERROR",
            SessionError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if the session can carry on after this error
    ///
    /// Voice-level failures only cost the session that one voice.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SessionError::UnknownVoiceType { .. }
                | SessionError::InvalidVoiceParams { .. }
                | SessionError::AlreadyDisconnected
                | SessionError::VoiceFailure { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = SessionError::UnknownVoiceType {
            voice_type: "Theremin".to_string(),
        };
        assert_eq!(err.error_code(), "UNKNOWN_VOICE_TYPE");
        assert_eq!(err.to_string(), "Unknown voice type: Theremin");
    }

    #[test]
    fn test_recoverable() {
        assert!(SessionError::AlreadyDisconnected.is_recoverable());
        assert!(!SessionError::OutputUnavailable {
            reason: "closed".to_string()
        }
        .is_recoverable());
    }
}
