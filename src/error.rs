//! Error handling for eqchain
//!
//! Errors fall in two groups: invariant violations raised by the topology
//! manager (always a bug in the manager, never retried) and ordinary I/O or
//! preset failures raised by the owner-side layers.

use thiserror::Error;

/// Result type alias for eqchain operations
pub type Result<T> = std::result::Result<T, ChainError>;

/// Main error type for eqchain operations
#[derive(Error, Debug)]
pub enum ChainError {
    // Topology Errors
    #[error("Slot index {index} is out of range (chain has {slot_count} slots)")]
    SlotOutOfRange { index: usize, slot_count: usize },

    #[error("Slot {slot} has no live stage but one was expected")]
    StageMissing { slot: usize },

    #[error("Slot {slot} already has a live stage")]
    StageAlreadyLive { slot: usize },

    #[error("Section {section} does not exist in slot {slot} (stage has {count} sections)")]
    SectionOutOfRange {
        slot: usize,
        section: usize,
        count: usize,
    },

    // Preset Errors
    #[error("Unknown filter family: {name}")]
    UnknownFamily { name: String },

    #[error("Invalid settings: {reason}")]
    InvalidSettings { reason: String },

    // I/O Errors
    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ChainError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            ChainError::SlotOutOfRange { .. } => "SLOT_OUT_OF_RANGE",
            ChainError::StageMissing { .. } => "STAGE_MISSING",
            ChainError::StageAlreadyLive { .. } => "STAGE_ALREADY_LIVE",
            ChainError::SectionOutOfRange { .. } => "SECTION_OUT_OF_RANGE",
            ChainError::UnknownFamily { .. } => "UNKNOWN_FAMILY",
            ChainError::InvalidSettings { .. } => "INVALID_SETTINGS",
            ChainError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            ChainError::Io(_) => "IO_ERROR",
            ChainError::Wav(_) => "WAV_ERROR",
            ChainError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Whether this error reports an internal inconsistency of the manager.
    ///
    /// These are programmer errors: the mutation that raised them was
    /// aborted before touching the graph, and retrying will not help.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            ChainError::SlotOutOfRange { .. }
                | ChainError::StageMissing { .. }
                | ChainError::StageAlreadyLive { .. }
                | ChainError::SectionOutOfRange { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = ChainError::StageMissing { slot: 3 };
        assert_eq!(err.error_code(), "STAGE_MISSING");
        assert_eq!(err.to_string(), "Slot 3 has no live stage but one was expected");
    }

    #[test]
    fn test_invariant_classification() {
        assert!(ChainError::SlotOutOfRange {
            index: 9,
            slot_count: 8
        }
        .is_invariant_violation());
        assert!(!ChainError::UnknownFamily {
            name: "lowpass48".to_string()
        }
        .is_invariant_violation());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ChainError = io.into();
        assert_eq!(err.error_code(), "IO_ERROR");
        assert!(!err.is_invariant_violation());
    }
}
