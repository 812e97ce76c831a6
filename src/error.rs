//! # Error Types
//!
//! Error handling for the packet analyzer.
//!
//! This module defines every error variant the analyzer core can surface,
//! from profile lookups to cipher validation and frame reassembly.
//!
//! ## Error Categories
//! - **Profile Errors**: no profile selected, unknown profile, invalid profile
//! - **Framing Errors**: buffer shorter than the configured header, bad frame length
//! - **Cryptographic Errors**: key/IV length, ciphertext shape, PKCS7 padding
//! - **Input Errors**: malformed hex strings, I/O and JSON failures on import/export
//!
//! Per-frame failures inside batch operations are never returned through
//! [`Result`]; they are recorded on the frame's own [`DecodedPacket`] as an
//! [`ErrorKind`] plus message.
//!
//! ## Example Usage
//! ```rust
//! use packet_lens::error::{AnalyzerError, ErrorKind};
//!
//! let err = AnalyzerError::ProfileNotFound("default".into());
//! assert_eq!(err.kind(), ErrorKind::ProfileNotFound);
//! assert_eq!(err.to_string(), "Profile 'default' not found");
//! ```
//!
//! [`DecodedPacket`]: crate::core::frame::DecodedPacket

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Error message constants shared by log lines and error payloads.
pub mod constants {
    /// Profile errors
    pub const ERR_NO_PROFILE_SELECTED: &str = "No profile selected";
    pub const ERR_EMPTY_PROFILE_NAME: &str = "Profile name cannot be empty";

    /// Cipher errors
    pub const ERR_INVALID_PADDING: &str = "Invalid PKCS7 padding";

    /// Hex input errors
    pub const ERR_INVALID_HEX_DIGIT: &str = "Hex input contains an invalid digit";
}

// AnalyzerError is the primary error type for all analyzer operations
#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("No profile selected")]
    NoProfileSelected,

    #[error("Profile '{0}' not found")]
    ProfileNotFound(String),

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Data length ({have}) is smaller than header size ({need})")]
    InvalidHeaderSize { have: usize, need: usize },

    #[error("Key length must be 16, 24 or 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    #[error("IV length must be 16 bytes, got {0}")]
    InvalidIvLength(usize),

    #[error("Ciphertext is empty")]
    EmptyCiphertext,

    #[error("Ciphertext length must be a multiple of 16, got {0}")]
    InvalidCiphertextLength(usize),

    #[error("Malformed hex input: {0}")]
    MalformedHexInput(String),

    #[error("Invalid PKCS7 padding")]
    InvalidPkcs7Padding,

    #[error("Invalid frame length: {0}")]
    InvalidFrameLength(u32),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Field-less mirror of [`AnalyzerError`], small enough to live on every
/// decoded packet and to cross a serialization boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NoProfileSelected,
    ProfileNotFound,
    InvalidProfile,
    InvalidHeaderSize,
    InvalidKeyLength,
    InvalidIvLength,
    EmptyCiphertext,
    InvalidCiphertextLength,
    MalformedHexInput,
    InvalidPkcs7Padding,
    InvalidFrameLength,
    Io,
    Json,
    Config,
}

impl AnalyzerError {
    /// Classify this error without its payload.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalyzerError::NoProfileSelected => ErrorKind::NoProfileSelected,
            AnalyzerError::ProfileNotFound(_) => ErrorKind::ProfileNotFound,
            AnalyzerError::InvalidProfile(_) => ErrorKind::InvalidProfile,
            AnalyzerError::InvalidHeaderSize { .. } => ErrorKind::InvalidHeaderSize,
            AnalyzerError::InvalidKeyLength(_) => ErrorKind::InvalidKeyLength,
            AnalyzerError::InvalidIvLength(_) => ErrorKind::InvalidIvLength,
            AnalyzerError::EmptyCiphertext => ErrorKind::EmptyCiphertext,
            AnalyzerError::InvalidCiphertextLength(_) => ErrorKind::InvalidCiphertextLength,
            AnalyzerError::MalformedHexInput(_) => ErrorKind::MalformedHexInput,
            AnalyzerError::InvalidPkcs7Padding => ErrorKind::InvalidPkcs7Padding,
            AnalyzerError::InvalidFrameLength(_) => ErrorKind::InvalidFrameLength,
            AnalyzerError::Io(_) => ErrorKind::Io,
            AnalyzerError::Json(_) => ErrorKind::Json,
            AnalyzerError::ConfigError(_) => ErrorKind::Config,
        }
    }

    /// True for errors caused by the analyzer setup rather than the bytes
    /// being analyzed. These abort a whole call instead of a single frame.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            AnalyzerError::NoProfileSelected
                | AnalyzerError::ProfileNotFound(_)
                | AnalyzerError::InvalidProfile(_)
                | AnalyzerError::InvalidKeyLength(_)
                | AnalyzerError::InvalidIvLength(_)
                | AnalyzerError::ConfigError(_)
        )
    }
}

/// Type alias for Results using AnalyzerError
pub type Result<T> = std::result::Result<T, AnalyzerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            AnalyzerError::InvalidHeaderSize { have: 3, need: 20 }.kind(),
            ErrorKind::InvalidHeaderSize
        );
        assert_eq!(
            AnalyzerError::InvalidCiphertextLength(17).kind(),
            ErrorKind::InvalidCiphertextLength
        );
    }

    #[test]
    fn test_configuration_classification() {
        assert!(AnalyzerError::NoProfileSelected.is_configuration());
        assert!(AnalyzerError::InvalidKeyLength(5).is_configuration());
        assert!(!AnalyzerError::EmptyCiphertext.is_configuration());
        assert!(!AnalyzerError::InvalidHeaderSize { have: 0, need: 4 }.is_configuration());
    }

    #[test]
    fn test_header_size_message() {
        let err = AnalyzerError::InvalidHeaderSize { have: 3, need: 20 };
        assert_eq!(err.to_string(), "Data length (3) is smaller than header size (20)");
    }
}
