//! # Decryption Profiles
//!
//! A [`Profile`] bundles everything needed to interpret one protocol variant:
//! the AES key and IV material, the width of the fixed frame header, and the
//! message-id naming table.
//!
//! Profiles live in a [`ProfileRegistry`], an explicit context object that
//! callers share by reference (usually through [`Analyzer`]).
//!
//! [`Analyzer`]: crate::analyzer::Analyzer

pub mod registry;

pub use registry::ProfileRegistry;

use crate::error::{constants, AnalyzerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Header widths the frame layout supports: zero to five big-endian `u32` fields.
pub const SUPPORTED_HEADER_SIZES: [usize; 6] = [0, 4, 8, 12, 16, 20];

/// Name of the preset returned by [`Profile::sample`].
pub const SAMPLE_PROFILE_NAME: &str = "sanguosha";

/// A named decryption profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Unique registry key
    pub name: String,

    /// AES key, hex-encoded or literal
    pub key_material: String,

    /// AES IV, hex-encoded or literal
    pub iv_material: String,

    /// Bytes of fixed header preceding the encrypted payload
    pub header_size: usize,

    /// Message id to display name
    #[serde(default)]
    pub message_names: HashMap<u32, String>,
}

impl Profile {
    pub fn new(
        name: impl Into<String>,
        key_material: impl Into<String>,
        iv_material: impl Into<String>,
        header_size: usize,
    ) -> Self {
        Self {
            name: name.into(),
            key_material: key_material.into(),
            iv_material: iv_material.into(),
            header_size,
            message_names: HashMap::new(),
        }
    }

    /// Preset for the card-game client this tool was first written against:
    /// literal 16-byte key and IV, a 20-byte header, and its heartbeat and
    /// login message ids.
    pub fn sample() -> Self {
        Self::new(SAMPLE_PROFILE_NAME, "Eeo1hSnvNVW9DoLr", "FGuuBlp66dtu3M6l", 20)
            .with_message_name(30000, "heartbeat")
            .with_message_name(30001, "heartbeat response")
            .with_message_name(30002, "login request")
            .with_message_name(30003, "login response")
    }

    /// Builder-style helper to seed a message name.
    pub fn with_message_name(mut self, id: u32, name: impl Into<String>) -> Self {
        self.message_names.insert(id, name.into());
        self
    }

    /// Check the structural invariants a registry enforces on registration.
    ///
    /// Key and IV lengths are not checked here; the cipher engine resolves
    /// and validates them when a payload is decrypted.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(AnalyzerError::InvalidProfile(
                constants::ERR_EMPTY_PROFILE_NAME.to_string(),
            ));
        }
        if !SUPPORTED_HEADER_SIZES.contains(&self.header_size) {
            return Err(AnalyzerError::InvalidProfile(format!(
                "Unsupported header size {} (expected one of {:?})",
                self.header_size, SUPPORTED_HEADER_SIZES
            )));
        }
        Ok(())
    }

    /// Display label for a message id: the mapped name, or a placeholder.
    pub fn message_label(&self, id: u32) -> String {
        match self.message_names.get(&id) {
            Some(name) => name.clone(),
            None => unknown_message_label(id),
        }
    }
}

/// Placeholder label for a message id with no mapping.
///
/// ```rust
/// assert_eq!(packet_lens::profile::unknown_message_label(99), "unknown message(99)");
/// ```
pub fn unknown_message_label(id: u32) -> String {
    format!("unknown message({id})")
}
