//! # Configuration Management
//!
//! Centralized configuration for the packet analyzer.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()` / `from_toml()`
//! - Direct instantiation with defaults
//! - Environment overrides via `from_env()` (`PACKET_LENS_*`)
//!
//! ## Example
//! ```toml
//! default_profile = "game"
//!
//! [introspection]
//! max_depth = 32
//!
//! [[profiles]]
//! name = "game"
//! key = "Eeo1hSnvNVW9DoLr"
//! iv = "FGuuBlp66dtu3M6l"
//! header_size = 20
//!
//! [profiles.message_names]
//! "30000" = "heartbeat"
//! ```

use crate::error::{AnalyzerError, Result};
use crate::profile::{Profile, SUPPORTED_HEADER_SIZES};
use crate::utils::crypto::CipherEngine;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::Level;

/// Default bound on nested length-delimited decoding
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Hard ceiling for `max_depth`. Nested levels are decoded recursively, so
/// this must fit a 2 MB thread stack in a debug build.
pub const MAX_ALLOWED_DEPTH: usize = 256;

/// Largest frame the incremental codec will buffer (e.g. 16 MB)
pub const DEFAULT_MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// Main analyzer configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AnalyzerConfig {
    /// Profile selected at startup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,

    /// Wire introspection limits
    #[serde(default)]
    pub introspection: IntrospectionConfig,

    /// Stream reassembly limits
    #[serde(default)]
    pub stream: StreamConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Profiles registered at startup
    #[serde(default)]
    pub profiles: Vec<ProfileConfig>,
}

impl AnalyzerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| AnalyzerError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| AnalyzerError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| AnalyzerError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Defaults overridden by `PACKET_LENS_*` environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env();
        Ok(config)
    }

    /// Apply `PACKET_LENS_*` overrides on top of this configuration.
    ///
    /// Unparsable values are ignored and the existing setting is kept.
    pub fn apply_env(&mut self) {
        if let Ok(depth) = std::env::var("PACKET_LENS_MAX_DEPTH") {
            if let Ok(val) = depth.parse::<usize>() {
                self.introspection.max_depth = val;
            }
        }

        if let Ok(len) = std::env::var("PACKET_LENS_MAX_FRAME_LEN") {
            if let Ok(val) = len.parse::<usize>() {
                self.stream.max_frame_len = val;
            }
        }

        if let Ok(level) = std::env::var("PACKET_LENS_LOG_LEVEL") {
            if let Ok(val) = level.parse::<Level>() {
                self.logging.log_level = val;
            }
        }

        if let Ok(name) = std::env::var("PACKET_LENS_DEFAULT_PROFILE") {
            if !name.is_empty() {
                self.default_profile = Some(name);
            }
        }
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    ///
    /// The example registers [`Profile::sample`] and selects it.
    pub fn example_config() -> String {
        let sample = Profile::sample();
        let config = Self {
            default_profile: Some(sample.name.clone()),
            profiles: vec![ProfileConfig::from(&sample)],
            ..Self::default()
        };
        toml::to_string_pretty(&config)
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| AnalyzerError::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| AnalyzerError::ConfigError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Build the startup profiles, with their message-name tables.
    pub fn build_profiles(&self) -> Vec<Profile> {
        self.profiles.iter().map(ProfileConfig::to_profile).collect()
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        errors.extend(self.introspection.validate());
        errors.extend(self.stream.validate());
        errors.extend(self.logging.validate());

        let mut seen = HashSet::new();
        for profile in &self.profiles {
            errors.extend(profile.validate());
            if !seen.insert(profile.name.as_str()) {
                errors.push(format!("Duplicate profile name: '{}'", profile.name));
            }
        }

        if let Some(ref name) = self.default_profile {
            if !seen.contains(name.as_str()) {
                errors.push(format!(
                    "Default profile '{name}' is not declared in [[profiles]]"
                ));
            }
        }

        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(AnalyzerError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Limits for schema-less wire introspection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct IntrospectionConfig {
    /// Maximum nesting of length-delimited values decoded as messages.
    /// Deeper values are kept as opaque bytes.
    pub max_depth: usize,

    /// Bytes to skip before decoding a decrypted payload
    pub skip: usize,
}

impl Default for IntrospectionConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            skip: 0,
        }
    }
}

impl IntrospectionConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.max_depth == 0 {
            errors.push("Introspection max_depth must be greater than 0".to_string());
        } else if self.max_depth > MAX_ALLOWED_DEPTH {
            errors.push(format!(
                "Introspection max_depth too large: {} (maximum: {MAX_ALLOWED_DEPTH})",
                self.max_depth
            ));
        }

        errors
    }
}

/// Limits for stream reassembly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Largest declared frame length the incremental codec accepts
    pub max_frame_len: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}

impl StreamConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.max_frame_len < 4 {
            errors.push(format!(
                "Max frame length too small: {} (minimum: 4 bytes for the length prefix)",
                self.max_frame_len
            ));
        } else if self.max_frame_len > u32::MAX as usize {
            errors.push(format!(
                "Max frame length too large: {} (length prefix is 32-bit)",
                self.max_frame_len
            ));
        }

        errors
    }
}

/// A profile as declared in configuration.
///
/// Message names are keyed by decimal strings, as in exported name files;
/// keys that are not valid ids are skipped when the profile is built.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProfileConfig {
    pub name: String,
    pub key: String,
    pub iv: String,
    pub header_size: usize,
    #[serde(default)]
    pub message_names: BTreeMap<String, String>,
}

impl From<&Profile> for ProfileConfig {
    fn from(profile: &Profile) -> Self {
        Self {
            name: profile.name.clone(),
            key: profile.key_material.clone(),
            iv: profile.iv_material.clone(),
            header_size: profile.header_size,
            message_names: profile
                .message_names
                .iter()
                .map(|(id, name)| (id.to_string(), name.clone()))
                .collect(),
        }
    }
}

impl ProfileConfig {
    pub fn to_profile(&self) -> Profile {
        let mut profile = Profile::new(&self.name, &self.key, &self.iv, self.header_size);
        profile.message_names = self
            .message_names
            .iter()
            .filter_map(|(key, name)| Some((key.trim().parse::<u32>().ok()?, name.clone())))
            .collect();
        profile
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.name.is_empty() {
            errors.push("Profile name cannot be empty".to_string());
        }

        if !SUPPORTED_HEADER_SIZES.contains(&self.header_size) {
            errors.push(format!(
                "Profile '{}': unsupported header size {} (expected one of {:?})",
                self.name, self.header_size, SUPPORTED_HEADER_SIZES
            ));
        }

        if let Err(e) = CipherEngine::new(&self.key, &self.iv) {
            errors.push(format!("Profile '{}': {e}", self.name));
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,

    /// Whether to include the event target (module path)
    pub show_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("packet-lens"),
            log_level: Level::INFO,
            json_format: false,
            show_target: false,
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        errors
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        level.as_str().to_lowercase().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
