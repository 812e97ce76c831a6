//! # Analyzer
//!
//! The context object an embedding tool holds: one profile registry, one
//! configuration, one metrics collector. Every entry point a tool-call
//! dispatcher needs is a method here, in a byte form and a hex-string form.
//!
//! ## Example
//! ```rust
//! use packet_lens::{Analyzer, Profile};
//!
//! let analyzer = Analyzer::new();
//! analyzer
//!     .registry()
//!     .register(Profile::new("game", "0123456789abcdef", "fedcba9876543210", 20))
//!     .unwrap();
//! analyzer.registry().select("game").unwrap();
//!
//! let ciphertext = analyzer.encrypt_hex("08 96 01").unwrap();
//! assert_eq!(analyzer.decrypt_hex(&ciphertext).unwrap(), "08 96 01");
//! ```

use crate::config::AnalyzerConfig;
use crate::core::{DecodedPacket, FlowPacket, FlowSegment, FrameCodec, FrameParser, StreamReassembler};
use crate::error::Result;
use crate::profile::ProfileRegistry;
use crate::utils::crypto::CipherEngine;
use crate::utils::hex::{format_hex, parse_hex};
use crate::utils::metrics::Metrics;
use crate::wire::{Message, WireIntrospector};
use tracing::{debug, info};

/// Packet analysis context.
#[derive(Debug, Default)]
pub struct Analyzer {
    config: AnalyzerConfig,
    registry: ProfileRegistry,
    metrics: Metrics,
}

impl Analyzer {
    /// Analyzer with default limits and an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an analyzer from validated configuration, registering its
    /// profiles and selecting `default_profile` when set.
    ///
    /// # Errors
    /// `ConfigError` listing every validation failure.
    pub fn from_config(config: AnalyzerConfig) -> Result<Self> {
        config.validate_strict()?;
        let registry = ProfileRegistry::with_profiles(
            config.build_profiles(),
            config.default_profile.as_deref(),
        )?;
        info!(
            profiles = registry.len(),
            current = ?registry.current_name(),
            "Analyzer configured"
        );
        Ok(Self {
            config,
            registry,
            metrics: Metrics::new(),
        })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn introspector(&self) -> WireIntrospector {
        WireIntrospector::from_config(&self.config.introspection)
    }

    /// Frame parser bound to this analyzer's registry, limits and metrics.
    pub fn frame_parser(&self) -> FrameParser<'_> {
        FrameParser::new(&self.registry)
            .with_introspector(self.introspector())
            .with_skip(self.config.introspection.skip)
            .with_metrics(&self.metrics)
    }

    pub fn reassembler(&self) -> StreamReassembler<'_> {
        StreamReassembler::new(self.frame_parser())
    }

    /// Decoder for feeding a live byte stream through `FramedRead`.
    pub fn frame_codec(&self) -> FrameCodec {
        FrameCodec::from_config(&self.config.stream)
    }

    pub fn parse_packet(&self, raw: &[u8]) -> Result<DecodedPacket> {
        self.frame_parser().parse_packet(raw)
    }

    pub fn parse_stream(&self, buf: &[u8]) -> Result<Vec<DecodedPacket>> {
        self.reassembler().parse_stream(buf)
    }

    pub fn decode_flow(&self, connection_id: u64, segments: &[FlowSegment]) -> Result<Vec<FlowPacket>> {
        self.reassembler().decode_flow(connection_id, segments)
    }

    /// Decrypt with the current profile. Unlike frame parsing, every
    /// failure is returned to the caller.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let engine = self.current_engine()?;
        match engine.decrypt(ciphertext) {
            Ok(plaintext) => {
                self.metrics.decrypt_succeeded();
                Ok(plaintext)
            }
            Err(e) => {
                debug!(error = %e, "Decryption failed");
                self.metrics.decrypt_failed();
                Err(e)
            }
        }
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        self.current_engine()?.encrypt(plaintext)
    }

    /// Structural tree of `bytes[skip..]`.
    pub fn introspect(&self, bytes: &[u8], skip: usize) -> Message {
        self.introspector().decode(bytes, skip)
    }

    pub fn decrypt_hex(&self, input: &str) -> Result<String> {
        Ok(format_hex(&self.decrypt(&parse_hex(input)?)?))
    }

    pub fn encrypt_hex(&self, input: &str) -> Result<String> {
        Ok(format_hex(&self.encrypt(&parse_hex(input)?)?))
    }

    pub fn parse_packet_hex(&self, input: &str) -> Result<DecodedPacket> {
        self.parse_packet(&parse_hex(input)?)
    }

    pub fn parse_stream_hex(&self, input: &str) -> Result<Vec<DecodedPacket>> {
        self.parse_stream(&parse_hex(input)?)
    }

    pub fn introspect_hex(&self, input: &str, skip: usize) -> Result<Message> {
        Ok(self.introspect(&parse_hex(input)?, skip))
    }

    fn current_engine(&self) -> Result<CipherEngine> {
        CipherEngine::from_profile(&self.registry.require_current()?)
    }
}
