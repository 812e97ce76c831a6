//! Single-frame parsing: header split, payload decryption and introspection.

use super::header::PacketHeader;
use crate::error::{AnalyzerError, ErrorKind, Result};
use crate::profile::{Profile, ProfileRegistry};
use crate::utils::crypto::CipherEngine;
use crate::utils::hex::format_hex;
use crate::utils::metrics::Metrics;
use crate::wire::{Message, WireIntrospector};
use serde::Serialize;
use tracing::{debug, instrument};

/// Everything learned about one frame.
///
/// When decryption fails, `decrypted` holds the untouched payload so callers
/// always have bytes to show, and the failure is recorded in `error`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedPacket {
    pub header: PacketHeader,
    pub raw: Vec<u8>,
    pub payload: Vec<u8>,
    pub decrypted: Vec<u8>,
    /// Present only when the decrypted payload yielded at least one field
    pub structure: Option<Message>,
    pub error: Option<String>,
    pub error_kind: Option<ErrorKind>,
}

impl DecodedPacket {
    /// Result for a frame that could not be parsed at all.
    pub fn failed(raw: &[u8], err: &AnalyzerError) -> Self {
        Self {
            raw: raw.to_vec(),
            error: Some(err.to_string()),
            error_kind: Some(err.kind()),
            ..Self::default()
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn raw_hex(&self) -> String {
        format_hex(&self.raw)
    }

    pub fn payload_hex(&self) -> String {
        format_hex(&self.payload)
    }

    pub fn decrypted_hex(&self) -> String {
        format_hex(&self.decrypted)
    }

    /// JSON text of the structure tree, if any.
    pub fn structure_text(&self) -> Option<String> {
        self.structure.as_ref().map(Message::render)
    }

    /// Serializable view with bytes rendered as hex.
    pub fn report(&self) -> PacketReport {
        PacketReport {
            header: self.header.clone(),
            raw_hex: self.raw_hex(),
            payload_hex: self.payload_hex(),
            decrypted_hex: self.decrypted_hex(),
            structure: self.structure_text(),
            error: self.error.clone(),
            error_kind: self.error_kind,
        }
    }
}

/// Presentation form of a [`DecodedPacket`] for tool responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PacketReport {
    pub header: PacketHeader,
    pub raw_hex: String,
    pub payload_hex: String,
    pub decrypted_hex: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

/// Parses frames with the registry's current profile.
#[derive(Debug, Clone, Copy)]
pub struct FrameParser<'a> {
    registry: &'a ProfileRegistry,
    introspector: WireIntrospector,
    skip: usize,
    metrics: Option<&'a Metrics>,
}

impl<'a> FrameParser<'a> {
    pub fn new(registry: &'a ProfileRegistry) -> Self {
        Self {
            registry,
            introspector: WireIntrospector::default(),
            skip: 0,
            metrics: None,
        }
    }

    pub fn with_introspector(mut self, introspector: WireIntrospector) -> Self {
        self.introspector = introspector;
        self
    }

    /// Bytes of decrypted payload ignored before introspection.
    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn with_metrics(mut self, metrics: &'a Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn registry(&self) -> &'a ProfileRegistry {
        self.registry
    }

    pub fn metrics(&self) -> Option<&'a Metrics> {
        self.metrics
    }

    /// Parse one complete frame.
    ///
    /// Fails when no profile is selected, when the frame is shorter than the
    /// profile's header, or when the profile's key or IV is unusable. A
    /// payload that does not decrypt is not a failure: the result carries
    /// the error instead.
    pub fn parse_packet(&self, raw: &[u8]) -> Result<DecodedPacket> {
        let profile = self.registry.require_current()?;
        self.parse_with_profile(&profile, raw)
    }

    /// Parse one frame with an explicit profile snapshot.
    #[instrument(skip_all, level = "debug", fields(profile = %profile.name, len = raw.len()))]
    pub fn parse_with_profile(&self, profile: &Profile, raw: &[u8]) -> Result<DecodedPacket> {
        let parsed = self.parse_inner(profile, raw);
        if let Some(metrics) = self.metrics {
            metrics.packet_parsed(raw.len());
            if !matches!(&parsed, Ok(packet) if packet.is_ok()) {
                metrics.packet_failed();
            }
        }
        parsed
    }

    fn parse_inner(&self, profile: &Profile, raw: &[u8]) -> Result<DecodedPacket> {
        let header = PacketHeader::parse(raw, profile)?;
        let payload = &raw[profile.header_size..];

        let mut packet = DecodedPacket {
            header,
            raw: raw.to_vec(),
            payload: payload.to_vec(),
            ..DecodedPacket::default()
        };

        if payload.is_empty() {
            return Ok(packet);
        }

        let engine = CipherEngine::from_profile(profile)?;
        match engine.decrypt(payload) {
            Ok(decrypted) => {
                self.record(Metrics::decrypt_succeeded);
                let structure = self.introspector.decode(&decrypted, self.skip);
                if !structure.is_empty() {
                    self.record(Metrics::structure_decoded);
                    packet.structure = Some(structure);
                }
                packet.decrypted = decrypted;
            }
            Err(e) => {
                debug!(message_id = packet.header.message_id, error = %e, "Payload decryption failed");
                self.record(Metrics::decrypt_failed);
                packet.decrypted = packet.payload.clone();
                packet.error = Some(e.to_string());
                packet.error_kind = Some(e.kind());
            }
        }

        Ok(packet)
    }

    fn record(&self, counter: fn(&Metrics)) {
        if let Some(metrics) = self.metrics {
            counter(metrics);
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    const KEY: &str = "0123456789abcdef";
    const IV: &str = "fedcba9876543210";

    fn registry(header_size: usize) -> ProfileRegistry {
        let registry = ProfileRegistry::new();
        registry
            .register(Profile::new("test", KEY, IV, header_size).with_message_name(7, "login"))
            .unwrap();
        registry.select("test").unwrap();
        registry
    }

    fn frame(message_id: u32, payload: &[u8]) -> Vec<u8> {
        let mut raw = Vec::new();
        raw.extend_from_slice(&((20 + payload.len()) as u32).to_be_bytes());
        raw.extend_from_slice(&message_id.to_be_bytes());
        raw.extend_from_slice(&[0u8; 12]);
        raw.extend_from_slice(payload);
        raw
    }

    #[test]
    fn test_no_profile_selected() {
        let registry = ProfileRegistry::new();
        let err = FrameParser::new(&registry).parse_packet(&[0u8; 20]).unwrap_err();
        assert!(matches!(err, AnalyzerError::NoProfileSelected));
    }

    #[test]
    fn test_short_frame() {
        let registry = registry(20);
        let err = FrameParser::new(&registry).parse_packet(&[0u8; 10]).unwrap_err();
        assert!(matches!(err, AnalyzerError::InvalidHeaderSize { have: 10, need: 20 }));
    }

    #[test]
    fn test_header_only_frame() {
        let registry = registry(20);
        let packet = FrameParser::new(&registry).parse_packet(&frame(7, &[])).unwrap();
        assert_eq!(packet.header.message_name, "login");
        assert!(packet.payload.is_empty());
        assert!(packet.decrypted.is_empty());
        assert!(packet.structure.is_none());
        assert!(packet.is_ok());
    }

    #[test]
    fn test_decrypts_and_introspects() {
        let registry = registry(20);
        let engine = CipherEngine::new(KEY, IV).unwrap();
        let ciphertext = engine.encrypt(&[0x08, 0x96, 0x01]).unwrap();

        let metrics = Metrics::new();
        let packet = FrameParser::new(&registry)
            .with_metrics(&metrics)
            .parse_packet(&frame(7, &ciphertext))
            .unwrap();

        assert!(packet.is_ok());
        assert_eq!(packet.decrypted, vec![0x08, 0x96, 0x01]);
        let structure = packet.structure.expect("structure");
        assert_eq!(structure.first(1).unwrap().value.as_varint(), Some(150));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.packets_parsed, 1);
        assert_eq!(snapshot.decrypt_success, 1);
        assert_eq!(snapshot.structures_decoded, 1);
    }

    #[test]
    fn test_undecryptable_payload_is_recorded() {
        let registry = registry(20);
        let metrics = Metrics::new();
        let packet = FrameParser::new(&registry)
            .with_metrics(&metrics)
            .parse_packet(&frame(99, &[1, 2, 3, 4, 5]))
            .unwrap();

        assert_eq!(packet.header.message_name, "unknown message(99)");
        assert_eq!(packet.decrypted, packet.payload);
        assert_eq!(packet.error_kind, Some(ErrorKind::InvalidCiphertextLength));
        assert!(packet.structure.is_none());
        assert_eq!(metrics.snapshot().packets_failed, 1);
    }

    #[test]
    fn test_bad_key_aborts() {
        let registry = ProfileRegistry::new();
        registry.register(Profile::new("bad", "short", IV, 20)).unwrap();
        registry.select("bad").unwrap();
        let err = FrameParser::new(&registry)
            .parse_packet(&frame(1, &[0u8; 16]))
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::InvalidKeyLength(5)));
    }

    #[test]
    fn test_report_hex() {
        let registry = registry(4);
        let packet = FrameParser::new(&registry)
            .parse_packet(&[0x00, 0x00, 0x00, 0x04])
            .unwrap();
        let report = packet.report();
        assert_eq!(report.raw_hex, "00 00 00 04");
        assert_eq!(report.payload_hex, "");

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["header"]["total_length"], 4);
    }
}
