//! # packet-lens
//!
//! Analysis core for captured traffic of a length-prefixed, AES-CBC
//! encrypted client/server protocol.
//!
//! ## Pipeline
//! ```text
//! StreamReassembler ─┐
//!                    ├─> FrameParser ─> ProfileRegistry (current profile)
//!  single frame  ────┘        │
//!                             ├─> CipherEngine (AES-CBC, lenient PKCS7)
//!                             └─> WireIntrospector (schema-less tree)
//! ```
//!
//! ## Modules
//! - [`profile`]: named key/IV/header profiles and message-id naming
//! - [`core`]: header layout, frame parsing, stream reassembly, live codec
//! - [`wire`]: bounded, schema-less tag/value decoding
//! - [`utils`]: cipher, hex helpers, logging setup, metrics
//! - [`config`]: TOML and environment configuration
//! - [`analyzer`]: the [`Analyzer`] context tying it all together
//!
//! Capture, transport and tool-call dispatch live outside this crate; they
//! hand in byte buffers (or hex strings) and consume the results.

#![cfg_attr(not(test), warn(clippy::unwrap_used, clippy::expect_used))]

pub mod analyzer;
pub mod config;
pub mod core;
pub mod error;
pub mod profile;
pub mod utils;
pub mod wire;

pub use analyzer::Analyzer;
pub use config::AnalyzerConfig;
pub use crate::core::{DecodedPacket, FrameCodec, FrameParser, PacketHeader, PacketReport, StreamReassembler};
pub use error::{AnalyzerError, ErrorKind, Result};
pub use profile::{Profile, ProfileRegistry};
pub use utils::crypto::CipherEngine;
pub use wire::{Message, Node, Value, WireIntrospector};
