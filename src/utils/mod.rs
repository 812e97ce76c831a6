//! # Utility Modules
//!
//! Supporting utilities for cryptography, hex I/O, logging and metrics.
//!
//! ## Components
//! - **Crypto**: AES-CBC payload cipher with lenient PKCS7 unpadding
//! - **Hex**: uppercase pair rendering and tolerant hex parsing
//! - **Logging**: `tracing-subscriber` setup driven by configuration
//! - **Metrics**: Thread-safe observability counters

pub mod crypto;
pub mod hex;
pub mod logging;
pub mod metrics;

pub use crypto::CipherEngine;
pub use metrics::{Metrics, MetricsSnapshot};
