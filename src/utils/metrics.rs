//! Analyzer Metrics
//!
//! Atomic counters describing what the analyzer has processed. Each
//! [`Analyzer`](crate::analyzer::Analyzer) owns one collector; parsers take
//! an optional reference so standalone use stays free of bookkeeping.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// Thread-safe counters for analyzer operations
#[derive(Debug)]
pub struct Metrics {
    /// Frames handed to the frame parser
    pub packets_parsed: AtomicU64,
    /// Frames whose result carries an error
    pub packets_failed: AtomicU64,
    /// Payloads decrypted successfully
    pub decrypt_success: AtomicU64,
    /// Payloads that failed to decrypt
    pub decrypt_failed: AtomicU64,
    /// Decrypted payloads that produced a non-empty structure tree
    pub structures_decoded: AtomicU64,
    /// Frames sliced out of concatenated stream buffers
    pub frames_reassembled: AtomicU64,
    /// Trailing bytes dropped by stream reassembly
    pub bytes_discarded: AtomicU64,
    /// Raw bytes received for analysis
    pub bytes_processed: AtomicU64,
    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            packets_parsed: AtomicU64::new(0),
            packets_failed: AtomicU64::new(0),
            decrypt_success: AtomicU64::new(0),
            decrypt_failed: AtomicU64::new(0),
            structures_decoded: AtomicU64::new(0),
            frames_reassembled: AtomicU64::new(0),
            bytes_discarded: AtomicU64::new(0),
            bytes_processed: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn packet_parsed(&self, byte_count: usize) {
        self.packets_parsed.fetch_add(1, Ordering::Relaxed);
        self.bytes_processed
            .fetch_add(byte_count as u64, Ordering::Relaxed);
    }

    pub fn packet_failed(&self) {
        self.packets_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn decrypt_succeeded(&self) {
        self.decrypt_success.fetch_add(1, Ordering::Relaxed);
    }

    pub fn decrypt_failed(&self) {
        self.decrypt_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn structure_decoded(&self) {
        self.structures_decoded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn frame_reassembled(&self) {
        self.frames_reassembled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_discarded(&self, byte_count: usize) {
        if byte_count > 0 {
            debug!(byte_count, "Discarding trailing stream bytes");
            self.bytes_discarded
                .fetch_add(byte_count as u64, Ordering::Relaxed);
        }
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            packets_parsed: self.packets_parsed.load(Ordering::Relaxed),
            packets_failed: self.packets_failed.load(Ordering::Relaxed),
            decrypt_success: self.decrypt_success.load(Ordering::Relaxed),
            decrypt_failed: self.decrypt_failed.load(Ordering::Relaxed),
            structures_decoded: self.structures_decoded.load(Ordering::Relaxed),
            frames_reassembled: self.frames_reassembled.load(Ordering::Relaxed),
            bytes_discarded: self.bytes_discarded.load(Ordering::Relaxed),
            bytes_processed: self.bytes_processed.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log current metrics
    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        info!(
            packets_parsed = snapshot.packets_parsed,
            packets_failed = snapshot.packets_failed,
            decrypt_success = snapshot.decrypt_success,
            decrypt_failed = snapshot.decrypt_failed,
            structures_decoded = snapshot.structures_decoded,
            frames_reassembled = snapshot.frames_reassembled,
            bytes_discarded = snapshot.bytes_discarded,
            bytes_processed = snapshot.bytes_processed,
            uptime_seconds = snapshot.uptime_seconds,
            "Analyzer metrics snapshot"
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub packets_parsed: u64,
    pub packets_failed: u64,
    pub decrypt_success: u64,
    pub decrypt_failed: u64,
    pub structures_decoded: u64,
    pub frames_reassembled: u64,
    pub bytes_discarded: u64,
    pub bytes_processed: u64,
    pub uptime_seconds: u64,
}
