//! Reassembly of concatenated ("sticky") frames.
//!
//! Each frame starts with its own big-endian `u32` total length, header
//! included. A captured buffer is walked frame by frame until the bytes run
//! out or the next length prefix is unusable; the unusable tail is dropped.

use super::frame::{DecodedPacket, FrameParser};
use super::header::{peek_frame_length, HEADER_FIELD_SIZE};
use crate::error::Result;
use crate::profile::Profile;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Splits concatenated buffers into frames and parses each one.
#[derive(Debug, Clone, Copy)]
pub struct StreamReassembler<'a> {
    parser: FrameParser<'a>,
}

impl<'a> StreamReassembler<'a> {
    pub fn new(parser: FrameParser<'a>) -> Self {
        Self { parser }
    }

    /// Parse every complete frame in `buf`, in order.
    ///
    /// Frames that fail to parse are reported in their own result and do
    /// not stop the walk. Errors caused by the analyzer setup (no profile
    /// selected, unusable key or IV) abort the call.
    #[instrument(skip_all, level = "debug", fields(len = buf.len()))]
    pub fn parse_stream(&self, buf: &[u8]) -> Result<Vec<DecodedPacket>> {
        let profile = self.parser.registry().require_current()?;
        let mut results = Vec::new();
        let mut offset = 0;

        while offset < buf.len() {
            let Some(frame_len) = next_frame_len(&buf[offset..], &profile) else {
                break;
            };
            let frame = &buf[offset..offset + frame_len];
            results.push(self.parse_frame(&profile, frame)?);
            offset += frame_len;
        }

        if let Some(metrics) = self.parser.metrics() {
            metrics.bytes_discarded(buf.len() - offset);
        } else if offset < buf.len() {
            debug!(byte_count = buf.len() - offset, "Discarding trailing stream bytes");
        }

        Ok(results)
    }

    /// Parse captured segments of one connection, one frame per segment.
    ///
    /// Empty segments are skipped. Each result keeps its segment's index and
    /// direction.
    #[instrument(skip_all, fields(connection_id = connection_id, segments = segments.len()))]
    pub fn decode_flow(&self, connection_id: u64, segments: &[FlowSegment]) -> Result<Vec<FlowPacket>> {
        let profile = self.parser.registry().require_current()?;
        let mut results = Vec::with_capacity(segments.len());

        for segment in segments.iter().filter(|s| !s.body.is_empty()) {
            let packet = self.parse_frame(&profile, &segment.body)?;
            results.push(FlowPacket {
                connection_id,
                index: segment.index,
                direction: segment.direction,
                packet,
            });
        }

        debug!(decoded = results.len(), "Flow decoded");
        Ok(results)
    }

    fn parse_frame(&self, profile: &Profile, frame: &[u8]) -> Result<DecodedPacket> {
        if let Some(metrics) = self.parser.metrics() {
            metrics.frame_reassembled();
        }
        match self.parser.parse_with_profile(profile, frame) {
            Ok(packet) => Ok(packet),
            Err(e) if e.is_configuration() => Err(e),
            Err(e) => {
                debug!(error = %e, len = frame.len(), "Frame failed to parse");
                Ok(DecodedPacket::failed(frame, &e))
            }
        }
    }
}

/// Length of the frame at the start of `rest`, if one can be sliced.
fn next_frame_len(rest: &[u8], profile: &Profile) -> Option<usize> {
    if rest.len() < profile.header_size.max(HEADER_FIELD_SIZE) {
        return None;
    }
    let declared = usize::try_from(peek_frame_length(rest)?).ok()?;
    if declared == 0 || declared > rest.len() {
        debug!(declared, remaining = rest.len(), "Frame length unusable, stopping");
        return None;
    }
    Some(declared)
}

/// Which side of the connection sent a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Client to server
    Upstream,
    /// Server to client
    Downstream,
}

/// One captured chunk of a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowSegment {
    /// Position of the chunk within the capture
    pub index: usize,
    pub direction: Direction,
    pub body: Bytes,
}

impl FlowSegment {
    pub fn new(index: usize, direction: Direction, body: impl Into<Bytes>) -> Self {
        Self {
            index,
            direction,
            body: body.into(),
        }
    }
}

/// Parse result for one [`FlowSegment`].
#[derive(Debug, Clone, PartialEq)]
pub struct FlowPacket {
    pub connection_id: u64,
    pub index: usize,
    pub direction: Direction,
    pub packet: DecodedPacket,
}
