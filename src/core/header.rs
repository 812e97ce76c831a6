//! Fixed frame header.
//!
//! ```text
//! [TotalLength(4)] [MessageId(4)] [Seq1(4)] [Seq2(4)] [Identifier(4)] [Payload(N)]
//! ```
//!
//! All fields are big-endian `u32`. A profile's header size selects how many
//! of them are present; absent fields read as zero.

use crate::error::{AnalyzerError, Result};
use crate::profile::Profile;
use serde::Serialize;

/// Width of one header field
pub const HEADER_FIELD_SIZE: usize = 4;

/// Decoded frame header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PacketHeader {
    /// Declared frame length, header included
    pub total_length: u32,
    pub message_id: u32,
    pub seq1: u32,
    pub seq2: u32,
    pub identifier: u32,
    /// Mapped name of `message_id`, or `unknown message(<id>)`
    pub message_name: String,
}

impl PacketHeader {
    /// Decode the header fields covered by `header_size` from the start of `raw`.
    ///
    /// The message name is left empty; see [`PacketHeader::parse`].
    pub fn decode(raw: &[u8], header_size: usize) -> Result<Self> {
        if raw.len() < header_size {
            return Err(AnalyzerError::InvalidHeaderSize {
                have: raw.len(),
                need: header_size,
            });
        }

        let mut fields = [0u32; 5];
        for (index, chunk) in raw[..header_size]
            .chunks_exact(HEADER_FIELD_SIZE)
            .take(fields.len())
            .enumerate()
        {
            fields[index] = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }

        let [total_length, message_id, seq1, seq2, identifier] = fields;
        Ok(Self {
            total_length,
            message_id,
            seq1,
            seq2,
            identifier,
            message_name: String::new(),
        })
    }

    /// Decode the header with `profile`'s layout and label its message id.
    pub fn parse(raw: &[u8], profile: &Profile) -> Result<Self> {
        let mut header = Self::decode(raw, profile.header_size)?;
        header.message_name = profile.message_label(header.message_id);
        Ok(header)
    }
}

/// Read the 4-byte big-endian frame length at the start of `buf`.
pub fn peek_frame_length(buf: &[u8]) -> Option<u32> {
    let prefix = buf.get(..HEADER_FIELD_SIZE)?;
    Some(u32::from_be_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn sample() -> Vec<u8> {
        let mut raw = Vec::new();
        for v in [0x18u32, 0x7530, 1, 2, 0xDEAD_BEEF] {
            raw.extend_from_slice(&v.to_be_bytes());
        }
        raw
    }

    #[test]
    fn test_full_header() {
        let profile = Profile::new("p", "k", "v", 20).with_message_name(0x7530, "heartbeat");
        let header = PacketHeader::parse(&sample(), &profile).unwrap();
        assert_eq!(header.total_length, 24);
        assert_eq!(header.message_id, 30000);
        assert_eq!(header.seq1, 1);
        assert_eq!(header.seq2, 2);
        assert_eq!(header.identifier, 0xDEAD_BEEF);
        assert_eq!(header.message_name, "heartbeat");
    }

    #[test]
    fn test_partial_header_leaves_zeroes() {
        let header = PacketHeader::decode(&sample(), 8).unwrap();
        assert_eq!(header.total_length, 24);
        assert_eq!(header.message_id, 30000);
        assert_eq!(header.seq1, 0);
        assert_eq!(header.identifier, 0);

        let empty = PacketHeader::decode(&[], 0).unwrap();
        assert_eq!(empty, PacketHeader::default());
    }

    #[test]
    fn test_short_buffer() {
        assert!(matches!(
            PacketHeader::decode(&[0, 0, 0], 4),
            Err(AnalyzerError::InvalidHeaderSize { have: 3, need: 4 })
        ));
    }

    #[test]
    fn test_peek_frame_length() {
        assert_eq!(peek_frame_length(&[0, 0, 1, 0, 9]), Some(256));
        assert_eq!(peek_frame_length(&[0, 0, 1]), None);
    }
}
