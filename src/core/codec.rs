//! Incremental frame splitting for live byte streams.
//!
//! [`FrameCodec`] applies the same length-prefix rule as
//! [`StreamReassembler`](super::stream::StreamReassembler), but over a
//! growing buffer: it yields a frame as soon as all of its bytes have
//! arrived and waits otherwise.

use super::header::{peek_frame_length, HEADER_FIELD_SIZE};
use crate::config::{StreamConfig, DEFAULT_MAX_FRAME_LEN};
use crate::error::AnalyzerError;
use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::debug;

/// Length-prefixed frame decoder.
///
/// Yields whole frames, header included, ready for
/// [`FrameParser::parse_packet`](super::frame::FrameParser::parse_packet).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCodec {
    max_frame_len: usize,
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_LEN)
    }
}

impl FrameCodec {
    pub fn new(max_frame_len: usize) -> Self {
        Self { max_frame_len }
    }

    pub fn from_config(config: &StreamConfig) -> Self {
        Self::new(config.max_frame_len)
    }
}

impl Decoder for FrameCodec {
    type Item = BytesMut;
    type Error = AnalyzerError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(declared) = peek_frame_length(&src[..]) else {
            return Ok(None);
        };

        let frame_len = declared as usize;
        if frame_len == 0 || frame_len > self.max_frame_len {
            return Err(AnalyzerError::InvalidFrameLength(declared));
        }

        if src.len() < frame_len {
            src.reserve(frame_len - src.len());
            return Ok(None);
        }

        Ok(Some(src.split_to(frame_len)))
    }

    // A partial frame at end of stream is dropped, not an error.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None => {
                if !src.is_empty() {
                    debug!(
                        byte_count = src.len(),
                        prefix_complete = src.len() >= HEADER_FIELD_SIZE,
                        "Discarding partial frame at end of stream"
                    );
                    src.clear();
                }
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_waits_for_full_frame() {
        let mut codec = FrameCodec::default();
        let mut buf = BytesMut::from(&[0u8, 0, 0, 6, 0xAA][..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert_eq!(buf.len(), 5);

        buf.extend_from_slice(&[0xBB, 0x00, 0, 0]);
        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&frame[..], &[0, 0, 0, 6, 0xAA, 0xBB]);
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn test_rejects_zero_and_oversized_lengths() {
        let mut codec = FrameCodec::new(64);
        let mut zero = BytesMut::from(&[0u8, 0, 0, 0][..]);
        assert!(matches!(
            codec.decode(&mut zero),
            Err(AnalyzerError::InvalidFrameLength(0))
        ));

        let mut huge = BytesMut::from(&[0u8, 0, 1, 0][..]);
        assert!(matches!(
            codec.decode(&mut huge),
            Err(AnalyzerError::InvalidFrameLength(256))
        ));
    }

    #[test]
    fn test_eof_drops_partial_frame() {
        let mut codec = FrameCodec::default();
        let mut buf = BytesMut::from(&[0u8, 0, 0, 9, 1][..]);
        assert!(codec.decode_eof(&mut buf).unwrap().is_none());
        assert!(buf.is_empty());
    }
}
