//! # Core Packet Components
//!
//! Frame layout, single-frame parsing and multi-frame reassembly.
//!
//! ## Components
//! - **Header**: fixed big-endian header fields selected by the profile
//! - **Frame**: header split, payload decryption, structure introspection
//! - **Stream**: offline reassembly of concatenated frames and captured flows
//! - **Codec**: Tokio decoder splitting frames off a live byte stream
//!
//! ## Wire Format
//! ```text
//! [TotalLength(4)] [MessageId(4)] [Seq1(4)] [Seq2(4)] [Identifier(4)] [Encrypted payload(N)]
//! ```
//!
//! ## Limits
//! - A frame must declare a non-zero length that fits in the bytes available
//! - The live codec rejects declared lengths above `max_frame_len` before buffering

pub mod codec;
pub mod frame;
pub mod header;
pub mod stream;

pub use codec::FrameCodec;
pub use frame::{DecodedPacket, FrameParser, PacketReport};
pub use header::PacketHeader;
pub use stream::{Direction, FlowPacket, FlowSegment, StreamReassembler};
