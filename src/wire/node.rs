//! Structural tree produced by wire introspection.
//!
//! The tree is a closed set of variants, so consumers match exhaustively
//! instead of probing a dynamic value.

use crate::utils::hex::format_hex;
use std::collections::BTreeMap;

/// Largest field number the tag/value grammar allows (2^29 - 1).
pub const MAX_FIELD_NUMBER: u64 = (1 << 29) - 1;

/// Value encoding named by the low three bits of a field tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType {
    Varint,
    Fixed64,
    LengthDelimited,
    Fixed32,
}

impl WireType {
    /// Map a 3-bit wire code. Group codes (3, 4) and reserved codes are rejected.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(WireType::Varint),
            1 => Some(WireType::Fixed64),
            2 => Some(WireType::LengthDelimited),
            5 => Some(WireType::Fixed32),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            WireType::Varint => 0,
            WireType::Fixed64 => 1,
            WireType::LengthDelimited => 2,
            WireType::Fixed32 => 5,
        }
    }
}

/// One decoded field occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub field: u64,
    pub wire_type: WireType,
    pub value: Value,
}

/// Decoded field payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    VarInt(u64),
    Fixed64 { raw: u64, as_f64: f64 },
    Fixed32 { raw: u32, as_f32: f32 },
    Bytes(Opaque),
    Message(Message),
}

impl Value {
    pub fn as_varint(&self) -> Option<u64> {
        match self {
            Value::VarInt(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Value::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Opaque> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

/// Length-delimited bytes that did not decode as a nested message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opaque {
    pub raw: Vec<u8>,
    /// Lossy UTF-8 rendering of `raw`
    pub text: String,
    /// Whether `raw` is valid UTF-8 as-is
    pub utf8: bool,
    /// Set when the value could not be read: it ran past the end of its
    /// enclosing buffer, or its varint exceeded ten bytes. `raw` then holds
    /// whatever bytes were left from the start of the value.
    pub truncated: bool,
}

impl Opaque {
    pub fn new(raw: &[u8]) -> Self {
        Self {
            raw: raw.to_vec(),
            text: String::from_utf8_lossy(raw).into_owned(),
            utf8: std::str::from_utf8(raw).is_ok(),
            truncated: false,
        }
    }

    pub fn truncated(raw: &[u8]) -> Self {
        Self {
            truncated: true,
            ..Self::new(raw)
        }
    }

    pub fn hex(&self) -> String {
        format_hex(&self.raw)
    }
}

/// Fields of one message level, keyed by field number. Repeated occurrences
/// keep their wire order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    fields: BTreeMap<u64, Vec<Node>>,
}

impl Message {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: Node) {
        self.fields.entry(node.field).or_default().push(node);
    }

    /// All occurrences of `field`, empty if absent.
    pub fn get(&self, field: u64) -> &[Node] {
        self.fields.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn first(&self, field: u64) -> Option<&Node> {
        self.get(field).first()
    }

    /// Distinct field numbers, ascending.
    pub fn field_numbers(&self) -> impl Iterator<Item = u64> + '_ {
        self.fields.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &[Node])> + '_ {
        self.fields.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    /// Number of field occurrences at this level.
    pub fn node_count(&self) -> usize {
        self.fields.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Deepest nesting of message values below this level (0 for a flat message).
    pub fn depth(&self) -> usize {
        self.fields
            .values()
            .flatten()
            .filter_map(|node| node.value.as_message())
            .map(|m| 1 + m.depth())
            .max()
            .unwrap_or(0)
    }
}
