//! Schema-less decoder for the tag/value wire grammar.
//!
//! Every field starts with a varint tag: the low three bits select the wire
//! type, the rest is the field number. Length-delimited values are ambiguous
//! without a schema (string, bytes or nested message), so the decoder tries
//! a nested decode and keeps it only when it is a perfect fit.
//!
//! The decoder never fails. Damage is contained to the smallest unit:
//! a bad tag ends the current level, an unreadable value (out of bounds or
//! an over-long varint) becomes a truncated opaque terminal and ends the
//! current level, and every field decoded before the damage is kept.

use super::node::{Message, Node, Opaque, Value, WireType, MAX_FIELD_NUMBER};
use super::reader::{WireError, WireReader};
use crate::config::{IntrospectionConfig, DEFAULT_MAX_DEPTH, MAX_ALLOWED_DEPTH};
use tracing::trace;

/// Result of decoding one message level.
struct Level {
    message: Message,
    /// Every byte of the level was consumed without a tag or bounds error
    clean: bool,
}

/// Stateless, depth-bounded wire decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireIntrospector {
    max_depth: usize,
}

impl Default for WireIntrospector {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl WireIntrospector {
    /// `max_depth` bounds how many message levels may nest below the top
    /// level; length-delimited values past the bound stay opaque.
    ///
    /// Values above [`MAX_ALLOWED_DEPTH`] are clamped to it.
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth: max_depth.min(MAX_ALLOWED_DEPTH),
        }
    }

    pub fn from_config(config: &IntrospectionConfig) -> Self {
        Self::new(config.max_depth)
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Decode `bytes[skip..]` into a structural tree.
    ///
    /// Returns an empty message when there is nothing past `skip`.
    pub fn decode(&self, bytes: &[u8], skip: usize) -> Message {
        match bytes.get(skip..) {
            Some(body) if !body.is_empty() => self.decode_level(body, 0).message,
            _ => Message::new(),
        }
    }

    /// Decode `bytes` only if they form a complete, well-formed message.
    pub fn decode_exact(&self, bytes: &[u8]) -> Option<Message> {
        let level = self.decode_level(bytes, 0);
        (level.clean && !level.message.is_empty()).then_some(level.message)
    }

    fn decode_level(&self, bytes: &[u8], depth: usize) -> Level {
        let mut reader = WireReader::new(bytes);
        let mut message = Message::new();

        while !reader.is_empty() {
            let (field, wire_type) = match read_tag(&mut reader) {
                Ok(tag) => tag,
                Err(e) => {
                    trace!(depth, offset = reader.position(), error = %e, "Tag error, ending level");
                    return Level { message, clean: false };
                }
            };

            let value_start = reader.position();
            match self.decode_value(&mut reader, wire_type, depth) {
                Ok(value) => message.push(Node {
                    field,
                    wire_type,
                    value,
                }),
                Err(e) => {
                    trace!(depth, field, error = %e, "Field value unreadable, ending level");
                    message.push(Node {
                        field,
                        wire_type,
                        value: Value::Bytes(Opaque::truncated(&bytes[value_start..])),
                    });
                    return Level { message, clean: false };
                }
            }
        }

        Level {
            message,
            clean: true,
        }
    }

    fn decode_value(
        &self,
        reader: &mut WireReader<'_>,
        wire_type: WireType,
        depth: usize,
    ) -> Result<Value, WireError> {
        let value = match wire_type {
            WireType::Varint => Value::VarInt(reader.read_varint()?),
            WireType::Fixed64 => {
                let raw = reader.read_fixed64()?;
                Value::Fixed64 {
                    raw,
                    as_f64: f64::from_bits(raw),
                }
            }
            WireType::Fixed32 => {
                let raw = reader.read_fixed32()?;
                Value::Fixed32 {
                    raw,
                    as_f32: f32::from_bits(raw),
                }
            }
            WireType::LengthDelimited => {
                let body = reader.read_len_prefixed()?;
                self.nested_or_opaque(body, depth)
            }
        };
        Ok(value)
    }

    fn nested_or_opaque(&self, body: &[u8], depth: usize) -> Value {
        if !body.is_empty() && depth < self.max_depth {
            let nested = self.decode_level(body, depth + 1);
            if nested.clean && !nested.message.is_empty() {
                return Value::Message(nested.message);
            }
        }
        Value::Bytes(Opaque::new(body))
    }
}

/// Read a tag and split it into field number and wire type.
fn read_tag(reader: &mut WireReader<'_>) -> Result<(u64, WireType), WireError> {
    let tag = reader.read_varint()?;
    let code = (tag & 0x07) as u8;
    let wire_type = WireType::from_code(code).ok_or(WireError::InvalidWireType(code))?;
    let field = tag >> 3;
    if field == 0 || field > MAX_FIELD_NUMBER {
        return Err(WireError::InvalidFieldNumber(field));
    }
    Ok((field, wire_type))
}
