//! # Wire Introspection
//!
//! Best-effort structural decoding of payloads in the varint tag/value
//! grammar, without a schema.
//!
//! ## Components
//! - **Reader**: bounds-checked cursor with varint and fixed-width reads
//! - **Node**: closed variant tree (`VarInt`, `Fixed64`, `Fixed32`, `Bytes`, `Message`)
//! - **Introspector**: depth-bounded recursive decoder
//! - **Render**: JSON text view of a decoded tree
//!
//! ## Wire Format
//! ```text
//! [Tag varint = field << 3 | wire_type] [Value]
//!   0 = varint   1 = fixed64   2 = varint length + bytes   5 = fixed32
//! ```

pub mod introspect;
pub mod node;
pub mod reader;
mod render;

pub use introspect::WireIntrospector;
pub use node::{Message, Node, Opaque, Value, WireType};
pub use reader::{WireError, WireReader};
