//! Textual JSON rendering of decoded trees.
//!
//! Field numbers become object keys in ascending order. A field seen once
//! renders as its value, a repeated field as an array in wire order.

use super::node::{Message, Node, Value};
use serde_json::{json, Map, Value as Json};

impl Message {
    /// Convert the tree into a JSON value.
    pub fn to_json(&self) -> Json {
        let mut object = Map::new();
        for (field, nodes) in self.iter() {
            let rendered = match nodes {
                [single] => single.to_json(),
                many => Json::Array(many.iter().map(Node::to_json).collect()),
            };
            object.insert(field.to_string(), rendered);
        }
        Json::Object(object)
    }

    /// Pretty-printed JSON text of the tree.
    pub fn render(&self) -> String {
        serde_json::to_string_pretty(&self.to_json()).unwrap_or_default()
    }
}

impl Node {
    pub fn to_json(&self) -> Json {
        match &self.value {
            Value::VarInt(v) => json!(v),
            Value::Fixed64 { raw, as_f64 } => json!({ "u64": raw, "f64": as_f64 }),
            Value::Fixed32 { raw, as_f32 } => json!({ "u32": raw, "f32": as_f32 }),
            Value::Bytes(opaque) => {
                let mut object = Map::new();
                object.insert("hex".into(), Json::String(opaque.hex()));
                object.insert("text".into(), Json::String(opaque.text.clone()));
                if opaque.truncated {
                    object.insert("truncated".into(), Json::Bool(true));
                }
                Json::Object(object)
            }
            Value::Message(message) => message.to_json(),
        }
    }
}
