#![allow(dead_code)]

use std::{collections::HashMap, env};

use native_editor_host::codec::{ByteOrder, Encoder};
use proptest::prelude::*;
use serde_json::Value;

/// Env guard that restores previous env vars on drop.
pub struct EnvGuard {
    old: HashMap<String, Option<String>>,
}

impl EnvGuard {
    pub fn set(vars: &[(&str, String)]) -> Self {
        let mut old = HashMap::new();
        for (k, v) in vars {
            old.insert((*k).to_string(), env::var(k).ok());
            env::set_var(k, v);
        }
        Self { old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (k, prev) in self.old.drain() {
            match prev {
                Some(v) => env::set_var(k, v),
                None => env::remove_var(k),
            }
        }
    }
}

/// Concatenate the frames of `messages` into one wire buffer.
pub fn wire(order: ByteOrder, messages: &[Value]) -> Vec<u8> {
    let encoder = Encoder::new(order);
    messages
        .iter()
        .flat_map(|m| encoder.encode(m).unwrap())
        .collect()
}

/// A frame with an arbitrary payload, bypassing the encoder.
pub fn raw_frame(order: ByteOrder, payload: &[u8]) -> Vec<u8> {
    let mut frame = order.write_u32(payload.len() as u32).to_vec();
    frame.extend_from_slice(payload);
    frame
}

/// Arbitrary JSON without floats (float text round trips are not bit-exact).
pub fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        "\\PC{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{0,6}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}
