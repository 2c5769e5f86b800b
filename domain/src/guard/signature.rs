//! Call signatures for repetition counting.
//!
//! A signature is the tool name plus a SHA-256 digest of the canonicalized
//! arguments. Object keys are sorted recursively before hashing, so
//! `{"a":1,"b":2}` and `{"b":2,"a":1}` share a signature. Signatures are only
//! used to count repeats, never to dispatch.

use std::collections::HashMap;
use std::fmt::Write as _;

use serde_json::Value;
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallSignature(String);

impl CallSignature {
    pub fn compute(tool_name: &str, arguments: &HashMap<String, Value>) -> Self {
        let mut canonical = String::new();
        write_canonical_object(&mut canonical, arguments.iter());

        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        Self(format!("{}:{:x}", tool_name, hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CallSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn write_canonical_object<'a>(out: &mut String, entries: impl Iterator<Item = (&'a String, &'a Value)>) {
    let mut entries: Vec<_> = entries.collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    out.push('{');
    for (i, (key, value)) in entries.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        // Keys are JSON-escaped the same way serde_json renders strings.
        let _ = write!(out, "{}:", Value::String(key.clone()));
        write_canonical(out, value);
    }
    out.push('}');
}

fn write_canonical(out: &mut String, value: &Value) {
    match value {
        Value::Object(map) => write_canonical_object(out, map.iter()),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(out, item);
            }
            out.push(']');
        }
        scalar => {
            let _ = write!(out, "{}", scalar);
        }
    }
}
