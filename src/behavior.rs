//! Per-location traversal behavior: how a sequence is ordered and how a
//! scalar mismatch resolves during merge.

use serde_json::{Map, Value};

/// Which side wins when merge finds two different values at one location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Destination (accumulated) value wins.
    #[default]
    Keep,
    /// Source (incoming) value wins.
    Replace,
}

/// Canonical ordering key for elements of a set-like sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Compact JSON text with object keys sorted recursively.
    Canonical,
    /// The string itself; canonical text for non-strings.
    Str,
    /// Object identity fields joined by NUL. Missing fields count as empty.
    /// Non-objects fall back to canonical text.
    Identity(&'static [&'static str]),
}

impl SortKey {
    pub fn key(&self, value: &Value) -> String {
        match self {
            SortKey::Canonical => canonical(value),
            SortKey::Str => match value {
                Value::String(s) => s.clone(),
                other => canonical(other),
            },
            SortKey::Identity(fields) => match value {
                Value::Object(map) => fields
                    .iter()
                    .map(|field| match map.get(*field) {
                        None => String::new(),
                        Some(Value::String(s)) => s.clone(),
                        Some(other) => canonical(other),
                    })
                    .collect::<Vec<_>>()
                    .join("\u{0}"),
                other => canonical(other),
            },
        }
    }
}

/// Sort key and conflict policy in effect at a location.
///
/// The default keeps sequence order and keeps the destination on conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Behavior {
    pub sort_key: Option<SortKey>,
    pub conflict_policy: ConflictPolicy,
}

impl Behavior {
    /// Set-like sequence ordered by `key`.
    pub const fn sorted(key: SortKey) -> Self {
        Self {
            sort_key: Some(key),
            conflict_policy: ConflictPolicy::Keep,
        }
    }

    pub const fn policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    pub fn is_set_like(&self) -> bool {
        self.sort_key.is_some()
    }
}

/// Canonical text of any JSON value, independent of object key order.
///
/// Characters outside printable ASCII are written as `\uXXXX` escapes
/// (UTF-16 surrogate pairs above the BMP), so `"é"` sorts before `"z"`.
pub fn canonical(value: &Value) -> String {
    let text = sorted_keys(value).to_string();
    let mut out = String::with_capacity(text.len());
    let mut units = [0u16; 2];
    for c in text.chars() {
        if (c as u32) < 0x7f {
            out.push(c);
            continue;
        }
        for unit in c.encode_utf16(&mut units) {
            out.push_str(&format!("\\u{:04x}", unit));
        }
    }
    out
}

fn sorted_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut out = Map::new();
            for (key, child) in entries {
                out.insert(key.clone(), sorted_keys(child));
            }
            Value::Object(out)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sorted_keys).collect()),
        other => other.clone(),
    }
}
