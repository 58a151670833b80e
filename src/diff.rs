//! Structural comparison of two tree values.
//!
//! Independent of any grammar: maps compare by key, sequences by index.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::location::Location;

/// One difference between the left (`a`) and right (`b`) trees.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DiffEntry {
    /// Present only in `a`.
    Missing { value: Value },
    /// Present only in `b`.
    Extra { value: Value },
    /// Present in both with different values.
    Mismatch { left: Value, right: Value },
}

/// Differences keyed by location. Empty means structurally equal.
pub type Diff = BTreeMap<Location, DiffEntry>;

/// Compare `a` against `b`.
pub fn diff(a: &Value, b: &Value) -> Diff {
    let mut out = Diff::new();
    diff_at(a, b, &Location::root(), &mut out);
    out
}

fn diff_at(a: &Value, b: &Value, location: &Location, out: &mut Diff) {
    match (a, b) {
        (Value::Object(a), Value::Object(b)) => {
            for (key, left) in a {
                let child = location.push(key.as_str());
                match b.get(key) {
                    Some(right) => diff_at(left, right, &child, out),
                    None => {
                        out.insert(
                            child,
                            DiffEntry::Missing {
                                value: left.clone(),
                            },
                        );
                    }
                }
            }
            for (key, right) in b {
                if !a.contains_key(key) {
                    out.insert(
                        location.push(key.as_str()),
                        DiffEntry::Extra {
                            value: right.clone(),
                        },
                    );
                }
            }
        }
        (Value::Array(a), Value::Array(b)) => {
            let n = a.len().min(b.len());
            for (i, (left, right)) in a.iter().zip(b).enumerate() {
                diff_at(left, right, &location.push(i.to_string()), out);
            }
            for (i, left) in a.iter().enumerate().skip(n) {
                out.insert(
                    location.push(i.to_string()),
                    DiffEntry::Missing {
                        value: left.clone(),
                    },
                );
            }
            for (i, right) in b.iter().enumerate().skip(n) {
                out.insert(
                    location.push(i.to_string()),
                    DiffEntry::Extra {
                        value: right.clone(),
                    },
                );
            }
        }
        _ if a != b => {
            out.insert(
                location.clone(),
                DiffEntry::Mismatch {
                    left: a.clone(),
                    right: b.clone(),
                },
            );
        }
        _ => {}
    }
}

/// Entries present only in the left tree.
pub fn missing(diff: &Diff) -> impl Iterator<Item = (&Location, &Value)> {
    diff.iter().filter_map(|(loc, entry)| match entry {
        DiffEntry::Missing { value } => Some((loc, value)),
        _ => None,
    })
}

/// Entries present only in the right tree.
pub fn extra(diff: &Diff) -> impl Iterator<Item = (&Location, &Value)> {
    diff.iter().filter_map(|(loc, entry)| match entry {
        DiffEntry::Extra { value } => Some((loc, value)),
        _ => None,
    })
}

/// Entries present in both trees with different values.
pub fn mismatch(diff: &Diff) -> impl Iterator<Item = (&Location, &Value, &Value)> {
    diff.iter().filter_map(|(loc, entry)| match entry {
        DiffEntry::Mismatch { left, right } => Some((loc, left, right)),
        _ => None,
    })
}
