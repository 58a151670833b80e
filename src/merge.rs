//! Grammar-aware merge of normalized documents.
//!
//! Maps merge by key union. Sequences with a sort key merge as sets keyed by
//! that sort key; sequences without one merge positionally. Any difference
//! that cannot be reconciled is reported as a [`MergeConflict`] and resolved
//! by the location's [`ConflictPolicy`].
//!
//! Positional merge is best effort: when both sides reorder an ordered
//! sequence independently the result is ambiguous.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::behavior::{ConflictPolicy, SortKey};
use crate::location::Location;
use crate::node::{Grammar, NodeId, Transition};

/// Two different values met at one location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeConflict {
    pub location: Location,
    pub destination: Value,
    pub source: Value,
}

/// Merged value plus every conflict found on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeResult {
    pub value: Value,
    pub conflicts: Vec<MergeConflict>,
}

/// Merge `src` into `dst` starting at the grammar's root.
pub fn merge(dst: &Value, src: &Value, grammar: &Grammar) -> MergeResult {
    let mut conflicts = Vec::new();
    let value = merge_at(
        dst,
        src,
        grammar,
        grammar.entry(),
        &Location::root(),
        &mut conflicts,
    );
    MergeResult { value, conflicts }
}

/// Left fold of [`merge`] over `docs`.
///
/// The first document seeds the accumulator unchanged. Returns `None` for an
/// empty input.
pub fn merge_all<I>(docs: I, grammar: &Grammar) -> Option<MergeResult>
where
    I: IntoIterator<Item = Value>,
{
    let mut docs = docs.into_iter();
    let first = docs.next()?;
    let seed = MergeResult {
        value: first,
        conflicts: Vec::new(),
    };
    Some(docs.fold(seed, |mut acc, src| {
        let MergeResult { value, conflicts } = merge(&acc.value, &src, grammar);
        acc.value = value;
        acc.conflicts.extend(conflicts);
        acc
    }))
}

/// Merge in an explicit `(node, behavior)` context, appending conflicts.
pub fn merge_at(
    dst: &Value,
    src: &Value,
    grammar: &Grammar,
    context: Transition,
    location: &Location,
    conflicts: &mut Vec<MergeConflict>,
) -> Value {
    let (node, behavior) = context;
    match (dst, src) {
        (Value::Object(d), Value::Object(s)) => merge_map(d, s, grammar, node, location, conflicts),
        (Value::Array(d), Value::Array(s)) => match behavior.sort_key {
            Some(key) => merge_set(d, s, key, behavior.conflict_policy, location, conflicts),
            None => merge_list(d, s, grammar, context, location, conflicts),
        },
        _ if dst == src => dst.clone(),
        _ => {
            conflicts.push(MergeConflict {
                location: location.clone(),
                destination: dst.clone(),
                source: src.clone(),
            });
            match behavior.conflict_policy {
                ConflictPolicy::Keep => dst.clone(),
                ConflictPolicy::Replace => src.clone(),
            }
        }
    }
}

fn merge_map(
    dst: &Map<String, Value>,
    src: &Map<String, Value>,
    grammar: &Grammar,
    node: NodeId,
    location: &Location,
    conflicts: &mut Vec<MergeConflict>,
) -> Value {
    let mut result = dst.clone();
    for (key, incoming) in src {
        let merged = match result.get(key) {
            None => incoming.clone(),
            Some(existing) => merge_at(
                existing,
                incoming,
                grammar,
                grammar.child(node, key),
                &location.push(key.as_str()),
                conflicts,
            ),
        };
        result.insert(key.clone(), merged);
    }
    Value::Object(result)
}

fn merge_set(
    dst: &[Value],
    src: &[Value],
    key: SortKey,
    policy: ConflictPolicy,
    location: &Location,
    conflicts: &mut Vec<MergeConflict>,
) -> Value {
    // the sort key acts as element identity
    let mut seen: BTreeMap<String, Value> =
        dst.iter().map(|item| (key.key(item), item.clone())).collect();
    for item in src {
        let id = key.key(item);
        match seen.get(&id) {
            None => {
                seen.insert(id, item.clone());
            }
            Some(existing) if existing != item => {
                conflicts.push(MergeConflict {
                    location: location.clone(),
                    destination: existing.clone(),
                    source: item.clone(),
                });
                if policy == ConflictPolicy::Replace {
                    seen.insert(id, item.clone());
                }
            }
            Some(_) => {}
        }
    }
    Value::Array(seen.into_values().collect())
}

fn merge_list(
    dst: &[Value],
    src: &[Value],
    grammar: &Grammar,
    context: Transition,
    location: &Location,
    conflicts: &mut Vec<MergeConflict>,
) -> Value {
    let mut result = dst.to_vec();
    let overlap = dst.len().min(src.len());
    for (i, incoming) in src.iter().enumerate().take(overlap) {
        if result[i] != *incoming {
            result[i] = merge_at(
                &result[i],
                incoming,
                grammar,
                context,
                &location.push(i.to_string()),
                conflicts,
            );
        }
    }
    result.extend(src[overlap..].iter().cloned());
    Value::Array(result)
}
