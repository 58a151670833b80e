//! Grammar-driven pre-order traversal.

use serde_json::Value;

use crate::location::Location;
use crate::node::{Grammar, Kind, NodeId};

/// One visited position.
#[derive(Debug, Clone, PartialEq)]
pub struct Step<'a> {
    pub value: &'a Value,
    pub kind: Kind,
    pub location: Location,
}

/// Lazy depth-first, pre-order walk over one or more trees.
///
/// Created by [`walk`]. Trees are visited in the order given; a value is
/// yielded before its children, and children in document order.
pub struct Walk<'a, 'g, I> {
    grammar: &'g Grammar,
    trees: I,
    stack: Vec<(&'a Value, NodeId, Location)>,
}

/// Walk every tree in `trees` with `grammar`.
pub fn walk<'a, 'g, I>(grammar: &'g Grammar, trees: I) -> Walk<'a, 'g, I::IntoIter>
where
    I: IntoIterator<Item = &'a Value>,
{
    Walk {
        grammar,
        trees: trees.into_iter(),
        stack: Vec::new(),
    }
}

impl<'a, 'g, I> Iterator for Walk<'a, 'g, I>
where
    I: Iterator<Item = &'a Value>,
{
    type Item = Step<'a>;

    fn next(&mut self) -> Option<Step<'a>> {
        if self.stack.is_empty() {
            let tree = self.trees.next()?;
            self.stack.push((tree, self.grammar.root(), Location::root()));
        }
        let (value, node, location) = self.stack.pop()?;

        // reversed so the first child pops first
        match value {
            Value::Object(map) => {
                for (key, child) in map.iter().rev() {
                    let (next, _) = self.grammar.child(node, key);
                    self.stack.push((child, next, location.push(key.as_str())));
                }
            }
            Value::Array(arr) => {
                for (i, item) in arr.iter().enumerate().rev() {
                    self.stack.push((item, node, location.push(i.to_string())));
                }
            }
            _ => {}
        }

        Some(Step {
            value,
            kind: self.grammar.kind(node),
            location,
        })
    }
}
