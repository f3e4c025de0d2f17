/*! Statistics accumulator

Statistics files are nested JSON objects whose leaves are either numbers or arrays.
They are loaded as a [Node] tree and merged path by path:

- branches are merged key by key, keys missing on one side are taken as is,
- numbers are summed (integers stay integers unless a float is involved),
- arrays are concatenated.

Any other combination at the same path is a [Error::StatsMismatch].
!*/
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Int(i64),
    Float(f64),
    Sequence(Vec<Value>),
    Branch(BTreeMap<String, Node>),
}

impl Default for Node {
    fn default() -> Self {
        Node::Branch(BTreeMap::new())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Int(i) => write!(f, "{}", i),
            // keeps the fractional part of integral floats, e.g. `2.0`
            Node::Float(x) => write!(f, "{:?}", x),
            Node::Sequence(s) => write!(f, "{}", Value::from(s.clone())),
            Node::Branch(_) => write!(f, "{{...}}"),
        }
    }
}

#[inline]
fn child_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

impl Node {
    fn kind(&self) -> &'static str {
        match self {
            Node::Int(_) | Node::Float(_) => "number",
            Node::Sequence(_) => "sequence",
            Node::Branch(_) => "branch",
        }
    }

    /// Merge `other` into `self`.
    pub fn merge(&mut self, other: Node) -> Result<(), Error> {
        self.merge_at("", other)
    }

    fn merge_at(&mut self, path: &str, other: Node) -> Result<(), Error> {
        match (self, other) {
            (Node::Branch(mine), Node::Branch(theirs)) => {
                for (key, node) in theirs {
                    let p = child_path(path, &key);
                    match mine.get_mut(&key) {
                        Some(existing) => existing.merge_at(&p, node)?,
                        None => {
                            mine.insert(key, node);
                        }
                    }
                }
            }
            (Node::Int(a), Node::Int(b)) => *a += b,
            (Node::Sequence(a), Node::Sequence(b)) => a.extend(b),
            (this, Node::Float(b)) => match this {
                Node::Int(a) => {
                    let sum = *a as f64 + b;
                    *this = Node::Float(sum);
                }
                Node::Float(a) => *a += b,
                mine => return Err(mismatch(path, mine.kind(), "number")),
            },
            (Node::Float(a), Node::Int(b)) => *a += b as f64,
            (mine, theirs) => return Err(mismatch(path, mine.kind(), theirs.kind())),
        }
        Ok(())
    }

    /// Navigate to the node at `path`.
    pub fn get(&self, path: &[&str]) -> Option<&Node> {
        path.iter().try_fold(self, |node, key| match node {
            Node::Branch(children) => children.get(*key),
            _ => None,
        })
    }

    pub fn as_branch(&self) -> Option<&BTreeMap<String, Node>> {
        match self {
            Node::Branch(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Node::Sequence(s) => Some(s),
            _ => None,
        }
    }

    /// Get the numeric value of a leaf.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Node::Int(i) => Some(*i as f64),
            Node::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Node::Int(_) | Node::Float(_))
    }
}

fn mismatch(path: &str, mine: &str, theirs: &str) -> Error {
    log::debug!("{}: cannot merge {} with {}", path, mine, theirs);
    Error::StatsMismatch {
        path: path.to_string(),
    }
}
