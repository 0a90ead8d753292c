//! A directed edge in the workflow graph.

use serde::{Deserialize, Serialize};

/// A directed connection `source → target` representing execution order.
///
/// Edges carry no state beyond their endpoints; at most one edge exists
/// between any unordered pair of nodes (the store's toggle rule enforces it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowEdge {
  pub id: String,
  pub source: String,
  pub target: String,
}

impl WorkflowEdge {
  pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      source: source.into(),
      target: target.into(),
    }
  }

  /// True if either endpoint is `node_id`.
  pub fn touches(&self, node_id: &str) -> bool {
    self.source == node_id || self.target == node_id
  }

  /// True if the edge connects `a` and `b` in either direction.
  pub fn links(&self, a: &str, b: &str) -> bool {
    (self.source == a && self.target == b) || (self.source == b && self.target == a)
  }
}
