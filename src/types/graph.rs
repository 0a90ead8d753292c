//! The workflow graph: nodes plus edges.

use serde::{Deserialize, Serialize};

use super::{NodeKind, WorkflowEdge, WorkflowNode};

/// The full workflow graph held by the store and handed to the renderer.
///
/// Nodes and edges keep insertion order so a synthesized graph always
/// serializes identically for identical input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowGraph {
  pub nodes: Vec<WorkflowNode>,
  pub edges: Vec<WorkflowEdge>,
}

impl WorkflowGraph {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn node(&self, id: &str) -> Option<&WorkflowNode> {
    self.nodes.iter().find(|n| n.id == id)
  }

  pub fn node_mut(&mut self, id: &str) -> Option<&mut WorkflowNode> {
    self.nodes.iter_mut().find(|n| n.id == id)
  }

  pub fn edge(&self, id: &str) -> Option<&WorkflowEdge> {
    self.edges.iter().find(|e| e.id == id)
  }

  /// Edge between `a` and `b`, matching either direction.
  pub fn edge_between(&self, a: &str, b: &str) -> Option<&WorkflowEdge> {
    self.edges.iter().find(|e| e.links(a, b))
  }

  /// All edges with `node_id` as source or target.
  pub fn edges_touching(&self, node_id: &str) -> Vec<&WorkflowEdge> {
    self.edges.iter().filter(|e| e.touches(node_id)).collect()
  }

  /// First node of the given kind, if any.
  pub fn find_kind(&self, kind: NodeKind) -> Option<&WorkflowNode> {
    self.nodes.iter().find(|n| n.kind == kind)
  }

  pub fn outgoing_edges(&self, node_id: &str) -> Vec<&WorkflowEdge> {
    self.edges.iter().filter(|e| e.source == node_id).collect()
  }
}
