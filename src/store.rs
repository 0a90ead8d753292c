//! In-memory authoritative graph and the edit operations API.
//!
//! The store is single-writer: the synthesis-replace path and the edit
//! operations are the only mutators, and callers serialize access through
//! [SharedStore]. Every operation is synchronous and total: referencing a
//! missing id is a no-op, never a panic.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, instrument, warn};

use crate::decoder::{DecodeError, decode_steps};
use crate::synthesizer::synthesize;
use crate::types::{NodeKind, Position, WorkflowEdge, WorkflowGraph, WorkflowNode, clamp_delay};

/// A mutable field on an existing node.
#[derive(Debug, Clone)]
pub enum NodeField {
  /// Object/container choice on a pick or drop node.
  SelectedOption(String),
  /// Delay duration on a delay node; clamped to ≥ 5 and rounded to steps of 5.
  DelaySeconds(u32),
}

/// Result of a connect-or-toggle request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggle {
  /// A new edge was inserted; carries its id.
  Connected(String),
  /// The existing edge between the pair was removed; carries its id.
  Removed(String),
  /// Self-loop or unknown endpoint; the graph is unchanged.
  Rejected,
}

/// Shared handle to the store. Each lock scope is one atomic mutation.
pub type SharedStore = Arc<Mutex<GraphStore>>;

/// Creates a fresh shared store with an empty graph.
pub fn shared_store() -> SharedStore {
  Arc::new(Mutex::new(GraphStore::new()))
}

/// Locks a shared store, recovering the inner state if a writer panicked.
pub fn lock(store: &SharedStore) -> MutexGuard<'_, GraphStore> {
  store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Authoritative in-memory workflow graph.
///
/// Holds the current graph, the `has_received_data` flag (true once one valid
/// frame has been decoded), and the monotonic id counters for user-added
/// nodes and edges. Counters are process-lifetime and never reused, even
/// across deletions or graph replacement.
#[derive(Debug, Default)]
pub struct GraphStore {
  graph: WorkflowGraph,
  has_received_data: bool,
  node_seq: u64,
  link_seq: u64,
}

impl GraphStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Current graph snapshot for the rendering layer.
  pub fn snapshot(&self) -> WorkflowGraph {
    self.graph.clone()
  }

  /// Borrowed view of the current graph.
  pub fn graph(&self) -> &WorkflowGraph {
    &self.graph
  }

  /// True once at least one valid frame has been decoded.
  pub fn has_received_data(&self) -> bool {
    self.has_received_data
  }

  /// Wholesale graph swap, invoked only by the synthesis path.
  ///
  /// Remote is authoritative: user-added nodes and local edits to synthesized
  /// nodes are discarded by the swap. That loss is deliberate policy, not a
  /// merge failure.
  pub fn replace_graph(&mut self, graph: WorkflowGraph) {
    self.graph = graph;
    self.has_received_data = true;
  }

  /// Decodes a frame, synthesizes the graph and swaps it in, atomically from
  /// the caller's perspective. On decode error the graph is left untouched.
  #[instrument(level = "debug", skip(self, payload))]
  pub fn apply_frame(&mut self, payload: &str) -> Result<(), DecodeError> {
    let steps = decode_steps(payload)?;
    debug!(steps = steps.len(), "applying frame");
    self.replace_graph(synthesize(&steps));
    Ok(())
  }

  /// Inserts a free-floating node at `position` and returns its fresh id.
  ///
  /// Ids are `{kind}_{counter}`, e.g. `delay_0`, `pick_3`.
  pub fn add_node(&mut self, kind: NodeKind, position: Position, label: &str) -> String {
    let id = format!("{kind}_{}", self.node_seq);
    self.node_seq += 1;
    self
      .graph
      .nodes
      .push(WorkflowNode::new(&id, kind, position, label));
    debug!(id = %id, "node added");
    id
  }

  /// Adds an edge `source → target`, unless one already exists between the
  /// unordered pair (in either direction), in which case that edge is removed
  /// instead. Connecting onto an existing link is how the canvas deletes it.
  pub fn connect_or_toggle(&mut self, source: &str, target: &str) -> Toggle {
    if source == target {
      warn!(node = %source, "self-loop rejected");
      return Toggle::Rejected;
    }
    if self.graph.node(source).is_none() || self.graph.node(target).is_none() {
      return Toggle::Rejected;
    }

    if let Some(existing) = self.graph.edge_between(source, target) {
      let id = existing.id.clone();
      self.graph.edges.retain(|e| e.id != id);
      debug!(id = %id, "edge toggled off");
      return Toggle::Removed(id);
    }

    let id = format!("link_{}", self.link_seq);
    self.link_seq += 1;
    self
      .graph
      .edges
      .push(WorkflowEdge::new(&id, source, target));
    debug!(id = %id, "edge added");
    Toggle::Connected(id)
  }

  /// Removes the node and every incident edge in one step, so dangling edges
  /// never exist. Unknown id is a no-op.
  pub fn delete_node(&mut self, node_id: &str) {
    let before = self.graph.nodes.len();
    self.graph.nodes.retain(|n| n.id != node_id);
    if self.graph.nodes.len() < before {
      self.graph.edges.retain(|e| !e.touches(node_id));
      debug!(id = %node_id, "node deleted with incident edges");
    }
  }

  /// Removes exactly that edge; no cascade. Unknown id is a no-op.
  pub fn delete_edge(&mut self, edge_id: &str) {
    self.graph.edges.retain(|e| e.id != edge_id);
  }

  /// Updates a node-local field. Fields only apply to the node kinds they
  /// belong to; unknown id or mismatched kind is a no-op. Returns whether the
  /// update was applied.
  pub fn set_node_field(&mut self, node_id: &str, field: NodeField) -> bool {
    let Some(node) = self.graph.node_mut(node_id) else {
      return false;
    };
    match field {
      NodeField::SelectedOption(option) if node.accepts_option() => {
        node.selected_option = Some(option);
        true
      }
      NodeField::DelaySeconds(seconds) if node.is_delay() => {
        node.delay_seconds = Some(clamp_delay(seconds));
        true
      }
      _ => false,
    }
  }

  /// Nudges a delay node by `steps` increments of the fixed delay step,
  /// flooring at the minimum. Returns the new value when applied.
  pub fn adjust_delay(&mut self, node_id: &str, steps: i32) -> Option<u32> {
    use crate::types::{DELAY_MIN_SECONDS, DELAY_STEP_SECONDS};
    let node = self.graph.node_mut(node_id)?;
    if !node.is_delay() {
      return None;
    }
    let current = i64::from(node.delay_seconds.unwrap_or(DELAY_MIN_SECONDS));
    let next = current + i64::from(steps) * i64::from(DELAY_STEP_SECONDS);
    let next = next.clamp(i64::from(DELAY_MIN_SECONDS), i64::from(u32::MAX)) as u32;
    let next = clamp_delay(next);
    node.delay_seconds = Some(next);
    Some(next)
  }
}
