//! Deterministic graph synthesis from an ordered step list.
//!
//! `synthesize` is a pure function: the same step list always yields
//! byte-identical node and edge sets (ids, positions, option values). The
//! layout is a single vertical chain sharing one horizontal anchor.

use crate::types::{NodeKind, Position, Step, Tool, WorkflowEdge, WorkflowGraph, WorkflowNode};

/// Horizontal anchor shared by every synthesized node.
pub const ANCHOR_X: f64 = 280.0;
/// Vertical position of the start node.
pub const START_Y: f64 = 100.0;
/// Vertical position of the first step node.
pub const FIRST_STEP_Y: f64 = 250.0;
/// Vertical pitch between consecutive chain nodes.
pub const STEP_PITCH_Y: f64 = 200.0;
/// Reserved id of the final edge into the end node.
pub const FINAL_EDGE_ID: &str = "edge_end";

/// Builds the full workflow graph for an ordered step list.
///
/// Chain: `start → step_0 → … → step_{n-1} → end`, or `start → end` when the
/// list is empty. Step i becomes node `step_{i}` (pick or drop, with the
/// step's object as the selected option); transition edges are `edge_{i}` and
/// the final edge into `end` is [FINAL_EDGE_ID].
pub fn synthesize(steps: &[Step]) -> WorkflowGraph {
  let mut graph = WorkflowGraph::new();

  graph.nodes.push(WorkflowNode::new(
    "start",
    NodeKind::Start,
    Position::new(ANCHOR_X, START_Y),
    "Start",
  ));

  let mut current_y = FIRST_STEP_Y;
  let mut previous_id = "start".to_string();

  for (index, step) in steps.iter().enumerate() {
    let node_id = format!("step_{index}");
    let (kind, label) = match step.tool {
      Tool::Pick => (NodeKind::Pick, "Pick"),
      Tool::Place => (NodeKind::Drop, "Drop"),
    };

    let mut node = WorkflowNode::new(&node_id, kind, Position::new(ANCHOR_X, current_y), label);
    node.selected_option = Some(step.object.clone());
    graph.nodes.push(node);

    graph
      .edges
      .push(WorkflowEdge::new(format!("edge_{index}"), &previous_id, &node_id));

    previous_id = node_id;
    current_y += STEP_PITCH_Y;
  }

  graph.nodes.push(WorkflowNode::new(
    "end",
    NodeKind::End,
    Position::new(ANCHOR_X, current_y),
    "End",
  ));
  graph
    .edges
    .push(WorkflowEdge::new(FINAL_EDGE_ID, &previous_id, "end"));

  graph
}
