//! A node in the workflow graph.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum value for a delay node, in seconds.
pub const DELAY_MIN_SECONDS: u32 = 5;
/// Increment step for delay adjustments, in seconds.
pub const DELAY_STEP_SECONDS: u32 = 5;

/// Clamps a delay value to the minimum and rounds it to the nearest step.
pub fn clamp_delay(seconds: u32) -> u32 {
  // Widened so rounding near u32::MAX cannot overflow.
  let step = u64::from(DELAY_STEP_SECONDS);
  let rounded = (u64::from(seconds) + step / 2) / step * step;
  rounded
    .max(u64::from(DELAY_MIN_SECONDS))
    .min(u64::from(u32::MAX)) as u32
}

/// Stage kind of a workflow node.
///
/// `Start` and `End` bracket a synthesized chain; `Pick`, `Drop` and `Delay`
/// are the working stages. The lowercase form doubles as the id prefix for
/// user-added nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
  Start,
  Pick,
  Drop,
  Delay,
  End,
}

impl fmt::Display for NodeKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      NodeKind::Start => write!(f, "start"),
      NodeKind::Pick => write!(f, "pick"),
      NodeKind::Drop => write!(f, "drop"),
      NodeKind::Delay => write!(f, "delay"),
      NodeKind::End => write!(f, "end"),
    }
  }
}

/// A position on the canvas, in real-valued canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
  pub x: f64,
  pub y: f64,
}

impl Position {
  pub fn new(x: f64, y: f64) -> Self {
    Self { x, y }
  }
}

/// A vertex in the workflow graph.
///
/// The `id` is the node's sole identity for its lifetime: edges reference it
/// and deletions name it. `selected_option` only carries meaning for pick and
/// drop nodes, `delay_seconds` only for delay nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowNode {
  pub id: String,
  pub kind: NodeKind,
  pub position: Position,
  pub label: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub selected_option: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub delay_seconds: Option<u32>,
}

impl WorkflowNode {
  pub fn new(id: impl Into<String>, kind: NodeKind, position: Position, label: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      kind,
      position,
      label: label.into(),
      selected_option: None,
      delay_seconds: None,
    }
  }

  /// True for node kinds that carry an object/container choice.
  pub fn accepts_option(&self) -> bool {
    matches!(self.kind, NodeKind::Pick | NodeKind::Drop)
  }

  pub fn is_delay(&self) -> bool {
    self.kind == NodeKind::Delay
  }
}
