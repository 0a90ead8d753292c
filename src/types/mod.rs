//! Workflow graph data model.
//!
//! Steps are what the remote controller streams; nodes, edges and the graph
//! are what the canvas renders. All types serialize as the camelCase JSON the
//! rendering layer consumes.

mod edge;
mod graph;
mod node;
mod step;

pub use edge::WorkflowEdge;
pub use graph::WorkflowGraph;
pub use node::{
  DELAY_MIN_SECONDS, DELAY_STEP_SECONDS, NodeKind, Position, WorkflowNode, clamp_delay,
};
pub use step::{Step, Tool};
