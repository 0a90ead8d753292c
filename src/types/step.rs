//! One remote-supplied robot instruction.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tool named by a remote step. `pick` grabs an object, `place` sets it down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
  Pick,
  Place,
}

impl fmt::Display for Tool {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Tool::Pick => write!(f, "pick"),
      Tool::Place => write!(f, "place"),
    }
  }
}

/// One remote instruction: which tool to run and on which object.
///
/// Steps are immutable once decoded. Their order inside a frame is
/// load-bearing: it is the execution sequence of the arm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
  pub tool: Tool,
  pub object: String,
}

impl Step {
  pub fn new(tool: Tool, object: impl Into<String>) -> Self {
    Self {
      tool,
      object: object.into(),
    }
  }
}
