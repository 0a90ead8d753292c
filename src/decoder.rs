//! Decode inbound frames into an ordered step list.
//!
//! The remote controller sends either one step record or a JSON array of
//! records; each frame is the full current sequence, not a delta. A frame that
//! fails to decode is rejected whole so the graph never sees a partial update.

use crate::types::Step;
use serde::Deserialize;
use thiserror::Error;

/// A frame that could not be decoded into steps.
#[derive(Debug, Error)]
pub enum DecodeError {
  /// Top-level parse failure, unknown `tool` value, or missing field.
  #[error("invalid step frame: {0}")]
  Frame(#[from] serde_json::Error),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Frame {
  Many(Vec<Step>),
  One(Step),
}

/// Decodes a frame payload into an ordered step list.
///
/// A single record decodes as a one-element list. Any malformed record
/// rejects the entire payload.
pub fn decode_steps(payload: &str) -> Result<Vec<Step>, DecodeError> {
  let frame: Frame = serde_json::from_str(payload)?;
  Ok(match frame {
    Frame::Many(steps) => steps,
    Frame::One(step) => vec![step],
  })
}
