//! # armflow
//!
//! Robot-arm workflow graph model and live-synchronization engine.
//!
//! A remote controller streams the authoritative step sequence (pick/place
//! instructions) over a persistent WebSocket. Each frame is decoded, a full
//! workflow graph is synthesized from it deterministically, and the in-memory
//! store swaps the graph in atomically. The rendering layer consumes
//! snapshots from the store and drives the edit operations (add node,
//! connect-or-toggle, delete, set field) for drag-and-drop editing.
//!
//! ## Data flow
//!
//! Remote frames: socket → [decoder] → [synthesizer] → [store] (replace).
//! User gestures: rendering layer → [store] edit operations → next snapshot.
//!
//! Remote is authoritative: a new frame replaces the whole graph, including
//! nodes added locally since the last frame.

pub mod config;
pub mod connection;
pub mod decoder;
pub mod store;
pub mod synthesizer;
pub mod types;

pub use config::ConnectionConfig;
pub use connection::{ConnectionManager, ConnectionState, FixedDelay, ReconnectPolicy};
pub use decoder::{DecodeError, decode_steps};
pub use store::{GraphStore, NodeField, SharedStore, Toggle, shared_store};
pub use synthesizer::synthesize;
pub use types::{NodeKind, Position, Step, Tool, WorkflowEdge, WorkflowGraph, WorkflowNode};
