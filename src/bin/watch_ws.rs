//! CLI: watch a remote step producer and print the live workflow graph.
//!
//! Connects to the producer's WebSocket endpoint, keeps the graph store in
//! sync, and prints a one-line chain summary whenever the graph changes.
//! Ctrl-C shuts the link down gracefully (normal-closure code, no reconnect).
//!
//! Usage: `watch_ws [--url ws://host:port/ws]`
//!
//! Set RUST_LOG=armflow=debug for per-frame logging.

use std::time::Duration;

use armflow::config::{ConnectionConfig, WS_URL_ENV};
use armflow::connection::ConnectionManager;
use armflow::store::{self, shared_store};
use armflow::types::WorkflowGraph;
use clap::Parser;
use std::env;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Watch a remote step producer and print the live workflow graph.
#[derive(Parser, Debug)]
#[command(name = "watch_ws")]
#[command(after_help = "Environment variables:
  ARMFLOW_WS_URL   Producer endpoint; overrides --url when set.

Examples:
  watch_ws
  watch_ws --url ws://192.168.1.20:8000/ws")]
struct Args {
  /// Producer WebSocket endpoint. Overridden by ARMFLOW_WS_URL if set.
  #[arg(long, value_name = "URL")]
  url: Option<String>,
}

/// One line per chain: `start -> step_0[pick Cube] -> end (4 nodes, 3 edges)`.
fn summarize(graph: &WorkflowGraph) -> String {
  let mut parts = Vec::with_capacity(graph.nodes.len());
  let mut current = graph.node("start").map(|n| n.id.clone());
  let mut hops = 0;
  while let Some(id) = current {
    let part = match graph.node(&id).and_then(|n| n.selected_option.as_deref()) {
      Some(option) => format!("{id}[{option}]"),
      None => id.clone(),
    };
    parts.push(part);
    current = graph.outgoing_edges(&id).first().map(|e| e.target.clone());
    hops += 1;
    if hops > graph.nodes.len() {
      break;
    }
  }
  format!(
    "{} ({} nodes, {} edges)",
    parts.join(" -> "),
    graph.nodes.len(),
    graph.edges.len()
  )
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let args = Args::parse();

  // Env var overrides the flag, matching the producer-side convention.
  let config = match env::var(WS_URL_ENV).ok().or(args.url) {
    Some(url) => ConnectionConfig::new(url),
    None => ConnectionConfig::default(),
  };
  info!(url = %config.url, "watching producer");

  let store = shared_store();
  let (shutdown_tx, shutdown_rx) = watch::channel(false);
  let manager = ConnectionManager::new(config);
  let link = tokio::spawn(manager.run(store.clone(), shutdown_rx));

  let mut last_summary = String::new();
  let mut ticker = tokio::time::interval(Duration::from_millis(250));
  loop {
    tokio::select! {
      _ = ticker.tick() => {
        let snapshot = {
          let guard = store::lock(&store);
          guard.has_received_data().then(|| guard.snapshot())
        };
        if let Some(graph) = snapshot {
          let summary = summarize(&graph);
          if summary != last_summary {
            println!("{summary}");
            last_summary = summary;
          }
        }
      }
      _ = tokio::signal::ctrl_c() => {
        info!("shutting down");
        break;
      }
    }
  }

  let _ = shutdown_tx.send(true);
  let _ = link.await;
}
