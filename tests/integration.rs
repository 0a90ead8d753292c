//! End-to-end tests over a real in-process WebSocket server: frames flow
//! socket → decoder → synthesizer → store, drops trigger the reconnect
//! policy, and shutdown cancels any pending reconnect.

use std::time::Duration;

use armflow::config::ConnectionConfig;
use armflow::connection::{ConnectionManager, ConnectionState, FixedDelay};
use armflow::store::{self, SharedStore, shared_store};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

const TWO_STEPS: &str = r#"[{"tool":"pick","object":"Cube"},{"tool":"place","object":"Box"}]"#;
const ONE_STEP: &str = r#"[{"tool":"pick","object":"Tape"}]"#;

async fn bind_server() -> (TcpListener, String) {
  let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
  let addr = listener.local_addr().expect("local addr");
  (listener, format!("ws://{addr}/ws"))
}

fn zero_delay_manager(url: &str) -> ConnectionManager {
  ConnectionManager::with_policy(
    ConnectionConfig::new(url),
    Box::new(FixedDelay(Duration::ZERO)),
  )
}

/// Polls `f` against the store until it holds or the timeout elapses.
async fn wait_for(store: &SharedStore, timeout: Duration, f: impl Fn(&armflow::GraphStore) -> bool) -> bool {
  let deadline = tokio::time::Instant::now() + timeout;
  loop {
    if f(&*store::lock(store)) {
      return true;
    }
    if tokio::time::Instant::now() >= deadline {
      return false;
    }
    tokio::time::sleep(Duration::from_millis(10)).await;
  }
}

#[tokio::test]
async fn frame_is_applied_end_to_end() {
  let (listener, url) = bind_server().await;
  let server = tokio::spawn(async move {
    let (stream, _) = listener.accept().await.expect("accept");
    let mut ws = accept_async(stream).await.expect("handshake");
    ws.send(Message::Text(TWO_STEPS.to_string())).await.expect("send");
    // Park until the client closes.
    while ws.next().await.is_some() {}
  });

  let store = shared_store();
  let (shutdown_tx, shutdown_rx) = watch::channel(false);
  let link = tokio::spawn(zero_delay_manager(&url).run(store.clone(), shutdown_rx));

  assert!(wait_for(&store, Duration::from_secs(5), |s| s.has_received_data()).await);
  {
    let guard = store::lock(&store);
    let graph = guard.graph();
    let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["start", "step_0", "step_1", "end"]);
    assert_eq!(graph.edges.len(), 3);
    assert_eq!(
      graph.node("step_0").unwrap().selected_option.as_deref(),
      Some("Cube")
    );
  }

  shutdown_tx.send(true).expect("signal shutdown");
  tokio::time::timeout(Duration::from_secs(5), link)
    .await
    .expect("link stops after shutdown")
    .expect("link task");
  server.abort();
}

#[tokio::test]
async fn reconnects_after_server_drop_and_applies_next_frame() {
  let (listener, url) = bind_server().await;
  let server = tokio::spawn(async move {
    // First connection: one frame, then drop.
    let (stream, _) = listener.accept().await.expect("accept 1");
    let mut ws = accept_async(stream).await.expect("handshake 1");
    ws.send(Message::Text(ONE_STEP.to_string())).await.expect("send 1");
    ws.close(None).await.expect("close 1");

    // Second connection after the client's reconnect: the richer frame.
    let (stream, _) = listener.accept().await.expect("accept 2");
    let mut ws = accept_async(stream).await.expect("handshake 2");
    ws.send(Message::Text(TWO_STEPS.to_string())).await.expect("send 2");
    while ws.next().await.is_some() {}
  });

  let store = shared_store();
  let (shutdown_tx, shutdown_rx) = watch::channel(false);
  let link = tokio::spawn(zero_delay_manager(&url).run(store.clone(), shutdown_rx));

  // One step first, four nodes after the reconnect.
  assert!(wait_for(&store, Duration::from_secs(5), |s| s.graph().nodes.len() == 4).await);
  assert_eq!(
    store::lock(&store).graph().node("step_1").unwrap().selected_option.as_deref(),
    Some("Box")
  );

  shutdown_tx.send(true).expect("signal shutdown");
  tokio::time::timeout(Duration::from_secs(5), link)
    .await
    .expect("link stops after shutdown")
    .expect("link task");
  server.abort();
}

#[tokio::test]
async fn malformed_frame_is_dropped_and_stream_continues() {
  let (listener, url) = bind_server().await;
  let server = tokio::spawn(async move {
    let (stream, _) = listener.accept().await.expect("accept");
    let mut ws = accept_async(stream).await.expect("handshake");
    ws.send(Message::Text(r#"{"tool":"unknown"}"#.to_string()))
      .await
      .expect("send bad");
    ws.send(Message::Text(TWO_STEPS.to_string())).await.expect("send good");
    while ws.next().await.is_some() {}
  });

  let store = shared_store();
  let (shutdown_tx, shutdown_rx) = watch::channel(false);
  let link = tokio::spawn(zero_delay_manager(&url).run(store.clone(), shutdown_rx));

  assert!(wait_for(&store, Duration::from_secs(5), |s| s.has_received_data()).await);
  // Only the valid frame reached the graph.
  assert_eq!(store::lock(&store).graph().nodes.len(), 4);

  shutdown_tx.send(true).expect("signal shutdown");
  tokio::time::timeout(Duration::from_secs(5), link)
    .await
    .expect("link stops after shutdown")
    .expect("link task");
  server.abort();
}

#[tokio::test]
async fn shutdown_closes_gracefully_without_reconnect() {
  let (listener, url) = bind_server().await;
  let server = tokio::spawn(async move {
    let (stream, _) = listener.accept().await.expect("accept");
    let mut ws = accept_async(stream).await.expect("handshake");
    ws.send(Message::Text(ONE_STEP.to_string())).await.expect("send");
    while ws.next().await.is_some() {}
    listener
  });

  let store = shared_store();
  let (shutdown_tx, shutdown_rx) = watch::channel(false);
  let manager = zero_delay_manager(&url);
  let mut state = manager.state();
  let link = tokio::spawn(manager.run(store.clone(), shutdown_rx));

  assert!(wait_for(&store, Duration::from_secs(5), |s| s.has_received_data()).await);
  shutdown_tx.send(true).expect("signal shutdown");
  tokio::time::timeout(Duration::from_secs(5), link)
    .await
    .expect("link stops after shutdown")
    .expect("link task");
  assert_eq!(*state.borrow_and_update(), ConnectionState::Disconnected);

  // No reconnect attempt arrives after a graceful shutdown.
  let listener = server.await.expect("server task");
  let second = tokio::time::timeout(Duration::from_millis(300), listener.accept()).await;
  assert!(second.is_err(), "unexpected reconnect after shutdown");
}

#[tokio::test]
async fn shutdown_during_reconnect_delay_cancels_the_timer() {
  let (listener, url) = bind_server().await;
  let server = tokio::spawn(async move {
    // Accept then drop immediately, pushing the client into its delay.
    let (stream, _) = listener.accept().await.expect("accept");
    let mut ws = accept_async(stream).await.expect("handshake");
    ws.close(None).await.expect("close");
  });

  let store = shared_store();
  let (shutdown_tx, shutdown_rx) = watch::channel(false);
  let manager = ConnectionManager::with_policy(
    ConnectionConfig::new(&url),
    Box::new(FixedDelay(Duration::from_secs(30))),
  );
  let link = tokio::spawn(manager.run(store.clone(), shutdown_rx));

  // Let the client observe the drop and enter its reconnect delay.
  server.await.expect("server task");
  tokio::time::sleep(Duration::from_millis(100)).await;

  // Shutdown must preempt the 30s reconnect delay.
  shutdown_tx.send(true).expect("signal shutdown");
  tokio::time::timeout(Duration::from_secs(2), link)
    .await
    .expect("pending reconnect cancelled")
    .expect("link task");
}
