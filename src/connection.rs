//! Persistent WebSocket link to the remote step producer.
//!
//! One logical full-duplex stream: connect, forward each text frame through
//! the store's atomic replace, and on any close or error schedule exactly one
//! reconnect after the policy delay. Shutdown closes with a normal-closure
//! code and cancels the pending reconnect instead of chaining another one.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::sync::watch;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tracing::{debug, info, instrument, warn};

use crate::config::ConnectionConfig;
use crate::store::{self, SharedStore};

/// Observable state of the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
  Disconnected,
  Connecting,
  Connected,
}

/// Strategy for the delay between a drop and the next connect attempt.
///
/// A trait rather than a constant so tests can substitute zero-delay timing.
pub trait ReconnectPolicy: Send + Sync {
  fn delay(&self) -> Duration;
}

/// Fixed-delay reconnect, the production policy.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl Default for FixedDelay {
  fn default() -> Self {
    Self(Duration::from_secs(3))
  }
}

impl ReconnectPolicy for FixedDelay {
  fn delay(&self) -> Duration {
    self.0
  }
}

/// Guard flags for the connect/reconnect cycle, kept apart from the socket so
/// the scheduling rules are testable without I/O.
///
/// Rules: `begin_connect` is a no-op while a connect is already in flight;
/// close/error schedules at most one reconnect at a time; open clears the
/// connecting flag and any pending-reconnect marker; after shutdown nothing
/// schedules anymore.
#[derive(Debug, Default)]
pub(crate) struct LinkState {
  connecting: bool,
  reconnect_pending: bool,
  shut_down: bool,
}

impl LinkState {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  /// Attempts to enter the connecting state. False when a connect is already
  /// in flight or the link has shut down.
  pub(crate) fn begin_connect(&mut self) -> bool {
    if self.connecting || self.shut_down {
      return false;
    }
    self.connecting = true;
    true
  }

  /// Socket opened: the connecting flag and any pending reconnect are cleared.
  pub(crate) fn on_open(&mut self) {
    self.connecting = false;
    self.reconnect_pending = false;
  }

  /// Connect attempt failed before opening. Clears the connecting flag only.
  pub(crate) fn on_error(&mut self) {
    self.connecting = false;
  }

  /// Socket closed or errored after opening. Returns true when the caller
  /// should schedule a reconnect: at most one may be pending, and none after
  /// shutdown.
  pub(crate) fn on_close(&mut self) -> bool {
    self.connecting = false;
    if self.shut_down || self.reconnect_pending {
      return false;
    }
    self.reconnect_pending = true;
    true
  }

  /// The reconnect delay elapsed. Returns true when the caller should
  /// actually reconnect (false after shutdown).
  pub(crate) fn reconnect_elapsed(&mut self) -> bool {
    self.reconnect_pending = false;
    !self.shut_down
  }

  /// Graceful shutdown. Returns true when a pending reconnect was cancelled.
  pub(crate) fn shutdown(&mut self) -> bool {
    self.shut_down = true;
    self.connecting = false;
    std::mem::take(&mut self.reconnect_pending)
  }

  #[cfg(test)]
  pub(crate) fn reconnect_pending(&self) -> bool {
    self.reconnect_pending
  }
}

/// Owns the socket and the reconnect timer; nothing else touches either.
pub struct ConnectionManager {
  config: ConnectionConfig,
  policy: Box<dyn ReconnectPolicy>,
  link: LinkState,
  state_tx: watch::Sender<ConnectionState>,
}

impl ConnectionManager {
  pub fn new(config: ConnectionConfig) -> Self {
    Self::with_policy(config, Box::new(FixedDelay::default()))
  }

  pub fn with_policy(config: ConnectionConfig, policy: Box<dyn ReconnectPolicy>) -> Self {
    let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
    Self {
      config,
      policy,
      link: LinkState::new(),
      state_tx,
    }
  }

  /// Receiver for connection state changes; subscribe before calling `run`.
  pub fn state(&self) -> watch::Receiver<ConnectionState> {
    self.state_tx.subscribe()
  }

  fn publish(&self, state: ConnectionState) {
    let _ = self.state_tx.send(state);
  }

  /// Drives the link until `shutdown` flips to true.
  ///
  /// Each received text frame goes through [store::lock] →
  /// `GraphStore::apply_frame` as one atomic replace. Malformed frames are
  /// warn-logged and dropped; transport errors leave the graph at its
  /// last-known-good state and trigger the reconnect policy.
  #[instrument(level = "info", skip(self, store, shutdown), fields(url = %self.config.url))]
  pub async fn run(mut self, store: SharedStore, mut shutdown: watch::Receiver<bool>) {
    loop {
      if !self.link.begin_connect() {
        break;
      }
      self.publish(ConnectionState::Connecting);
      debug!("connecting");

      let connected = tokio::select! {
        r = connect_async(self.config.url.as_str()) => r,
        _ = wait_for_shutdown(&mut shutdown) => {
          self.link.shutdown();
          break;
        }
      };

      match connected {
        Ok((ws, _response)) => {
          self.link.on_open();
          self.publish(ConnectionState::Connected);
          info!("connected");

          let (mut sink, mut stream) = ws.split();
          let mut graceful = false;
          loop {
            tokio::select! {
              msg = stream.next() => match msg {
                Some(Ok(Message::Text(payload))) => {
                  let mut guard = store::lock(&store);
                  if let Err(e) = guard.apply_frame(&payload) {
                    warn!(error = %e, "dropping malformed frame");
                  }
                }
                Some(Ok(Message::Close(frame))) => {
                  info!(?frame, "peer closed");
                  break;
                }
                Some(Ok(_)) => {} // ping/pong/binary: nothing to decode
                Some(Err(e)) => {
                  warn!(error = %e, "socket error");
                  break;
                }
                None => {
                  info!("stream ended");
                  break;
                }
              },
              _ = wait_for_shutdown(&mut shutdown) => {
                let close = Message::Close(Some(CloseFrame {
                  code: CloseCode::Normal,
                  reason: "shutdown".into(),
                }));
                if let Err(e) = sink.send(close).await {
                  debug!(error = %e, "close handshake failed");
                }
                graceful = true;
                break;
              }
            }
          }
          if graceful {
            self.link.shutdown();
            break;
          }
        }
        Err(e) => {
          self.link.on_error();
          warn!(error = %e, "connect failed");
        }
      }

      // Dropped or failed: schedule exactly one reconnect.
      if !self.link.on_close() {
        break;
      }
      self.publish(ConnectionState::Disconnected);
      let delay = self.policy.delay();
      debug!(delay_ms = delay.as_millis() as u64, "reconnect scheduled");
      tokio::select! {
        _ = tokio::time::sleep(delay) => {
          if !self.link.reconnect_elapsed() {
            break;
          }
        }
        _ = wait_for_shutdown(&mut shutdown) => {
          self.link.shutdown();
          break;
        }
      }
    }

    self.publish(ConnectionState::Disconnected);
    info!("link stopped");
  }
}

/// Resolves once the shutdown flag flips to true (or its sender is dropped).
async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
  loop {
    if *shutdown.borrow() {
      return;
    }
    if shutdown.changed().await.is_err() {
      return;
    }
  }
}
