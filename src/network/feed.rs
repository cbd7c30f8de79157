// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Reconnecting TCP reader for sentence feeds.
//!
//! A [`Feed`] owns a background task that connects, forwards every received
//! line and reconnects after a delay when the server goes away.

use std::time::Duration;

use log::{error, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::config::DEFAULT_FEED_ADDRESS;

/// Configuration for a feed connection.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Server address in "host:port" format.
    pub address: String,
    /// Delay before reconnecting after disconnect.
    pub reconnect_delay: Duration,
    /// Channel buffer size for received lines.
    pub buffer_size: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_FEED_ADDRESS.to_string(),
            reconnect_delay: Duration::from_secs(5),
            buffer_size: 1024,
        }
    }
}

/// Feed connection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedState {
    Connecting,
    Connected,
    /// Server closed the connection; a reconnect follows.
    Disconnected,
    Error(String),
}

/// Events emitted by the feed task.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    StateChanged(FeedState),
    /// One received line, without its terminator.
    Line(Vec<u8>),
}

/// Handle to a running feed.
///
/// Dropping the handle stops the background task.
pub struct Feed {
    event_rx: mpsc::Receiver<FeedEvent>,
    cancel_token: CancellationToken,
}

impl std::fmt::Debug for Feed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Feed")
            .field("cancel_token", &self.cancel_token)
            .finish_non_exhaustive()
    }
}

impl Feed {
    /// Spawn the feed task. Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn(config: FeedConfig) -> Self {
        let (event_tx, event_rx) = mpsc::channel(config.buffer_size);
        let cancel_token = CancellationToken::new();
        let task_cancel = cancel_token.clone();

        tokio::spawn(async move {
            feed_loop(event_tx, config.address, task_cancel, config.reconnect_delay).await;
        });

        Self {
            event_rx,
            cancel_token,
        }
    }

    /// Receive the next event.
    ///
    /// Returns `None` once the feed has shut down.
    pub async fn recv(&mut self) -> Option<FeedEvent> {
        self.event_rx.recv().await
    }

    /// Stop the feed.
    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}

impl Drop for Feed {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

async fn feed_loop(
    event_tx: mpsc::Sender<FeedEvent>,
    address: String,
    cancel_token: CancellationToken,
    reconnect_delay: Duration,
) {
    loop {
        if cancel_token.is_cancelled() {
            info!("Feed cancelled");
            return;
        }

        if event_tx
            .send(FeedEvent::StateChanged(FeedState::Connecting))
            .await
            .is_err()
        {
            return; // Receiver dropped
        }

        info!("Connecting to {address}...");

        match connect_and_read(&address, &event_tx, &cancel_token).await {
            Ok(StopReason::ConnectionClosed) => {
                info!("Feed closed by server");
                let _ = event_tx
                    .send(FeedEvent::StateChanged(FeedState::Disconnected))
                    .await;
            }
            Ok(StopReason::Cancelled) => {
                info!("Feed cancelled");
                return;
            }
            Err(e) => {
                error!("Feed error: {e}");
                let _ = event_tx
                    .send(FeedEvent::StateChanged(FeedState::Error(e.to_string())))
                    .await;
            }
        }

        warn!("Reconnecting in {} seconds...", reconnect_delay.as_secs());

        tokio::select! {
            () = sleep(reconnect_delay) => {}
            () = cancel_token.cancelled() => {
                info!("Feed cancelled during reconnect delay");
                return;
            }
        }
    }
}

enum StopReason {
    ConnectionClosed,
    Cancelled,
}

async fn connect_and_read(
    address: &str,
    event_tx: &mpsc::Sender<FeedEvent>,
    cancel_token: &CancellationToken,
) -> Result<StopReason, std::io::Error> {
    let stream = tokio::select! {
        stream = TcpStream::connect(address) => stream?,
        () = cancel_token.cancelled() => return Ok(StopReason::Cancelled),
    };
    info!("Connected to {address}");

    if event_tx
        .send(FeedEvent::StateChanged(FeedState::Connected))
        .await
        .is_err()
    {
        return Ok(StopReason::Cancelled);
    }

    // Lines are read as bytes so one bad byte spoils a sentence, not the
    // connection.
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        tokio::select! {
            read = reader.read_until(b'\n', &mut buf) => {
                if read? == 0 {
                    return Ok(StopReason::ConnectionClosed);
                }
                while matches!(buf.last(), Some(b'\n' | b'\r')) {
                    buf.pop();
                }
                if event_tx.send(FeedEvent::Line(buf.clone())).await.is_err() {
                    return Ok(StopReason::Cancelled);
                }
            }

            () = cancel_token.cancelled() => {
                return Ok(StopReason::Cancelled);
            }
        }
    }
}
