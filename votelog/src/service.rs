//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Vote log service lifecycle
//!
//! [`VoteLogService`] wires one [`RconClient`], one [`VoteLogPoller`] and, when
//! the server is unreachable at start-up, one [`ReconnectSupervisor`] together
//! under a shared cancellation token.

use crate::{CursorStore, VoteHandler, VoteLogConfig, VoteLogPoller};
use async_trait::async_trait;
use craftlink_client::{
    Connector, RconClient, ReconnectSupervisor, SupervisorHandler, SupervisorState, TcpConnector,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Holds the poller until it is started, then its task.
struct PollerSlot<C: Connector> {
    pending: Mutex<Option<VoteLogPoller<C>>>,
    running: Mutex<Option<JoinHandle<()>>>,
    shutdown: CancellationToken,
}

impl<C: Connector> PollerSlot<C> {
    /// Spawn the poller unless it was already started
    async fn launch(&self) -> bool {
        let Some(poller) = self.pending.lock().await.take() else {
            return false;
        };
        let handle = tokio::spawn(poller.run(self.shutdown.clone()));
        *self.running.lock().await = Some(handle);
        true
    }

    async fn is_running(&self) -> bool {
        self.running
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

#[async_trait]
impl<C: Connector> SupervisorHandler for PollerSlot<C> {
    async fn on_reconnected(&self) {
        if self.launch().await {
            info!("Vote log poller started after reconnect");
        }
    }

    async fn on_round_failed(&self, round: u32) {
        warn!(round, "RCON still unreachable, vote log polling paused");
    }
}

/// Runs vote log tailing for one server.
///
/// # Example
///
/// ```no_run
/// use craftlink_client::RconConfig;
/// use craftlink_votelog::{VoteEvent, VoteHandler, VoteLogConfig, VoteLogService};
/// use async_trait::async_trait;
/// use std::sync::Arc;
///
/// struct Printer;
///
/// #[async_trait]
/// impl VoteHandler for Printer {
///     async fn on_vote(&self, event: VoteEvent) {
///         println!("{} voted on {}", event.player, event.service);
///     }
/// }
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = VoteLogConfig::new(RconConfig::load("rcon.properties")?);
///     let service = VoteLogService::new(config, Arc::new(Printer));
///     service.start().await;
///
///     let players = service.client().send_command("list").await?;
///     println!("{players}");
///
///     tokio::signal::ctrl_c().await?;
///     service.shutdown().await;
///     Ok(())
/// }
/// ```
pub struct VoteLogService<C: Connector = TcpConnector> {
    client: Arc<RconClient<C>>,
    config: VoteLogConfig,
    poller: Arc<PollerSlot<C>>,
    supervisor: Mutex<Option<JoinHandle<SupervisorState>>>,
    shutdown: CancellationToken,
}

impl VoteLogService<TcpConnector> {
    /// Create a TCP-backed service. Nothing connects until [`start`](Self::start).
    pub fn new(config: VoteLogConfig, handler: Arc<dyn VoteHandler>) -> Self {
        Self::with_connector(config, TcpConnector, handler)
    }
}

impl<C: Connector> VoteLogService<C> {
    /// Create a service whose client opens sessions through `connector`.
    ///
    /// A cursor file that cannot be read is logged and replaced by an empty
    /// store.
    pub fn with_connector(config: VoteLogConfig, connector: C, handler: Arc<dyn VoteHandler>) -> Self {
        let client = Arc::new(RconClient::with_connector(config.rcon.clone(), connector));
        let cursors = match CursorStore::load(&config.cursor_path) {
            Ok(cursors) => cursors,
            Err(e) => {
                error!(
                    path = %config.cursor_path.display(),
                    error = %e,
                    "Cannot read vote cursor file, starting from an empty cursor"
                );
                CursorStore::empty(&config.cursor_path)
            }
        };
        let shutdown = CancellationToken::new();
        let poller = VoteLogPoller::new(client.clone(), handler, cursors, config.poller.clone());

        Self {
            client,
            config,
            poller: Arc::new(PollerSlot {
                pending: Mutex::new(Some(poller)),
                running: Mutex::new(None),
                shutdown: shutdown.clone(),
            }),
            supervisor: Mutex::new(None),
            shutdown,
        }
    }

    /// Shared client, for issuing interactive commands
    pub fn client(&self) -> Arc<RconClient<C>> {
        self.client.clone()
    }

    /// Service configuration
    pub fn config(&self) -> &VoteLogConfig {
        &self.config
    }

    /// Whether the poller task is alive
    pub async fn is_polling(&self) -> bool {
        self.poller.is_running().await
    }

    /// Connect and begin polling.
    ///
    /// When the initial connect fails a [`ReconnectSupervisor`] is spawned
    /// instead and starts the poller once the server is back. Returns whether
    /// the initial connect succeeded.
    pub async fn start(&self) -> bool {
        let endpoint = self.client.endpoint().key();
        if self.client.connect().await {
            if self.poller.launch().await {
                info!(endpoint = %endpoint, "Vote log service started");
            }
            return true;
        }

        let mut supervisor = self.supervisor.lock().await;
        if supervisor.is_none() {
            warn!(
                endpoint = %endpoint,
                retry_interval = ?self.config.supervisor.retry_interval,
                "RCON unavailable, supervising reconnects"
            );
            let handle = ReconnectSupervisor::new(
                self.client.clone(),
                self.poller.clone(),
                self.config.supervisor.clone(),
                self.shutdown.clone(),
            )
            .spawn();
            *supervisor = Some(handle);
        }
        false
    }

    /// Stop all tasks and close the connection
    pub async fn shutdown(&self) {
        self.shutdown.cancel();

        let supervisor = self.supervisor.lock().await.take();
        if let Some(handle) = supervisor {
            if let Err(e) = handle.await {
                error!(error = %e, "Reconnect supervisor task failed");
            }
        }
        let running = self.poller.running.lock().await.take();
        if let Some(handle) = running {
            if let Err(e) = handle.await {
                error!(error = %e, "Vote log poller task failed");
            }
        }

        self.client.disconnect().await;
        info!(endpoint = %self.client.endpoint(), "Vote log service stopped");
    }
}
