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

//! Background reconnect supervision
//!
//! When the initial connect fails the supervisor keeps retrying on a long
//! interval and hands control back through [`SupervisorHandler`] once the
//! client is connected again.

use crate::{Connector, RconClient, SupervisorConfig, TcpConnector};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Hooks invoked by [`ReconnectSupervisor`]. All methods default to no-ops.
#[async_trait]
pub trait SupervisorHandler: Send + Sync + 'static {
    /// Called once, after the client reconnects
    async fn on_reconnected(&self) {}

    /// Called after each failed reconnect round
    async fn on_round_failed(&self, _round: u32) {}
}

/// Handler that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSupervisorHandler;

#[async_trait]
impl SupervisorHandler for NoopSupervisorHandler {}

/// How a supervisor run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    /// Cancelled before a connection came back
    Down,
    /// The client is connected
    Up,
}

/// Retries [`RconClient::connect`] every `retry_interval` until it succeeds.
///
/// A run is one-shot: it ends with [`SupervisorState::Up`] after the first
/// successful round, or [`SupervisorState::Down`] when cancelled.
pub struct ReconnectSupervisor<C: Connector = TcpConnector> {
    client: Arc<RconClient<C>>,
    handler: Arc<dyn SupervisorHandler>,
    config: SupervisorConfig,
    shutdown: CancellationToken,
}

impl<C: Connector> ReconnectSupervisor<C> {
    /// Create a supervisor for `client`
    pub fn new(
        client: Arc<RconClient<C>>,
        handler: Arc<dyn SupervisorHandler>,
        config: SupervisorConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            client,
            handler,
            config,
            shutdown,
        }
    }

    /// Run on a new tokio task
    pub fn spawn(self) -> JoinHandle<SupervisorState> {
        tokio::spawn(self.run())
    }

    /// Run until reconnected or cancelled
    #[instrument(skip(self), fields(endpoint = %self.client.endpoint()))]
    pub async fn run(self) -> SupervisorState {
        let mut round = 0u32;
        loop {
            tokio::select! {
                () = self.shutdown.cancelled() => {
                    debug!("Reconnect supervisor cancelled");
                    return SupervisorState::Down;
                }
                () = sleep(self.config.retry_interval) => {}
            }

            round = round.saturating_add(1);
            if self.client.is_connected() {
                info!(round, "RCON already connected");
                break;
            }

            info!(round, "Retrying RCON connection");
            let connected = tokio::select! {
                () = self.shutdown.cancelled() => {
                    debug!("Reconnect supervisor cancelled mid-round");
                    return SupervisorState::Down;
                }
                connected = self.client.connect() => connected,
            };
            if connected {
                info!(round, "RCON reconnected");
                break;
            }

            warn!(round, retry_in = ?self.config.retry_interval, "Reconnect round failed");
            self.handler.on_round_failed(round).await;
        }

        self.handler.on_reconnected().await;
        SupervisorState::Up
    }
}
