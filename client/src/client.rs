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

//! Shared RCON client with lazy connect and a single reconnect retry

use crate::{Connector, Endpoint, RconConfig, RconError, Result, TcpConnector, Transport};
use metrics::counter;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

/// Number of response characters written to the debug log
const RESPONSE_LOG_CHARS: usize = 100;

/// Client connection state (stored as atomic u8)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    /// No live connection
    Disconnected = 0,
    /// Connecting or logging in
    Connecting = 1,
    /// Logged in and usable
    Authenticated = 2,
}

impl ConnectionState {
    /// Convert from u8 (for atomic operations)
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Connecting,
            2 => Self::Authenticated,
            _ => Self::Disconnected,
        }
    }

    /// Convert to u8 (for atomic operations)
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Authenticated => write!(f, "authenticated"),
        }
    }
}

/// RCON client shared between the poller, the supervisor and callers.
///
/// At most one connection exists at a time and commands are serialized on it;
/// concurrent callers queue on an internal lock. A failed command triggers one
/// close, one reopen and one retry before the error is surfaced.
///
/// # Example
///
/// ```no_run
/// use craftlink_client::{RconClient, RconConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = RconClient::new(RconConfig::new("localhost", 25575, "secret"));
/// let players = client.send_command("list").await?;
/// println!("{players}");
/// # Ok(())
/// # }
/// ```
pub struct RconClient<C: Connector = TcpConnector> {
    config: RconConfig,
    connector: C,
    slot: Mutex<Option<C::Transport>>,
    state: AtomicU8,
}

impl RconClient<TcpConnector> {
    /// Create a TCP client. No connection is made until needed.
    pub fn new(config: RconConfig) -> Self {
        Self::with_connector(config, TcpConnector)
    }
}

impl<C: Connector> RconClient<C> {
    /// Create a client that opens sessions through `connector`
    pub fn with_connector(config: RconConfig, connector: C) -> Self {
        Self {
            config,
            connector,
            slot: Mutex::new(None),
            state: AtomicU8::new(ConnectionState::Disconnected.as_u8()),
        }
    }

    /// Server this client talks to
    pub fn endpoint(&self) -> &Endpoint {
        &self.config.endpoint
    }

    /// Client configuration
    pub fn config(&self) -> &RconConfig {
        &self.config
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Whether an authenticated connection is held
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Authenticated
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }

    /// Connect with retries.
    ///
    /// Makes up to `connect_attempts` attempts, pausing `connect_backoff`
    /// between them. Returns `true` immediately when already connected.
    #[instrument(skip(self), fields(endpoint = %self.config.endpoint))]
    pub async fn connect(&self) -> bool {
        let attempts = self.config.connect_attempts.max(1);
        for attempt in 1..=attempts {
            {
                let mut slot = self.slot.lock().await;
                if slot.is_some() {
                    return true;
                }
                info!(attempt, attempts, "Connecting to RCON");
                match self.open().await {
                    Ok(transport) => {
                        *slot = Some(transport);
                        info!("RCON connected");
                        return true;
                    }
                    Err(e) => warn!(attempt, attempts, error = %e, "RCON connect attempt failed"),
                }
            }
            if attempt < attempts {
                debug!(backoff = ?self.config.connect_backoff, "Waiting before next connect attempt");
                sleep(self.config.connect_backoff).await;
            }
        }
        error!(attempts, "All RCON connect attempts failed");
        false
    }

    /// Send a command and return the server's reply.
    ///
    /// Opens a connection first if none is held. If the exchange fails the
    /// connection is discarded, reopened once and the command retried once;
    /// the most recent error is returned when that also fails.
    #[instrument(skip(self), fields(endpoint = %self.config.endpoint))]
    pub async fn send_command(&self, command: &str) -> Result<String> {
        let mut slot = self.slot.lock().await;
        if slot.is_none() {
            *slot = Some(self.open().await?);
        }

        let first_error = match Self::exchange_on(&mut slot, command).await {
            Ok(response) => {
                counter!("craftlink.rcon.commands.sent").increment(1);
                log_response(command, &response);
                return Ok(response);
            }
            Err(e) => e,
        };

        counter!("craftlink.rcon.commands.failed").increment(1);
        warn!(error = %first_error, "Command failed, reconnecting once");
        self.drop_connection(&mut slot).await;

        *slot = Some(self.open().await?);
        counter!("craftlink.rcon.reconnects").increment(1);

        match Self::exchange_on(&mut slot, command).await {
            Ok(response) => {
                counter!("craftlink.rcon.commands.sent").increment(1);
                log_response(command, &response);
                Ok(response)
            }
            Err(e) => {
                counter!("craftlink.rcon.commands.failed").increment(1);
                error!(error = %e, "Command failed after reconnect");
                self.drop_connection(&mut slot).await;
                Err(e)
            }
        }
    }

    /// Close the current connection, if any
    pub async fn disconnect(&self) {
        let mut slot = self.slot.lock().await;
        self.drop_connection(&mut slot).await;
    }

    async fn exchange_on(slot: &mut Option<C::Transport>, command: &str) -> Result<String> {
        match slot.as_mut() {
            Some(transport) => transport.exchange(command).await,
            None => Err(RconError::NotConnected),
        }
    }

    async fn open(&self) -> Result<C::Transport> {
        self.set_state(ConnectionState::Connecting);
        let _reset = ConnectingGuard(&self.state);
        match self.connector.open(&self.config).await {
            Ok(transport) => {
                counter!("craftlink.rcon.connects").increment(1);
                self.set_state(ConnectionState::Authenticated);
                Ok(transport)
            }
            Err(e) => {
                counter!("craftlink.rcon.connect_failures").increment(1);
                self.set_state(ConnectionState::Disconnected);
                Err(e)
            }
        }
    }

    async fn drop_connection(&self, slot: &mut Option<C::Transport>) {
        if let Some(mut transport) = slot.take() {
            transport.close().await;
            debug!("Dropped RCON connection");
        }
        self.set_state(ConnectionState::Disconnected);
    }
}

/// Falls back to `Disconnected` if an open is dropped while still connecting.
struct ConnectingGuard<'a>(&'a AtomicU8);

impl Drop for ConnectingGuard<'_> {
    fn drop(&mut self) {
        let _ = self.0.compare_exchange(
            ConnectionState::Connecting.as_u8(),
            ConnectionState::Disconnected.as_u8(),
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }
}

impl<C: Connector> fmt::Debug for RconClient<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RconClient")
            .field("endpoint", &self.config.endpoint)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

fn log_response(command: &str, response: &str) {
    let preview: String = response.chars().take(RESPONSE_LOG_CHARS).collect();
    debug!(command, response = %preview, "RCON response");
}
