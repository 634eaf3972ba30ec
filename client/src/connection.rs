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

//! Authenticated RCON connections
//!
//! [`RconConnection`] owns one framed stream and performs strictly sequential
//! request/response round trips on it. [`Transport`] and [`Connector`] are the
//! seams [`RconClient`](crate::RconClient) is written against, so tests can
//! swap the TCP socket for an in-memory fake.

use crate::{Endpoint, RconConfig, RconError, Result};
use async_trait::async_trait;
use craftlink_rconcodec::{RconCodec, RconPacket};
use futures_util::{SinkExt, StreamExt};
use metrics::{counter, histogram};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::codec::Framed;
use tracing::{debug, info, instrument, trace, warn};

/// An authenticated RCON session over any byte stream.
pub struct RconConnection<S> {
    framed: Framed<S, RconCodec>,
    endpoint: String,
    next_request_id: i32,
    read_timeout: Duration,
    healthy: bool,
    closed: bool,
}

impl RconConnection<TcpStream> {
    /// Connect to `endpoint` over TCP and authenticate.
    ///
    /// The TCP connect is bounded by `connect_timeout`; the login round trip
    /// and every later exchange are bounded by `read_timeout`.
    #[instrument(skip(endpoint), fields(endpoint = %endpoint))]
    pub async fn open(
        endpoint: &Endpoint,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<Self> {
        let connect = TcpStream::connect((endpoint.host(), endpoint.port()));
        let stream = match timeout(connect_timeout, connect).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => return Err(RconError::Timeout),
        };
        stream.set_nodelay(true)?;
        debug!(peer_addr = ?stream.peer_addr().ok(), "TCP connection established");

        Self::authenticate(stream, endpoint, read_timeout).await
    }
}

impl<S> RconConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Authenticate over an already-connected stream.
    ///
    /// Sends exactly one login packet. A reply carrying request id `-1`, or the
    /// peer closing before a complete reply, is an [`RconError::Auth`].
    pub async fn authenticate(stream: S, endpoint: &Endpoint, read_timeout: Duration) -> Result<Self> {
        let mut connection = Self {
            framed: Framed::new(stream, RconCodec::new()),
            endpoint: endpoint.key(),
            next_request_id: 1,
            read_timeout,
            healthy: true,
            closed: false,
        };

        let request_id = connection.next_id();
        match connection
            .round_trip(RconPacket::auth(request_id, endpoint.password()))
            .await
        {
            Ok(reply) if reply.is_auth_failure() => {
                warn!(endpoint = %connection.endpoint, "RCON login rejected");
                connection.close().await;
                Err(RconError::Auth)
            }
            Ok(_) => {
                info!(endpoint = %connection.endpoint, "RCON authenticated");
                Ok(connection)
            }
            Err(RconError::ConnectionClosed) => {
                connection.close().await;
                Err(RconError::Auth)
            }
            Err(e) => {
                connection.close().await;
                Err(e)
            }
        }
    }

    /// Send one command and wait for its reply.
    ///
    /// Once any exchange fails the connection refuses further use with
    /// [`RconError::NotConnected`].
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    pub async fn exchange(&mut self, command: &str) -> Result<String> {
        let request_id = self.next_id();
        let reply = self
            .round_trip(RconPacket::command(request_id, command))
            .await?;
        if reply.request_id != request_id {
            self.healthy = false;
            return Err(RconError::MismatchedResponse {
                expected: request_id,
                actual: reply.request_id,
            });
        }
        Ok(reply.payload)
    }

    /// Shut down the write side and release the stream. Idempotent.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.healthy = false;
        if let Err(e) = self.framed.get_mut().shutdown().await {
            trace!(error = %e, "Shutdown after close failed");
        }
        debug!(endpoint = %self.endpoint, "RCON connection closed");
    }

    /// Whether the connection can still carry exchanges
    pub fn is_open(&self) -> bool {
        self.healthy && !self.closed
    }

    fn next_id(&mut self) -> i32 {
        let id = self.next_request_id;
        self.next_request_id = self.next_request_id.checked_add(1).unwrap_or(1);
        id
    }

    async fn round_trip(&mut self, packet: RconPacket) -> Result<RconPacket> {
        if !self.is_open() {
            return Err(RconError::NotConnected);
        }
        let started = Instant::now();
        let framed = &mut self.framed;
        let result = timeout(self.read_timeout, async {
            framed.send(packet).await?;
            match framed.next().await {
                Some(reply) => Ok::<_, RconError>(reply?),
                None => Err(RconError::ConnectionClosed),
            }
        })
        .await
        .unwrap_or(Err(RconError::Timeout));

        histogram!("craftlink.rcon.exchange_duration").record(started.elapsed().as_secs_f64());
        match &result {
            Ok(reply) => {
                counter!("craftlink.rcon.packets.received").increment(1);
                trace!(request_id = reply.request_id, packet_type = %reply.packet_type, "Received reply");
            }
            Err(e) => {
                self.healthy = false;
                debug!(error = %e, "Round trip failed");
            }
        }
        result
    }
}

/// One live, authenticated session that commands can be sent over.
#[async_trait]
pub trait Transport: Send + 'static {
    /// Send one command and return the reply payload
    async fn exchange(&mut self, command: &str) -> Result<String>;

    /// Release the session. Must be idempotent.
    async fn close(&mut self);
}

#[async_trait]
impl<S> Transport for RconConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    async fn exchange(&mut self, command: &str) -> Result<String> {
        RconConnection::exchange(self, command).await
    }

    async fn close(&mut self) {
        RconConnection::close(self).await;
    }
}

/// Opens authenticated [`Transport`]s for a configuration.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Session type produced by this connector
    type Transport: Transport;

    /// Connect and authenticate
    async fn open(&self, config: &RconConfig) -> Result<Self::Transport>;
}

/// Connects over TCP.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

#[async_trait]
impl Connector for TcpConnector {
    type Transport = RconConnection<TcpStream>;

    async fn open(&self, config: &RconConfig) -> Result<Self::Transport> {
        RconConnection::open(&config.endpoint, config.connect_timeout, config.read_timeout).await
    }
}
