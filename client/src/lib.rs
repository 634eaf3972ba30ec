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

//! # Craftlink RCON Client
//!
//! Async Minecraft RCON client that keeps one authenticated connection per
//! server, serializes commands over it, and recovers from dropped sockets.
//!
//! ## Features
//!
//! - **Lazy Connect** - The first command opens and authenticates the connection
//! - **Single Retry** - A failed command is retried once on a fresh connection
//! - **Reconnect Supervision** - [`ReconnectSupervisor`] retries on a long interval in the background
//! - **Testable Transport** - [`Connector`] and [`Transport`] let tests replace the TCP socket
//!
//! ## Quick Start
//!
//! ```no_run
//! use craftlink_client::{RconClient, RconConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RconConfig::load("rcon.properties")?;
//!     let client = RconClient::new(config);
//!
//!     if client.connect().await {
//!         println!("{}", client.send_command("list").await?);
//!     }
//!     client.disconnect().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Supervising Reconnects
//!
//! ```no_run
//! use craftlink_client::{
//!     NoopSupervisorHandler, ReconnectSupervisor, RconClient, RconConfig, SupervisorConfig,
//! };
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() {
//! let client = Arc::new(RconClient::new(RconConfig::default()));
//! let shutdown = CancellationToken::new();
//! let handle = ReconnectSupervisor::new(
//!     client,
//!     Arc::new(NoopSupervisorHandler),
//!     SupervisorConfig::default(),
//!     shutdown.clone(),
//! )
//! .spawn();
//! # shutdown.cancel();
//! # let _ = handle.await;
//! # }
//! ```

mod client;
mod config;
mod connection;
mod error;
mod supervisor;

pub use client::{ConnectionState, RconClient};
pub use config::{DEFAULT_RCON_HOST, DEFAULT_RCON_PORT, Endpoint, RconConfig, SupervisorConfig};
pub use connection::{Connector, RconConnection, TcpConnector, Transport};
pub use error::{ConfigError, RconError, Result};
pub use supervisor::{NoopSupervisorHandler, ReconnectSupervisor, SupervisorHandler, SupervisorState};

// Re-export the wire types
pub use craftlink_rconcodec::{CodecError, PacketType, RconPacket};
