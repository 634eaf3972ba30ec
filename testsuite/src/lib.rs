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

//! # Craftlink Test Suite
//!
//! [`MockRconServer`] is a small in-process RCON server for exercising the
//! client, the vote log poller and the service end to end over real TCP.
//!
//! ```no_run
//! use craftlink_client::{RconClient, RconConfig};
//! use craftlink_testsuite::MockRconServer;
//!
//! # async fn example() -> std::io::Result<()> {
//! let server = MockRconServer::start("secret").await?;
//! server.set_reply("list", "There are 0 of a max of 20 players online");
//!
//! let client = RconClient::new(RconConfig::default().with_endpoint(server.endpoint("secret")));
//! assert!(client.connect().await);
//! # Ok(())
//! # }
//! ```

mod server;

pub use server::{Fault, MockRconServer, UNKNOWN_COMMAND, VOTE_LOG_CAPACITY};
