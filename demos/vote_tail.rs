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

//! Vote Tail Demo
//!
//! Connects to a Minecraft server over RCON and prints every vote reported by
//! its vote log until Ctrl+C.
//!
//! Usage: cargo run --example vote_tail -p craftlink-votelog -- [rcon.properties] [cursor.json]
//!
//! The properties file holds `MC_HOST`, `MC_RCON_PORT` and `MC_RCON_PASSWORD`.

use async_trait::async_trait;
use craftlink_client::RconConfig;
use craftlink_votelog::{DEFAULT_CURSOR_PATH, VoteEvent, VoteHandler, VoteLogConfig, VoteLogService};
use std::sync::Arc;
use tracing::{info, warn};

struct PrintVotes;

#[async_trait]
impl VoteHandler for PrintVotes {
    async fn on_vote(&self, event: VoteEvent) {
        let source = if event.is_pmc { " (PMC)" } else { "" };
        println!("{} voted on {}{}", event.player, event.service, source);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let properties = args.get(1).map_or("rcon.properties", String::as_str);
    let cursor_path = args.get(2).map_or(DEFAULT_CURSOR_PATH, String::as_str);

    let rcon = RconConfig::load(properties)?;
    let config = VoteLogConfig::new(rcon).with_cursor_path(cursor_path);
    let service = VoteLogService::new(config, Arc::new(PrintVotes));

    if service.start().await {
        info!(endpoint = %service.client().endpoint(), "Tailing vote log");
    } else {
        warn!(endpoint = %service.client().endpoint(), "RCON unavailable, retrying in the background");
    }

    tokio::signal::ctrl_c().await?;
    service.shutdown().await;
    Ok(())
}
