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

//! Scripted RCON transport and recording handler shared by the vote log tests

#![allow(dead_code)]

use async_trait::async_trait;
use craftlink_client::{Connector, RconClient, RconConfig, RconError, Result, Transport};
use craftlink_votelog::{VoteEvent, VoteHandler, VoteLogEntry};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Replies and open outcomes handed out in order. Once the reply queue is
/// drained every command answers with an empty batch.
#[derive(Default)]
pub struct Script {
    opens: Mutex<VecDeque<Result<()>>>,
    replies: Mutex<VecDeque<Result<String>>>,
    commands: Mutex<Vec<String>>,
    open_calls: AtomicUsize,
}

impl Script {
    pub fn push_open(&self, outcome: Result<()>) {
        self.opens.lock().unwrap().push_back(outcome);
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Ok(reply.into()));
    }

    pub fn push_error(&self, error: RconError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    pub fn opens(&self) -> usize {
        self.open_calls.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Default)]
pub struct ScriptedConnector(pub Arc<Script>);

pub struct ScriptedTransport(Arc<Script>);

#[async_trait]
impl Connector for ScriptedConnector {
    type Transport = ScriptedTransport;

    async fn open(&self, _config: &RconConfig) -> Result<ScriptedTransport> {
        self.0.open_calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self.0.opens.lock().unwrap().pop_front().unwrap_or(Ok(()));
        outcome.map(|()| ScriptedTransport(self.0.clone()))
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn exchange(&mut self, command: &str) -> Result<String> {
        self.0.commands.lock().unwrap().push(command.to_string());
        let reply = self.0.replies.lock().unwrap().pop_front();
        reply.unwrap_or_else(|| Ok("[]".to_string()))
    }

    async fn close(&mut self) {}
}

pub fn rcon_config() -> RconConfig {
    RconConfig::new("h", 25575, "pw")
}

pub fn scripted_client() -> (Arc<RconClient<ScriptedConnector>>, Arc<Script>) {
    let connector = ScriptedConnector::default();
    let script = connector.0.clone();
    (
        Arc::new(RconClient::with_connector(rcon_config(), connector)),
        script,
    )
}

/// Render entries the way the server plugin does, with surrounding chrome
pub fn divotelog_response(entries: &[VoteLogEntry]) -> String {
    let json = serde_json::to_string(entries).unwrap();
    format!("Vote log entries: {json}")
}

#[derive(Default)]
pub struct RecordingHandler {
    pub votes: Mutex<Vec<VoteEvent>>,
    pub lines: Mutex<Vec<u64>>,
}

impl RecordingHandler {
    pub fn votes(&self) -> Vec<VoteEvent> {
        self.votes.lock().unwrap().clone()
    }

    pub fn lines(&self) -> Vec<u64> {
        self.lines.lock().unwrap().clone()
    }
}

#[async_trait]
impl VoteHandler for RecordingHandler {
    async fn on_vote(&self, event: VoteEvent) {
        self.votes.lock().unwrap().push(event);
    }

    async fn on_line(&self, entry: &VoteLogEntry) {
        self.lines.lock().unwrap().push(entry.seq);
    }
}

pub const VOTINGPLUGIN_X: &str =
    "[VotingPlugin] Received a vote from service site 'CraftRank' by player 'X'!";

pub const VOTIFIER_PMC: &str = "[Votifier] Got a protocol v1 vote record from /1.2.3.4:1 -> Vote (from:PlanetMinecraft.com username:Steve address:1.2.3.4 timeStamp:1 additionalData:null)";
