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

//! Scriptable RCON server

use craftlink_client::Endpoint;
use craftlink_rconcodec::{PacketType, RconCodec, RconPacket};
use craftlink_votelog::VoteLogEntry;
use futures_util::{SinkExt, StreamExt};
use std::collections::{HashMap, VecDeque};
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_util::codec::Framed;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Lines kept by the vote log ring buffer
pub const VOTE_LOG_CAPACITY: usize = 512;

/// Reply to commands nobody scripted
pub const UNKNOWN_COMMAND: &str = "Unknown or incomplete command, see below for error";

/// Fault to inject on an upcoming command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Close the socket without answering
    Hangup,
    /// Answer with a request id the client never sent
    WrongId,
    /// Send a frame with a negative length prefix
    Garbage,
}

#[derive(Default)]
struct VoteLog {
    entries: VecDeque<VoteLogEntry>,
    next_seq: u64,
}

#[derive(Default)]
struct MockState {
    password: String,
    reject_logins: AtomicBool,
    replies: Mutex<HashMap<String, String>>,
    faults: Mutex<VecDeque<Fault>>,
    vote_log: Mutex<VoteLog>,
    commands: Mutex<Vec<String>>,
    connections: AtomicUsize,
    logins: AtomicUsize,
    live: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process RCON server speaking the Minecraft wire format.
///
/// Answers logins against a fixed password, serves `divotelog` from an
/// in-memory ring buffer the way the server plugin does, answers other
/// commands from a reply table, and can be told to misbehave.
pub struct MockRconServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    shutdown: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl MockRconServer {
    /// Bind to an ephemeral localhost port and start accepting
    pub async fn start(password: impl Into<String>) -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(MockState {
            password: password.into(),
            ..MockState::default()
        });
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(accept_loop(listener, state.clone(), shutdown.clone()));
        debug!(%addr, "Mock RCON server listening");
        Ok(Self {
            addr,
            state,
            shutdown,
            task: Some(task),
        })
    }

    /// Listening address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Endpoint for this server with the given password
    pub fn endpoint(&self, password: &str) -> Endpoint {
        Endpoint::new(self.addr.ip().to_string(), self.addr.port(), password)
    }

    /// Answer `command` with `reply`
    pub fn set_reply(&self, command: impl Into<String>, reply: impl Into<String>) {
        lock(&self.state.replies).insert(command.into(), reply.into());
    }

    /// Reject every login, as if the password were changed
    pub fn reject_logins(&self, reject: bool) {
        self.state.reject_logins.store(reject, Ordering::SeqCst);
    }

    /// Apply `fault` to the next command that arrives
    pub fn inject(&self, fault: Fault) {
        lock(&self.state.faults).push_back(fault);
    }

    /// Append a console line to the vote log. Returns its sequence number.
    pub fn push_vote_line(&self, line: impl Into<String>) -> u64 {
        let mut log = lock(&self.state.vote_log);
        log.next_seq += 1;
        let seq = log.next_seq;
        let time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX));
        log.entries.push_back(VoteLogEntry {
            seq,
            time: Some(time),
            line: line.into(),
        });
        while log.entries.len() > VOTE_LOG_CAPACITY {
            log.entries.pop_front();
        }
        seq
    }

    /// Commands received so far, in order
    pub fn commands(&self) -> Vec<String> {
        lock(&self.state.commands).clone()
    }

    /// TCP connections accepted
    pub fn connections(&self) -> usize {
        self.state.connections.load(Ordering::SeqCst)
    }

    /// Successful logins
    pub fn logins(&self) -> usize {
        self.state.logins.load(Ordering::SeqCst)
    }

    /// Connections currently open
    pub fn live_connections(&self) -> u64 {
        self.state.live.load(Ordering::SeqCst)
    }

    /// Stop accepting and close every open connection
    pub async fn shutdown(mut self) {
        self.shutdown.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Mock RCON accept loop failed");
            }
        }
    }
}

impl Drop for MockRconServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn accept_loop(listener: TcpListener, state: Arc<MockState>, shutdown: CancellationToken) {
    loop {
        let (stream, peer) = tokio::select! {
            biased;
            () = shutdown.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!(error = %e, "Mock RCON accept failed");
                    continue;
                }
            },
        };
        state.connections.fetch_add(1, Ordering::SeqCst);
        trace!(%peer, "Mock RCON connection accepted");
        let state = state.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            state.live.fetch_add(1, Ordering::SeqCst);
            tokio::select! {
                biased;
                () = shutdown.cancelled() => {}
                () = serve(stream, &state) => {}
            }
            state.live.fetch_sub(1, Ordering::SeqCst);
            trace!(%peer, "Mock RCON connection closed");
        });
    }
}

async fn serve(stream: TcpStream, state: &MockState) {
    let mut framed = Framed::new(stream, RconCodec::new());
    let mut authenticated = false;

    while let Some(Ok(packet)) = framed.next().await {
        let reply = match packet.packet_type {
            PacketType::Auth => {
                if packet.payload == state.password && !state.reject_logins.load(Ordering::SeqCst) {
                    authenticated = true;
                    state.logins.fetch_add(1, Ordering::SeqCst);
                    RconPacket::new(packet.request_id, PacketType::Command, "")
                } else {
                    RconPacket::new(-1, PacketType::Command, "")
                }
            }
            PacketType::Command if authenticated => {
                lock(&state.commands).push(packet.payload.clone());
                let fault = lock(&state.faults).pop_front();
                match fault {
                    Some(Fault::Hangup) => return,
                    Some(Fault::WrongId) => RconPacket::new(
                        packet.request_id.wrapping_add(1000),
                        PacketType::Response,
                        "",
                    ),
                    Some(Fault::Garbage) => {
                        let _ = framed.get_mut().write_all(&(-1i32).to_le_bytes()).await;
                        return;
                    }
                    None => RconPacket::new(
                        packet.request_id,
                        PacketType::Response,
                        respond(state, &packet.payload),
                    ),
                }
            }
            _ => return,
        };
        if framed.send(reply).await.is_err() {
            return;
        }
    }
}

fn respond(state: &MockState, command: &str) -> String {
    let mut words = command.split_whitespace();
    if words.next() == Some("divotelog") {
        let after = words.next().and_then(|word| word.parse().ok()).unwrap_or(0u64);
        let limit = words
            .next()
            .and_then(|word| word.parse::<usize>().ok())
            .map_or(50, |limit| limit.clamp(1, 200));
        let log = lock(&state.vote_log);
        let batch: Vec<&VoteLogEntry> = log
            .entries
            .iter()
            .filter(|entry| entry.seq > after)
            .take(limit)
            .collect();
        return serde_json::to_string(&batch).unwrap_or_else(|_| "[]".to_string());
    }
    lock(&state.replies)
        .get(command)
        .cloned()
        .unwrap_or_else(|| UNKNOWN_COMMAND.to_string())
}
