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

//! Vote log polling loop
//!
//! The poller tails the server's vote log through the `divotelog` command:
//! each poll asks for entries after the current cursor, hands new lines to the
//! [`VoteHandler`], and moves the persisted cursor forward after each entry.

use crate::{
    CursorStore, PollerConfig, Result, VoteHandler, VoteLogEntry, VoteLogError, parse_batch,
    parse_vote_line,
};
use craftlink_client::{Connector, RconClient, TcpConnector};
use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use tokio::select;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, trace, warn};

/// What one poll did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchOutcome {
    /// Entries in the response
    pub received: usize,
    /// Entries newer than the cursor
    pub processed: usize,
    /// Votes handed to the handler
    pub emitted: usize,
    /// The batch was treated as pre-existing backlog and skipped
    pub skipped_backlog: bool,
}

/// Tails the vote log of one server.
pub struct VoteLogPoller<C: Connector = TcpConnector> {
    client: Arc<RconClient<C>>,
    handler: Arc<dyn VoteHandler>,
    cursors: CursorStore,
    key: String,
    last_seq: u64,
    initialized: bool,
    config: PollerConfig,
}

impl<C: Connector> VoteLogPoller<C> {
    /// Create a poller starting from the stored cursor for the client's endpoint
    pub fn new(
        client: Arc<RconClient<C>>,
        handler: Arc<dyn VoteHandler>,
        cursors: CursorStore,
        config: PollerConfig,
    ) -> Self {
        let key = client.endpoint().key();
        let last_seq = cursors.last_seq(&key);
        if last_seq > 0 {
            info!(key = %key, last_seq, "Resuming vote log from persisted cursor");
        }
        Self {
            client,
            handler,
            cursors,
            key,
            last_seq,
            initialized: false,
            config,
        }
    }

    /// Highest sequence number processed so far
    pub fn last_seq(&self) -> u64 {
        self.last_seq
    }

    /// Whether a batch has been parsed since this poller was created
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Cursor store backing this poller
    pub fn cursors(&self) -> &CursorStore {
        &self.cursors
    }

    /// The tailing command for the current cursor
    pub fn command(&self) -> String {
        format!("divotelog {} {}", self.last_seq, self.config.limit())
    }

    /// Issue one tailing command and process its batch
    #[instrument(skip(self), fields(key = %self.key, last_seq = self.last_seq))]
    pub async fn poll_once(&mut self) -> Result<BatchOutcome> {
        let response = self.client.send_command(&self.command()).await?;
        let batch = parse_batch(&response).inspect_err(|_| {
            counter!("craftlink.votelog.parse_misses").increment(1);
        })?;
        Ok(self.process_batch(&batch).await)
    }

    /// Apply a parsed batch.
    ///
    /// The first batch after start-up with no stored cursor only moves the
    /// cursor to its highest sequence. After that every entry above the
    /// cursor is handed to the handler and then persisted. Entries at or
    /// below the cursor are dropped.
    pub async fn process_batch(&mut self, batch: &[VoteLogEntry]) -> BatchOutcome {
        let mut outcome = BatchOutcome {
            received: batch.len(),
            ..BatchOutcome::default()
        };

        if !self.initialized {
            self.initialized = true;
            let max_seq = batch.iter().map(|entry| entry.seq).max().unwrap_or(0);
            if self.last_seq == 0 && max_seq != 0 {
                info!(max_seq, entries = batch.len(), "Skipping vote log backlog");
                self.last_seq = max_seq;
                self.persist();
                outcome.skipped_backlog = true;
                return outcome;
            }
        }

        if !batch.is_empty() {
            debug!(entries = batch.len(), after_seq = self.last_seq, "Received vote log entries");
        }

        for entry in batch {
            if entry.seq <= self.last_seq {
                trace!(seq = entry.seq, last_seq = self.last_seq, "Dropping stale entry");
                continue;
            }
            self.last_seq = entry.seq;
            outcome.processed += 1;
            counter!("craftlink.votelog.lines_processed").increment(1);

            if !entry.line.is_empty() {
                trace!(seq = entry.seq, line = %entry.line, "Processing vote log line");
                self.handler.on_line(entry).await;
                if let Some(event) = parse_vote_line(&entry.line) {
                    info!(seq = entry.seq, player = %event.player, service = %event.service, "Vote received");
                    self.handler.on_vote(event).await;
                    counter!("craftlink.votelog.votes_emitted").increment(1);
                    outcome.emitted += 1;
                }
            }

            self.persist();
        }

        outcome
    }

    fn persist(&mut self) {
        if let Err(e) = self.cursors.advance(&self.key, self.last_seq) {
            warn!(key = %self.key, last_seq = self.last_seq, error = %e, "Failed to persist vote cursor");
        }
    }

    /// Poll until `shutdown` fires
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(key = %self.key, last_seq = self.last_seq, "Starting vote log poller");
        if !pause(self.config.startup_delay, &shutdown).await {
            return;
        }

        loop {
            let result = select! {
                () = shutdown.cancelled() => break,
                result = self.poll_once() => result,
            };
            let delay = match result {
                Ok(outcome) => {
                    trace!(?outcome, "Poll complete");
                    self.config.poll_interval
                }
                Err(VoteLogError::ParseMiss(preview)) => {
                    warn!(response = %preview, "Unexpected divotelog response");
                    self.config.miss_backoff
                }
                Err(e) => {
                    error!(error = %e, "Vote log poll failed");
                    self.config.error_backoff
                }
            };
            if !pause(delay, &shutdown).await {
                break;
            }
        }

        info!(key = %self.key, last_seq = self.last_seq, "Vote log poller stopped");
    }
}

/// Sleep for `duration`. Returns `false` when cancelled first.
async fn pause(duration: Duration, shutdown: &CancellationToken) -> bool {
    select! {
        () = shutdown.cancelled() => false,
        () = sleep(duration) => true,
    }
}
