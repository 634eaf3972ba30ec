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

//! Vote log configuration

use craftlink_client::{RconConfig, SupervisorConfig};
use std::path::PathBuf;
use std::time::Duration;

/// Smallest batch `divotelog` accepts
pub const MIN_BATCH_LIMIT: u32 = 1;

/// Largest batch `divotelog` accepts
pub const MAX_BATCH_LIMIT: u32 = 200;

/// Default cursor file location
pub const DEFAULT_CURSOR_PATH: &str = "data/vote_state.json";

/// Poller timing and batch size
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Pause before the first poll
    pub startup_delay: Duration,
    /// Pause between successful polls
    pub poll_interval: Duration,
    /// Pause after a response without a parsable batch
    pub miss_backoff: Duration,
    /// Pause after a failed command
    pub error_backoff: Duration,
    /// Entries requested per poll
    pub batch_limit: u32,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            startup_delay: Duration::from_secs(2),
            poll_interval: Duration::from_secs(2),
            miss_backoff: Duration::from_secs(2),
            error_backoff: Duration::from_secs(5),
            batch_limit: 50,
        }
    }
}

impl PollerConfig {
    /// Create a default poller configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pause before the first poll
    pub fn with_startup_delay(mut self, delay: Duration) -> Self {
        self.startup_delay = delay;
        self
    }

    /// Set the pause between polls
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the pause after a parse miss
    pub fn with_miss_backoff(mut self, backoff: Duration) -> Self {
        self.miss_backoff = backoff;
        self
    }

    /// Set the pause after a failed command
    pub fn with_error_backoff(mut self, backoff: Duration) -> Self {
        self.error_backoff = backoff;
        self
    }

    /// Set the batch size, clamped to what the server accepts
    pub fn with_batch_limit(mut self, limit: u32) -> Self {
        self.batch_limit = limit.clamp(MIN_BATCH_LIMIT, MAX_BATCH_LIMIT);
        self
    }

    /// Batch size actually sent to the server
    pub fn limit(&self) -> u32 {
        self.batch_limit.clamp(MIN_BATCH_LIMIT, MAX_BATCH_LIMIT)
    }
}

/// Everything a [`VoteLogService`](crate::VoteLogService) needs
#[derive(Debug, Clone)]
pub struct VoteLogConfig {
    /// RCON connection settings
    pub rcon: RconConfig,
    /// Reconnect supervision settings
    pub supervisor: SupervisorConfig,
    /// Poll loop settings
    pub poller: PollerConfig,
    /// Cursor state file
    pub cursor_path: PathBuf,
}

impl Default for VoteLogConfig {
    fn default() -> Self {
        Self {
            rcon: RconConfig::default(),
            supervisor: SupervisorConfig::default(),
            poller: PollerConfig::default(),
            cursor_path: PathBuf::from(DEFAULT_CURSOR_PATH),
        }
    }
}

impl VoteLogConfig {
    /// Create a configuration for the given RCON settings
    pub fn new(rcon: RconConfig) -> Self {
        Self {
            rcon,
            ..Default::default()
        }
    }

    /// Set the reconnect supervision settings
    pub fn with_supervisor(mut self, supervisor: SupervisorConfig) -> Self {
        self.supervisor = supervisor;
        self
    }

    /// Set the poll loop settings
    pub fn with_poller(mut self, poller: PollerConfig) -> Self {
        self.poller = poller;
        self
    }

    /// Set the cursor state file
    pub fn with_cursor_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cursor_path = path.into();
        self
    }
}
