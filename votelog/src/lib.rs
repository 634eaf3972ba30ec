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

//! # Craftlink Vote Log
//!
//! Tails a Minecraft server's vote log over RCON and reports each vote once,
//! even across restarts.
//!
//! The server side buffers console lines from vote plugins and exposes them
//! through the `divotelog <after_seq> <limit>` console command, which answers
//! with a JSON array of `{"seq", "time", "line"}` entries. [`VoteLogPoller`]
//! repeatedly asks for entries after its cursor, recognises Votifier and
//! VotingPlugin lines with [`parse_vote_line`], hands the resulting
//! [`VoteEvent`]s to a [`VoteHandler`], and persists the cursor in a
//! [`CursorStore`] after every entry.
//!
//! [`VoteLogService`] bundles all of this with the RCON client and its
//! reconnect supervisor.

mod config;
mod cursor;
mod entry;
mod error;
mod handler;
mod parser;
mod poller;
mod service;

pub use config::{
    DEFAULT_CURSOR_PATH, MAX_BATCH_LIMIT, MIN_BATCH_LIMIT, PollerConfig, VoteLogConfig,
};
pub use cursor::{Cursor, CursorStore};
pub use entry::{VoteLogEntry, parse_batch};
pub use error::{CursorError, Result, VoteLogError};
pub use handler::VoteHandler;
pub use parser::{VoteEvent, parse_vote_line};
pub use poller::{BatchOutcome, VoteLogPoller};
pub use service::VoteLogService;
