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

//! Vote log error types

use craftlink_client::RconError;
use thiserror::Error;

/// Errors raised by the vote log poller
#[derive(Debug, Error)]
pub enum VoteLogError {
    /// The tailing command could not be issued
    #[error("RCON error: {0}")]
    Rcon(#[from] RconError),

    /// The response did not contain a JSON array of entries
    #[error("Unexpected divotelog response: {0}")]
    ParseMiss(String),
}

/// Errors raised by the cursor store
#[derive(Debug, Error)]
pub enum CursorError {
    /// The state file could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The state file is not valid cursor JSON
    #[error("Corrupt cursor file: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Vote log result type
pub type Result<T> = std::result::Result<T, VoteLogError>;
