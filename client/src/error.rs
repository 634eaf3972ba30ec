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

//! Client error types

use craftlink_rconcodec::CodecError;
use std::io;
use thiserror::Error;

/// RCON client error type
#[derive(Debug, Error)]
pub enum RconError {
    /// The server rejected the password (or RCON is disabled)
    #[error("RCON authentication failed - invalid password or RCON disabled")]
    Auth,

    /// The peer closed the connection before a full frame arrived
    #[error("Connection closed by server")]
    ConnectionClosed,

    /// A frame could not be decoded
    #[error("Protocol error: {0}")]
    Protocol(CodecError),

    /// The response did not correlate with the request that was sent
    #[error("Response id {actual} does not match request id {expected}")]
    MismatchedResponse {
        /// Request id that was sent
        expected: i32,
        /// Request id that came back
        actual: i32,
    },

    /// Connect, read, or write exceeded its configured timeout
    #[error("Operation timed out")]
    Timeout,

    /// Underlying socket failure
    #[error("I/O error: {0}")]
    Io(io::Error),

    /// The connection was already closed
    #[error("Not connected")]
    NotConnected,
}

impl RconError {
    /// Whether a fresh connection could plausibly succeed where this one failed.
    ///
    /// Authentication failures are permanent until the password changes.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Auth)
    }

    /// Whether the peer violated the wire protocol
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, Self::Protocol(_) | Self::MismatchedResponse { .. })
    }
}

impl From<io::Error> for RconError {
    fn from(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::TimedOut => Self::Timeout,
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof => Self::ConnectionClosed,
            _ => Self::Io(error),
        }
    }
}

impl From<CodecError> for RconError {
    fn from(error: CodecError) -> Self {
        match error {
            CodecError::IOError { kind, operation } => {
                Self::from(io::Error::new(kind, operation))
            }
            CodecError::Truncated { .. } => Self::ConnectionClosed,
            other => Self::Protocol(other),
        }
    }
}

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The properties file could not be read
    #[error("Failed to read config file: {0}")]
    Io(#[from] io::Error),

    /// `MC_RCON_PORT` is not a valid TCP port
    #[error("Invalid RCON port: {0:?}")]
    InvalidPort(String),
}

/// Client result type
pub type Result<T> = std::result::Result<T, RconError>;
