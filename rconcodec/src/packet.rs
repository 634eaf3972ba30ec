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

use crate::consts::{AUTH_FAILURE_ID, packet_type};
use std::fmt;

/// The type field of an RCON packet.
///
/// The server reuses type `2` for its reply to an authentication request, so
/// [`PacketType::Command`] is also what a successful login comes back as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketType {
    /// Login request carrying the password
    Auth,
    /// Command to execute (or the server's auth reply)
    Command,
    /// Command output
    Response,
    /// Any other value read off the wire
    Unknown(i32),
}

impl From<i32> for PacketType {
    fn from(value: i32) -> Self {
        match value {
            packet_type::AUTH => PacketType::Auth,
            packet_type::COMMAND => PacketType::Command,
            packet_type::RESPONSE => PacketType::Response,
            other => PacketType::Unknown(other),
        }
    }
}

impl From<PacketType> for i32 {
    fn from(value: PacketType) -> Self {
        match value {
            PacketType::Auth => packet_type::AUTH,
            PacketType::Command => packet_type::COMMAND,
            PacketType::Response => packet_type::RESPONSE,
            PacketType::Unknown(other) => other,
        }
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacketType::Auth => write!(f, "Auth"),
            PacketType::Command => write!(f, "Command"),
            PacketType::Response => write!(f, "Response"),
            PacketType::Unknown(value) => write!(f, "Unknown({value})"),
        }
    }
}

///
/// A single decoded RCON packet.
///
/// The trailing padding is not part of `payload`; the codec adds and strips it.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RconPacket {
    /// Correlation id chosen by the client and echoed by the server
    pub request_id: i32,
    /// Packet type
    pub packet_type: PacketType,
    /// Payload text without padding
    pub payload: String,
}

impl RconPacket {
    /// Creates a packet from its parts.
    pub fn new(request_id: i32, packet_type: PacketType, payload: impl Into<String>) -> Self {
        Self {
            request_id,
            packet_type,
            payload: payload.into(),
        }
    }

    /// Creates a login packet.
    pub fn auth(request_id: i32, password: impl Into<String>) -> Self {
        Self::new(request_id, PacketType::Auth, password)
    }

    /// Creates a command packet.
    pub fn command(request_id: i32, command: impl Into<String>) -> Self {
        Self::new(request_id, PacketType::Command, command)
    }

    /// Whether this is the server rejecting a login.
    pub fn is_auth_failure(&self) -> bool {
        self.request_id == AUTH_FAILURE_ID
    }
}
