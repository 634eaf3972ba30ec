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

//! Wire-level constants of the Minecraft RCON protocol

/// Size of the little-endian length prefix in front of every body.
pub const LENGTH_PREFIX: usize = 4;

/// Size of the request id and packet type fields that open every body.
pub const BODY_HEADER: usize = 8;

/// NUL bytes terminating every body.
pub const PADDING: usize = 2;

/// Body length of a packet with an empty payload.
pub const MIN_BODY_LENGTH: usize = BODY_HEADER + PADDING;

/// Largest body accepted in either direction.
pub const MAX_BODY_LENGTH: usize = 1024 * 1024;

/// Request id the server answers with when authentication fails.
pub const AUTH_FAILURE_ID: i32 = -1;

/// Packet type identifiers
pub mod packet_type {
    /// `SERVERDATA_AUTH`
    pub const AUTH: i32 = 3;
    /// `SERVERDATA_EXECCOMMAND`, also used by the server for the auth reply
    pub const COMMAND: i32 = 2;
    /// `SERVERDATA_RESPONSE_VALUE`
    pub const RESPONSE: i32 = 0;
}
