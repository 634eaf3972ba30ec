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

//! # Craftlink RCON Protocol Codec
//!
//! This crate implements the binary framing of the Minecraft Remote Console
//! (RCON) protocol. It is designed to be used with Tokio through
//! `tokio_util::codec::Framed`, but the framing functions are also exposed
//! directly for callers that manage their own buffers.
//!
//! ## Wire Format
//!
//! Every packet is a little-endian length prefix followed by a body:
//!
//! ```text
//! +-----------+------------+-------------+-----------------+-----------+
//! | length:4  | request:4  | type:4      | payload:n       | 0x00 0x00 |
//! +-----------+------------+-------------+-----------------+-----------+
//!             |<------------------ length bytes -------------------->|
//! ```
//!
//! - `length` counts the body only, never itself.
//! - `request` is chosen by the client and echoed by the server. A login
//!   rejected by the server comes back with request id `-1`.
//! - `type` is `3` for a login, `2` for a command and `0` for command output.
//! - The payload is UTF-8 and may not contain NUL bytes; the two trailing NUL
//!   bytes are padding, not part of the payload.
//!
//! ## Core Components
//!
//! ### [`RconCodec`]
//!
//! Implements [`Encoder`](tokio_util::codec::Encoder) and
//! [`Decoder`](tokio_util::codec::Decoder). The decoder accumulates the length
//! prefix, then the announced body, and yields one [`RconPacket`] per frame.
//! Reaching end of stream in the middle of a frame is reported as
//! [`CodecError::Truncated`].
//!
//! ### [`encode`], [`decode_header`], [`decode_body`]
//!
//! Stateless building blocks the codec is made of.
//!
//! ## Usage Example
//!
//! ```rust
//! use craftlink_rconcodec::{PacketType, RconCodec, RconPacket};
//! use tokio_util::codec::{Decoder, Encoder};
//! use bytes::BytesMut;
//!
//! let mut codec = RconCodec::new();
//! let mut buffer = BytesMut::new();
//! codec.encode(RconPacket::command(1, "list"), &mut buffer).unwrap();
//!
//! let packet = codec.decode(&mut buffer).unwrap().unwrap();
//! assert_eq!(packet.packet_type, PacketType::Command);
//! assert_eq!(packet.payload, "list");
//! ```
//!
//! ## Thread Safety
//!
//! `RconCodec` holds per-stream decoder state and should not be shared
//! between connections.

#![warn(
    clippy::cargo,
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap
)]

mod codec;
mod consts;
mod packet;
mod result;

pub use self::codec::{RconCodec, decode_body, decode_header, encode};
pub use self::consts::{
    AUTH_FAILURE_ID, BODY_HEADER, LENGTH_PREFIX, MAX_BODY_LENGTH, MIN_BODY_LENGTH, PADDING,
    packet_type,
};
pub use self::packet::{PacketType, RconPacket};
pub use self::result::{CodecError, CodecResult};
