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

//! Error types for the RCON codec

/// Result Type for Codec Operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors raised while encoding or decoding RCON packets.
///
/// None of these are fatal to the process. A connection that sees one of them
/// on its read side should still be considered unusable, since the framing
/// can no longer be trusted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// An I/O error occurred while reading from or writing to the underlying stream.
    #[error("I/O error during {operation}: {kind:?}")]
    IOError {
        /// The kind of I/O error that occurred
        kind: std::io::ErrorKind,
        /// Description of the operation that failed
        operation: String,
    },

    /// The outgoing payload contains a NUL byte, which would corrupt the framing.
    #[error("payload contains a NUL byte at offset {position}")]
    EmbeddedNul {
        /// Offset of the first NUL byte
        position: usize,
    },

    /// The length prefix announced a body that is negative, shorter than the
    /// body header or longer than [`MAX_BODY_LENGTH`](crate::MAX_BODY_LENGTH).
    #[error("invalid body length {length}")]
    InvalidLength {
        /// The announced length
        length: i64,
    },

    /// Fewer than four bytes were supplied to [`decode_header`](crate::decode_header).
    #[error("incomplete length prefix ({available} of 4 bytes)")]
    IncompleteHeader {
        /// Number of bytes available
        available: usize,
    },

    /// The body is too short to hold a request id and packet type.
    #[error("response too short: {length} bytes, expected at least 8")]
    BodyTooShort {
        /// Number of bytes in the body
        length: usize,
    },

    /// The payload text is not valid UTF-8.
    #[error("payload is not valid UTF-8 (valid up to byte {valid_up_to})")]
    InvalidUtf8 {
        /// Length of the valid prefix
        valid_up_to: usize,
    },

    /// The stream ended in the middle of a frame.
    #[error("stream ended with {buffered} bytes of an incomplete frame")]
    Truncated {
        /// Bytes of the partial frame that were buffered
        buffered: usize,
    },
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::IOError {
            kind: err.kind(),
            operation: err.to_string(),
        }
    }
}
