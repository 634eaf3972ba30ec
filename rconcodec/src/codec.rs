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

use crate::consts::{BODY_HEADER, LENGTH_PREFIX, MAX_BODY_LENGTH, MIN_BODY_LENGTH, PADDING};
use crate::{CodecError, CodecResult, PacketType, RconPacket};
use byteorder::{ByteOrder, LittleEndian};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

/// Encodes a single packet into a freshly allocated frame.
///
/// The frame is `i32_le(len(body)) || body` where
/// `body = i32_le(request_id) || i32_le(packet_type) || payload || 0x00 0x00`.
///
/// # Errors
/// - [`CodecError::EmbeddedNul`] if `payload` contains a NUL byte.
/// - [`CodecError::InvalidLength`] if the body would exceed
///   [`MAX_BODY_LENGTH`](crate::MAX_BODY_LENGTH).
///
/// # Example
/// ```
/// use craftlink_rconcodec::{PacketType, encode};
///
/// let frame = encode(1, PacketType::Command, "list").unwrap();
/// assert_eq!(&frame[..4], &[14, 0, 0, 0]);
/// ```
pub fn encode(request_id: i32, packet_type: PacketType, payload: &str) -> CodecResult<Bytes> {
    let mut dst = BytesMut::with_capacity(LENGTH_PREFIX + MIN_BODY_LENGTH + payload.len());
    encode_into(request_id, packet_type, payload.as_bytes(), &mut dst)?;
    Ok(dst.freeze())
}

/// Reads the body length announced by a frame's length prefix.
///
/// Only the first four bytes of `header` are inspected. The caller must read
/// exactly the returned number of bytes before handing them to [`decode_body`].
///
/// # Errors
/// - [`CodecError::IncompleteHeader`] if fewer than four bytes are supplied.
/// - [`CodecError::InvalidLength`] for negative lengths, lengths shorter than
///   the body header and lengths above [`MAX_BODY_LENGTH`](crate::MAX_BODY_LENGTH).
pub fn decode_header(header: &[u8]) -> CodecResult<usize> {
    if header.len() < LENGTH_PREFIX {
        return Err(CodecError::IncompleteHeader {
            available: header.len(),
        });
    }
    let announced = LittleEndian::read_i32(&header[..LENGTH_PREFIX]);
    match usize::try_from(announced) {
        Ok(length) if (BODY_HEADER..=MAX_BODY_LENGTH).contains(&length) => Ok(length),
        _ => Err(CodecError::InvalidLength {
            length: i64::from(announced),
        }),
    }
}

/// Decodes a body previously sized by [`decode_header`].
///
/// The payload is everything after the 8-byte header with the two padding
/// bytes removed. Bodies of 8 or 9 bytes carry no payload.
///
/// # Errors
/// - [`CodecError::BodyTooShort`] if `body` holds fewer than 8 bytes.
/// - [`CodecError::InvalidUtf8`] if the payload is not UTF-8.
pub fn decode_body(body: &[u8]) -> CodecResult<RconPacket> {
    if body.len() < BODY_HEADER {
        return Err(CodecError::BodyTooShort { length: body.len() });
    }
    let request_id = LittleEndian::read_i32(&body[0..4]);
    let packet_type = PacketType::from(LittleEndian::read_i32(&body[4..8]));
    let text = if body.len() >= MIN_BODY_LENGTH {
        &body[BODY_HEADER..body.len() - PADDING]
    } else {
        &[][..]
    };
    let payload = std::str::from_utf8(text).map_err(|e| CodecError::InvalidUtf8 {
        valid_up_to: e.valid_up_to(),
    })?;
    Ok(RconPacket::new(request_id, packet_type, payload))
}

fn encode_into(
    request_id: i32,
    packet_type: PacketType,
    payload: &[u8],
    dst: &mut BytesMut,
) -> CodecResult<()> {
    if let Some(position) = payload.iter().position(|&byte| byte == 0) {
        return Err(CodecError::EmbeddedNul { position });
    }
    let body_length = MIN_BODY_LENGTH + payload.len();
    if body_length > MAX_BODY_LENGTH {
        return Err(CodecError::InvalidLength {
            length: body_length as i64,
        });
    }

    dst.reserve(LENGTH_PREFIX + body_length);
    dst.put_i32_le(body_length as i32);
    dst.put_i32_le(request_id);
    dst.put_i32_le(packet_type.into());
    dst.put_slice(payload);
    dst.put_bytes(0, PADDING);
    Ok(())
}

/// A codec for the Minecraft RCON protocol.
///
/// `RconCodec` frames outgoing [`RconPacket`]s and reassembles incoming ones
/// from an arbitrarily fragmented byte stream. It is meant to be wrapped in a
/// `tokio_util::codec::Framed` around the TCP stream of a single connection.
///
/// The protocol has no multiplexing, so the codec carries no correlation
/// state; it only remembers how far into the current frame it is.
#[derive(Debug, Default)]
pub struct RconCodec {
    decoder_state: DecoderState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum DecoderState {
    /// Waiting for the four length bytes
    #[default]
    Length,
    /// Length consumed, waiting for this many body bytes
    Body(usize),
}

impl RconCodec {
    /// Creates a new codec positioned at a frame boundary.
    ///
    /// # Example
    /// ```
    /// use craftlink_rconcodec::RconCodec;
    ///
    /// let codec = RconCodec::new();
    /// ```
    pub fn new() -> RconCodec {
        RconCodec::default()
    }

    /// Whether the decoder is in the middle of a frame.
    pub fn is_mid_frame(&self) -> bool {
        self.decoder_state != DecoderState::Length
    }
}

impl Decoder for RconCodec {
    type Item = RconPacket;
    type Error = CodecError;

    /// Decodes at most one packet from `src`.
    ///
    /// The length prefix is consumed as soon as it is complete; the body is
    /// only consumed once all announced bytes are buffered. A malformed length
    /// or body is returned as an error and the stream should be abandoned.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<RconPacket>, Self::Error> {
        loop {
            match self.decoder_state {
                DecoderState::Length => {
                    if src.len() < LENGTH_PREFIX {
                        return Ok(None);
                    }
                    let length = decode_header(&src[..LENGTH_PREFIX])?;
                    src.advance(LENGTH_PREFIX);
                    src.reserve(length.saturating_sub(src.len()));
                    self.decoder_state = DecoderState::Body(length);
                }
                DecoderState::Body(length) => {
                    if src.len() < length {
                        return Ok(None);
                    }
                    let body = src.split_to(length);
                    self.decoder_state = DecoderState::Length;
                    let packet = decode_body(&body)?;
                    trace!(
                        request_id = packet.request_id,
                        packet_type = %packet.packet_type,
                        length,
                        "Decoded packet"
                    );
                    return Ok(Some(packet));
                }
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<RconPacket>, Self::Error> {
        if let Some(packet) = self.decode(src)? {
            return Ok(Some(packet));
        }
        let buffered = match self.decoder_state {
            DecoderState::Length => src.len(),
            DecoderState::Body(_) => LENGTH_PREFIX + src.len(),
        };
        if buffered == 0 {
            return Ok(None);
        }
        src.clear();
        self.decoder_state = DecoderState::Length;
        Err(CodecError::Truncated { buffered })
    }
}

impl Encoder<RconPacket> for RconCodec {
    type Error = CodecError;

    fn encode(&mut self, item: RconPacket, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_into(
            item.request_id,
            item.packet_type,
            item.payload.as_bytes(),
            dst,
        )?;
        trace!(
            request_id = item.request_id,
            packet_type = %item.packet_type,
            "Encoded packet"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============================================================================
    // Helper Functions
    // ============================================================================

    fn collect_all(codec: &mut RconCodec, src: &mut BytesMut) -> Vec<RconPacket> {
        let mut out = Vec::new();
        while let Some(packet) = codec.decode(src).expect("decode should not error") {
            out.push(packet);
        }
        out
    }

    fn frame(request_id: i32, packet_type: PacketType, payload: &str) -> BytesMut {
        BytesMut::from(&encode(request_id, packet_type, payload).expect("encode ok")[..])
    }

    // ============================================================================
    // Encoding Tests
    // ============================================================================

    #[test]
    fn encode_matches_wire_layout() {
        let bytes = encode(7, PacketType::Command, "list").unwrap();
        assert_eq!(
            &bytes[..],
            &[
                14, 0, 0, 0, // length
                7, 0, 0, 0, // request id
                2, 0, 0, 0, // type
                b'l', b'i', b's', b't', // payload
                0, 0, // padding
            ]
        );
    }

    #[test]
    fn encode_empty_payload_is_ten_byte_body() {
        let bytes = encode(1, PacketType::Auth, "").unwrap();
        assert_eq!(bytes.len(), 14);
        assert_eq!(&bytes[..4], &[10, 0, 0, 0]);
        assert_eq!(&bytes[8..12], &[3, 0, 0, 0]);
    }

    #[test]
    fn encode_negative_request_id_is_little_endian() {
        let bytes = encode(-1, PacketType::Response, "").unwrap();
        assert_eq!(&bytes[4..8], &[0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn encode_rejects_embedded_nul() {
        assert_eq!(
            encode(1, PacketType::Command, "say a\0b"),
            Err(CodecError::EmbeddedNul { position: 5 })
        );
    }

    #[test]
    fn encode_rejects_oversized_payload() {
        let payload = "x".repeat(MAX_BODY_LENGTH);
        assert!(matches!(
            encode(1, PacketType::Command, &payload),
            Err(CodecError::InvalidLength { .. })
        ));
    }

    #[test]
    fn encoder_trait_matches_free_function() {
        let mut codec = RconCodec::new();
        let mut dst = BytesMut::new();
        codec
            .encode(RconPacket::command(42, "time set day"), &mut dst)
            .unwrap();
        assert_eq!(
            &dst[..],
            &encode(42, PacketType::Command, "time set day").unwrap()[..]
        );
    }

    #[test]
    fn encoder_leaves_buffer_untouched_on_error() {
        let mut codec = RconCodec::new();
        let mut dst = BytesMut::new();
        assert!(codec.encode(RconPacket::command(1, "\0"), &mut dst).is_err());
        assert!(dst.is_empty());
    }

    // ============================================================================
    // Header / Body Tests
    // ============================================================================

    #[test]
    fn decode_header_reads_little_endian() {
        assert_eq!(decode_header(&[10, 0, 0, 0]).unwrap(), 10);
        assert_eq!(decode_header(&[0x00, 0x01, 0, 0, 0xAA]).unwrap(), 256);
    }

    #[test]
    fn decode_header_rejects_bad_lengths() {
        assert_eq!(
            decode_header(&[0xFF, 0xFF, 0xFF, 0xFF]),
            Err(CodecError::InvalidLength { length: -1 })
        );
        assert_eq!(
            decode_header(&[7, 0, 0, 0]),
            Err(CodecError::InvalidLength { length: 7 })
        );
        assert!(matches!(
            decode_header(&[0, 0, 0x20, 0]),
            Err(CodecError::InvalidLength { .. })
        ));
    }

    #[test]
    fn decode_header_needs_four_bytes() {
        assert_eq!(
            decode_header(&[1, 2]),
            Err(CodecError::IncompleteHeader { available: 2 })
        );
    }

    #[test]
    fn decode_body_too_short_never_panics() {
        for length in 0..BODY_HEADER {
            let body = vec![0u8; length];
            assert_eq!(decode_body(&body), Err(CodecError::BodyTooShort { length }));
        }
    }

    #[test]
    fn decode_body_without_padding_has_empty_payload() {
        let packet = decode_body(&[5, 0, 0, 0, 0, 0, 0, 0]).unwrap();
        assert_eq!(packet, RconPacket::new(5, PacketType::Response, ""));

        let packet = decode_body(&[5, 0, 0, 0, 0, 0, 0, 0, 0]).unwrap();
        assert_eq!(packet.payload, "");
    }

    #[test]
    fn decode_body_strips_padding() {
        let mut body = vec![9, 0, 0, 0, 0, 0, 0, 0];
        body.extend_from_slice(b"There are 0 of a max of 20 players online");
        body.extend_from_slice(&[0, 0]);
        let packet = decode_body(&body).unwrap();
        assert_eq!(packet.request_id, 9);
        assert_eq!(packet.payload, "There are 0 of a max of 20 players online");
    }

    #[test]
    fn decode_body_rejects_invalid_utf8() {
        let body = [1, 0, 0, 0, 0, 0, 0, 0, b'o', b'k', 0xC3, 0, 0];
        assert_eq!(
            decode_body(&body),
            Err(CodecError::InvalidUtf8 { valid_up_to: 2 })
        );
    }

    // ============================================================================
    // Decoder Tests
    // ============================================================================

    #[test]
    fn decoder_handles_byte_by_byte_delivery() {
        let wire = frame(3, PacketType::Response, "Done");
        let mut codec = RconCodec::new();
        let mut src = BytesMut::new();
        let mut decoded = Vec::new();
        for &byte in wire.iter() {
            src.put_u8(byte);
            if let Some(packet) = codec.decode(&mut src).unwrap() {
                decoded.push(packet);
            }
        }
        assert_eq!(decoded, vec![RconPacket::new(3, PacketType::Response, "Done")]);
        assert!(!codec.is_mid_frame());
    }

    #[test]
    fn decoder_splits_back_to_back_frames() {
        let mut src = frame(1, PacketType::Response, "first");
        src.extend_from_slice(&frame(2, PacketType::Response, "second"));
        let mut codec = RconCodec::new();
        let packets = collect_all(&mut codec, &mut src);
        assert_eq!(packets.len(), 2);
        assert_eq!(packets[0].payload, "first");
        assert_eq!(packets[1].payload, "second");
        assert!(src.is_empty());
    }

    #[test]
    fn decoder_waits_for_full_body() {
        let wire = frame(1, PacketType::Response, "partial body");
        let mut src = BytesMut::from(&wire[..wire.len() - 3]);
        let mut codec = RconCodec::new();
        assert_eq!(codec.decode(&mut src).unwrap(), None);
        assert!(codec.is_mid_frame());
        src.extend_from_slice(&wire[wire.len() - 3..]);
        assert_eq!(
            codec.decode(&mut src).unwrap().map(|p| p.payload),
            Some("partial body".to_string())
        );
    }

    #[test]
    fn decoder_rejects_invalid_length_prefix() {
        let mut src = BytesMut::from(&[0xFF, 0xFF, 0xFF, 0xFF, 1, 2, 3][..]);
        let mut codec = RconCodec::new();
        assert!(matches!(
            codec.decode(&mut src),
            Err(CodecError::InvalidLength { length: -1 })
        ));
    }

    #[test]
    fn decode_eof_on_clean_boundary_is_none() {
        let mut codec = RconCodec::new();
        let mut src = BytesMut::new();
        assert_eq!(codec.decode_eof(&mut src).unwrap(), None);
    }

    #[test]
    fn decode_eof_mid_frame_is_truncated() {
        let wire = frame(1, PacketType::Response, "cut short");
        let mut src = BytesMut::from(&wire[..6]);
        let mut codec = RconCodec::new();
        assert_eq!(
            codec.decode_eof(&mut src),
            Err(CodecError::Truncated { buffered: 6 })
        );
        assert!(!codec.is_mid_frame());
    }

    #[test]
    fn decode_eof_with_partial_length_is_truncated() {
        let mut src = BytesMut::from(&[14, 0][..]);
        let mut codec = RconCodec::new();
        assert_eq!(
            codec.decode_eof(&mut src),
            Err(CodecError::Truncated { buffered: 2 })
        );
    }

    #[test]
    #[tracing_test::traced_test]
    fn codec_traces_each_packet() {
        let mut codec = RconCodec::new();
        let mut dst = BytesMut::new();
        codec
            .encode(RconPacket::new(7, PacketType::Command, "list"), &mut dst)
            .unwrap();
        codec.decode(&mut dst).unwrap();
        assert!(logs_contain("Encoded packet"));
        assert!(logs_contain("Decoded packet"));
    }
}
