//! The three packets of a status exchange.
//!
//! Every packet on the wire is `[VarInt length][VarInt packet id][payload]`, where the
//! length covers the id and the payload. Outbound packets are encoded into a byte vector;
//! the inbound response is recognised in place from whatever has been buffered so far.

use std::str;

use crate::error::ProtocolError;
use crate::varint::{self, Decoded};

pub const STATUS_PACKET_ID: u32 = 0x00;

/// `next_state` value asking the server to switch to the status protocol.
pub const NEXT_STATE_STATUS: u32 = 1;

/// Largest frame a three byte length prefix can announce.
pub const MAXIMUM_PACKET_SIZE: u32 = 2_097_151;

fn write_frame(out: &mut Vec<u8>, packet_id: u32, payload: &[u8]) {
    let length = varint::encoded_len(packet_id) + payload.len();
    varint::encode(length as u32, out);
    varint::encode(packet_id, out);
    out.extend_from_slice(payload);
}

fn write_string(out: &mut Vec<u8>, s: &str) {
    varint::encode(s.len() as u32, out);
    out.extend_from_slice(s.as_bytes());
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handshake<'a> {
    pub protocol_version: u32,
    pub server_address: &'a str,
    pub server_port: u16,
    pub next_state: u32,
}

impl<'a> Handshake<'a> {
    /// A handshake that moves the connection into the status state.
    pub fn status(server_address: &'a str, server_port: u16, protocol_version: u32) -> Self {
        Self {
            protocol_version,
            server_address,
            server_port,
            next_state: NEXT_STATE_STATUS,
        }
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        let mut payload = Vec::with_capacity(self.server_address.len() + 12);
        varint::encode(self.protocol_version, &mut payload);
        write_string(&mut payload, self.server_address);
        payload.extend_from_slice(&self.server_port.to_be_bytes());
        varint::encode(self.next_state, &mut payload);
        write_frame(out, STATUS_PACKET_ID, &payload);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusRequest;

impl StatusRequest {
    pub fn encode(&self, out: &mut Vec<u8>) {
        write_frame(out, STATUS_PACKET_ID, &[]);
    }
}

/// A complete status response, borrowing its JSON text from the receive buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusResponse<'a> {
    pub json: &'a str,
}

impl<'a> StatusResponse<'a> {
    /// Tries to recognise one response frame at the start of `buf`.
    ///
    /// Returns [`Decoded::Incomplete`] until the whole frame announced by the length prefix
    /// is present; this check has no side effects and may be repeated after every read.
    /// Once the frame is complete its contents are validated and any inconsistency is an error.
    pub fn try_parse(buf: &'a [u8]) -> Result<Decoded<Self>, ProtocolError> {
        let (length, prefix_len) = match varint::decode(buf)? {
            Decoded::Complete(length, prefix_len) => (length, prefix_len),
            Decoded::Incomplete => return Ok(Decoded::Incomplete),
        };
        if length > MAXIMUM_PACKET_SIZE {
            return Err(ProtocolError::PacketTooLarge(length));
        }
        let frame_len = prefix_len + length as usize;
        if buf.len() < frame_len {
            return Ok(Decoded::Incomplete);
        }

        let mut body = &buf[prefix_len..frame_len];
        let packet_id = read_varint_in_frame(&mut body)?;
        if packet_id != STATUS_PACKET_ID {
            return Err(ProtocolError::UnexpectedPacketId(packet_id));
        }
        let json_len = read_varint_in_frame(&mut body)? as usize;
        if json_len > body.len() {
            return Err(ProtocolError::LengthMismatch);
        }
        let json = str::from_utf8(&body[..json_len])?;

        Ok(Decoded::Complete(Self { json }, frame_len))
    }
}

/// Inside a complete frame running out of bytes means the frame lied about its contents.
fn read_varint_in_frame(body: &mut &[u8]) -> Result<u32, ProtocolError> {
    match varint::decode(body)? {
        Decoded::Complete(value, used) => {
            *body = &body[used..];
            Ok(value)
        }
        Decoded::Incomplete => Err(ProtocolError::LengthMismatch),
    }
}

#[cfg(test)]
pub(crate) fn encode_response(packet_id: u32, json: &str) -> Vec<u8> {
    let mut payload = Vec::new();
    write_string(&mut payload, json);
    let mut out = Vec::new();
    write_frame(&mut out, packet_id, &payload);
    out
}
