//! Little-endian base-128 integers as used by the Minecraft protocol.

use crate::error::ProtocolError;

const SEGMENT_BITS: u8 = 0b0111_1111;
const CONTINUE_BIT: u8 = 0b1000_0000;

pub const MAX_VARINT_LEN: usize = 5;

/// Result of a decode attempt against a buffer that may still be filling up.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Decoded<T> {
    Complete(T, usize),
    Incomplete,
}

pub fn encode(mut n: u32, out: &mut Vec<u8>) -> usize {
    let mut bytes_sent = 0;
    loop {
        bytes_sent += 1;
        let tmp = n as u8 & SEGMENT_BITS;
        n >>= 7;
        if n == 0 {
            out.push(tmp);
            return bytes_sent;
        }
        out.push(tmp | CONTINUE_BIT);
    }
}

pub fn encoded_len(n: u32) -> usize {
    match n {
        0..=0x7F => 1,
        0x80..=0x3FFF => 2,
        0x4000..=0x1F_FFFF => 3,
        0x20_0000..=0xFFF_FFFF => 4,
        _ => 5,
    }
}

/// Running out of input is [`Decoded::Incomplete`], not an error.
pub fn decode(buf: &[u8]) -> Result<Decoded<u32>, ProtocolError> {
    let mut read_int: u32 = 0;
    for (bytes_read, &incoming_byte) in buf.iter().take(MAX_VARINT_LEN).enumerate() {
        read_int |= u32::from(incoming_byte & SEGMENT_BITS) << (7 * bytes_read);
        if incoming_byte & CONTINUE_BIT == 0 {
            return Ok(Decoded::Complete(read_int, bytes_read + 1));
        }
    }
    if buf.len() >= MAX_VARINT_LEN {
        Err(ProtocolError::VarIntTooLong)
    } else {
        Ok(Decoded::Incomplete)
    }
}
