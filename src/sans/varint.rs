//! Base-128 variable-length integers and the zigzag mapping.

use super::WireError;

/// Longest encoding of a 64-bit value.
pub const MAX_LEN: usize = 10;

/// Read a varint from the front of a buffer.
///
/// Returns the value and the number of bytes it occupied.
pub fn read_varint(r: &[u8]) -> Result<(u64, usize), WireError> {
    let mut value = 0;

    for (i, shift) in (0..u64::BITS).step_by(7).enumerate() {
        let b = *r.get(i).ok_or(WireError::Truncated)?;

        // The last byte holds only bit 63.
        if i == MAX_LEN - 1 && b > 1 {
            Err(WireError::Overflow)?;
        }

        value |= u64::from(b & 0x7F) << shift;

        if b < 0x80 {
            return Ok((value, i + 1));
        }
    }

    Err(WireError::Overflow)
}

/// Encode a varint into a fixed buffer.
///
/// Returns the buffer and the number of leading bytes in use.
pub fn encode_varint(mut v: u64) -> ([u8; MAX_LEN], usize) {
    let mut buf = [0; MAX_LEN];
    let mut i = 0;

    loop {
        let b = (v & 0x7F) as u8;
        v >>= 7;

        if v == 0 {
            buf[i] = b;
            return (buf, i + 1);
        }

        buf[i] = b | 0x80;
        i += 1;
    }
}

/// Number of bytes [`encode_varint`] uses for a value.
pub const fn encoded_len(v: u64) -> usize {
    let bits = u64::BITS - (v | 1).leading_zeros();
    bits.div_ceil(7) as usize
}

pub fn zigzag_encode_32(n: i32) -> u32 {
    ((n << 1) ^ (n >> 31)) as u32
}

pub fn zigzag_decode_32(z: u32) -> i32 {
    ((z >> 1) as i32) ^ -((z & 1) as i32)
}

pub fn zigzag_encode_64(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

pub fn zigzag_decode_64(z: u64) -> i64 {
    ((z >> 1) as i64) ^ -((z & 1) as i64)
}
