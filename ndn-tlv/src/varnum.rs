//
// Copyright (c) The NDNgo-rs Contributors
//
// SPDX-License-Identifier: MIT
//

//
// VAR-number codec (spec §4.1): the encoding used for both TLV-TYPE and
// TLV-LENGTH.
//

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{DecodeError, DecodeResult};

/// Returns the number of octets a canonical VAR-number encoding of `v`
/// occupies.
pub fn var_number_len(v: u64) -> usize {
    if v < 0xFD {
        1
    } else if v <= 0xFFFF {
        3
    } else if v <= 0xFFFF_FFFF {
        5
    } else {
        9
    }
}

/// Encodes `v` as a VAR-number, always choosing the shortest of the four
/// forms (canonical encoding).
pub fn encode_var_number(buf: &mut BytesMut, v: u64) {
    if v < 0xFD {
        buf.put_u8(v as u8);
    } else if v <= 0xFFFF {
        buf.put_u8(0xFD);
        buf.put_u16(v as u16);
    } else if v <= 0xFFFF_FFFF {
        buf.put_u8(0xFE);
        buf.put_u32(v as u32);
    } else {
        buf.put_u8(0xFF);
        buf.put_u64(v);
    }
}

/// Decodes a VAR-number from the front of `buf`, advancing past it.
///
/// Rejects truncated prefixes (not enough trailing octets for the marker
/// read) with [`DecodeError::ReadOutOfBounds`].
pub fn decode_var_number(buf: &mut Bytes) -> DecodeResult<u64> {
    if !buf.has_remaining() {
        return Err(DecodeError::ReadOutOfBounds);
    }
    let marker = buf.get_u8();
    match marker {
        0xFD => {
            if buf.remaining() < 2 {
                return Err(DecodeError::ReadOutOfBounds);
            }
            Ok(buf.get_u16() as u64)
        }
        0xFE => {
            if buf.remaining() < 4 {
                return Err(DecodeError::ReadOutOfBounds);
            }
            Ok(buf.get_u32() as u64)
        }
        0xFF => {
            if buf.remaining() < 8 {
                return Err(DecodeError::ReadOutOfBounds);
            }
            Ok(buf.get_u64())
        }
        v => Ok(v as u64),
    }
}
