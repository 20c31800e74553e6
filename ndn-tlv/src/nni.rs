//
// Copyright (c) The NDNgo-rs Contributors
//
// SPDX-License-Identifier: MIT
//

//
// NonNegativeInteger codec (spec §4.1): 1, 2, 4, or 8 octet big-endian
// unsigned integers used for TLV-LENGTH and most numeric fields (nonce,
// sequence numbers, face IDs, fragment indices, ...).
//

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{DecodeError, DecodeResult};

/// Returns the number of octets a canonical NNI encoding of `v` occupies.
pub fn nni_len(v: u64) -> usize {
    if v <= u8::MAX as u64 {
        1
    } else if v <= u16::MAX as u64 {
        2
    } else if v <= u32::MAX as u64 {
        4
    } else {
        8
    }
}

/// Encodes `v` in the shortest of the four NNI forms.
pub fn encode_nni(buf: &mut BytesMut, v: u64) {
    if v <= u8::MAX as u64 {
        buf.put_u8(v as u8);
    } else if v <= u16::MAX as u64 {
        buf.put_u16(v as u16);
    } else if v <= u32::MAX as u64 {
        buf.put_u32(v as u32);
    } else {
        buf.put_u64(v);
    }
}

/// Decodes an entire buffer as a NonNegativeInteger. The buffer must be
/// exactly 1, 2, 4, or 8 octets; any other length is
/// [`DecodeError::InvalidNniLength`].
pub fn decode_nni(value: &Bytes) -> DecodeResult<u64> {
    let mut buf = value.clone();
    match buf.remaining() {
        1 => Ok(buf.get_u8() as u64),
        2 => Ok(buf.get_u16() as u64),
        4 => Ok(buf.get_u32() as u64),
        8 => Ok(buf.get_u64()),
        len => Err(DecodeError::InvalidNniLength(len)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(v: u64, expect_len: usize) {
        let mut buf = BytesMut::new();
        encode_nni(&mut buf, v);
        assert_eq!(buf.len(), expect_len);
        assert_eq!(nni_len(v), expect_len);
        assert_eq!(decode_nni(&buf.freeze()).unwrap(), v);
    }

    #[test]
    fn canonical_lengths() {
        roundtrip(0, 1);
        roundtrip(u8::MAX as u64, 1);
        roundtrip(u8::MAX as u64 + 1, 2);
        roundtrip(u16::MAX as u64, 2);
        roundtrip(u16::MAX as u64 + 1, 4);
        roundtrip(u32::MAX as u64, 4);
        roundtrip(u32::MAX as u64 + 1, 8);
        roundtrip(u64::MAX, 8);
    }

    #[test]
    fn invalid_length_rejected() {
        assert_eq!(
            decode_nni(&Bytes::from_static(&[0, 0, 0])),
            Err(DecodeError::InvalidNniLength(3))
        );
        assert_eq!(
            decode_nni(&Bytes::new()),
            Err(DecodeError::InvalidNniLength(0))
        );
    }
}
