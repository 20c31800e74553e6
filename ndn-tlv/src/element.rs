//
// Copyright (c) The NDNgo-rs Contributors
//
// SPDX-License-Identifier: MIT
//

//
// Top-level TLV elements: TYPE-LENGTH-VALUE triples and the iterator that
// walks a wire buffer element by element.
//

use bytes::{Buf, Bytes, BytesMut};

use crate::error::{DecodeError, DecodeResult, EncodeError, EncodeResult};
use crate::varnum::{decode_var_number, encode_var_number, var_number_len};

/// A single decoded TYPE-LENGTH-VALUE triple. `value` is the VALUE field
/// only; TYPE and LENGTH have already been stripped off.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Element {
    pub typ: u64,
    pub value: Bytes,
}

impl Element {
    pub fn new(typ: u64, value: Bytes) -> Element {
        Element { typ, value }
    }

    /// Total length of this element once re-encoded: TYPE + LENGTH + VALUE.
    pub fn len(&self) -> usize {
        var_number_len(self.typ) + var_number_len(self.value.len() as u64) + self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && self.typ == 0
    }

    /// Appends this element's wire form (TYPE, LENGTH, VALUE) to `buf`.
    pub fn encode(&self, buf: &mut BytesMut) {
        encode_var_number(buf, self.typ);
        encode_var_number(buf, self.value.len() as u64);
        buf.extend_from_slice(&self.value);
    }
}

/// Walks a buffer as a sequence of top-level TLV elements.
///
/// Does not itself enforce critical/non-critical handling or element
/// ordering; callers decoding a composite type drive the iteration and
/// apply their own per-field rules, consulting [`crate::is_critical`] (or
/// the NDNLPv2 variant) for fields they don't recognize.
pub struct Decoder {
    buf: Bytes,
}

impl Decoder {
    pub fn new(buf: Bytes) -> Decoder {
        Decoder { buf }
    }

    /// Decodes and returns the next element, or `None` if the buffer is
    /// exhausted.
    pub fn next(&mut self) -> DecodeResult<Option<Element>> {
        if self.buf.is_empty() {
            return Ok(None);
        }
        let typ = decode_var_number(&mut self.buf)?;
        let len = decode_var_number(&mut self.buf)? as usize;
        if self.buf.remaining() < len {
            return Err(DecodeError::ReadOutOfBounds);
        }
        let value = self.buf.split_to(len);
        Ok(Some(Element::new(typ, value)))
    }

    /// Returns whatever is left unconsumed.
    pub fn rest(&self) -> &Bytes {
        &self.buf
    }

    /// Fails with [`DecodeError::TrailingBytes`] unless the buffer has been
    /// fully consumed. Composite decoders call this once they've read every
    /// field they expect.
    pub fn err_unless_eof(&self) -> DecodeResult<()> {
        if self.buf.is_empty() {
            Ok(())
        } else {
            Err(DecodeError::TrailingBytes)
        }
    }
}

/// Implemented by types that can serialize themselves to a single TLV
/// element's TYPE and VALUE.
///
/// This mirrors the wire contract of `tlv.Marshaler` in the reference
/// implementation, adapted to return owned data rather than mutate a
/// caller-supplied buffer: `marshal` produces the (TYPE, VALUE) pair,
/// and [`encode`] wraps it with the LENGTH prefix.
pub trait Marshaler {
    fn marshal(&self) -> EncodeResult<(u64, Bytes)>;
}

/// Implemented by types that can be reconstructed from a single TLV
/// element's TYPE and VALUE.
pub trait Unmarshaler: Sized {
    fn unmarshal(typ: u64, value: Bytes) -> DecodeResult<Self>;
}

/// Encodes `m` as a complete wire element (TYPE, LENGTH, VALUE).
pub fn encode<M: Marshaler>(m: &M) -> EncodeResult<Bytes> {
    let (typ, value) = m.marshal()?;
    let mut buf = BytesMut::with_capacity(
        var_number_len(typ) + var_number_len(value.len() as u64) + value.len(),
    );
    Element::new(typ, value).encode(&mut buf);
    Ok(buf.freeze())
}

/// Decodes a complete wire element (TYPE, LENGTH, VALUE) into `U`, failing
/// if there are bytes left over afterwards.
pub fn decode<U: Unmarshaler>(wire: Bytes) -> DecodeResult<U> {
    let mut dec = Decoder::new(wire);
    let elem = dec.next()?.ok_or(DecodeError::ReadOutOfBounds)?;
    dec.err_unless_eof()?;
    U::unmarshal(elem.typ, elem.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ping(u64);

    impl Marshaler for Ping {
        fn marshal(&self) -> EncodeResult<(u64, Bytes)> {
            let mut buf = BytesMut::new();
            crate::nni::encode_nni(&mut buf, self.0);
            Ok((1, buf.freeze()))
        }
    }

    impl Unmarshaler for Ping {
        fn unmarshal(typ: u64, value: Bytes) -> DecodeResult<Self> {
            if typ != 1 {
                return Err(DecodeError::Critical(typ));
            }
            Ok(Ping(crate::nni::decode_nni(&value)?))
        }
    }

    #[test]
    fn marshal_roundtrip() {
        let wire = encode(&Ping(42)).unwrap();
        let decoded: Ping = decode(wire).unwrap();
        assert_eq!(decoded.0, 42);
    }

    #[test]
    fn decoder_iterates_multiple_elements() {
        let mut buf = BytesMut::new();
        Element::new(1, Bytes::from_static(b"a")).encode(&mut buf);
        Element::new(2, Bytes::from_static(b"bc")).encode(&mut buf);
        let mut dec = Decoder::new(buf.freeze());
        let first = dec.next().unwrap().unwrap();
        assert_eq!(first.typ, 1);
        assert_eq!(first.value, Bytes::from_static(b"a"));
        let second = dec.next().unwrap().unwrap();
        assert_eq!(second.typ, 2);
        assert_eq!(second.value, Bytes::from_static(b"bc"));
        assert!(dec.next().unwrap().is_none());
        dec.err_unless_eof().unwrap();
    }

    #[test]
    fn truncated_value_rejected() {
        let mut dec = Decoder::new(Bytes::from_static(&[1, 5, b'a', b'b']));
        assert_eq!(dec.next(), Err(DecodeError::ReadOutOfBounds));
    }
}
