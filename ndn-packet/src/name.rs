//
// Copyright (c) The NDNgo-rs Contributors
//
// SPDX-License-Identifier: MIT
//

//! Name model (spec §3, §4.7): components, names, canonical ordering, and
//! the URI-text syntax (`/a/b=c`).

use bytes::{Bytes, BytesMut};
use ndn_tlv::{DecodeError, DecodeResult, Decoder, EncodeResult, Marshaler, Unmarshaler};

use crate::error::{PacketError, PacketResult};
use crate::tlv_type;

/// A single NameComponent: a TLV-TYPE in `[1, 65535]` plus an opaque value.
///
/// The generic component type (0x08) is used unless the URI text or the
/// caller names one of the typed components explicitly (Keyword, Segment,
/// ByteOffset, Version, Timestamp, SequenceNum, or one of the two digest
/// components).
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct NameComponent {
    pub typ: u64,
    pub value: Bytes,
}

impl NameComponent {
    pub fn new(typ: u64, value: impl Into<Bytes>) -> PacketResult<NameComponent> {
        let value = value.into();
        if typ == 0 || typ > 65535 {
            return Err(PacketError::ComponentType(typ));
        }
        Ok(NameComponent { typ, value })
    }

    pub fn generic(value: impl Into<Bytes>) -> NameComponent {
        NameComponent {
            typ: tlv_type::GENERIC_NAME_COMPONENT,
            value: value.into(),
        }
    }

    pub fn implicit_sha256_digest(digest: impl Into<Bytes>) -> NameComponent {
        NameComponent {
            typ: tlv_type::IMPLICIT_SHA256_DIGEST_COMPONENT,
            value: digest.into(),
        }
    }

    pub fn parameters_sha256_digest(digest: impl Into<Bytes>) -> NameComponent {
        NameComponent {
            typ: tlv_type::PARAMETERS_SHA256_DIGEST_COMPONENT,
            value: digest.into(),
        }
    }

    fn len(&self) -> usize {
        ndn_tlv::var_number_len(self.typ)
            + ndn_tlv::var_number_len(self.value.len() as u64)
            + self.value.len()
    }

    fn encode(&self, buf: &mut BytesMut) {
        ndn_tlv::encode_var_number(buf, self.typ);
        ndn_tlv::encode_var_number(buf, self.value.len() as u64);
        buf.extend_from_slice(&self.value);
    }

    /// Parses one `/`-separated URI segment: `[type=]percent-encoded-value`.
    fn parse_uri_segment(segment: &str) -> PacketResult<NameComponent> {
        let (typ, raw) = match segment.split_once('=') {
            Some((t, v)) => (
                t.parse::<u64>()
                    .map_err(|_| PacketError::ComponentType(0))?,
                v,
            ),
            None => (tlv_type::GENERIC_NAME_COMPONENT, segment),
        };
        NameComponent::new(typ, percent_decode(raw))
    }

    fn fmt_uri(&self, out: &mut String) {
        if self.typ != tlv_type::GENERIC_NAME_COMPONENT {
            out.push_str(&self.typ.to_string());
            out.push('=');
        }
        percent_encode(&self.value, out);
    }
}

fn percent_decode(s: &str) -> Vec<u8> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let Ok(b) = u8::from_str_radix(&s[i + 1..i + 3], 16) {
                out.push(b);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}

fn percent_encode(value: &[u8], out: &mut String) {
    for &b in value {
        match b {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(b as char);
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
}

/// An ordered sequence of [`NameComponent`]s.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Name(Vec<NameComponent>);

impl Name {
    pub fn new() -> Name {
        Name(Vec::new())
    }

    pub fn components(&self) -> &[NameComponent] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, component: NameComponent) -> &mut Name {
        self.0.push(component);
        self
    }

    pub fn append(mut self, component: NameComponent) -> Name {
        self.0.push(component);
        self
    }

    pub fn last(&self) -> Option<&NameComponent> {
        self.0.last()
    }

    /// Returns `true` iff `self` is a prefix of `other`: `|self| <= |other|`
    /// and every component in `0..|self|` matches.
    pub fn is_prefix_of(&self, other: &Name) -> bool {
        self.0.len() <= other.0.len() && self.0.iter().zip(other.0.iter()).all(|(a, b)| a == b)
    }

    /// Parses NDN URI text (`/a/b=c`). A leading `/` is optional; an empty
    /// string or lone `/` yields the empty name.
    pub fn parse(uri: &str) -> PacketResult<Name> {
        let mut name = Name::new();
        for segment in uri.trim_start_matches('/').split('/') {
            if segment.is_empty() {
                continue;
            }
            name.push(NameComponent::parse_uri_segment(segment)?);
        }
        Ok(name)
    }

    pub fn to_uri(&self) -> String {
        let mut out = String::new();
        if self.0.is_empty() {
            out.push('/');
        }
        for c in &self.0 {
            out.push('/');
            c.fmt_uri(&mut out);
        }
        out
    }

    pub(crate) fn wire_len(&self) -> usize {
        self.0.iter().map(NameComponent::len).sum()
    }

    pub(crate) fn encode_value(&self, buf: &mut BytesMut) {
        for c in &self.0 {
            c.encode(buf);
        }
    }

    /// Parses a Name's VALUE (the caller has already matched the outer
    /// TLV-TYPE) into its components, rejecting any NameComponent TLV-TYPE
    /// outside `[1, 65535]` as [`PacketError::ComponentType`] (spec §7).
    pub fn decode_from(value: Bytes) -> PacketResult<Name> {
        let mut dec = Decoder::new(value);
        let mut name = Name::new();
        while let Some(elem) = dec.next()? {
            if elem.typ == 0 || elem.typ > 65535 {
                return Err(PacketError::ComponentType(elem.typ));
            }
            name.push(NameComponent {
                typ: elem.typ,
                value: elem.value,
            });
        }
        Ok(name)
    }
}

/// Canonical NDN component ordering: shorter octet strings sort first;
/// equal-length components compare lexicographically by octet value.
impl Ord for NameComponent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value
            .len()
            .cmp(&other.value.len())
            .then_with(|| self.value.cmp(&other.value))
    }
}

impl PartialOrd for NameComponent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Name {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_uri())
    }
}

impl std::str::FromStr for Name {
    type Err = PacketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Name::parse(s)
    }
}

impl Marshaler for Name {
    fn marshal(&self) -> EncodeResult<(u64, Bytes)> {
        let mut buf = BytesMut::with_capacity(self.wire_len());
        self.encode_value(&mut buf);
        Ok((tlv_type::NAME, buf.freeze()))
    }
}

impl Unmarshaler for Name {
    /// Trait-boundary entry point: callers that can report a
    /// [`PacketError`] directly (e.g. `Interest`/`Data` decode) should call
    /// [`Name::decode_from`] instead, so an out-of-range NameComponent
    /// TLV-TYPE surfaces as `ComponentType` rather than being downgraded to
    /// `Critical` here.
    fn unmarshal(typ: u64, value: Bytes) -> DecodeResult<Name> {
        if typ != tlv_type::NAME {
            return Err(DecodeError::Critical(typ));
        }
        Name::decode_from(value).map_err(|e| match e {
            PacketError::Tlv(e) => e,
            PacketError::ComponentType(t) => DecodeError::Critical(t),
            _ => DecodeError::Critical(tlv_type::NAME),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_iff_concatenation() {
        let p = Name::parse("/a/b").unwrap();
        let n = Name::parse("/a/b/c").unwrap();
        assert!(p.is_prefix_of(&n));
        assert!(!n.is_prefix_of(&p));
        assert!(Name::new().is_prefix_of(&n));
    }

    #[test]
    fn uri_roundtrip() {
        let n = Name::parse("/a/b=c").unwrap();
        assert_eq!(n.len(), 2);
        assert_eq!(n.components()[1].typ, tlv_type::GENERIC_NAME_COMPONENT);
        // type=value form round-trips back through to_uri using the decimal
        // type prefix only for non-generic components.
        let typed = Name::new().append(NameComponent::new(32, "c").unwrap());
        assert_eq!(typed.to_uri(), "/32=c");
    }

    #[test]
    fn empty_name_uri_is_slash() {
        assert_eq!(Name::new().to_uri(), "/");
        assert_eq!(Name::parse("/").unwrap(), Name::new());
        assert_eq!(Name::parse("").unwrap(), Name::new());
    }

    #[test]
    fn component_type_out_of_range_rejected() {
        assert_eq!(
            NameComponent::new(0, "x"),
            Err(PacketError::ComponentType(0))
        );
        assert_eq!(
            NameComponent::new(65536, "x"),
            Err(PacketError::ComponentType(65536))
        );
    }

    #[test]
    fn decode_rejects_component_type_out_of_range() {
        let mut buf = BytesMut::new();
        ndn_tlv::encode_var_number(&mut buf, 0);
        ndn_tlv::encode_var_number(&mut buf, 1);
        buf.extend_from_slice(b"x");
        assert_eq!(
            Name::decode_from(buf.freeze()),
            Err(PacketError::ComponentType(0))
        );

        let mut buf = BytesMut::new();
        ndn_tlv::encode_var_number(&mut buf, 65536);
        ndn_tlv::encode_var_number(&mut buf, 1);
        buf.extend_from_slice(b"x");
        assert_eq!(
            Name::decode_from(buf.freeze()),
            Err(PacketError::ComponentType(65536))
        );
    }

    #[test]
    fn wire_roundtrip() {
        let n = Name::parse("/A").unwrap();
        let wire = ndn_tlv::encode(&n).unwrap();
        assert_eq!(wire, Bytes::from_static(&[0x07, 0x03, 0x08, 0x01, b'A']));
        let decoded: Name = ndn_tlv::decode(wire).unwrap();
        assert_eq!(decoded, n);
    }
}
