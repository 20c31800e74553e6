//
// Copyright (c) The NDNgo-rs Contributors
//
// SPDX-License-Identifier: MIT
//

//! The Data packet (spec §3, §4.2).

use std::cell::OnceCell;

use bytes::{Bytes, BytesMut};
use ndn_tlv::{DecodeError, Decoder, Element, EncodeResult, Marshaler, Unmarshaler};
use sha2::{Digest, Sha256};

use crate::error::{PacketError, PacketResult};
use crate::meta_info::MetaInfo;
use crate::name::Name;
use crate::sig_info::SigInfo;
use crate::tlv_type;

/// A Data packet.
///
/// `digest` caches the SHA-256 of the packet's complete wire encoding, used
/// as the ImplicitSha256DigestComponent in selectors. It is computed lazily
/// on first access and is not part of equality or hashing.
#[derive(Clone, Debug, Default)]
pub struct Data {
    pub name: Name,
    pub meta_info: MetaInfo,
    pub content: Bytes,
    pub signature_info: Option<SigInfo>,
    pub signature_value: Bytes,
    digest: OnceCell<[u8; 32]>,
}

impl PartialEq for Data {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.meta_info == other.meta_info
            && self.content == other.content
            && self.signature_info == other.signature_info
            && self.signature_value == other.signature_value
    }
}

impl Data {
    pub fn new(name: Name) -> Data {
        Data {
            name,
            ..Default::default()
        }
    }

    /// Returns the SHA-256 digest of this Data's complete TLV encoding,
    /// computing and caching it on first call.
    pub fn implicit_digest(&self) -> ndn_tlv::EncodeResult<[u8; 32]> {
        if let Some(d) = self.digest.get() {
            return Ok(*d);
        }
        let wire = ndn_tlv::encode(self)?;
        let digest: [u8; 32] = Sha256::digest(&wire).into();
        let _ = self.digest.set(digest);
        Ok(digest)
    }
}

impl Marshaler for Data {
    fn marshal(&self) -> EncodeResult<(u64, Bytes)> {
        let mut buf = BytesMut::new();

        let (typ, value) = self.name.marshal()?;
        Element::new(typ, value).encode(&mut buf);

        let (typ, value) = self.meta_info.marshal()?;
        Element::new(typ, value).encode(&mut buf);

        Element::new(tlv_type::CONTENT, self.content.clone()).encode(&mut buf);

        let sig_info_wire = SigInfo::encode_as(self.signature_info.as_ref(), tlv_type::SIGNATURE_INFO)?;
        buf.extend_from_slice(&sig_info_wire);

        Element::new(tlv_type::SIGNATURE_VALUE, self.signature_value.clone()).encode(&mut buf);

        Ok((tlv_type::DATA, buf.freeze()))
    }
}

impl Data {
    pub fn decode_from(typ: u64, value: Bytes) -> PacketResult<Data> {
        if typ != tlv_type::DATA {
            return Err(PacketError::Tlv(DecodeError::Critical(typ)));
        }
        let mut data = Data::default();
        let mut dec = Decoder::new(value);
        while let Some(elem) = dec.next()? {
            match elem.typ {
                tlv_type::NAME => data.name = Name::decode_from(elem.value)?,
                tlv_type::META_INFO => {
                    data.meta_info = MetaInfo::unmarshal(elem.typ, elem.value)?
                }
                tlv_type::CONTENT => data.content = elem.value,
                tlv_type::SIGNATURE_INFO => {
                    let si = SigInfo::decode_from(elem.value)?;
                    data.signature_info = (!is_null_marker(&si)).then_some(si);
                }
                tlv_type::SIGNATURE_VALUE => data.signature_value = elem.value,
                typ if ndn_tlv::is_critical(typ) => {
                    return Err(PacketError::Tlv(DecodeError::Critical(typ)));
                }
                _ => {}
            }
        }
        dec.err_unless_eof()?;
        Ok(data)
    }
}

/// A SigInfo identical to what [`SigInfo::encode_as`] emits for `None`:
/// SigType=Null and nothing else set. Decoding folds this back to `None`
/// so that `decode(encode(data)).signature_info == data.signature_info`
/// for a Data whose caller never set one.
fn is_null_marker(si: &SigInfo) -> bool {
    si.sig_type == Some(crate::sig_info::SigType::Null)
        && si.key_locator.empty()
        && si.nonce.is_none()
        && si.time.is_none()
        && si.seq_num.is_none()
        && si.extensions.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let mut data = Data::new(Name::parse("/A/B").unwrap());
        data.content = Bytes::from_static(b"hello");
        let wire = ndn_tlv::encode(&data).unwrap();
        let value = Decoder::new(wire).next().unwrap().unwrap().value;
        let decoded = Data::decode_from(tlv_type::DATA, value).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn missing_signature_info_wire_carries_null_but_roundtrips_to_none() {
        let data = Data::new(Name::parse("/A").unwrap());
        let wire = ndn_tlv::encode(&data).unwrap();
        let value = Decoder::new(wire.clone()).next().unwrap().unwrap().value;
        let decoded = Data::decode_from(tlv_type::DATA, value).unwrap();
        assert_eq!(decoded.signature_info, None);
        assert!(wire.windows(2).any(|w| w == [tlv_type::SIGNATURE_TYPE as u8, 0xC8]));
    }

    #[test]
    fn implicit_digest_is_cached() {
        let data = Data::new(Name::parse("/A").unwrap());
        let first = data.implicit_digest().unwrap();
        let second = data.implicit_digest().unwrap();
        assert_eq!(first, second);
    }
}
