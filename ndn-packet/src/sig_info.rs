//
// Copyright (c) The NDNgo-rs Contributors
//
// SPDX-License-Identifier: MIT
//

//! SignatureInfo, KeyLocator, and the extension-type registry (spec §3).

use std::collections::HashSet;
use std::sync::RwLock;

use bytes::{Bytes, BytesMut};
use ndn_tlv::{
    DecodeError, DecodeResult, Decoder, Element, EncodeResult, Marshaler, Unmarshaler,
};
use num_derive::{FromPrimitive, ToPrimitive};

use crate::error::{PacketError, PacketResult};
use crate::name::Name;
use crate::tlv_type;

/// SigType assigned numbers (spec §6).
#[derive(Clone, Copy, Debug, Eq, FromPrimitive, PartialEq, ToPrimitive)]
pub enum SigType {
    Sha256 = 0x00,
    Sha256Rsa = 0x01,
    Sha256Ecdsa = 0x03,
    HmacSha256 = 0x04,
    Null = 0xC8,
}

impl SigType {
    fn from_nni(v: u64) -> PacketResult<SigType> {
        num_traits::FromPrimitive::from_u64(v).ok_or(PacketError::SigType(v))
    }
}

/// A KeyLocator is either a [`Name`] or a raw digest, never both.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct KeyLocator {
    pub name: Option<Name>,
    pub digest: Option<Bytes>,
}

impl KeyLocator {
    pub fn empty(&self) -> bool {
        self.name.is_none() && self.digest.is_none()
    }

    pub fn from_name(name: Name) -> KeyLocator {
        KeyLocator {
            name: Some(name),
            digest: None,
        }
    }

    pub fn from_digest(digest: impl Into<Bytes>) -> KeyLocator {
        KeyLocator {
            name: None,
            digest: Some(digest.into()),
        }
    }
}

impl Marshaler for KeyLocator {
    fn marshal(&self) -> EncodeResult<(u64, Bytes)> {
        if self.name.is_some() && self.digest.is_some() {
            return Err(ndn_tlv::EncodeError::Other(
                "KeyLocator has both Name and Digest set",
            ));
        }
        let mut buf = BytesMut::new();
        if let Some(digest) = &self.digest {
            Element::new(tlv_type::KEY_DIGEST, digest.clone()).encode(&mut buf);
        } else if let Some(name) = &self.name {
            let (typ, value) = name.marshal()?;
            Element::new(typ, value).encode(&mut buf);
        }
        Ok((tlv_type::KEY_LOCATOR, buf.freeze()))
    }
}

impl Unmarshaler for KeyLocator {
    fn unmarshal(typ: u64, value: Bytes) -> DecodeResult<KeyLocator> {
        if typ != tlv_type::KEY_LOCATOR {
            return Err(DecodeError::Critical(typ));
        }
        let mut kl = KeyLocator::default();
        let mut dec = Decoder::new(value);
        while let Some(elem) = dec.next()? {
            match elem.typ {
                tlv_type::NAME => kl.name = Some(Name::unmarshal(elem.typ, elem.value)?),
                tlv_type::KEY_DIGEST => kl.digest = Some(elem.value),
                typ if ndn_tlv::is_critical(typ) => return Err(DecodeError::Critical(typ)),
                _ => {}
            }
        }
        if kl.name.is_some() && kl.digest.is_some() {
            return Err(DecodeError::Critical(tlv_type::KEY_LOCATOR));
        }
        dec.err_unless_eof()?;
        Ok(kl)
    }
}

/// Registry of application-specific SigInfo extension TLV-TYPEs (spec §1.2,
/// grounded on `RegisterSigInfoExtension`). An extension type registered
/// here is carried through decode/encode as an opaque element even when it
/// would otherwise be rejected as an unknown critical TLV.
static EXTENSION_TYPES: RwLock<Option<HashSet<u64>>> = RwLock::new(None);

pub fn register_extension(typ: u64) {
    let mut guard = EXTENSION_TYPES
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.get_or_insert_with(HashSet::new).insert(typ);
}

fn is_registered_extension(typ: u64) -> bool {
    EXTENSION_TYPES
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .as_ref()
        .is_some_and(|set| set.contains(&typ))
}

/// SignatureInfo, shared by Interest and Data via [`SigInfo::encode_as`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SigInfo {
    pub sig_type: Option<SigType>,
    pub key_locator: KeyLocator,
    pub nonce: Option<Bytes>,
    pub time: Option<u64>,
    pub seq_num: Option<u64>,
    pub extensions: Vec<Element>,
}

impl SigInfo {
    /// Encodes `self` (or `SigType::Null` when `None`) under the given
    /// outer TLV-TYPE: `SIGNATURE_INFO` (0x16) for Data or
    /// `INTEREST_SIGNATURE_INFO` (0x2C) for Interest.
    pub fn encode_as(this: Option<&SigInfo>, typ: u64) -> EncodeResult<Bytes> {
        let mut buf = BytesMut::new();
        let Some(si) = this else {
            let mut nni = BytesMut::new();
            ndn_tlv::nni::encode_nni(&mut nni, SigType::Null as u64);
            Element::new(tlv_type::SIGNATURE_TYPE, nni.freeze()).encode(&mut buf);
            let mut outer = BytesMut::new();
            Element::new(typ, buf.freeze()).encode(&mut outer);
            return Ok(outer.freeze());
        };

        let sig_type = si.sig_type.unwrap_or(SigType::Sha256);
        let mut nni = BytesMut::new();
        ndn_tlv::nni::encode_nni(&mut nni, sig_type as u64);
        Element::new(tlv_type::SIGNATURE_TYPE, nni.freeze()).encode(&mut buf);

        if !si.key_locator.empty() {
            let (typ, value) = si.key_locator.marshal()?;
            Element::new(typ, value).encode(&mut buf);
        }
        if let Some(time) = si.time {
            let mut nni = BytesMut::new();
            ndn_tlv::nni::encode_nni(&mut nni, time);
            Element::new(tlv_type::SIGNATURE_TIME, nni.freeze()).encode(&mut buf);
        }
        if let Some(nonce) = &si.nonce {
            Element::new(tlv_type::SIGNATURE_NONCE, nonce.clone()).encode(&mut buf);
        }
        if let Some(seq_num) = si.seq_num {
            let mut nni = BytesMut::new();
            ndn_tlv::nni::encode_nni(&mut nni, seq_num);
            Element::new(tlv_type::SIGNATURE_SEQ_NUM, nni.freeze()).encode(&mut buf);
        }
        for ext in &si.extensions {
            ext.encode(&mut buf);
        }

        let mut outer = BytesMut::new();
        Element::new(typ, buf.freeze()).encode(&mut outer);
        Ok(outer.freeze())
    }

    pub fn decode_from(value: Bytes) -> PacketResult<SigInfo> {
        let mut si = SigInfo::default();
        let mut dec = Decoder::new(value);
        while let Some(elem) = dec.next()? {
            match elem.typ {
                tlv_type::SIGNATURE_TYPE => {
                    let v = ndn_tlv::nni::decode_nni(&elem.value)?;
                    si.sig_type = Some(SigType::from_nni(v)?);
                }
                tlv_type::KEY_LOCATOR => {
                    si.key_locator = KeyLocator::unmarshal(elem.typ, elem.value)?;
                }
                tlv_type::SIGNATURE_NONCE => {
                    if elem.value.is_empty() {
                        return Err(PacketError::SigNonce);
                    }
                    si.nonce = Some(elem.value);
                }
                tlv_type::SIGNATURE_TIME => {
                    si.time = Some(ndn_tlv::nni::decode_nni(&elem.value)?);
                }
                tlv_type::SIGNATURE_SEQ_NUM => {
                    si.seq_num = Some(ndn_tlv::nni::decode_nni(&elem.value)?);
                }
                typ if is_registered_extension(typ) => {
                    si.extensions.push(Element::new(typ, elem.value));
                }
                typ if ndn_tlv::is_critical(typ) => {
                    return Err(PacketError::Tlv(DecodeError::Critical(typ)));
                }
                _ => {}
            }
        }
        dec.err_unless_eof()?;
        Ok(si)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_encodes_as_null() {
        let wire = SigInfo::encode_as(None, tlv_type::SIGNATURE_INFO).unwrap();
        let mut dec = Decoder::new(wire);
        let outer = dec.next().unwrap().unwrap();
        assert_eq!(outer.typ, tlv_type::SIGNATURE_INFO);
        let si = SigInfo::decode_from(outer.value).unwrap();
        assert_eq!(si.sig_type, Some(SigType::Null));
    }

    #[test]
    fn key_locator_rejects_both_set() {
        let kl = KeyLocator {
            name: Some(Name::parse("/k").unwrap()),
            digest: Some(Bytes::from_static(b"x")),
        };
        assert!(kl.marshal().is_err());
    }

    #[test]
    fn unregistered_critical_extension_rejected() {
        let mut buf = BytesMut::new();
        ndn_tlv::nni::encode_nni(&mut buf, SigType::Sha256 as u64);
        let mut value = BytesMut::new();
        Element::new(tlv_type::SIGNATURE_TYPE, buf.freeze()).encode(&mut value);
        Element::new(3, Bytes::from_static(b"ext")).encode(&mut value);
        let err = SigInfo::decode_from(value.freeze()).unwrap_err();
        assert_eq!(err, PacketError::Tlv(DecodeError::Critical(3)));
    }
}
