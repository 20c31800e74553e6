//
// Copyright (c) The NDNgo-rs Contributors
//
// SPDX-License-Identifier: MIT
//

//! MetaInfo and the ContentType enumeration (spec §3, §6).

use bytes::{Bytes, BytesMut};
use ndn_tlv::{DecodeError, DecodeResult, Decoder, Element, EncodeResult, Marshaler, Unmarshaler};
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;

use crate::name::NameComponent;
use crate::tlv_type;

/// ContentType assigned numbers (spec §6).
#[derive(Clone, Copy, Debug, Eq, FromPrimitive, PartialEq, ToPrimitive)]
pub enum ContentType {
    Blob = 0,
    Link = 1,
    Key = 2,
    Nack = 3,
    Manifest = 4,
    PrefixAnn = 5,
    KiteAck = 6,
    Flic = 0x400,
}

/// The MetaInfo block carried on every Data packet.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MetaInfo {
    pub content_type: Option<ContentType>,
    pub freshness_period: Option<u64>,
    pub final_block_id: Option<NameComponent>,
}

impl Marshaler for MetaInfo {
    fn marshal(&self) -> EncodeResult<(u64, Bytes)> {
        let mut buf = BytesMut::new();
        if let Some(ct) = self.content_type {
            let mut nni = BytesMut::new();
            ndn_tlv::nni::encode_nni(&mut nni, ct as u64);
            Element::new(tlv_type::CONTENT_TYPE, nni.freeze()).encode(&mut buf);
        }
        if let Some(fp) = self.freshness_period {
            let mut nni = BytesMut::new();
            ndn_tlv::nni::encode_nni(&mut nni, fp);
            Element::new(tlv_type::FRESHNESS_PERIOD, nni.freeze()).encode(&mut buf);
        }
        if let Some(fbi) = &self.final_block_id {
            let mut inner = BytesMut::new();
            ndn_tlv::encode_var_number(&mut inner, fbi.typ);
            ndn_tlv::encode_var_number(&mut inner, fbi.value.len() as u64);
            inner.extend_from_slice(&fbi.value);
            Element::new(tlv_type::FINAL_BLOCK_ID, inner.freeze()).encode(&mut buf);
        }
        Ok((tlv_type::META_INFO, buf.freeze()))
    }
}

impl Unmarshaler for MetaInfo {
    fn unmarshal(typ: u64, value: Bytes) -> DecodeResult<MetaInfo> {
        if typ != tlv_type::META_INFO {
            return Err(DecodeError::Critical(typ));
        }
        let mut mi = MetaInfo::default();
        let mut dec = Decoder::new(value);
        while let Some(elem) = dec.next()? {
            match elem.typ {
                tlv_type::CONTENT_TYPE => {
                    let v = ndn_tlv::nni::decode_nni(&elem.value)?;
                    mi.content_type = ContentType::from_u64(v);
                }
                tlv_type::FRESHNESS_PERIOD => {
                    mi.freshness_period = Some(ndn_tlv::nni::decode_nni(&elem.value)?);
                }
                tlv_type::FINAL_BLOCK_ID => {
                    let mut inner = Decoder::new(elem.value);
                    if let Some(comp) = inner.next()? {
                        mi.final_block_id = Some(NameComponent {
                            typ: comp.typ,
                            value: comp.value,
                        });
                    }
                }
                typ if ndn_tlv::is_critical(typ) => return Err(DecodeError::Critical(typ)),
                _ => {}
            }
        }
        dec.err_unless_eof()?;
        Ok(mi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let mi = MetaInfo {
            content_type: Some(ContentType::Blob),
            freshness_period: Some(4000),
            final_block_id: Some(NameComponent::generic(Bytes::from_static(b"end"))),
        };
        let wire = ndn_tlv::encode(&mi).unwrap();
        let decoded: MetaInfo = ndn_tlv::decode(wire).unwrap();
        assert_eq!(decoded, mi);
    }

    #[test]
    fn empty_metainfo_roundtrips() {
        let mi = MetaInfo::default();
        let wire = ndn_tlv::encode(&mi).unwrap();
        let decoded: MetaInfo = ndn_tlv::decode(wire).unwrap();
        assert_eq!(decoded, mi);
    }
}
