//
// Copyright (c) The NDNgo-rs Contributors
//
// SPDX-License-Identifier: MIT
//

//! The LpL3 header block (spec §3) and the NDNLPv2 criticality rule.

use bytes::{BufMut, Bytes, BytesMut};
use ndn_tlv::Element;

use crate::error::{LpError, LpResult};
use crate::tlv_type;

/// NDNLPv2 uses a different criticality rule than general TLV (spec §4.3):
/// `t < 800 || (t > 959 && t mod 4 != 0)`.
pub fn is_lp_critical(typ: u64) -> bool {
    typ < 800 || (typ > 959 && typ % 4 != 0)
}

/// The layer-3-adjacent fields carried in an NDNLPv2 header.
///
/// Every field is a genuine `Option`, not a "zero means absent" sentinel
/// (spec §9 Design Notes): a `CongestionMark` of 0 is distinguishable from
/// an absent one, and is encoded as such.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LpL3 {
    pub pit_token: Option<Bytes>,
    pub next_hop_face_id: Option<u64>,
    pub incoming_face_id: Option<u64>,
    pub cache_policy_type: Option<u64>,
    pub congestion_mark: Option<u64>,
}

impl LpL3 {
    pub fn is_empty(&self) -> bool {
        self.pit_token.is_none()
            && self.next_hop_face_id.is_none()
            && self.incoming_face_id.is_none()
            && self.cache_policy_type.is_none()
            && self.congestion_mark.is_none()
    }

    /// Overwrites `self` with `src`'s fields. Mutable-receiver by design:
    /// the reference implementation's by-value `inheritFrom` has no
    /// observable effect on the caller (spec §9 decisions).
    pub fn inherit_from(&mut self, src: &LpL3) {
        self.pit_token = src.pit_token.clone();
        self.next_hop_face_id = src.next_hop_face_id;
        self.incoming_face_id = src.incoming_face_id;
        self.cache_policy_type = src.cache_policy_type;
        self.congestion_mark = src.congestion_mark;
    }

    pub(crate) fn encode_into(&self, buf: &mut BytesMut) {
        if let Some(token) = &self.pit_token {
            Element::new(tlv_type::LP_PIT_TOKEN, token.clone()).encode(buf);
        }
        if let Some(id) = self.next_hop_face_id {
            let mut nni = BytesMut::new();
            ndn_tlv::nni::encode_nni(&mut nni, id);
            Element::new(tlv_type::LP_NEXT_HOP_FACE_ID, nni.freeze()).encode(buf);
        }
        if let Some(id) = self.incoming_face_id {
            let mut nni = BytesMut::new();
            ndn_tlv::nni::encode_nni(&mut nni, id);
            Element::new(tlv_type::LP_INCOMING_FACE_ID, nni.freeze()).encode(buf);
        }
        if let Some(cp) = self.cache_policy_type {
            let mut nni = BytesMut::new();
            ndn_tlv::nni::encode_nni(&mut nni, cp);
            let mut inner = BytesMut::new();
            Element::new(tlv_type::LP_CACHE_POLICY_TYPE, nni.freeze()).encode(&mut inner);
            Element::new(tlv_type::LP_CACHE_POLICY, inner.freeze()).encode(buf);
        }
        if let Some(mark) = self.congestion_mark {
            let mut nni = BytesMut::new();
            ndn_tlv::nni::encode_nni(&mut nni, mark);
            Element::new(tlv_type::LP_CONGESTION_MARK, nni.freeze()).encode(buf);
        }
    }

    pub(crate) fn decode_field(&mut self, typ: u64, value: Bytes) -> LpResult<bool> {
        match typ {
            tlv_type::LP_PIT_TOKEN => {
                // Allocated fresh at the source length (spec §9 decision),
                // rather than copied into a fixed-capacity destination.
                self.pit_token = Some(Bytes::copy_from_slice(&value));
            }
            tlv_type::LP_NEXT_HOP_FACE_ID => {
                self.next_hop_face_id = Some(ndn_tlv::nni::decode_nni(&value)?);
            }
            tlv_type::LP_INCOMING_FACE_ID => {
                self.incoming_face_id = Some(ndn_tlv::nni::decode_nni(&value)?);
            }
            tlv_type::LP_CACHE_POLICY => {
                let mut dec = ndn_tlv::Decoder::new(value);
                let inner = dec.next()?.ok_or(LpError::UnexpectedElem)?;
                if inner.typ != tlv_type::LP_CACHE_POLICY_TYPE {
                    return Err(LpError::UnexpectedElem);
                }
                self.cache_policy_type = Some(ndn_tlv::nni::decode_nni(&inner.value)?);
                dec.err_unless_eof().map_err(|_| LpError::UnexpectedElem)?;
            }
            tlv_type::LP_CONGESTION_MARK => {
                self.congestion_mark = Some(ndn_tlv::nni::decode_nni(&value)?);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// Builds an 8-octet big-endian PIT token from `n` (spec §1.2).
pub fn pit_token_from_uint(n: u64) -> Bytes {
    let mut buf = BytesMut::with_capacity(8);
    buf.put_u64(n);
    buf.freeze()
}

/// Reads an 8-octet big-endian PIT token. Returns `None` if `token` is not
/// exactly 8 octets, rather than silently defaulting to 0.
pub fn pit_token_to_uint(token: &[u8]) -> Option<u64> {
    token.try_into().ok().map(u64::from_be_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn criticality_rule() {
        assert!(is_lp_critical(0));
        assert!(is_lp_critical(799));
        assert!(!is_lp_critical(800));
        assert!(!is_lp_critical(959));
        assert!(is_lp_critical(961));
        assert!(!is_lp_critical(960));
    }

    #[test]
    fn pit_token_roundtrip() {
        let token = pit_token_from_uint(0x1122334455667788);
        assert_eq!(pit_token_to_uint(&token), Some(0x1122334455667788));
        assert_eq!(pit_token_to_uint(&token[..7]), None);
    }

    #[test]
    fn empty_header_encodes_to_nothing() {
        let header = LpL3::default();
        assert!(header.is_empty());
        let mut buf = BytesMut::new();
        header.encode_into(&mut buf);
        assert!(buf.is_empty());
    }

    #[test]
    fn congestion_mark_zero_is_distinct_from_absent() {
        let mut buf = BytesMut::new();
        let header = LpL3 {
            congestion_mark: Some(0),
            ..Default::default()
        };
        header.encode_into(&mut buf);
        assert!(!buf.is_empty());
    }
}
