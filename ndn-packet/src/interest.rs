//
// Copyright (c) The NDNgo-rs Contributors
//
// SPDX-License-Identifier: MIT
//

//! The Interest packet (spec §3, §4.2).

use bytes::{Buf, BufMut, Bytes, BytesMut};
use ndn_tlv::{DecodeError, Decoder, Element, EncodeResult, Marshaler};
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::error::{PacketError, PacketResult};
use crate::name::{Name, NameComponent};
use crate::sig_info::SigInfo;
use crate::tlv_type;

/// An Interest packet.
///
/// `nonce` is left unset (`None`) until encode time, at which point a
/// random value is drawn if the caller hasn't already supplied one; a
/// decoded Interest always has `nonce` populated since the field is
/// mandatory on the wire.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Interest {
    pub name: Name,
    pub can_be_prefix: bool,
    pub must_be_fresh: bool,
    pub forwarding_hint: Vec<Name>,
    pub nonce: Option<u32>,
    pub interest_lifetime: Option<u64>,
    pub hop_limit: Option<u8>,
    pub application_parameters: Option<Bytes>,
    pub signature_info: Option<SigInfo>,
    pub signature_value: Option<Bytes>,
}

impl Interest {
    pub fn new(name: Name) -> Interest {
        Interest {
            name,
            ..Default::default()
        }
    }

    fn needs_params_digest(&self) -> bool {
        self.application_parameters.is_some()
            || self.signature_info.is_some()
            || self.signature_value.is_some()
    }

    /// Encodes the ApplicationParameters / InterestSignatureInfo /
    /// InterestSignatureValue tail, in wire order. This is both the last
    /// part of the Interest's own encoding and the digest pre-image for
    /// the ParametersSha256DigestComponent.
    fn encode_tail(&self) -> EncodeResult<Bytes> {
        let mut tail = BytesMut::new();
        if let Some(params) = &self.application_parameters {
            Element::new(tlv_type::APPLICATION_PARAMETERS, params.clone()).encode(&mut tail);
        }
        if self.signature_info.is_some() || self.signature_value.is_some() {
            let wire = SigInfo::encode_as(
                self.signature_info.as_ref(),
                tlv_type::INTEREST_SIGNATURE_INFO,
            )?;
            tail.extend_from_slice(&wire);
        }
        if let Some(sig_value) = &self.signature_value {
            Element::new(tlv_type::INTEREST_SIGNATURE_VALUE, sig_value.clone()).encode(&mut tail);
        }
        Ok(tail.freeze())
    }
}

impl Marshaler for Interest {
    fn marshal(&self) -> EncodeResult<(u64, Bytes)> {
        let tail = self.encode_tail()?;

        let mut name = self.name.clone();
        if self.needs_params_digest() {
            let has_digest = matches!(
                name.last(),
                Some(c) if c.typ == tlv_type::PARAMETERS_SHA256_DIGEST_COMPONENT
            );
            if !has_digest {
                let digest = Sha256::digest(&tail);
                name.push(NameComponent::parameters_sha256_digest(Bytes::copy_from_slice(
                    &digest,
                )));
            }
        }

        let mut buf = BytesMut::new();
        let (typ, value) = name.marshal()?;
        Element::new(typ, value).encode(&mut buf);

        if self.can_be_prefix {
            Element::new(tlv_type::CAN_BE_PREFIX, Bytes::new()).encode(&mut buf);
        }
        if self.must_be_fresh {
            Element::new(tlv_type::MUST_BE_FRESH, Bytes::new()).encode(&mut buf);
        }
        if !self.forwarding_hint.is_empty() {
            let mut fh = BytesMut::new();
            for hint in &self.forwarding_hint {
                let (t, v) = hint.marshal()?;
                Element::new(t, v).encode(&mut fh);
            }
            Element::new(tlv_type::FORWARDING_HINT, fh.freeze()).encode(&mut buf);
        }

        let nonce = self.nonce.unwrap_or_else(|| rand::rng().random());
        let mut nonce_buf = BytesMut::with_capacity(4);
        nonce_buf.put_u32(nonce);
        Element::new(tlv_type::NONCE, nonce_buf.freeze()).encode(&mut buf);

        if let Some(lifetime) = self.interest_lifetime {
            let mut nni = BytesMut::new();
            ndn_tlv::nni::encode_nni(&mut nni, lifetime);
            Element::new(tlv_type::INTEREST_LIFETIME, nni.freeze()).encode(&mut buf);
        }
        if let Some(hop_limit) = self.hop_limit {
            Element::new(tlv_type::HOP_LIMIT, Bytes::copy_from_slice(&[hop_limit]))
                .encode(&mut buf);
        }

        buf.extend_from_slice(&tail);
        Ok((tlv_type::INTEREST, buf.freeze()))
    }
}

impl Interest {
    pub fn decode_from(typ: u64, value: Bytes) -> PacketResult<Interest> {
        if typ != tlv_type::INTEREST {
            return Err(PacketError::Tlv(DecodeError::Critical(typ)));
        }
        let mut interest = Interest::default();
        let mut dec = Decoder::new(value);
        let mut digest_preimage: Option<Bytes> = None;

        loop {
            let before = dec.rest().clone();
            let Some(elem) = dec.next()? else { break };
            if digest_preimage.is_none()
                && matches!(
                    elem.typ,
                    tlv_type::APPLICATION_PARAMETERS
                        | tlv_type::INTEREST_SIGNATURE_INFO
                        | tlv_type::INTEREST_SIGNATURE_VALUE
                )
            {
                digest_preimage = Some(before);
            }
            match elem.typ {
                tlv_type::NAME => interest.name = Name::decode_from(elem.value)?,
                tlv_type::CAN_BE_PREFIX => interest.can_be_prefix = true,
                tlv_type::MUST_BE_FRESH => interest.must_be_fresh = true,
                tlv_type::FORWARDING_HINT => {
                    let mut inner = Decoder::new(elem.value);
                    while let Some(name_elem) = inner.next()? {
                        if name_elem.typ != tlv_type::NAME {
                            return Err(PacketError::Tlv(DecodeError::Critical(name_elem.typ)));
                        }
                        interest.forwarding_hint.push(Name::decode_from(name_elem.value)?);
                    }
                }
                tlv_type::NONCE => {
                    if elem.value.len() != 4 {
                        return Err(PacketError::NonceLen(elem.value.len()));
                    }
                    let mut nonce_bytes = elem.value;
                    interest.nonce = Some(nonce_bytes.get_u32());
                }
                tlv_type::INTEREST_LIFETIME => {
                    let lifetime = ndn_tlv::nni::decode_nni(&elem.value)
                        .map_err(|_| PacketError::Lifetime)?;
                    interest.interest_lifetime = Some(lifetime);
                }
                tlv_type::HOP_LIMIT => {
                    if elem.value.len() != 1 {
                        return Err(PacketError::HopLimit);
                    }
                    interest.hop_limit = Some(elem.value[0]);
                }
                tlv_type::APPLICATION_PARAMETERS => {
                    interest.application_parameters = Some(elem.value);
                }
                tlv_type::INTEREST_SIGNATURE_INFO => {
                    interest.signature_info = Some(SigInfo::decode_from(elem.value)?);
                }
                tlv_type::INTEREST_SIGNATURE_VALUE => {
                    interest.signature_value = Some(elem.value);
                }
                typ if ndn_tlv::is_critical(typ) => {
                    return Err(PacketError::Tlv(DecodeError::Critical(typ)));
                }
                _ => {}
            }
        }
        dec.err_unless_eof()?;

        if interest.needs_params_digest() {
            let preimage = digest_preimage.expect("digest-triggering field was matched above");
            let digest = Sha256::digest(&preimage);
            match interest.name.last() {
                Some(c)
                    if c.typ == tlv_type::PARAMETERS_SHA256_DIGEST_COMPONENT
                        && c.value.as_ref() == digest.as_slice() =>
                {
                    return Ok(interest);
                }
                _ => return Err(PacketError::ParamsDigest),
            }
        }

        Ok(interest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_interest_roundtrip() {
        let mut interest = Interest::new(Name::parse("/A").unwrap());
        interest.nonce = Some(0x01020304);
        let wire = ndn_tlv::encode(&interest).unwrap();
        assert_eq!(
            wire,
            Bytes::from_static(&[
                0x05, 0x0B, 0x07, 0x03, 0x08, 0x01, b'A', 0x0A, 0x04, 0x01, 0x02, 0x03, 0x04
            ])
        );
        let decoded =
            Interest::decode_from(tlv_type::INTEREST, ndn_tlv::Decoder::new(wire).next().unwrap().unwrap().value)
                .unwrap();
        assert_eq!(decoded, interest);
    }

    #[test]
    fn nonce_generated_when_absent() {
        let interest = Interest::new(Name::parse("/A").unwrap());
        let wire = ndn_tlv::encode(&interest).unwrap();
        assert_eq!(wire.len(), 13);
    }

    #[test]
    fn application_parameters_appends_digest() {
        let mut interest = Interest::new(Name::parse("/A").unwrap());
        interest.nonce = Some(1);
        interest.application_parameters = Some(Bytes::from_static(b"payload"));
        let wire = ndn_tlv::encode(&interest).unwrap();
        let value = ndn_tlv::Decoder::new(wire).next().unwrap().unwrap().value;
        let decoded = Interest::decode_from(tlv_type::INTEREST, value).unwrap();
        let last = decoded.name.last().unwrap();
        assert_eq!(last.typ, tlv_type::PARAMETERS_SHA256_DIGEST_COMPONENT);
        assert_eq!(decoded.application_parameters, interest.application_parameters);
    }

    #[test]
    fn nonce_length_enforced() {
        let mut buf = BytesMut::new();
        Element::new(tlv_type::NAME, Bytes::new()).encode(&mut buf);
        Element::new(tlv_type::NONCE, Bytes::from_static(&[1, 2, 3])).encode(&mut buf);
        let err = Interest::decode_from(tlv_type::INTEREST, buf.freeze()).unwrap_err();
        assert_eq!(err, PacketError::NonceLen(3));
    }

    #[test]
    fn out_of_range_name_component_reported_as_component_type() {
        let mut name_value = BytesMut::new();
        Element::new(0, Bytes::from_static(b"x")).encode(&mut name_value);
        let mut buf = BytesMut::new();
        Element::new(tlv_type::NAME, name_value.freeze()).encode(&mut buf);
        Element::new(tlv_type::NONCE, Bytes::from_static(&[1, 2, 3, 4])).encode(&mut buf);
        let err = Interest::decode_from(tlv_type::INTEREST, buf.freeze()).unwrap_err();
        assert_eq!(err, PacketError::ComponentType(0));
    }
}
