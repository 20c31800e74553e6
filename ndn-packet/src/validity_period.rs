//
// Copyright (c) The NDNgo-rs Contributors
//
// SPDX-License-Identifier: MIT
//

//! ValidityPeriod and PrefixAnnouncement (spec §4.2, §6), encoded bit-exactly
//! per the assigned-number table.

use bytes::{Bytes, BytesMut};
use ndn_tlv::{DecodeError, DecodeResult, Decoder, Element, EncodeResult, Marshaler, Unmarshaler};

use crate::tlv_type;

/// MgmtExpirationPeriod, used only by [`PrefixAnnouncement`].
const MGMT_EXPIRATION_PERIOD: u64 = 0x6D;

/// A pair of ISO-8601-style timestamps bounding when a certificate is
/// valid. Carried as opaque octets; this crate does not interpret them.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ValidityPeriod {
    pub not_before: Bytes,
    pub not_after: Bytes,
}

impl Marshaler for ValidityPeriod {
    fn marshal(&self) -> EncodeResult<(u64, Bytes)> {
        let mut buf = BytesMut::new();
        Element::new(tlv_type::NOT_BEFORE, self.not_before.clone()).encode(&mut buf);
        Element::new(tlv_type::NOT_AFTER, self.not_after.clone()).encode(&mut buf);
        Ok((tlv_type::VALIDITY_PERIOD, buf.freeze()))
    }
}

impl Unmarshaler for ValidityPeriod {
    fn unmarshal(typ: u64, value: Bytes) -> DecodeResult<ValidityPeriod> {
        if typ != tlv_type::VALIDITY_PERIOD {
            return Err(DecodeError::Critical(typ));
        }
        let mut vp = ValidityPeriod::default();
        let mut dec = Decoder::new(value);
        while let Some(elem) = dec.next()? {
            match elem.typ {
                tlv_type::NOT_BEFORE => vp.not_before = elem.value,
                tlv_type::NOT_AFTER => vp.not_after = elem.value,
                typ if ndn_tlv::is_critical(typ) => return Err(DecodeError::Critical(typ)),
                _ => {}
            }
        }
        dec.err_unless_eof()?;
        Ok(vp)
    }
}

/// The Content payload of an NDN prefix announcement object.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PrefixAnnouncement {
    pub expiration_period: u64,
    pub validity_period: ValidityPeriod,
}

impl Marshaler for PrefixAnnouncement {
    fn marshal(&self) -> EncodeResult<(u64, Bytes)> {
        let mut buf = BytesMut::new();
        let mut nni = BytesMut::new();
        ndn_tlv::nni::encode_nni(&mut nni, self.expiration_period);
        Element::new(MGMT_EXPIRATION_PERIOD, nni.freeze()).encode(&mut buf);
        let (typ, value) = self.validity_period.marshal()?;
        Element::new(typ, value).encode(&mut buf);
        Ok((tlv_type::CONTENT, buf.freeze()))
    }
}

impl Unmarshaler for PrefixAnnouncement {
    fn unmarshal(typ: u64, value: Bytes) -> DecodeResult<PrefixAnnouncement> {
        if typ != tlv_type::CONTENT {
            return Err(DecodeError::Critical(typ));
        }
        let mut pa = PrefixAnnouncement::default();
        let mut dec = Decoder::new(value);
        while let Some(elem) = dec.next()? {
            match elem.typ {
                MGMT_EXPIRATION_PERIOD => {
                    pa.expiration_period = ndn_tlv::nni::decode_nni(&elem.value)?;
                }
                tlv_type::VALIDITY_PERIOD => {
                    pa.validity_period = ValidityPeriod::unmarshal(elem.typ, elem.value)?;
                }
                typ if ndn_tlv::is_critical(typ) => return Err(DecodeError::Critical(typ)),
                _ => {}
            }
        }
        dec.err_unless_eof()?;
        Ok(pa)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let pa = PrefixAnnouncement {
            expiration_period: 3600,
            validity_period: ValidityPeriod {
                not_before: Bytes::from_static(b"20260101T000000"),
                not_after: Bytes::from_static(b"20270101T000000"),
            },
        };
        let wire = ndn_tlv::encode(&pa).unwrap();
        let decoded: PrefixAnnouncement = ndn_tlv::decode(wire).unwrap();
        assert_eq!(decoded, pa);
    }
}
