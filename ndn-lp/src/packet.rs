//
// Copyright (c) The NDNgo-rs Contributors
//
// SPDX-License-Identifier: MIT
//

//! The LpPacket wire frame and the L3 `Packet` envelope (spec §3, §4.3).

use bytes::{Buf, BufMut, Bytes, BytesMut};
use ndn_packet::{Data, Interest, PrefixAnnouncement};
use ndn_tlv::{Decoder, Element, Marshaler, Unmarshaler};

use crate::error::{LpError, LpResult};
use crate::lp_l3::LpL3;
use crate::tlv_type;

/// The L3 envelope carried by an LpPacket, once any fragmentation has been
/// resolved.
///
/// `Nack` is not a distinct wire type: it is an Interest whose LpPacket
/// carried a NackReason field (spec §3). `Fragment` represents a payload
/// that is still only one piece of a multi-fragment packet; a caller sees
/// it only when choosing to forward fragments without reassembling them.
#[derive(Clone, Debug, PartialEq)]
pub enum Packet {
    Interest(Interest),
    Data(Data),
    Nack { interest: Interest, reason: u8 },
    Fragment(Bytes),
}

/// An NDNLPv2 frame.
///
/// `fragment` holds the complete TLV wire bytes (TYPE+LENGTH+VALUE) of the
/// L3 packet this frame carries, or a byte-range slice of them when this is
/// one piece of a fragmented packet — never just the bare VALUE.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LpPacket {
    pub sequence: Option<u64>,
    pub l3: LpL3,
    pub nack_reason: Option<u8>,
    pub frag_index: Option<u64>,
    pub frag_count: Option<u64>,
    pub acks: Vec<u64>,
    pub tx_sequence: Option<u64>,
    pub non_discovery: bool,
    pub prefix_announcement: Option<PrefixAnnouncement>,
    pub fragment: Bytes,
}

impl Packet {
    /// Encodes the L3 payload this packet carries and wraps it in a fresh,
    /// unfragmented LpPacket with the given header. Fragmentation, when
    /// needed, is [`crate::fragmenter::LpFragmenter`]'s job.
    pub fn to_lp(&self, l3: LpL3) -> ndn_tlv::EncodeResult<LpPacket> {
        let (fragment, nack_reason) = match self {
            Packet::Interest(interest) => (ndn_tlv::encode(interest)?, None),
            Packet::Data(data) => (ndn_tlv::encode(data)?, None),
            Packet::Nack { interest, reason } => (ndn_tlv::encode(interest)?, Some(*reason)),
            Packet::Fragment(bytes) => (bytes.clone(), None),
        };
        Ok(LpPacket {
            l3,
            nack_reason,
            fragment,
            ..Default::default()
        })
    }
}

impl LpPacket {
    /// Wraps an L3 packet with no LpL3 header at all, matching what a
    /// caller with nothing to attach (no PIT token, no face IDs) sends.
    pub fn bare(packet: &Packet) -> ndn_tlv::EncodeResult<LpPacket> {
        packet.to_lp(LpL3::default())
    }

    fn validate(&self) -> LpResult<()> {
        match (self.frag_index, self.frag_count) {
            (Some(idx), Some(cnt)) => {
                if idx >= cnt || self.sequence.is_none() {
                    return Err(LpError::Fragment);
                }
            }
            (None, None) => {}
            _ => return Err(LpError::Fragment),
        }
        if self.tx_sequence.is_some() && self.sequence.is_none() {
            return Err(LpError::Reliability);
        }
        Ok(())
    }

    /// Encodes this frame as a complete LpPacket TLV.
    pub fn encode(&self) -> LpResult<Bytes> {
        self.validate()?;

        let mut buf = BytesMut::new();
        if let Some(seq) = self.sequence {
            Element::new(tlv_type::LP_SEQUENCE, be64(seq)).encode(&mut buf);
        }
        self.l3.encode_into(&mut buf);
        if let Some(reason) = self.nack_reason {
            let mut nni = BytesMut::new();
            ndn_tlv::nni::encode_nni(&mut nni, reason as u64);
            Element::new(tlv_type::LP_NACK_REASON, nni.freeze()).encode(&mut buf);
        }
        if let Some(idx) = self.frag_index {
            let mut nni = BytesMut::new();
            ndn_tlv::nni::encode_nni(&mut nni, idx);
            Element::new(tlv_type::LP_FRAG_INDEX, nni.freeze()).encode(&mut buf);
        }
        if let Some(cnt) = self.frag_count {
            let mut nni = BytesMut::new();
            ndn_tlv::nni::encode_nni(&mut nni, cnt);
            Element::new(tlv_type::LP_FRAG_COUNT, nni.freeze()).encode(&mut buf);
        }
        for ack in &self.acks {
            Element::new(tlv_type::LP_ACK, be64(*ack)).encode(&mut buf);
        }
        if let Some(txseq) = self.tx_sequence {
            Element::new(tlv_type::LP_TX_SEQUENCE, be64(txseq)).encode(&mut buf);
        }
        if self.non_discovery {
            Element::new(tlv_type::LP_NON_DISCOVERY, Bytes::new()).encode(&mut buf);
        }
        if let Some(pa) = &self.prefix_announcement {
            // PrefixAnnouncement's own TLV-TYPE is Content (it doubles as a
            // Data payload); here it is re-keyed under LpPrefixAnnouncement.
            let (_, value) = pa.marshal().map_err(|_| LpError::Fragment)?;
            Element::new(tlv_type::LP_PREFIX_ANNOUNCEMENT, value).encode(&mut buf);
        }
        Element::new(tlv_type::LP_FRAGMENT, self.fragment.clone()).encode(&mut buf);

        let mut frame = BytesMut::new();
        Element::new(tlv_type::LP_PACKET, buf.freeze()).encode(&mut frame);
        Ok(frame.freeze())
    }

    /// Decodes a complete frame. A bare Interest or Data (outer TYPE is not
    /// LpPacket) is accepted as an unwrapped single fragment carrying an
    /// empty LpL3 header (spec §4.3, scenario S3).
    pub fn decode(wire: Bytes) -> LpResult<LpPacket> {
        let elem = Decoder::new(wire.clone())
            .next()
            .map_err(LpError::from)?
            .ok_or(LpError::NotLpFrame)?;

        match elem.typ {
            tlv_type::LP_PACKET => Self::decode_fields(elem.value),
            ndn_packet::tlv_type::INTEREST | ndn_packet::tlv_type::DATA => Ok(LpPacket {
                fragment: wire,
                ..Default::default()
            }),
            _ => Err(LpError::NotLpFrame),
        }
    }

    fn decode_fields(value: Bytes) -> LpResult<LpPacket> {
        let mut pkt = LpPacket::default();
        let mut dec = Decoder::new(value);
        while let Some(elem) = dec.next().map_err(LpError::from)? {
            match elem.typ {
                tlv_type::LP_SEQUENCE => pkt.sequence = Some(read_be64(elem.value)?),
                tlv_type::LP_NACK_REASON => {
                    let reason = ndn_tlv::nni::decode_nni(&elem.value).map_err(LpError::from)?;
                    pkt.nack_reason = Some(reason as u8);
                }
                tlv_type::LP_FRAG_INDEX => {
                    pkt.frag_index =
                        Some(ndn_tlv::nni::decode_nni(&elem.value).map_err(LpError::from)?);
                }
                tlv_type::LP_FRAG_COUNT => {
                    pkt.frag_count =
                        Some(ndn_tlv::nni::decode_nni(&elem.value).map_err(LpError::from)?);
                }
                tlv_type::LP_ACK => pkt.acks.push(read_be64(elem.value)?),
                tlv_type::LP_TX_SEQUENCE => pkt.tx_sequence = Some(read_be64(elem.value)?),
                tlv_type::LP_NON_DISCOVERY => pkt.non_discovery = true,
                tlv_type::LP_PREFIX_ANNOUNCEMENT => {
                    pkt.prefix_announcement = Some(
                        ndn_packet::PrefixAnnouncement::unmarshal(
                            ndn_packet::tlv_type::CONTENT,
                            elem.value,
                        )
                        .map_err(LpError::from)?,
                    );
                }
                tlv_type::LP_FRAGMENT => pkt.fragment = elem.value,
                typ => {
                    if !pkt.l3.decode_field(typ, elem.value)? && crate::lp_l3::is_lp_critical(typ)
                    {
                        return Err(LpError::Tlv(ndn_tlv::DecodeError::Critical(typ)));
                    }
                }
            }
        }
        pkt.validate()?;
        Ok(pkt)
    }

    /// Resolves this frame's L3 envelope. Returns [`Packet::Fragment`]
    /// unreassembled when FragCount indicates more than one piece.
    pub fn into_packet(&self) -> LpResult<Packet> {
        if let Some(cnt) = self.frag_count {
            if cnt > 1 {
                return Ok(Packet::Fragment(self.fragment.clone()));
            }
        }
        let mut dec = Decoder::new(self.fragment.clone());
        let elem = dec.next().map_err(LpError::from)?.ok_or(LpError::L3Type)?;
        dec.err_unless_eof().map_err(|_| LpError::L3Type)?;
        match elem.typ {
            ndn_packet::tlv_type::INTEREST => {
                let interest = Interest::decode_from(elem.typ, elem.value)?;
                match self.nack_reason {
                    Some(reason) => Ok(Packet::Nack { interest, reason }),
                    None => Ok(Packet::Interest(interest)),
                }
            }
            ndn_packet::tlv_type::DATA => {
                let data = Data::decode_from(elem.typ, elem.value)?;
                Ok(Packet::Data(data))
            }
            _ => Err(LpError::L3Type),
        }
    }
}

fn be64(n: u64) -> Bytes {
    let mut buf = BytesMut::with_capacity(8);
    buf.put_u64(n);
    buf.freeze()
}

fn read_be64(mut value: Bytes) -> LpResult<u64> {
    if value.len() != 8 {
        return Err(LpError::SequenceSize);
    }
    Ok(value.get_u64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndn_packet::Name;

    fn interest_a() -> Interest {
        let mut interest = Interest::new(Name::parse("/A").unwrap());
        interest.nonce = Some(0x01020304);
        interest
    }

    #[test]
    fn s1_lp_interest_wraps_without_header() {
        let lp = LpPacket::bare(&Packet::Interest(interest_a())).unwrap();
        let wire = lp.encode().unwrap();
        assert_eq!(
            &wire[..13],
            &[0x64, 0x0F, 0x50, 0x0D, 0x05, 0x0B, 0x07, 0x03, 0x08, 0x01, b'A', 0x0A, 0x04]
        );
    }

    #[test]
    fn s2_lp_decode_with_headers() {
        let wire = Bytes::from_static(&[
            0x64, 0x1F, 0x51, 0x08, 0x88, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11, 0x52, 0x01,
            0x00, 0x53, 0x01, 0x01, 0x50, 0x0D, 0x05, 0x0B, 0x07, 0x03, 0x08, 0x01, b'A', 0x0A,
            0x04, 0x01, 0x02, 0x03, 0x04,
        ]);
        let lp = LpPacket::decode(wire).unwrap();
        assert_eq!(lp.sequence, Some(0x8877665544332211));
        assert_eq!(lp.frag_index, Some(0));
        assert_eq!(lp.frag_count, Some(1));
        match lp.into_packet().unwrap() {
            Packet::Interest(interest) => {
                assert_eq!(interest.name, Name::parse("/A").unwrap());
                assert_eq!(interest.nonce, Some(0x01020304));
            }
            other => panic!("expected Interest, got {other:?}"),
        }
    }

    #[test]
    fn s3_bare_interest_through_lp_decoder() {
        let wire = Bytes::from_static(&[
            0x05, 0x0B, 0x07, 0x03, 0x08, 0x01, b'A', 0x0A, 0x04, 0x01, 0x02, 0x03, 0x04,
        ]);
        let lp = LpPacket::decode(wire).unwrap();
        assert!(lp.l3.is_empty());
        match lp.into_packet().unwrap() {
            Packet::Interest(interest) => assert_eq!(interest.name, Name::parse("/A").unwrap()),
            other => panic!("expected Interest, got {other:?}"),
        }
    }

    #[test]
    fn nack_reason_round_trips_as_nack() {
        let lp = Packet::Nack {
            interest: interest_a(),
            reason: 50,
        }
        .to_lp(LpL3::default())
        .unwrap();
        let wire = lp.encode().unwrap();
        let decoded = LpPacket::decode(wire).unwrap();
        match decoded.into_packet().unwrap() {
            Packet::Nack { reason, .. } => assert_eq!(reason, 50),
            other => panic!("expected Nack, got {other:?}"),
        }
    }

    #[test]
    fn frag_index_without_frag_count_rejected() {
        let mut lp = LpPacket::bare(&Packet::Interest(interest_a())).unwrap();
        lp.frag_index = Some(0);
        assert_eq!(lp.encode().unwrap_err(), LpError::Fragment);
    }

    #[test]
    fn multi_fragment_not_reassembled_here() {
        let mut lp = LpPacket::bare(&Packet::Fragment(Bytes::from_static(b"partial"))).unwrap();
        lp.sequence = Some(1);
        lp.frag_index = Some(0);
        lp.frag_count = Some(2);
        assert_eq!(lp.into_packet().unwrap(), Packet::Fragment(Bytes::from_static(b"partial")));
    }
}
