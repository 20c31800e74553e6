//
// Copyright (c) The NDNgo-rs Contributors
//
// SPDX-License-Identifier: MIT
//

//! MTU-based NDNLPv2 fragmentation (spec §4.3).

use bytes::{Bytes, BytesMut};
use ndn_tlv::Decoder;
use rand::Rng;

use crate::error::{LpError, LpResult};
use crate::lp_l3::LpL3;
use crate::packet::{LpPacket, Packet};

/// Conservative upper bound on the LpPacket + LpSequence + LpFragIndex +
/// LpFragCount + LpFragment TL overhead, for a packet that also carries an
/// LpL3 header of typical size. Leaves `mtu - FRAGMENT_OVERHEAD` octets of
/// `room` per fragment.
const FRAGMENT_OVERHEAD: usize = 60;

/// Splits L3 packets across fragments that each fit within an MTU.
pub struct LpFragmenter {
    room: usize,
    next_sequence: u64,
}

impl LpFragmenter {
    pub fn new(mtu: usize) -> LpFragmenter {
        LpFragmenter {
            room: mtu.saturating_sub(FRAGMENT_OVERHEAD),
            next_sequence: rand::rng().random(),
        }
    }

    /// Fragments `packet`, attaching `l3` to the first (or only) resulting
    /// fragment.
    pub fn fragment(&mut self, packet: &Packet, l3: LpL3) -> LpResult<Vec<LpPacket>> {
        let (wire, nack_reason) = match packet {
            Packet::Interest(interest) => (ndn_tlv::encode(interest).map_err(|_| LpError::Fragment)?, None),
            Packet::Data(data) => (ndn_tlv::encode(data).map_err(|_| LpError::Fragment)?, None),
            Packet::Nack { interest, reason } => {
                (ndn_tlv::encode(interest).map_err(|_| LpError::Fragment)?, Some(*reason))
            }
            Packet::Fragment(_) => return Err(LpError::Fragment),
        };

        let elem = Decoder::new(wire.clone())
            .next()
            .map_err(LpError::from)?
            .ok_or(LpError::Fragment)?;
        let header_len = wire.len() - elem.value.len();
        let header = wire.slice(0..header_len);
        let payload = elem.value;

        let sizeof_first_fragment = self.room as isize - header_len as isize;
        if sizeof_first_fragment >= payload.len() as isize {
            return Ok(vec![LpPacket {
                l3,
                nack_reason,
                fragment: wire,
                ..Default::default()
            }]);
        }
        if sizeof_first_fragment <= 0 {
            return Err(LpError::Fragment);
        }
        let sizeof_first_fragment = sizeof_first_fragment as usize;

        let mut chunks = vec![{
            let mut buf = BytesMut::with_capacity(header_len + sizeof_first_fragment);
            buf.extend_from_slice(&header);
            buf.extend_from_slice(&payload[..sizeof_first_fragment]);
            buf.freeze()
        }];
        let mut offset = sizeof_first_fragment;
        while offset < payload.len() {
            let end = (offset + self.room).min(payload.len());
            chunks.push(payload.slice(offset..end));
            offset = end;
        }

        let frag_count = chunks.len() as u64;
        let base_sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.wrapping_add(frag_count);

        Ok(chunks
            .into_iter()
            .enumerate()
            .map(|(i, chunk)| LpPacket {
                sequence: Some(base_sequence.wrapping_add(i as u64)),
                l3: if i == 0 { l3.clone() } else { LpL3::default() },
                nack_reason: if i == 0 { nack_reason } else { None },
                frag_index: Some(i as u64),
                frag_count: Some(frag_count),
                fragment: chunk,
                ..Default::default()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndn_packet::{Interest, Name};

    fn interest(name: &str) -> Interest {
        let mut interest = Interest::new(Name::parse(name).unwrap());
        interest.nonce = Some(1);
        interest
    }

    #[test]
    fn fits_in_one_fragment_is_not_fragmented() {
        let mut f = LpFragmenter::new(1500);
        let fragments = f
            .fragment(&Packet::Interest(interest("/A")), LpL3::default())
            .unwrap();
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].frag_index, None);
        assert_eq!(fragments[0].frag_count, None);
    }

    #[test]
    fn large_payload_is_split_into_consecutive_fragments() {
        let mut f = LpFragmenter::new(100);
        let mut interest = interest("/A");
        interest.application_parameters = Some(Bytes::from(vec![7u8; 500]));
        let fragments = f.fragment(&Packet::Interest(interest), LpL3::default()).unwrap();
        assert!(fragments.len() > 1);
        for (i, frag) in fragments.iter().enumerate() {
            assert_eq!(frag.frag_index, Some(i as u64));
            assert_eq!(frag.frag_count, Some(fragments.len() as u64));
        }
        let sequences: Vec<u64> = fragments.iter().map(|f| f.sequence.unwrap()).collect();
        for w in sequences.windows(2) {
            assert_eq!(w[1], w[0] + 1);
        }
    }

    #[test]
    fn mtu_too_small_for_headers_is_rejected() {
        let mut f = LpFragmenter::new(10);
        let err = f
            .fragment(&Packet::Interest(interest("/A")), LpL3::default())
            .unwrap_err();
        assert_eq!(err, LpError::Fragment);
    }
}
