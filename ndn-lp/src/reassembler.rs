//
// Copyright (c) The NDNgo-rs Contributors
//
// SPDX-License-Identifier: MIT
//

//! Groups NDNLPv2 fragments back into complete frames (spec §4.3).
//!
//! Timeout policy is deliberately left to the caller: [`Reassembler`] never
//! reads a clock on its own. A caller drives `expire_older_than` with
//! whatever notion of "now" and whatever staleness threshold it wants.

use std::collections::HashMap;

use bytes::{Bytes, BytesMut};

use crate::error::{LpError, LpResult};
use crate::packet::LpPacket;

struct PartialSet {
    frag_count: u64,
    header: Option<LpPacket>,
    pieces: HashMap<u64, Bytes>,
    last_seen: u64,
}

/// Reassembles fragments sharing `Sequence - FragIndex` into the LpPacket
/// the first fragment describes, with `fragment` replaced by the full,
/// concatenated L3 wire bytes.
#[derive(Default)]
pub struct Reassembler {
    partial: HashMap<u64, PartialSet>,
}

impl Reassembler {
    pub fn new() -> Reassembler {
        Reassembler::default()
    }

    /// Feeds one received frame in. A frame with no FragIndex/FragCount is
    /// already complete and is returned immediately. Returns `Ok(None)`
    /// while a fragment set is still incomplete.
    pub fn insert(&mut self, lp: LpPacket, now: u64) -> LpResult<Option<LpPacket>> {
        let (index, count) = match (lp.frag_index, lp.frag_count) {
            (Some(i), Some(c)) => (i, c),
            (None, None) => return Ok(Some(lp)),
            _ => return Err(LpError::Fragment),
        };
        if index >= count {
            return Err(LpError::Fragment);
        }
        let sequence = lp.sequence.ok_or(LpError::Fragment)?;
        let key = sequence.wrapping_sub(index);

        let entry = self.partial.entry(key).or_insert_with(|| PartialSet {
            frag_count: count,
            header: None,
            pieces: HashMap::new(),
            last_seen: now,
        });
        if entry.frag_count != count {
            return Err(LpError::Fragment);
        }
        entry.last_seen = now;

        if index == 0 {
            entry.header = Some(LpPacket {
                sequence: lp.sequence,
                l3: lp.l3.clone(),
                nack_reason: lp.nack_reason,
                frag_index: None,
                frag_count: None,
                acks: lp.acks.clone(),
                tx_sequence: lp.tx_sequence,
                non_discovery: lp.non_discovery,
                prefix_announcement: lp.prefix_announcement.clone(),
                fragment: Bytes::new(),
            });
        }
        entry.pieces.insert(index, lp.fragment);

        if entry.pieces.len() as u64 != count {
            return Ok(None);
        }

        let mut set = self.partial.remove(&key).expect("key was just looked up");
        let mut header = set.header.take().ok_or(LpError::Fragment)?;
        let mut buf = BytesMut::new();
        for i in 0..count {
            let piece = set.pieces.get(&i).ok_or(LpError::Fragment)?;
            buf.extend_from_slice(piece);
        }
        header.fragment = buf.freeze();
        Ok(Some(header))
    }

    /// Drops fragment sets last touched before `cutoff`, per whatever clock
    /// the caller uses for `now` in [`Reassembler::insert`].
    pub fn expire_older_than(&mut self, cutoff: u64) {
        self.partial.retain(|_, set| set.last_seen >= cutoff);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragmenter::LpFragmenter;
    use crate::lp_l3::LpL3;
    use crate::packet::Packet;
    use ndn_packet::{Interest, Name};

    #[test]
    fn reassembles_in_any_arrival_order() {
        let mut fragmenter = LpFragmenter::new(100);
        let mut interest = Interest::new(Name::parse("/A").unwrap());
        interest.nonce = Some(1);
        interest.application_parameters = Some(Bytes::from(vec![9u8; 400]));
        let fragments = fragmenter
            .fragment(&Packet::Interest(interest.clone()), LpL3::default())
            .unwrap();
        assert!(fragments.len() > 1);

        let expected_wire = ndn_tlv::encode(&interest).unwrap();

        let mut reassembler = Reassembler::new();
        let mut reversed = fragments;
        reversed.reverse();
        let mut completed = None;
        for (i, frag) in reversed.into_iter().enumerate() {
            completed = reassembler.insert(frag, i as u64).unwrap();
        }
        let completed = completed.unwrap();
        assert_eq!(completed.fragment, expected_wire);
    }

    #[test]
    fn unfragmented_frame_passes_through() {
        let lp = LpPacket::default();
        let mut reassembler = Reassembler::new();
        assert_eq!(reassembler.insert(lp.clone(), 0).unwrap(), Some(lp));
    }

    #[test]
    fn stale_partial_sets_are_expired() {
        let mut reassembler = Reassembler::new();
        let lp = LpPacket {
            sequence: Some(10),
            frag_index: Some(0),
            frag_count: Some(2),
            fragment: Bytes::from_static(b"x"),
            ..Default::default()
        };
        assert_eq!(reassembler.insert(lp, 0).unwrap(), None);
        assert_eq!(reassembler.partial.len(), 1);
        reassembler.expire_older_than(5);
        assert_eq!(reassembler.partial.len(), 0);
    }
}
