//
// Copyright (c) The NDNgo-rs Contributors
//
// SPDX-License-Identifier: MIT
//

//! Per-face forwarder state and the PIT-token reverse-path wrapping (spec
//! §4.6).

use std::collections::HashSet;

use bytes::{Bytes, BytesMut};
use ndn_face::Face;
use ndn_lp::{LpL3, Packet};
use ndn_packet::Name;
use ndn_utils::task::Task;
use tokio::sync::mpsc;

/// Largest original PIT token a consumer may supply and still have it
/// survive the reverse-path wrap: 2 octets FaceID plus 1 octet LenOrig
/// leave 5 octets of an 8-octet field for the original token (spec §4.6).
pub const MAX_ORIGINAL_TOKEN_LEN: usize = 5;

/// Wraps `orig` with `face_id`'s low 16 bits:
/// `FaceID(2BE) || LenOrig(1) || orig || zero-pad to 8 octets`
/// (spec §4.6, grounded on `original_source/l3/fwface.go`'s `tokenInsertID`).
/// Returns `None` when `orig` is too long to embed.
pub fn token_insert_id(orig: &[u8], face_id: u32) -> Option<Bytes> {
    if orig.len() > MAX_ORIGINAL_TOKEN_LEN {
        return None;
    }
    let mut buf = BytesMut::with_capacity(8);
    buf.extend_from_slice(&(face_id as u16).to_be_bytes());
    buf.extend_from_slice(&[orig.len() as u8]);
    buf.extend_from_slice(orig);
    buf.resize(8, 0);
    Some(buf.freeze())
}

/// Reverses [`token_insert_id`]: recovers the downstream FaceID and the
/// original token. Returns `None` on a malformed token (wrong length,
/// LenOrig out of range) — the caller drops the packet (spec §4.6).
pub fn token_strip_id(token: &[u8]) -> Option<(u32, Bytes)> {
    if token.len() != 8 {
        return None;
    }
    let face_id = u16::from_be_bytes([token[0], token[1]]) as u32;
    let len_orig = token[2] as usize;
    if len_orig > MAX_ORIGINAL_TOKEN_LEN {
        return None;
    }
    Some((face_id, Bytes::copy_from_slice(&token[3..3 + len_orig])))
}

/// A Forwarder-owned face: a [`Face`] plus the route and announcement sets
/// that drive FIB lookups and readvertisement (spec §4.6). Owned
/// exclusively by the [`crate::Forwarder`] actor loop (spec §9 Design
/// Notes: "Forwarder exclusively owns FwFaces").
pub(crate) struct FwFace {
    pub(crate) id: u32,
    tx: mpsc::Sender<(Packet, LpL3)>,
    pub(crate) routes: HashSet<Name>,
    pub(crate) announcements: HashSet<Name>,
    _dispatch: Task<()>,
}

impl FwFace {
    /// Spawns the rx-dispatcher task that reads decoded packets off `face`,
    /// wraps the PIT token of Interests with `id`, and forwards everything
    /// to the Forwarder's shared packet channel tagged with `id` (spec §5,
    /// §4.6 "Interest path" step 1).
    pub(crate) fn new(
        id: u32,
        mut face: Face,
        pkt_tx: mpsc::Sender<(u32, Packet, LpL3)>,
    ) -> FwFace {
        let tx = face.sender_with_l3();
        let _dispatch = Task::spawn(async move {
            while let Some((packet, mut l3)) = face.recv_with_l3().await {
                if matches!(packet, Packet::Interest(_)) {
                    let orig = l3.pit_token.clone().unwrap_or_default();
                    match token_insert_id(&orig, id) {
                        Some(wrapped) => l3.pit_token = Some(wrapped),
                        None => continue,
                    }
                }
                if pkt_tx.send((id, packet, l3)).await.is_err() {
                    break;
                }
            }
        });
        FwFace {
            id,
            tx,
            routes: HashSet::new(),
            announcements: HashSet::new(),
            _dispatch,
        }
    }

    /// Sends a packet out this face with the given LpL3 header. Backpressure
    /// from a slow peer blocks the caller — the Forwarder loop has no
    /// shedding policy (spec §5).
    pub(crate) async fn send(&self, packet: Packet, l3: LpL3) -> bool {
        self.tx.send((packet, l3)).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip_for_every_length_up_to_five() {
        for len in 0..=MAX_ORIGINAL_TOKEN_LEN {
            let orig: Vec<u8> = (0..len as u8).collect();
            let wrapped = token_insert_id(&orig, 0x1234).unwrap();
            assert_eq!(wrapped.len(), 8);
            let (face_id, recovered) = token_strip_id(&wrapped).unwrap();
            assert_eq!(face_id, 0x1234);
            assert_eq!(recovered, Bytes::from(orig));
        }
    }

    #[test]
    fn token_longer_than_five_octets_is_rejected() {
        let orig = [0u8; 6];
        assert!(token_insert_id(&orig, 1).is_none());
    }

    #[test]
    fn strip_rejects_wrong_length() {
        assert!(token_strip_id(&[0, 0, 0]).is_none());
    }
}
