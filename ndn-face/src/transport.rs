//
// Copyright (c) The NDNgo-rs Contributors
//
// SPDX-License-Identifier: MIT
//

//! The Transport contract (spec §4.4): a duplex, frame-preserving byte
//! channel with subscribable up/down state.

use bytes::Bytes;
use tokio::sync::{mpsc, watch};

/// A transport's lifecycle state. `Down` and `Up` may alternate any number
/// of times; `Closed` is terminal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransportState {
    Down,
    Up,
    Closed,
}

/// A duplex byte-frame channel (spec §4.4).
///
/// Implementors drive the channel endpoints this trait exposes: a stream
/// transport (TCP, Unix) runs a re-framer over a sliding buffer and pushes
/// complete TLV frames into the `rx` side; a datagram transport (UDP,
/// memif, AF_PACKET) forwards frames directly. Either way, one frame goes
/// in for one frame that comes out — this trait only owns the endpoints,
/// not the framing policy.
pub trait Transport: Send {
    /// The channel of complete, decoded frames arriving from the peer.
    fn rx(&mut self) -> &mut mpsc::Receiver<Bytes>;

    /// The channel to push complete outgoing frames into.
    fn tx(&self) -> &mpsc::Sender<Bytes>;

    /// The transport's current state.
    fn state(&self) -> TransportState;

    /// A receiver that observes every state transition, starting from the
    /// current state.
    fn subscribe_state(&self) -> watch::Receiver<TransportState>;
}

/// Test doubles for [`Transport`], gated behind the `test-util` feature
/// (teacher idiom: a `testing`/`test_util` module shipped in the crate
/// itself rather than duplicated by every downstream crate's tests).
#[cfg(any(test, feature = "test-util"))]
pub mod testing {
    use super::*;

    /// An in-memory Transport backed by channels the test drives directly,
    /// standing in for a concrete transport (TCP/UDP/memif) in tests.
    pub struct ChannelTransport {
        pub rx: mpsc::Receiver<Bytes>,
        pub tx: mpsc::Sender<Bytes>,
        state: watch::Sender<TransportState>,
    }

    impl ChannelTransport {
        pub fn new() -> (ChannelTransport, mpsc::Sender<Bytes>, mpsc::Receiver<Bytes>) {
            let (peer_tx, rx) = mpsc::channel(16);
            let (tx, peer_rx) = mpsc::channel(16);
            let (state, _) = watch::channel(TransportState::Up);
            (ChannelTransport { rx, tx, state }, peer_tx, peer_rx)
        }

        pub fn set_state(&self, state: TransportState) {
            let _ = self.state.send(state);
        }
    }

    impl Transport for ChannelTransport {
        fn rx(&mut self) -> &mut mpsc::Receiver<Bytes> {
            &mut self.rx
        }

        fn tx(&self) -> &mpsc::Sender<Bytes> {
            &self.tx
        }

        fn state(&self) -> TransportState {
            *self.state.borrow()
        }

        fn subscribe_state(&self) -> watch::Receiver<TransportState> {
            self.state.subscribe()
        }
    }
}
