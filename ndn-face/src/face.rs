//
// Copyright (c) The NDNgo-rs Contributors
//
// SPDX-License-Identifier: MIT
//

//! The Face decode/encode boundary over a [`Transport`] (spec §4.5).

use ndn_lp::{LpL3, LpPacket, Packet};
use ndn_utils::task::Task;
use tokio::sync::{mpsc, watch};
use tracing::trace;

use crate::transport::{Transport, TransportState};

/// Wraps a [`Transport`] and performs the NDNLPv2/TLV decode-encode
/// boundary: callers exchange [`Packet`] values, never raw bytes.
///
/// The LpL3 header (PitToken, face-ID fields, …) of each frame is kept
/// alongside the decoded `Packet` internally; ordinary consumers go through
/// [`Face::recv`]/[`Face::sender`] and never see it, while a forwarder's
/// per-face dispatcher needs it to rewrite the PIT token and uses
/// [`Face::recv_with_l3`]/[`Face::sender_with_l3`] instead.
pub struct Face {
    rx: mpsc::Receiver<(Packet, LpL3)>,
    tx: mpsc::Sender<Packet>,
    tx_l3: mpsc::Sender<(Packet, LpL3)>,
    state: watch::Receiver<TransportState>,
    _rx_task: Task<()>,
    _tx_task: Task<()>,
}

impl Face {
    /// Takes ownership of `transport` and starts its rx/tx loops. Per spec
    /// §4.4, `transport`'s own `rx()`/`tx()` must not be used afterward.
    pub fn new(mut transport: Box<dyn Transport>) -> Face {
        let state = transport.subscribe_state();
        let (rx_tx, rx) = mpsc::channel(64);
        let (tx, mut tx_rx) = mpsc::channel::<Packet>(64);
        let (tx_l3, mut tx_l3_rx) = mpsc::channel::<(Packet, LpL3)>(64);

        let transport_tx = transport.tx().clone();
        let _tx_task = Task::spawn(async move {
            let mut tx_rx_done = false;
            let mut tx_l3_rx_done = false;
            loop {
                let (packet, l3) = tokio::select! {
                    msg = tx_rx.recv(), if !tx_rx_done => match msg {
                        Some(packet) => (packet, LpL3::default()),
                        None => { tx_rx_done = true; continue; }
                    },
                    msg = tx_l3_rx.recv(), if !tx_l3_rx_done => match msg {
                        Some(msg) => msg,
                        None => { tx_l3_rx_done = true; continue; }
                    },
                    else => break,
                };
                let lp = match packet.to_lp(l3) {
                    Ok(lp) => lp,
                    Err(e) => {
                        trace!("dropping outgoing packet: {e}");
                        continue;
                    }
                };
                let wire = match lp.encode() {
                    Ok(wire) => wire,
                    Err(e) => {
                        e.log();
                        continue;
                    }
                };
                if transport_tx.send(wire).await.is_err() {
                    break;
                }
            }
        });

        let _rx_task = Task::spawn(async move {
            while let Some(wire) = transport.rx().recv().await {
                let lp = match LpPacket::decode(wire) {
                    Ok(lp) => lp,
                    Err(e) => {
                        e.log();
                        continue;
                    }
                };
                let packet = match lp.into_packet() {
                    Ok(packet) => packet,
                    Err(e) => {
                        e.log();
                        continue;
                    }
                };
                if rx_tx.send((packet, lp.l3)).await.is_err() {
                    break;
                }
            }
        });

        Face {
            rx,
            tx,
            tx_l3,
            state,
            _rx_task,
            _tx_task,
        }
    }

    /// Receives the next decoded packet, or `None` once the transport and
    /// its backlog are fully drained.
    pub async fn recv(&mut self) -> Option<Packet> {
        self.rx.recv().await.map(|(packet, _)| packet)
    }

    /// Receives the next decoded packet together with the LpL3 header it
    /// arrived with.
    pub async fn recv_with_l3(&mut self) -> Option<(Packet, LpL3)> {
        self.rx.recv().await
    }

    /// A clonable sink of outgoing packets, each wrapped with an empty LpL3
    /// header. Dropping every clone of every sender (this one and
    /// [`Face::sender_with_l3`]'s) closes the Face's tx loop, which in turn
    /// closes the transport's tx side.
    pub fn sender(&self) -> mpsc::Sender<Packet> {
        self.tx.clone()
    }

    /// A clonable sink of outgoing packets paired with the LpL3 header to
    /// wrap them in, for a caller (the forwarder) that needs to set
    /// PitToken or face-ID fields explicitly.
    pub fn sender_with_l3(&self) -> mpsc::Sender<(Packet, LpL3)> {
        self.tx_l3.clone()
    }

    pub fn state(&self) -> TransportState {
        *self.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<TransportState> {
        self.state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::testing::ChannelTransport;
    use bytes::Bytes;
    use ndn_packet::{Interest, Name};

    #[tokio::test]
    async fn round_trips_an_interest_through_the_transport() {
        let (transport, peer_tx, mut peer_rx) = ChannelTransport::new();
        let mut face = Face::new(Box::new(transport));

        let mut interest = Interest::new(Name::parse("/A").unwrap());
        interest.nonce = Some(7);
        face.sender().send(Packet::Interest(interest.clone())).await.unwrap();

        let wire = peer_rx.recv().await.unwrap();
        let decoded = LpPacket::decode(wire).unwrap().into_packet().unwrap();
        assert_eq!(decoded, Packet::Interest(interest.clone()));

        let reply_lp = Packet::Interest(interest.clone()).to_lp(LpL3::default()).unwrap();
        peer_tx.send(reply_lp.encode().unwrap()).await.unwrap();
        let received = face.recv().await.unwrap();
        assert_eq!(received, Packet::Interest(interest));
    }

    #[tokio::test]
    async fn l3_header_round_trips_through_sender_with_l3() {
        let (transport, peer_tx, mut peer_rx) = ChannelTransport::new();
        let mut face = Face::new(Box::new(transport));

        let mut interest = Interest::new(Name::parse("/A").unwrap());
        interest.nonce = Some(7);
        let l3 = LpL3 {
            pit_token: Some(Bytes::from_static(&[1, 2, 3])),
            ..Default::default()
        };
        face.sender_with_l3()
            .send((Packet::Interest(interest.clone()), l3.clone()))
            .await
            .unwrap();

        let wire = peer_rx.recv().await.unwrap();
        let decoded = LpPacket::decode(wire).unwrap();
        assert_eq!(decoded.l3.pit_token, l3.pit_token);

        let reply_lp = Packet::Interest(interest.clone()).to_lp(l3.clone()).unwrap();
        peer_tx.send(reply_lp.encode().unwrap()).await.unwrap();
        let (received, received_l3) = face.recv_with_l3().await.unwrap();
        assert_eq!(received, Packet::Interest(interest));
        assert_eq!(received_l3.pit_token, l3.pit_token);
    }

    #[tokio::test]
    async fn malformed_frame_is_dropped_not_fatal() {
        let (transport, peer_tx, _peer_rx) = ChannelTransport::new();
        let mut face = Face::new(Box::new(transport));

        peer_tx.send(Bytes::from_static(&[0xFF])).await.unwrap();
        let mut interest = Interest::new(Name::parse("/A").unwrap());
        interest.nonce = Some(1);
        let lp = Packet::Interest(interest.clone()).to_lp(LpL3::default()).unwrap();
        peer_tx.send(lp.encode().unwrap()).await.unwrap();

        let received = face.recv().await.unwrap();
        assert_eq!(received, Packet::Interest(interest));
    }
}
