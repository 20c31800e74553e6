//
// Copyright (c) The NDNgo-rs Contributors
//
// SPDX-License-Identifier: MIT
//

//! The forwarding plane actor (spec §4.6, §5): a single-writer loop that
//! owns the face table, performs longest-prefix-match Interest routing, and
//! correlates Data/Nack responses via the PIT-token reverse path.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use ndn_face::{Face, Transport, TransportState};
use ndn_lp::{LpL3, Packet};
use ndn_packet::Name;
use ndn_utils::task::Task;
use rand::Rng;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::warn;

use crate::error::{FwError, FwResult};
use crate::fw_face::{token_strip_id, FwFace};
use crate::readvertise::ReadvertiseDestination;

/// Clamp applied to [`ForwarderConfig::max_faces`] (spec §9 decision): the
/// wire PIT-token reserves exactly 2 octets for FaceID, so a cap above
/// `2^16 - 1` would admit faces whose ID can never round-trip through a
/// Data/Nack's reverse path.
pub const MAX_FACES_CAP: u32 = (1 << 16) - 1;

/// Tuning surface for a [`Forwarder`] (spec §1.1 ambient configuration).
#[derive(Clone, Copy, Debug)]
pub struct ForwarderConfig {
    pub max_faces: u32,
}

impl Default for ForwarderConfig {
    fn default() -> ForwarderConfig {
        ForwarderConfig {
            max_faces: MAX_FACES_CAP,
        }
    }
}

impl ForwarderConfig {
    fn clamped_max_faces(&self) -> u32 {
        self.max_faces.min(MAX_FACES_CAP)
    }
}

enum Command {
    AddFace {
        face: Face,
        respond: oneshot::Sender<FwResult<(u32, watch::Receiver<TransportState>)>>,
    },
    AddRoute {
        id: u32,
        name: Name,
        respond: oneshot::Sender<()>,
    },
    RemoveRoute {
        id: u32,
        name: Name,
        respond: oneshot::Sender<()>,
    },
    AddAnnouncement {
        id: u32,
        name: Name,
        respond: oneshot::Sender<()>,
    },
    RemoveAnnouncement {
        id: u32,
        name: Name,
        respond: oneshot::Sender<()>,
    },
    CloseFace {
        id: u32,
        respond: oneshot::Sender<()>,
    },
    AddReadvertiseDestination {
        dest: Arc<dyn ReadvertiseDestination>,
        respond: oneshot::Sender<()>,
    },
    RemoveReadvertiseDestination {
        dest: Arc<dyn ReadvertiseDestination>,
        respond: oneshot::Sender<()>,
    },
}

/// A logical forwarding plane (spec §4.6): demultiplexes Interest/Data/Nack
/// packets among faces by longest-prefix match and rewrites PIT tokens to
/// carry the downstream face's identity, instead of keeping a pending
/// Interest table.
///
/// A `Forwarder` is a cheap, clonable handle onto a single actor loop
/// (spec §5's single-writer task); every clone shares the same face table.
/// The loop exits once the last handle (and the `Arc`-shared loop task) is
/// dropped.
#[derive(Clone, Debug)]
pub struct Forwarder {
    cmd_tx: mpsc::Sender<Command>,
    _loop_task: Arc<Task<()>>,
}

impl Forwarder {
    pub fn new(config: ForwarderConfig) -> Forwarder {
        let max_faces = config.clamped_max_faces();
        let (cmd_tx, cmd_rx) = mpsc::channel(64);
        let (pkt_tx, pkt_rx) = mpsc::channel::<(u32, Packet, LpL3)>(256);
        let loop_pkt_tx = pkt_tx.clone();
        let _loop_task = Arc::new(Task::spawn(run_loop(
            max_faces,
            cmd_rx,
            pkt_rx,
            loop_pkt_tx,
        )));
        Forwarder {
            cmd_tx,
            _loop_task,
        }
    }

    async fn call<T>(&self, cmd: Command, rx: oneshot::Receiver<T>) -> FwResult<T> {
        self.cmd_tx.send(cmd).await.map_err(|_| FwError::Closed)?;
        rx.await.map_err(|_| FwError::Closed)
    }

    /// Constructs a [`Face`] over `transport` and adds it (spec §4.6
    /// `AddTransport`). `transport`'s own `rx()`/`tx()` must not be used
    /// afterward.
    pub async fn add_transport(
        &self,
        transport: Box<dyn Transport>,
    ) -> FwResult<FwFaceHandle> {
        self.add_face(Face::new(transport)).await
    }

    /// Adds an already-constructed [`Face`] (spec §4.6 `AddFace`). `face`
    /// must not be used directly afterward.
    pub async fn add_face(&self, face: Face) -> FwResult<FwFaceHandle> {
        let (respond, rx) = oneshot::channel();
        let result = self.call(Command::AddFace { face, respond }, rx).await?;
        let (id, state) = result?;
        Ok(FwFaceHandle {
            id,
            fw: self.clone(),
            state,
        })
    }

    /// Registers `dest` to receive `Advertise`/`Withdraw` calls for future
    /// announcements (spec §4.6). Existing announcements are not replayed
    /// to a newly added destination (documented limitation).
    pub async fn add_readvertise_destination(&self, dest: Arc<dyn ReadvertiseDestination>) {
        let (respond, rx) = oneshot::channel();
        let _ = self
            .call(
                Command::AddReadvertiseDestination { dest, respond },
                rx,
            )
            .await;
    }

    pub async fn remove_readvertise_destination(&self, dest: Arc<dyn ReadvertiseDestination>) {
        let (respond, rx) = oneshot::channel();
        let _ = self
            .call(
                Command::RemoveReadvertiseDestination { dest, respond },
                rx,
            )
            .await;
    }
}

/// A handle to a face added to a [`Forwarder`] (spec §4.6 `FwFace`
/// interface). Mutating methods submit a command to the owning
/// `Forwarder`'s actor loop and wait for it to apply.
#[derive(Clone, Debug)]
pub struct FwFaceHandle {
    id: u32,
    fw: Forwarder,
    state: watch::Receiver<TransportState>,
}

impl FwFaceHandle {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn state(&self) -> TransportState {
        *self.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<TransportState> {
        self.state.clone()
    }

    pub async fn add_route(&self, name: Name) {
        let (respond, rx) = oneshot::channel();
        let _ = self
            .fw
            .call(
                Command::AddRoute {
                    id: self.id,
                    name,
                    respond,
                },
                rx,
            )
            .await;
    }

    pub async fn remove_route(&self, name: Name) {
        let (respond, rx) = oneshot::channel();
        let _ = self
            .fw
            .call(
                Command::RemoveRoute {
                    id: self.id,
                    name,
                    respond,
                },
                rx,
            )
            .await;
    }

    pub async fn add_announcement(&self, name: Name) {
        let (respond, rx) = oneshot::channel();
        let _ = self
            .fw
            .call(
                Command::AddAnnouncement {
                    id: self.id,
                    name,
                    respond,
                },
                rx,
            )
            .await;
    }

    pub async fn remove_announcement(&self, name: Name) {
        let (respond, rx) = oneshot::channel();
        let _ = self
            .fw
            .call(
                Command::RemoveAnnouncement {
                    id: self.id,
                    name,
                    respond,
                },
                rx,
            )
            .await;
    }

    /// Removes this face from its forwarder: withdraws every announcement
    /// it still holds, then drops it (spec §4.6 `Close`).
    pub async fn close(&self) {
        let (respond, rx) = oneshot::channel();
        let _ = self
            .fw
            .call(Command::CloseFace {
                id: self.id,
                respond,
            }, rx)
            .await;
    }
}

async fn run_loop(
    max_faces: u32,
    mut cmd_rx: mpsc::Receiver<Command>,
    mut pkt_rx: mpsc::Receiver<(u32, Packet, LpL3)>,
    pkt_tx: mpsc::Sender<(u32, Packet, LpL3)>,
) {
    let mut faces: HashMap<u32, FwFace> = HashMap::new();
    let mut announcements: HashMap<Name, HashSet<u32>> = HashMap::new();
    let mut readvertise: Vec<Arc<dyn ReadvertiseDestination>> = Vec::new();

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                Some(cmd) => handle_command(
                    cmd,
                    &mut faces,
                    &mut announcements,
                    &mut readvertise,
                    max_faces,
                    &pkt_tx,
                ),
                None => break,
            },
            pkt = pkt_rx.recv() => match pkt {
                Some((from, packet, l3)) => dispatch_packet(&faces, from, packet, l3).await,
                None => break,
            },
        }
    }
}

fn handle_command(
    cmd: Command,
    faces: &mut HashMap<u32, FwFace>,
    announcements: &mut HashMap<Name, HashSet<u32>>,
    readvertise: &mut Vec<Arc<dyn ReadvertiseDestination>>,
    max_faces: u32,
    pkt_tx: &mpsc::Sender<(u32, Packet, LpL3)>,
) {
    match cmd {
        Command::AddFace { face, respond } => {
            let result = if faces.len() as u32 >= max_faces {
                Err(FwError::MaxFwFaces)
            } else {
                let state = face.subscribe_state();
                let mut rng = rand::rng();
                let mut id = 0u32;
                while id == 0 || faces.contains_key(&id) {
                    id = rng.random::<u16>() as u32;
                }
                faces.insert(id, FwFace::new(id, face, pkt_tx.clone()));
                Ok((id, state))
            };
            let _ = respond.send(result);
        }
        Command::AddRoute { id, name, respond } => {
            if let Some(face) = faces.get_mut(&id) {
                face.routes.insert(name);
            }
            let _ = respond.send(());
        }
        Command::RemoveRoute { id, name, respond } => {
            if let Some(face) = faces.get_mut(&id) {
                face.routes.remove(&name);
            }
            let _ = respond.send(());
        }
        Command::AddAnnouncement { id, name, respond } => {
            add_announcement(faces, announcements, readvertise, id, name);
            let _ = respond.send(());
        }
        Command::RemoveAnnouncement { id, name, respond } => {
            remove_announcement(faces, announcements, readvertise, id, &name);
            let _ = respond.send(());
        }
        Command::CloseFace { id, respond } => {
            if let Some(face) = faces.get(&id) {
                let names: Vec<Name> = face.announcements.iter().cloned().collect();
                for name in names {
                    remove_announcement(faces, announcements, readvertise, id, &name);
                }
            }
            faces.remove(&id);
            let _ = respond.send(());
        }
        Command::AddReadvertiseDestination { dest, respond } => {
            if !readvertise.iter().any(|d| Arc::ptr_eq(d, &dest)) {
                readvertise.push(dest);
            }
            let _ = respond.send(());
        }
        Command::RemoveReadvertiseDestination { dest, respond } => {
            readvertise.retain(|d| !Arc::ptr_eq(d, &dest));
            let _ = respond.send(());
        }
    }
}

fn add_announcement(
    faces: &mut HashMap<u32, FwFace>,
    announcements: &mut HashMap<Name, HashSet<u32>>,
    readvertise: &[Arc<dyn ReadvertiseDestination>],
    id: u32,
    name: Name,
) {
    let Some(face) = faces.get_mut(&id) else {
        return;
    };
    face.announcements.insert(name.clone());
    let holders = announcements.entry(name.clone()).or_default();
    if holders.is_empty() {
        for dest in readvertise {
            if let Err(e) = dest.advertise(&name) {
                warn!("readvertise destination failed to advertise {name}: {e}");
            }
        }
    }
    holders.insert(id);
}

fn remove_announcement(
    faces: &mut HashMap<u32, FwFace>,
    announcements: &mut HashMap<Name, HashSet<u32>>,
    readvertise: &[Arc<dyn ReadvertiseDestination>],
    id: u32,
    name: &Name,
) {
    if let Some(face) = faces.get_mut(&id) {
        face.announcements.remove(name);
    }
    if let Some(holders) = announcements.get_mut(name) {
        holders.remove(&id);
        if holders.is_empty() {
            announcements.remove(name);
            for dest in readvertise {
                if let Err(e) = dest.withdraw(name) {
                    warn!("readvertise destination failed to withdraw {name}: {e}");
                }
            }
        }
    }
}

/// Longest route in `face`'s table that prefixes `name`, or `None` if no
/// route matches (spec §4.6; corrects `original_source/l3/fwface.go`'s
/// `lpmRoute`, whose loop variable shadows the `name` parameter and so
/// always compares a route against itself).
fn lpm_route(face: &FwFace, name: &Name) -> Option<usize> {
    face.routes
        .iter()
        .filter(|route| route.is_prefix_of(name))
        .map(Name::len)
        .max()
}

/// Routes one packet arriving from face `_from` (spec §4.6). `_from` is
/// unused: split-horizon suppression is not implemented, matching the
/// resolved open question in spec §9 (an Interest may be forwarded back
/// out the face it arrived on).
async fn dispatch_packet(faces: &HashMap<u32, FwFace>, _from: u32, packet: Packet, l3: LpL3) {
    match &packet {
        Packet::Interest(interest) => {
            let mut best_len: Option<usize> = None;
            let mut nexthops: Vec<u32> = Vec::new();
            for (&id, face) in faces {
                let Some(len) = lpm_route(face, &interest.name) else {
                    continue;
                };
                match best_len {
                    Some(best) if len > best => {
                        best_len = Some(len);
                        nexthops.clear();
                        nexthops.push(id);
                    }
                    Some(best) if len == best => nexthops.push(id),
                    None => {
                        best_len = Some(len);
                        nexthops.push(id);
                    }
                    _ => {}
                }
            }
            for id in nexthops {
                if let Some(face) = faces.get(&id) {
                    face.send(packet.clone(), l3.clone()).await;
                }
            }
        }
        Packet::Data(_) | Packet::Nack { .. } => {
            let Some(token) = l3.pit_token.as_deref() else {
                return;
            };
            let Some((downstream_id, orig_token)) = token_strip_id(token) else {
                return;
            };
            if let Some(face) = faces.get(&downstream_id) {
                let mut out_l3 = l3.clone();
                out_l3.pit_token = Some(orig_token);
                face.send(packet.clone(), out_l3).await;
            }
        }
        Packet::Fragment(_) => {
            warn!("forwarder received an unreassembled LP fragment; dropping");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndn_face::testing::ChannelTransport;
    use ndn_packet::Interest;

    async fn connected_face(
        fw: &Forwarder,
    ) -> (
        FwFaceHandle,
        mpsc::Sender<bytes::Bytes>,
        mpsc::Receiver<bytes::Bytes>,
    ) {
        let (transport, peer_tx, peer_rx) = ChannelTransport::new();
        let handle = fw.add_face(Face::new(Box::new(transport))).await.unwrap();
        (handle, peer_tx, peer_rx)
    }

    #[tokio::test]
    async fn s4_lpm_picks_the_most_specific_route() {
        let fw = Forwarder::new(ForwarderConfig::default());
        let (f1, f1_tx, mut f1_rx) = connected_face(&fw).await;
        let (f2, f2_tx, mut f2_rx) = connected_face(&fw).await;
        f1.add_route(Name::parse("/a").unwrap()).await;
        f2.add_route(Name::parse("/a/b").unwrap()).await;

        let interest = Interest::new(Name::parse("/a/b/c").unwrap());
        let lp = Packet::Interest(interest.clone())
            .to_lp(LpL3::default())
            .unwrap();
        f1_tx.send(lp.encode().unwrap()).await.unwrap();

        let wire = f2_rx.recv().await.unwrap();
        let decoded = ndn_lp::LpPacket::decode(wire).unwrap().into_packet().unwrap();
        assert_eq!(decoded, Packet::Interest(interest));

        assert!(
            tokio::time::timeout(std::time::Duration::from_millis(50), f1_rx.recv())
                .await
                .is_err(),
            "F1 should not receive the Interest it lost LPM against"
        );

        f1.add_route(Name::parse("/a/b").unwrap()).await;
        let interest2 = Interest::new(Name::parse("/a/b/c").unwrap());
        let lp2 = Packet::Interest(interest2.clone())
            .to_lp(LpL3::default())
            .unwrap();
        f2_tx.send(lp2.encode().unwrap()).await.unwrap();

        let w1 = f1_rx.recv().await.unwrap();
        let d1 = ndn_lp::LpPacket::decode(w1).unwrap().into_packet().unwrap();
        assert_eq!(d1, Packet::Interest(interest2.clone()));
    }

    #[tokio::test]
    async fn s5_data_returns_via_stripped_token_not_the_wrapped_one() {
        let fw = Forwarder::new(ForwarderConfig::default());
        let (f1, f1_tx, mut f1_rx) = connected_face(&fw).await;
        let (f2, f2_tx, mut f2_rx) = connected_face(&fw).await;
        f2.add_route(Name::new()).await;

        let interest = Interest::new(Name::parse("/x").unwrap());
        let lp = Packet::Interest(interest.clone())
            .to_lp(LpL3::default())
            .unwrap();
        f1_tx.send(lp.encode().unwrap()).await.unwrap();

        let wire = f2_rx.recv().await.unwrap();
        let forwarded = ndn_lp::LpPacket::decode(wire).unwrap();
        assert!(forwarded.l3.pit_token.is_some());

        let mut data = ndn_packet::Data::new(Name::parse("/x").unwrap());
        data.content = bytes::Bytes::from_static(b"hello");
        let data_lp = Packet::Data(data.clone())
            .to_lp(LpL3 {
                pit_token: forwarded.l3.pit_token.clone(),
                ..Default::default()
            })
            .unwrap();
        f2_tx.send(data_lp.encode().unwrap()).await.unwrap();

        let wire = f1_rx.recv().await.unwrap();
        let received_lp = ndn_lp::LpPacket::decode(wire).unwrap();
        assert_eq!(received_lp.l3.pit_token, None);
        assert_eq!(received_lp.into_packet().unwrap(), Packet::Data(data));
    }

    #[tokio::test]
    async fn max_faces_rejects_once_full() {
        let fw = Forwarder::new(ForwarderConfig { max_faces: 1 });
        let (t1, _tx1, _rx1) = ChannelTransport::new();
        fw.add_face(Face::new(Box::new(t1))).await.unwrap();

        let (t2, _tx2, _rx2) = ChannelTransport::new();
        let err = fw.add_face(Face::new(Box::new(t2))).await.unwrap_err();
        assert_eq!(err, FwError::MaxFwFaces);
    }

    #[derive(Default)]
    struct RecordingDestination {
        events: std::sync::Mutex<Vec<(bool, Name)>>,
    }

    impl ReadvertiseDestination for RecordingDestination {
        fn advertise(&self, name: &Name) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.events.lock().unwrap().push((true, name.clone()));
            Ok(())
        }

        fn withdraw(&self, name: &Name) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.events.lock().unwrap().push((false, name.clone()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn s6_announcements_are_reference_counted_across_faces() {
        let fw = Forwarder::new(ForwarderConfig::default());
        let d1 = Arc::new(RecordingDestination::default());
        let d2 = Arc::new(RecordingDestination::default());
        fw.add_readvertise_destination(d1.clone()).await;
        fw.add_readvertise_destination(d2.clone()).await;

        let (f1, _tx1, _rx1) = connected_face(&fw).await;
        let (f2, _tx2, _rx2) = connected_face(&fw).await;
        let p = Name::parse("/p").unwrap();

        f1.add_announcement(p.clone()).await;
        assert_eq!(d1.events.lock().unwrap().as_slice(), &[(true, p.clone())]);
        assert_eq!(d2.events.lock().unwrap().as_slice(), &[(true, p.clone())]);

        f2.add_announcement(p.clone()).await;
        assert_eq!(d1.events.lock().unwrap().len(), 1, "second announcer must not re-advertise");

        f1.close().await;
        assert_eq!(d1.events.lock().unwrap().len(), 1, "f2 still announces /p");

        f2.close().await;
        assert_eq!(
            d1.events.lock().unwrap().as_slice(),
            &[(true, p.clone()), (false, p.clone())]
        );
        assert_eq!(
            d2.events.lock().unwrap().as_slice(),
            &[(true, p.clone()), (false, p)]
        );
    }
}
