//
// Copyright (c) The NDNgo-rs Contributors
//
// SPDX-License-Identifier: MIT
//

//! The default-forwarder singleton (spec §1.2), reproduced from the
//! original's `GetDefaultForwarder`/`AddUplink`
//! (`original_source/l3/forwarder.go`), which guards a process-wide
//! `Forwarder` behind `sync.Once`. This uses `std::sync::OnceLock` instead.
//!
//! Unlike the original's `DeleteDefaultForwarder` (documented there as
//! "non-thread-safe, test-only"), `OnceLock` cannot be reset once
//! initialized; tests that need an isolated forwarder should construct
//! their own with [`Forwarder::new`] rather than going through this module.

use std::sync::OnceLock;

use ndn_face::Transport;
use ndn_packet::Name;

use crate::error::FwResult;
use crate::forwarder::{Forwarder, ForwarderConfig, FwFaceHandle};

static DEFAULT_FORWARDER: OnceLock<Forwarder> = OnceLock::new();

/// Returns the process-wide default [`Forwarder`], constructing it with
/// [`ForwarderConfig::default`] on first use.
pub fn default_forwarder() -> Forwarder {
    DEFAULT_FORWARDER
        .get_or_init(|| Forwarder::new(ForwarderConfig::default()))
        .clone()
}

/// Adds `transport` to the default forwarder and, once the face is up,
/// gives it the `/` route so it receives every Interest the forwarder
/// can't otherwise match (the original's `AddUplink`).
///
/// The original only called `AddRoute` when `AddTransport` *failed*,
/// which reads as an inverted condition left over from refactoring; this
/// adds the route on success, as the doc comment there describes.
pub async fn add_uplink(transport: Box<dyn Transport>) -> FwResult<FwFaceHandle> {
    let face = default_forwarder().add_transport(transport).await?;
    face.add_route(Name::new()).await;
    Ok(face)
}
