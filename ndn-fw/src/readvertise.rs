//
// Copyright (c) The NDNgo-rs Contributors
//
// SPDX-License-Identifier: MIT
//

//! Readvertise destinations (spec §4.6): external parties notified when a
//! name prefix gains or loses its first/last announcing face.

use ndn_packet::Name;

/// A sink for prefix reachability changes, fed by [`crate::Forwarder`]'s
/// announcement bookkeeping.
///
/// Errors are discarded by the caller (spec §4.6, documented limitation):
/// a destination that can't currently reach its own upstream has no way to
/// signal the forwarder to retry, so this trait reports success/failure
/// only for the destination's own logging.
pub trait ReadvertiseDestination: Send + Sync {
    fn advertise(&self, name: &Name) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    fn withdraw(&self, name: &Name) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
