//
// Copyright (c) The NDNgo-rs Contributors
//
// SPDX-License-Identifier: MIT
//

//! The Transport contract and the Face decode/encode boundary (spec §4.4,
//! §4.5). Concrete transports (TCP, UDP, memif, AF_PACKET) are collaborators
//! out of scope here; this crate defines the interface they implement.

pub mod face;
pub mod transport;

pub use face::Face;
pub use transport::{Transport, TransportState};

#[cfg(any(test, feature = "test-util"))]
pub use transport::testing;
