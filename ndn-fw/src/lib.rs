//
// Copyright (c) The NDNgo-rs Contributors
//
// SPDX-License-Identifier: MIT
//

//! The forwarding plane (spec §4.6): a logical forwarder that owns a set of
//! faces, performs longest-prefix-match Interest routing, correlates
//! Data/Nack responses to their originating downstream face via an
//! embedded PIT token, and manages prefix announcements and
//! re-advertisement.

mod error;
mod forwarder;
mod fw_face;
pub mod global;
mod readvertise;

pub use error::{FwError, FwResult};
pub use forwarder::{Forwarder, ForwarderConfig, FwFaceHandle, MAX_FACES_CAP};
pub use fw_face::{token_insert_id, token_strip_id, MAX_ORIGINAL_TOKEN_LEN};
pub use readvertise::ReadvertiseDestination;
