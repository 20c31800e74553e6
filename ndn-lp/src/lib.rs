//
// Copyright (c) The NDNgo-rs Contributors
//
// SPDX-License-Identifier: MIT
//

//! NDNLPv2 link-layer framing: headers, fragmentation, and reassembly
//! (spec §3, §4.3).

pub mod error;
pub mod fragmenter;
pub mod lp_l3;
pub mod packet;
pub mod reassembler;
pub mod tlv_type;

pub use error::{LpError, LpResult};
pub use fragmenter::LpFragmenter;
pub use lp_l3::LpL3;
pub use packet::{LpPacket, Packet};
pub use reassembler::Reassembler;
