//
// Copyright (c) The NDNgo-rs Contributors
//
// SPDX-License-Identifier: MIT
//

//! ndn-packet: the Name model and the L3 packet types (Interest, Data,
//! SigInfo, ValidityPeriod, PrefixAnnouncement) built on top of `ndn-tlv`
//! (spec §3, §4.2, §4.7).

pub mod data;
pub mod error;
pub mod interest;
pub mod meta_info;
pub mod name;
pub mod sig_info;
pub mod tlv_type;
pub mod validity_period;

pub use data::Data;
pub use error::{PacketError, PacketResult};
pub use interest::Interest;
pub use meta_info::{ContentType, MetaInfo};
pub use name::{Name, NameComponent};
pub use sig_info::{KeyLocator, SigInfo, SigType};
pub use validity_period::{PrefixAnnouncement, ValidityPeriod};
