//
// Copyright (c) The NDNgo-rs Contributors
//
// SPDX-License-Identifier: MIT
//

//! Assigned TLV-TYPE numbers for NDNLPv2 (spec §6).

pub const LP_PACKET: u64 = 0x64;
pub const LP_FRAGMENT: u64 = 0x50;
pub const LP_SEQUENCE: u64 = 0x51;
pub const LP_FRAG_INDEX: u64 = 0x52;
pub const LP_FRAG_COUNT: u64 = 0x53;
pub const LP_PIT_TOKEN: u64 = 0x62;
/// Not in the baseline assigned-number table (Nack is described only as an
/// LP field in the data model, §3); added from the standard NDNLPv2
/// numbering so the Nack envelope variant has a wire representation. See
/// DESIGN.md.
pub const LP_NACK_REASON: u64 = 0x0320;
pub const LP_NEXT_HOP_FACE_ID: u64 = 0x0330;
pub const LP_INCOMING_FACE_ID: u64 = 0x0331;
pub const LP_CACHE_POLICY: u64 = 0x0334;
pub const LP_CACHE_POLICY_TYPE: u64 = 0x0335;
pub const LP_CONGESTION_MARK: u64 = 0x0340;
pub const LP_ACK: u64 = 0x0344;
pub const LP_TX_SEQUENCE: u64 = 0x0348;
pub const LP_NON_DISCOVERY: u64 = 0x034C;
pub const LP_PREFIX_ANNOUNCEMENT: u64 = 0x0350;
