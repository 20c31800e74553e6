//
// Copyright (c) The NDNgo-rs Contributors
//
// SPDX-License-Identifier: MIT
//

//! NDNLPv2 decoding/encoding errors (spec §7).

use ndn_utils::error::ErrorKind;
use tracing::warn;

pub type LpResult<T> = Result<T, LpError>;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LpError {
    Tlv(ndn_tlv::DecodeError),
    Packet(ndn_packet::PacketError),
    /// Malformed fragment metadata, or an MTU too small to fit the headers.
    Fragment,
    /// TxSequence present without Sequence.
    Reliability,
    /// A sequence-like field (Sequence, Ack, TxSequence) was not 8 octets.
    SequenceSize,
    /// Top-level TYPE is neither LpPacket, Interest, nor Data.
    NotLpFrame,
    /// CachePolicy did not contain exactly one CachePolicyType element.
    UnexpectedElem,
    /// LpFragment payload, once fully reassembled, was neither Interest nor
    /// Data.
    L3Type,
}

impl From<ndn_tlv::DecodeError> for LpError {
    fn from(e: ndn_tlv::DecodeError) -> Self {
        LpError::Tlv(e)
    }
}

impl From<ndn_packet::PacketError> for LpError {
    fn from(e: ndn_packet::PacketError) -> Self {
        LpError::Packet(e)
    }
}

impl std::fmt::Display for LpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LpError::Tlv(e) => write!(f, "{e}"),
            LpError::Packet(e) => write!(f, "{e}"),
            LpError::Fragment => write!(f, "{}: malformed fragment metadata", ErrorKind::Fragment),
            LpError::Reliability => {
                write!(f, "{}: TxSequence without Sequence", ErrorKind::Reliability)
            }
            LpError::SequenceSize => {
                write!(f, "{}: sequence-like field is not 8 octets", ErrorKind::SequenceSize)
            }
            LpError::NotLpFrame => {
                write!(
                    f,
                    "{}: outer TLV-TYPE is neither LpPacket, Interest, nor Data",
                    ErrorKind::NotLpFrame
                )
            }
            LpError::UnexpectedElem => {
                write!(f, "{}: malformed CachePolicy", ErrorKind::UnexpectedElem)
            }
            LpError::L3Type => {
                write!(f, "{}: LP fragment payload is neither Interest nor Data", ErrorKind::L3Type)
            }
        }
    }
}

impl std::error::Error for LpError {}

impl LpError {
    pub fn log(&self) {
        warn!("{}", self);
    }
}
