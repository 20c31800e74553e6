//
// Copyright (c) The NDNgo-rs Contributors
//
// SPDX-License-Identifier: MIT
//

//! L3 packet decoding errors (spec §7).

use ndn_utils::error::ErrorKind;
use tracing::warn;

pub type PacketResult<T> = Result<T, PacketError>;

/// Errors specific to Interest/Data/Name/SigInfo decoding, layered on top of
/// [`ndn_tlv::DecodeError`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PacketError {
    Tlv(ndn_tlv::DecodeError),
    /// NameComponent TLV-TYPE outside `[1, 65535]`.
    ComponentType(u64),
    /// Interest Nonce was not exactly 4 octets.
    NonceLen(usize),
    /// InterestLifetime or FreshnessPeriod out of range.
    Lifetime,
    /// HopLimit out of range.
    HopLimit,
    /// ParametersSha256DigestComponent missing, misplaced, or mismatched.
    ParamsDigest,
    /// Unsupported or malformed SigType.
    SigType(u64),
    /// KeyLocator has both Name and Digest set.
    KeyLocator,
    /// SignatureNonce present but empty.
    SigNonce,
    /// SignatureValue violates a registered extension's contract.
    SigValue,
}

impl From<ndn_tlv::DecodeError> for PacketError {
    fn from(e: ndn_tlv::DecodeError) -> Self {
        PacketError::Tlv(e)
    }
}

impl std::fmt::Display for PacketError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PacketError::Tlv(e) => write!(f, "{e}"),
            PacketError::ComponentType(typ) => {
                write!(f, "{}: invalid NameComponent TLV-TYPE: {typ}", ErrorKind::ComponentType)
            }
            PacketError::NonceLen(len) => {
                write!(f, "{}: invalid Interest Nonce length: {len}", ErrorKind::NonceLen)
            }
            PacketError::Lifetime => write!(f, "{}: invalid lifetime value", ErrorKind::Lifetime),
            PacketError::HopLimit => write!(f, "{}: invalid HopLimit value", ErrorKind::HopLimit),
            PacketError::ParamsDigest => {
                write!(
                    f,
                    "{}: ParametersSha256DigestComponent mismatch or misplaced",
                    ErrorKind::ParamsDigest
                )
            }
            PacketError::SigType(typ) => {
                write!(f, "{}: unsupported SigType: {typ}", ErrorKind::SigType)
            }
            PacketError::KeyLocator => {
                write!(f, "{}: KeyLocator has both Name and Digest set", ErrorKind::KeyLocator)
            }
            PacketError::SigNonce => write!(f, "{}: empty SignatureNonce", ErrorKind::SigNonce),
            PacketError::SigValue => write!(f, "{}: invalid SignatureValue", ErrorKind::SigValue),
        }
    }
}

impl std::error::Error for PacketError {}

impl PacketError {
    pub fn log(&self) {
        warn!("{}", self);
    }
}
