//
// Copyright (c) The NDNgo-rs Contributors
//
// SPDX-License-Identifier: MIT
//

//
// TLV-layer decoding/encoding errors.
//

use ndn_utils::error::ErrorKind;
use tracing::warn;

pub type DecodeResult<T> = Result<T, DecodeError>;
pub type EncodeResult<T> = Result<T, EncodeError>;

/// Errors raised while parsing VAR-numbers, NonNegativeIntegers, or
/// top-level elements.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DecodeError {
    /// Ran out of input while reading a VAR-number, NNI, or element VALUE.
    ReadOutOfBounds,
    /// A NonNegativeInteger field was not 1, 2, 4, or 8 octets.
    InvalidNniLength(usize),
    /// An unknown critical TLV-TYPE was encountered (spec §4.1).
    Critical(u64),
    /// The wire had trailing bytes after the expected element(s).
    TrailingBytes,
}

/// Errors raised while assembling a TLV element (currently none of the
/// primitives can fail to encode; kept as a distinct type so higher layers
/// building on `Marshaler` have somewhere to report structural violations,
/// e.g. `ndn_packet`'s `ErrKeyLocator`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EncodeError {
    Other(&'static str),
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::ReadOutOfBounds => {
                write!(f, "{}: attempt to read out of bounds", ErrorKind::ReadOutOfBounds)
            }
            DecodeError::InvalidNniLength(len) => {
                write!(f, "{}: invalid NonNegativeInteger length: {len}", ErrorKind::InvalidLength)
            }
            DecodeError::Critical(typ) => {
                write!(f, "{}: unknown critical TLV-TYPE: {typ}", ErrorKind::Critical)
            }
            DecodeError::TrailingBytes => {
                write!(f, "{}: trailing bytes after TLV element", ErrorKind::TrailingBytes)
            }
        }
    }
}

impl std::error::Error for DecodeError {}

impl DecodeError {
    pub fn log(&self) {
        warn!("{}", self);
    }
}

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodeError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for EncodeError {}
