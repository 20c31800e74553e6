//
// Copyright (c) The NDNgo-rs Contributors
//
// SPDX-License-Identifier: MIT
//

//
// Shared error vocabulary (spec §7). Each crate defines its own error enum
// for the operations it owns, but every variant maps back to one of these
// kinds so callers get a stable, crate-independent classification.
//

/// Classification of a decode/encode/forwarding failure.
///
/// Individual crates (`ndn-tlv`, `ndn-packet`, `ndn-lp`, `ndn-fw`) define
/// their own `Debug + Display + std::error::Error` enums with the context
/// specific to that layer (which field, which byte offset), but each
/// variant's `Display` impl leads with the `ErrorKind` it maps to (spec §7's
/// `Err*` names) so messages stay consistent across crates even though the
/// enums themselves don't.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Fragment,
    Reliability,
    SequenceSize,
    NotLpFrame,
    UnexpectedElem,
    L3Type,
    ComponentType,
    NonceLen,
    Lifetime,
    HopLimit,
    ParamsDigest,
    SigType,
    KeyLocator,
    SigNonce,
    SigValue,
    Critical,
    MaxFwFaces,
    ReadOutOfBounds,
    InvalidLength,
    TrailingBytes,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Fragment => "ErrFragment",
            ErrorKind::Reliability => "ErrReliability",
            ErrorKind::SequenceSize => "ErrSequenceSize",
            ErrorKind::NotLpFrame => "ErrNotLpFrame",
            ErrorKind::UnexpectedElem => "ErrUnexpectedElem",
            ErrorKind::L3Type => "ErrL3Type",
            ErrorKind::ComponentType => "ErrComponentType",
            ErrorKind::NonceLen => "ErrNonceLen",
            ErrorKind::Lifetime => "ErrLifetime",
            ErrorKind::HopLimit => "ErrHopLimit",
            ErrorKind::ParamsDigest => "ErrParamsDigest",
            ErrorKind::SigType => "ErrSigType",
            ErrorKind::KeyLocator => "ErrKeyLocator",
            ErrorKind::SigNonce => "ErrSigNonce",
            ErrorKind::SigValue => "ErrSigValue",
            ErrorKind::Critical => "ErrCritical",
            ErrorKind::MaxFwFaces => "ErrMaxFwFaces",
            ErrorKind::ReadOutOfBounds => "ErrReadOutOfBounds",
            ErrorKind::InvalidLength => "ErrInvalidLength",
            ErrorKind::TrailingBytes => "ErrTrailingBytes",
        };
        write!(f, "{name}")
    }
}
