//
// Copyright (c) The NDNgo-rs Contributors
//
// SPDX-License-Identifier: MIT
//

//! Forwarder errors (spec §7).

use ndn_utils::error::ErrorKind;
use tracing::warn;

pub type FwResult<T> = Result<T, FwError>;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FwError {
    Lp(ndn_lp::LpError),
    /// `AddFace` called with the face table already at capacity.
    MaxFwFaces,
    /// A command was submitted to a Forwarder whose loop has already exited.
    Closed,
}

impl From<ndn_lp::LpError> for FwError {
    fn from(e: ndn_lp::LpError) -> Self {
        FwError::Lp(e)
    }
}

impl std::fmt::Display for FwError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FwError::Lp(e) => write!(f, "{e}"),
            FwError::MaxFwFaces => {
                write!(f, "{}: forwarder face table is full", ErrorKind::MaxFwFaces)
            }
            FwError::Closed => write!(f, "forwarder loop has exited"),
        }
    }
}

impl std::error::Error for FwError {}

impl FwError {
    pub fn log(&self) {
        warn!("{}", self);
    }
}
