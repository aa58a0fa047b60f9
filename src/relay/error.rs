//! Error type for the relay.
//!
//! Handling a remote response never fails: stale, duplicate, and
//! unexpected responses are dropped and reported through a
//! [`Disposition`][super::Disposition] instead. Errors only arise when a
//! request is registered.

#![warn(missing_docs)]

use super::table::CorrelationId;
use std::error;
use std::fmt::{Display, Formatter};

/// Error type for registering relayed requests.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// A request with this correlation ID is already waiting for replies.
    DuplicateCorrelationId(CorrelationId),

    /// The request was to be forwarded to no remote server at all.
    NoRemoteServers(CorrelationId),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Error::DuplicateCorrelationId(id) => {
                write!(f, "request {id} is already pending")
            }
            Error::NoRemoteServers(id) => {
                write!(f, "request {id} has no remote servers to wait for")
            }
        }
    }
}

impl error::Error for Error {}
