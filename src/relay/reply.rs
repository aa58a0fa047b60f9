//! Sending the final response to the client.

use crate::base::{ClientResponse, NetworkAddress};
use std::sync::Arc;

//------------ ClientReplier -------------------------------------------------

/// The transport's outbound half, as far as the relay is concerned.
///
/// Sending is fire-and-forget: the relay does not wait for the message to
/// leave and does not learn about transmission failures. Implementations
/// should not block for long since they run on a worker thread.
pub trait ClientReplier: Send + Sync {
    /// Sends `response` to `destination`.
    fn send_message(
        &self,
        response: ClientResponse,
        destination: &NetworkAddress,
    );
}

impl<T: ClientReplier + ?Sized> ClientReplier for Arc<T> {
    fn send_message(
        &self,
        response: ClientResponse,
        destination: &NetworkAddress,
    ) {
        (**self).send_message(response, destination)
    }
}
