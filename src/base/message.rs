//! Decoded GNRS messages.
//!
//! There are three kinds of message the relay works with. A
//! [`ClientRequest`] is the lookup or insert a client sent to this server
//! and that was forwarded to one or more remote servers. A
//! [`RemoteResponse`] is the answer of one of those remote servers. A
//! [`ClientResponse`] is the single merged answer that goes back to the
//! client.

use super::addr::NetworkAddress;
use super::guid::Guid;
use super::time::Timestamp;
use core::fmt;
use std::time::Duration;

/// The protocol version marker placed in every response this server builds.
pub const PROTOCOL_VERSION: u8 = 0;

//------------ MessageType ---------------------------------------------------

/// The message types of the GNRS protocol.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MessageType {
    /// Insert bindings for a GUID.
    Insert,

    /// Look up the bindings of a GUID.
    Lookup,

    /// Replace the bindings of a GUID.
    Update,

    /// Acknowledgment of an insert.
    InsertResponse,

    /// Answer to a lookup.
    LookupResponse,

    /// Acknowledgment of an update.
    UpdateResponse,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MessageType::Insert => "INSERT",
            MessageType::Lookup => "LOOKUP",
            MessageType::Update => "UPDATE",
            MessageType::InsertResponse => "INSERT_RESPONSE",
            MessageType::LookupResponse => "LOOKUP_RESPONSE",
            MessageType::UpdateResponse => "UPDATE_RESPONSE",
        })
    }
}

//------------ ResponseCode --------------------------------------------------

/// The outcome reported by a response.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum ResponseCode {
    /// The request was carried out.
    #[default]
    Success,

    /// The request could not be carried out.
    Failed,
}

//------------ RequestTiming -------------------------------------------------

/// The instants a client request passed through on its way out.
///
/// The transport stamps these as the request moves from the receive queue
/// into local processing and finally out to the remote servers.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RequestTiming {
    /// When the request was received and queued.
    received: Timestamp,

    /// When local processing of the request started.
    processing_started: Timestamp,

    /// When the request was forwarded to the remote servers.
    forwarded: Timestamp,
}

impl RequestTiming {
    /// Creates a new value from the three instants.
    pub fn new(
        received: Timestamp,
        processing_started: Timestamp,
        forwarded: Timestamp,
    ) -> Self {
        Self {
            received,
            processing_started,
            forwarded,
        }
    }

    /// Returns when the request was received.
    pub fn received(&self) -> Timestamp {
        self.received
    }

    /// Returns when local processing started.
    pub fn processing_started(&self) -> Timestamp {
        self.processing_started
    }

    /// Returns when the request was forwarded.
    pub fn forwarded(&self) -> Timestamp {
        self.forwarded
    }

    /// Returns how long the request sat in the receive queue.
    pub fn queue_time(&self) -> Duration {
        self.processing_started
            .saturating_duration_since(self.received)
    }

    /// Returns how long local processing took before forwarding.
    pub fn processing_time(&self) -> Duration {
        self.forwarded
            .saturating_duration_since(self.processing_started)
    }
}

//------------ RequestKind ---------------------------------------------------

/// What a client asked for.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RequestKind {
    /// Look up the bindings of a GUID.
    Lookup(Guid),

    /// Insert bindings for a GUID.
    Insert(Guid),

    /// Any other message type.
    ///
    /// Such a request should never have been forwarded. The relay refuses
    /// to answer it.
    Unsupported(MessageType),
}

impl RequestKind {
    /// Returns the GUID the request is about, if it is supported.
    pub fn guid(&self) -> Option<&Guid> {
        match self {
            RequestKind::Lookup(guid) | RequestKind::Insert(guid) => {
                Some(guid)
            }
            RequestKind::Unsupported(_) => None,
        }
    }

    /// Returns the protocol message type of the request.
    pub fn message_type(&self) -> MessageType {
        match self {
            RequestKind::Lookup(_) => MessageType::Lookup,
            RequestKind::Insert(_) => MessageType::Insert,
            RequestKind::Unsupported(msg_type) => *msg_type,
        }
    }
}

//------------ ClientRequest -------------------------------------------------

/// A request received from a client and forwarded to remote servers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientRequest {
    /// The client's request ID.
    request_id: u32,

    /// Where the client sent the request from.
    origin: NetworkAddress,

    /// The instants of the request's local life.
    timing: RequestTiming,

    /// What the client asked for.
    kind: RequestKind,
}

impl ClientRequest {
    /// Creates a new request.
    pub fn new(
        request_id: u32,
        origin: NetworkAddress,
        timing: RequestTiming,
        kind: RequestKind,
    ) -> Self {
        Self {
            request_id,
            origin,
            timing,
            kind,
        }
    }

    /// Creates a lookup request.
    pub fn lookup(
        request_id: u32,
        origin: NetworkAddress,
        timing: RequestTiming,
        guid: Guid,
    ) -> Self {
        Self::new(request_id, origin, timing, RequestKind::Lookup(guid))
    }

    /// Creates an insert request.
    pub fn insert(
        request_id: u32,
        origin: NetworkAddress,
        timing: RequestTiming,
        guid: Guid,
    ) -> Self {
        Self::new(request_id, origin, timing, RequestKind::Insert(guid))
    }

    /// Returns the request ID.
    pub fn request_id(&self) -> u32 {
        self.request_id
    }

    /// Returns the client's address.
    pub fn origin(&self) -> &NetworkAddress {
        &self.origin
    }

    /// Returns the request's timing.
    pub fn timing(&self) -> &RequestTiming {
        &self.timing
    }

    /// Returns what the client asked for.
    pub fn kind(&self) -> &RequestKind {
        &self.kind
    }
}

//------------ ResponsePayload -----------------------------------------------

/// The type specific part of a remote response.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ResponsePayload {
    /// A lookup answer carrying the remote server's bindings.
    Lookup(Vec<NetworkAddress>),

    /// An insert acknowledgment.
    Insert,

    /// Any other response type.
    Other(MessageType),
}

//------------ RemoteResponse ------------------------------------------------

/// A response received from a remote server.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RemoteResponse {
    /// The request ID, copied from the forwarded request.
    request_id: u32,

    /// The remote server that sent the response.
    origin: NetworkAddress,

    /// When the response was created.
    created: Timestamp,

    /// The remote server's outcome.
    code: ResponseCode,

    /// The type specific content.
    payload: ResponsePayload,
}

impl RemoteResponse {
    /// Creates a new response.
    pub fn new(
        request_id: u32,
        origin: NetworkAddress,
        created: Timestamp,
        code: ResponseCode,
        payload: ResponsePayload,
    ) -> Self {
        Self {
            request_id,
            origin,
            created,
            code,
            payload,
        }
    }

    /// Creates a successful lookup response.
    pub fn lookup(
        request_id: u32,
        origin: NetworkAddress,
        created: Timestamp,
        bindings: Vec<NetworkAddress>,
    ) -> Self {
        Self::new(
            request_id,
            origin,
            created,
            ResponseCode::Success,
            ResponsePayload::Lookup(bindings),
        )
    }

    /// Creates a successful insert acknowledgment.
    pub fn insert(
        request_id: u32,
        origin: NetworkAddress,
        created: Timestamp,
    ) -> Self {
        Self::new(
            request_id,
            origin,
            created,
            ResponseCode::Success,
            ResponsePayload::Insert,
        )
    }

    /// Returns the request ID.
    pub fn request_id(&self) -> u32 {
        self.request_id
    }

    /// Returns the address of the remote server.
    pub fn origin(&self) -> &NetworkAddress {
        &self.origin
    }

    /// Returns when the remote server created the response.
    pub fn created(&self) -> Timestamp {
        self.created
    }

    /// Returns the remote server's outcome.
    pub fn code(&self) -> ResponseCode {
        self.code
    }

    /// Returns the type specific content.
    pub fn payload(&self) -> &ResponsePayload {
        &self.payload
    }

    /// Returns the bindings carried by a lookup response.
    pub fn bindings(&self) -> Option<&[NetworkAddress]> {
        match self.payload {
            ResponsePayload::Lookup(ref bindings) => Some(bindings),
            _ => None,
        }
    }
}

//------------ ClientPayload -------------------------------------------------

/// The type specific part of a client response.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ClientPayload {
    /// A lookup answer with the merged bindings.
    Lookup(Vec<NetworkAddress>),

    /// An insert acknowledgment.
    Insert,
}

//------------ ClientResponse ------------------------------------------------

/// The response sent back to a client.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientResponse {
    /// The client's request ID.
    request_id: u32,

    /// This server's address.
    origin: NetworkAddress,

    /// The outcome.
    code: ResponseCode,

    /// The protocol version marker.
    version: u8,

    /// The type specific content.
    payload: ClientPayload,
}

impl ClientResponse {
    /// Creates a successful lookup answer.
    pub fn lookup(
        request_id: u32,
        origin: NetworkAddress,
        bindings: Vec<NetworkAddress>,
    ) -> Self {
        Self {
            request_id,
            origin,
            code: ResponseCode::Success,
            version: PROTOCOL_VERSION,
            payload: ClientPayload::Lookup(bindings),
        }
    }

    /// Creates a successful insert acknowledgment.
    pub fn insert(request_id: u32, origin: NetworkAddress) -> Self {
        Self {
            request_id,
            origin,
            code: ResponseCode::Success,
            version: PROTOCOL_VERSION,
            payload: ClientPayload::Insert,
        }
    }

    /// Returns the request ID.
    pub fn request_id(&self) -> u32 {
        self.request_id
    }

    /// Returns the address of the server that built the response.
    pub fn origin(&self) -> &NetworkAddress {
        &self.origin
    }

    /// Returns the outcome.
    pub fn code(&self) -> ResponseCode {
        self.code
    }

    /// Returns the protocol version marker.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Returns the type specific content.
    pub fn payload(&self) -> &ClientPayload {
        &self.payload
    }

    /// Returns the bindings of a lookup answer.
    pub fn bindings(&self) -> Option<&[NetworkAddress]> {
        match self.payload {
            ClientPayload::Lookup(ref bindings) => Some(bindings),
            ClientPayload::Insert => None,
        }
    }
}

//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn timing_intervals() {
        let timing = RequestTiming::new(
            Timestamp::from_millis(100),
            Timestamp::from_millis(130),
            Timestamp::from_millis(145),
        );
        assert_eq!(timing.queue_time(), Duration::from_millis(30));
        assert_eq!(timing.processing_time(), Duration::from_millis(15));

        // Out of order stamps must not underflow.
        let skewed = RequestTiming::new(
            Timestamp::from_millis(50),
            Timestamp::from_millis(40),
            Timestamp::from_millis(30),
        );
        assert_eq!(skewed.queue_time(), Duration::ZERO);
        assert_eq!(skewed.processing_time(), Duration::ZERO);
    }

    #[test]
    fn request_kind() {
        let guid = Guid::from_static(b"G1");
        assert_eq!(RequestKind::Lookup(guid.clone()).guid(), Some(&guid));
        assert_eq!(
            RequestKind::Insert(guid).message_type(),
            MessageType::Insert
        );
        let other = RequestKind::Unsupported(MessageType::Update);
        assert_eq!(other.guid(), None);
        assert_eq!(other.message_type().to_string(), "UPDATE");
    }
}
