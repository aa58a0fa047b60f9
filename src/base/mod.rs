//! Basic GNRS data types.
//!
//! This module contains the already-decoded form of the messages the relay
//! deals with. Turning these into octets and back is the job of the wire
//! codec which lives elsewhere.
//!
//! * [`NetworkAddress`] identifies servers, clients, and the locators bound
//!   to a GUID,
//! * [`Guid`] is the identifier being looked up or inserted,
//! * [`ClientRequest`] is what a client sent to this server,
//! * [`RemoteResponse`] is what a remote server sent back, and
//! * [`ClientResponse`] is what this server eventually sends the client.
//!
//! All instants are [`Timestamp`]s taken from one monotonic
//! [`Clock`][crate::relay::clock::Clock].

pub use self::addr::{AddressType, NetworkAddress};
pub use self::guid::Guid;
pub use self::message::{
    ClientPayload, ClientRequest, ClientResponse, MessageType, RemoteResponse,
    RequestKind, RequestTiming, ResponseCode, ResponsePayload,
    PROTOCOL_VERSION,
};
pub use self::time::Timestamp;

pub mod addr;
pub mod guid;
pub mod message;
pub mod time;
