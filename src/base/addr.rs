//! Network addresses.
//!
//! GNRS does not tie itself to a single network layer. An address is a
//! type tag plus the raw octets of the address in that network. The relay
//! never looks inside the octets; it only compares, hashes, and copies
//! addresses. The one exception are IPv4/UDP addresses which can be
//! converted to and from [`SocketAddrV4`] for convenience.

use bytes::Bytes;
use core::fmt;
use std::net::{Ipv4Addr, SocketAddrV4};

//------------ AddressType ---------------------------------------------------

/// The kind of network an address belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum AddressType {
    /// An IPv4 address plus UDP port, four octets followed by two.
    Ipv4Udp,

    /// A GUID used as a network address.
    Guid,
}

impl AddressType {
    /// Returns the mnemonic used when displaying addresses of this type.
    pub fn mnemonic(self) -> &'static str {
        match self {
            AddressType::Ipv4Udp => "udp4",
            AddressType::Guid => "guid",
        }
    }
}

//------------ NetworkAddress ------------------------------------------------

/// An address of a server, a client, or a binding.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NetworkAddress {
    /// The kind of network this address belongs to.
    addr_type: AddressType,

    /// The address octets.
    value: Bytes,
}

impl NetworkAddress {
    /// Creates an address from its type and octets.
    pub fn new(addr_type: AddressType, value: impl Into<Bytes>) -> Self {
        Self {
            addr_type,
            value: value.into(),
        }
    }

    /// Creates an IPv4/UDP address.
    pub fn from_socket_addr(addr: SocketAddrV4) -> Self {
        let mut value = Vec::with_capacity(6);
        value.extend_from_slice(&addr.ip().octets());
        value.extend_from_slice(&addr.port().to_be_bytes());
        Self::new(AddressType::Ipv4Udp, value)
    }

    /// Returns the address type.
    pub fn addr_type(&self) -> AddressType {
        self.addr_type
    }

    /// Returns the raw address octets.
    pub fn as_slice(&self) -> &[u8] {
        self.value.as_ref()
    }

    /// Converts an IPv4/UDP address back into a socket address.
    ///
    /// Returns `None` for other address types or malformed octets.
    pub fn to_socket_addr(&self) -> Option<SocketAddrV4> {
        if self.addr_type != AddressType::Ipv4Udp {
            return None;
        }
        match *self.as_slice() {
            [a, b, c, d, hi, lo] => Some(SocketAddrV4::new(
                Ipv4Addr::new(a, b, c, d),
                u16::from_be_bytes([hi, lo]),
            )),
            _ => None,
        }
    }
}

impl From<SocketAddrV4> for NetworkAddress {
    fn from(addr: SocketAddrV4) -> Self {
        Self::from_socket_addr(addr)
    }
}

impl fmt::Display for NetworkAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(addr) = self.to_socket_addr() {
            return write!(f, "{}:{}", self.addr_type.mnemonic(), addr);
        }
        write!(f, "{}:", self.addr_type.mnemonic())?;
        for octet in self.as_slice() {
            write!(f, "{:02x}", octet)?;
        }
        Ok(())
    }
}

//============ Tests =========================================================
