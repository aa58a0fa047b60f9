//! Globally unique identifiers.

use bytes::Bytes;
use core::fmt;

//------------ Guid ----------------------------------------------------------

/// The identifier a client looks up or inserts bindings for.
///
/// GNRS GUIDs are usually 160 bit values, but the relay treats them as
/// opaque octets and does not enforce a length.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Guid(Bytes);

impl Guid {
    /// Creates a GUID from its octets.
    pub fn from_octets(octets: impl Into<Bytes>) -> Self {
        Guid(octets.into())
    }

    /// Creates a GUID from a static octets slice without copying.
    pub const fn from_static(octets: &'static [u8]) -> Self {
        Guid(Bytes::from_static(octets))
    }

    /// Returns the GUID's octets.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl AsRef<[u8]> for Guid {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for octet in self.as_slice() {
            write!(f, "{:02x}", octet)?;
        }
        Ok(())
    }
}
