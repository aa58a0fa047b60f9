//! Filling the binding cache from lookup results.
//!
//! When a relayed lookup completes, the merged bindings are worth keeping:
//! the next lookup for the same GUID can then be answered locally. The
//! remote servers' responses carry no lifetimes for their bindings, so
//! every cached binding gets the configured default TTL and expiration,
//! counted from the moment the lookup completed.
//!
//! How the store keeps, evicts, or persists the bindings is up to the
//! [`BindingStore`] implementation.

use super::config::Config;
use crate::base::{Guid, NetworkAddress, Timestamp};
use std::sync::Arc;
use std::time::Duration;
use std::vec::Vec;
use tracing::trace;

//------------ CacheOrigin ---------------------------------------------------

/// Where a set of cached bindings came from.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CacheOrigin {
    /// The bindings were merged from remote lookup responses.
    LookupResponse,

    /// The bindings were taken from a client's insert.
    Insert,
}

//------------ GuidBinding ---------------------------------------------------

/// A single cached binding for a GUID.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct GuidBinding {
    /// The bound address.
    address: NetworkAddress,

    /// Until when the binding may be served without re-querying.
    ttl: Timestamp,

    /// When the binding must be dropped.
    expiration: Timestamp,
}

impl GuidBinding {
    /// Creates a new binding.
    pub fn new(
        address: NetworkAddress,
        ttl: Timestamp,
        expiration: Timestamp,
    ) -> Self {
        Self {
            address,
            ttl,
            expiration,
        }
    }

    /// Returns the bound address.
    pub fn address(&self) -> &NetworkAddress {
        &self.address
    }

    /// Returns until when the binding is fresh.
    pub fn ttl(&self) -> Timestamp {
        self.ttl
    }

    /// Returns when the binding expires.
    pub fn expiration(&self) -> Timestamp {
        self.expiration
    }
}

//------------ BindingStore --------------------------------------------------

/// The GUID to binding store the relay writes lookup results into.
pub trait BindingStore: Send + Sync {
    /// Adds `bindings` for `guid`, tagged with where they came from.
    ///
    /// Failures are the store's own business; the relay does not retry.
    fn add_bindings(
        &self,
        guid: &Guid,
        origin: CacheOrigin,
        bindings: Vec<GuidBinding>,
    );
}

impl<T: BindingStore + ?Sized> BindingStore for Arc<T> {
    fn add_bindings(
        &self,
        guid: &Guid,
        origin: CacheOrigin,
        bindings: Vec<GuidBinding>,
    ) {
        (**self).add_bindings(guid, origin, bindings)
    }
}

//------------ CacheWriter ---------------------------------------------------

/// Turns merged lookup results into cache entries.
#[derive(Clone, Debug)]
pub struct CacheWriter<Store> {
    /// The store to write into.
    store: Store,

    /// Added to the completion time to get each binding's TTL.
    default_ttl: Duration,

    /// Added to the completion time to get each binding's expiration.
    default_expiration: Duration,
}

impl<Store> CacheWriter<Store> {
    /// Creates a writer using the default lifetimes from `config`.
    pub fn new(store: Store, config: &Config) -> Self {
        Self {
            store,
            default_ttl: config.default_ttl(),
            default_expiration: config.default_expiration(),
        }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Creates bindings for `addresses` as of `now`.
    ///
    /// All bindings share the same TTL and expiration.
    pub fn bindings(
        &self,
        now: Timestamp,
        addresses: &[NetworkAddress],
    ) -> Vec<GuidBinding> {
        let ttl = now + self.default_ttl;
        let expiration = now + self.default_expiration;
        addresses
            .iter()
            .map(|address| GuidBinding::new(address.clone(), ttl, expiration))
            .collect()
    }
}

impl<Store: BindingStore> CacheWriter<Store> {
    /// Hands the bindings of a completed lookup for `guid` to the store.
    pub fn write(
        &self,
        guid: &Guid,
        addresses: &[NetworkAddress],
        now: Timestamp,
    ) {
        let bindings = self.bindings(now, addresses);
        trace!(%guid, count = bindings.len(), "Caching lookup result");
        self.store
            .add_bindings(guid, CacheOrigin::LookupResponse, bindings);
    }
}

//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::AddressType;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(Guid, CacheOrigin, Vec<GuidBinding>)>>);

    impl BindingStore for Recorder {
        fn add_bindings(
            &self,
            guid: &Guid,
            origin: CacheOrigin,
            bindings: Vec<GuidBinding>,
        ) {
            self.0.lock().push((guid.clone(), origin, bindings));
        }
    }

    fn addr(octet: u8) -> NetworkAddress {
        NetworkAddress::new(AddressType::Guid, vec![octet])
    }

    #[test]
    fn bindings_share_one_snapshot() {
        let mut config = Config::new();
        config.set_default_ttl(Duration::from_secs(5));
        config.set_default_expiration(Duration::from_secs(60));
        let writer = CacheWriter::new(Arc::new(Recorder::default()), &config);

        let now = Timestamp::from_millis(1_000);
        writer.write(&Guid::from_static(b"G1"), &[addr(1), addr(2)], now);

        let written = writer.store().0.lock();
        assert_eq!(written.len(), 1);
        let (guid, origin, bindings) = &written[0];
        assert_eq!(guid, &Guid::from_static(b"G1"));
        assert_eq!(*origin, CacheOrigin::LookupResponse);
        assert_eq!(bindings.len(), 2);
        for binding in bindings {
            assert_eq!(binding.ttl(), Timestamp::from_millis(6_000));
            assert_eq!(binding.expiration(), Timestamp::from_millis(61_000));
            assert!(binding.ttl() > now);
            assert!(binding.expiration() > now);
        }
        assert_eq!(bindings[0].address(), &addr(1));
        assert_eq!(bindings[1].address(), &addr(2));
    }

    #[test]
    fn empty_results_are_still_written() {
        let writer =
            CacheWriter::new(Arc::new(Recorder::default()), &Config::new());
        writer.write(&Guid::from_static(b"G2"), &[], Timestamp::EPOCH);
        let written = writer.store().0.lock();
        assert_eq!(written.len(), 1);
        assert!(written[0].2.is_empty());
    }
}
