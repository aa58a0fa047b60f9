//! Helpers shared by the integration tests.
#![allow(dead_code)]

use gnrs_relay::base::{
    AddressType, ClientRequest, ClientResponse, Guid, NetworkAddress,
    RequestTiming, Timestamp,
};
use gnrs_relay::relay::cache::{BindingStore, CacheOrigin, GuidBinding};
use gnrs_relay::relay::clock::FakeClock;
use gnrs_relay::relay::config::Config;
use gnrs_relay::relay::reply::ClientReplier;
use gnrs_relay::relay::stats::Telemetry;
use gnrs_relay::relay::{PendingRequestTable, ResponseCorrelator};
use parking_lot::Mutex;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::sync::Arc;

//------------ RecordingStore ------------------------------------------------

/// A binding store that remembers every write.
#[derive(Debug, Default)]
pub struct RecordingStore {
    writes: Mutex<Vec<(Guid, CacheOrigin, Vec<GuidBinding>)>>,
}

impl RecordingStore {
    pub fn writes(&self) -> Vec<(Guid, CacheOrigin, Vec<GuidBinding>)> {
        self.writes.lock().clone()
    }
}

impl BindingStore for RecordingStore {
    fn add_bindings(
        &self,
        guid: &Guid,
        origin: CacheOrigin,
        bindings: Vec<GuidBinding>,
    ) {
        self.writes.lock().push((guid.clone(), origin, bindings));
    }
}

//------------ RecordingReplier ----------------------------------------------

/// A replier that remembers every response instead of sending it.
#[derive(Debug, Default)]
pub struct RecordingReplier {
    sent: Mutex<Vec<(ClientResponse, NetworkAddress)>>,
}

impl RecordingReplier {
    pub fn sent(&self) -> Vec<(ClientResponse, NetworkAddress)> {
        self.sent.lock().clone()
    }

    pub fn count_for(&self, request_id: u32) -> usize {
        self.sent
            .lock()
            .iter()
            .filter(|(response, _)| response.request_id() == request_id)
            .count()
    }
}

impl ClientReplier for RecordingReplier {
    fn send_message(
        &self,
        response: ClientResponse,
        destination: &NetworkAddress,
    ) {
        self.sent.lock().push((response, destination.clone()));
    }
}

//------------ Addresses -----------------------------------------------------

/// Returns a UDP address in 192.0.2.0/24.
pub fn udp(host: u8, port: u16) -> NetworkAddress {
    SocketAddrV4::new(Ipv4Addr::new(192, 0, 2, host), port).into()
}

/// Returns the address of remote server `n`.
pub fn server(n: u8) -> NetworkAddress {
    udp(n, 5001)
}

/// Returns a locator address as carried in lookup responses.
pub fn locator(n: u8) -> NetworkAddress {
    NetworkAddress::new(AddressType::Guid, vec![0x10, n])
}

pub fn client_addr() -> NetworkAddress {
    udp(200, 40000)
}

pub fn own_addr() -> NetworkAddress {
    udp(1, 5001)
}

pub fn ms(millis: u64) -> Timestamp {
    Timestamp::from_millis(millis)
}

//------------ Requests ------------------------------------------------------

/// Timing of a request received at 0, processed at 1 and forwarded at 3 ms.
pub fn timing() -> RequestTiming {
    RequestTiming::new(ms(0), ms(1), ms(3))
}

pub fn lookup(id: u32, guid: &'static [u8]) -> ClientRequest {
    let guid = Guid::from_static(guid);
    ClientRequest::lookup(id, client_addr(), timing(), guid)
}

pub fn insert(id: u32, guid: &'static [u8]) -> ClientRequest {
    let guid = Guid::from_static(guid);
    ClientRequest::insert(id, client_addr(), timing(), guid)
}

//------------ Relay ---------------------------------------------------------

pub type TestCorrelator = ResponseCorrelator<
    Arc<RecordingStore>,
    Arc<RecordingReplier>,
    FakeClock,
>;

/// A correlator together with handles to all its collaborators.
pub struct Relay {
    pub correlator: TestCorrelator,
    pub table: Arc<PendingRequestTable>,
    pub telemetry: Arc<Telemetry>,
    pub store: Arc<RecordingStore>,
    pub replier: Arc<RecordingReplier>,
    pub clock: FakeClock,
}

impl Relay {
    /// Creates a relay with the clock standing at 10 ms.
    pub fn new(config: &Config) -> Self {
        #[cfg(feature = "logging")]
        gnrs_relay::logging::init_logging();

        let table = Arc::new(PendingRequestTable::new());
        let telemetry = Arc::new(Telemetry::new(config.collect_statistics()));
        let store = Arc::new(RecordingStore::default());
        let replier = Arc::new(RecordingReplier::default());
        let clock = FakeClock::at(ms(10));
        let correlator = ResponseCorrelator::with_clock(
            own_addr(),
            config,
            table.clone(),
            telemetry.clone(),
            store.clone(),
            replier.clone(),
            clock.clone(),
        );
        Self {
            correlator,
            table,
            telemetry,
            store,
            replier,
            clock,
        }
    }

    pub fn with_statistics() -> Self {
        let mut config = Config::new();
        config.set_collect_statistics(true);
        Self::new(&config)
    }
}

impl Default for Relay {
    fn default() -> Self {
        Self::new(&Config::new())
    }
}
