//! Peer Stores
//!
//! Read-only views over the three stores this crate queries. The stores
//! themselves live elsewhere; queries only ever enumerate and look up.

use crate::types::{Address, HubState, PeerData};

/// Persistent peer database (ConnDB)
pub trait ConnDb {
    fn entries(&self) -> Vec<(Address, PeerData)>;

    fn has(&self, address: &str) -> bool;

    fn get(&self, address: &str) -> Option<PeerData>;
}

/// Live connection registry (ConnHub)
pub trait ConnHub {
    /// Every tracked connection with its hub attributes (`state`, `key`, ...)
    fn entries(&self) -> Vec<(Address, PeerData)>;

    fn get_state(&self, address: &str) -> Option<HubState>;
}

/// Peers staged as connection candidates (ConnStaging)
pub trait ConnStaging {
    fn entries(&self) -> Vec<(Address, PeerData)>;

    /// Staging only exposes enumeration, so lookups scan the entries
    fn get(&self, address: &str) -> Option<PeerData> {
        self.entries()
            .into_iter()
            .find(|(addr, _)| addr == address)
            .map(|(_, data)| data)
    }
}

impl<T: ConnDb + ?Sized> ConnDb for &T {
    fn entries(&self) -> Vec<(Address, PeerData)> {
        (**self).entries()
    }

    fn has(&self, address: &str) -> bool {
        (**self).has(address)
    }

    fn get(&self, address: &str) -> Option<PeerData> {
        (**self).get(address)
    }
}

impl<T: ConnHub + ?Sized> ConnHub for &T {
    fn entries(&self) -> Vec<(Address, PeerData)> {
        (**self).entries()
    }

    fn get_state(&self, address: &str) -> Option<HubState> {
        (**self).get_state(address)
    }
}

impl<T: ConnStaging + ?Sized> ConnStaging for &T {
    fn entries(&self) -> Vec<(Address, PeerData)> {
        (**self).entries()
    }

    fn get(&self, address: &str) -> Option<PeerData> {
        (**self).get(address)
    }
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// Insertion-ordered in-memory store
///
/// Serves as any of the three stores; used by the CLI (loaded from a
/// snapshot file) and by tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Vec<(Address, PeerData)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store; a repeated address replaces the earlier entry
    pub fn from_entries(entries: impl IntoIterator<Item = (Address, PeerData)>) -> Self {
        let mut store = Self::new();
        for (address, data) in entries {
            store.insert(address, data);
        }
        store
    }

    /// Insert or replace the attributes of an address
    pub fn insert(&mut self, address: impl Into<Address>, data: PeerData) {
        let address = address.into();
        match self.entries.iter_mut().find(|(addr, _)| *addr == address) {
            Some((_, existing)) => *existing = data,
            None => self.entries.push((address, data)),
        }
    }

    pub fn entry(&self, address: &str) -> Option<&PeerData> {
        self.entries
            .iter()
            .find(|(addr, _)| addr == address)
            .map(|(_, data)| data)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ConnDb for MemoryStore {
    fn entries(&self) -> Vec<(Address, PeerData)> {
        self.entries.clone()
    }

    fn has(&self, address: &str) -> bool {
        self.entry(address).is_some()
    }

    fn get(&self, address: &str) -> Option<PeerData> {
        self.entry(address).cloned()
    }
}

impl ConnHub for MemoryStore {
    fn entries(&self) -> Vec<(Address, PeerData)> {
        self.entries.clone()
    }

    fn get_state(&self, address: &str) -> Option<HubState> {
        self.entry(address).and_then(|data| data.state.clone())
    }
}

impl ConnStaging for MemoryStore {
    fn entries(&self) -> Vec<(Address, PeerData)> {
        self.entries.clone()
    }

    fn get(&self, address: &str) -> Option<PeerData> {
        self.entry(address).cloned()
    }
}
