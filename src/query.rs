//! Query Facade
//!
//! Entry point for callers: pulls fresh entries from the three stores on
//! every call, merges hub entries through [`PeerMerger`] and returns owned
//! peer lists. Nothing is cached between calls.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::merge::PeerMerger;
use crate::sources::{ConnDb, ConnHub, ConnStaging};
use crate::types::{HubState, Peer, Pool, PoolSelector};

/// Read-only view over ConnDB, ConnHub and ConnStaging
pub struct ConnQuery<D, H, S> {
    db: D,
    hub: H,
    staging: S,
}

impl<D: ConnDb, H: ConnHub, S: ConnStaging> ConnQuery<D, H, S> {
    pub fn new(db: D, hub: H, staging: S) -> Self {
        Self { db, hub, staging }
    }

    // =========================================================================
    // PEER LISTS
    // =========================================================================

    /// Every known peer: connectable ones from db and staging, plus every
    /// peer the hub is connected or connecting to. No address twice.
    pub fn all_peers(&self) -> Vec<Peer> {
        let mut peers = self.connectable_peers(PoolSelector::DbAndStaging);
        peers.extend(self.in_connection_peers());
        peers
    }

    /// Peers we are currently connected to
    pub fn connected_peers(&self) -> Vec<Peer> {
        self.hub_peers(|state| *state == HubState::Connected)
    }

    /// Peers we are currently attempting to connect with
    pub fn connecting_peers(&self) -> Vec<Peer> {
        self.hub_peers(|state| *state == HubState::Connecting)
    }

    /// Peers that are either connected or connecting
    pub fn in_connection_peers(&self) -> Vec<Peer> {
        self.hub_peers(|state| state.is_live())
    }

    /// Dial candidates from the selected static stores
    ///
    /// Each entry is tagged with its own pool. Addresses the hub is
    /// connected or connecting to are never returned. With
    /// [`PoolSelector::DbAndStaging`], an address held by both stores is
    /// returned once, from db.
    pub fn connectable_peers(&self, pool: PoolSelector) -> Vec<Peer> {
        let mut candidates = Vec::new();

        if pool.uses_db() {
            candidates.extend(
                self.db
                    .entries()
                    .into_iter()
                    .map(|(address, data)| Peer::tagged(address, Pool::Db, data)),
            );
        }

        if pool.uses_staging() {
            candidates.extend(
                self.staging
                    .entries()
                    .into_iter()
                    .filter(|(address, _)| !(pool.uses_db() && self.db.has(address)))
                    .map(|(address, data)| Peer::tagged(address, Pool::Staging, data)),
            );
        }

        let total = candidates.len();
        candidates.retain(|peer| !self.is_in_connection(&peer.address));

        debug!(
            "Connectable peers from {}: {} of {} candidates",
            pool,
            candidates.len(),
            total
        );
        candidates
    }

    /// Summary counts over the current store contents
    pub fn stats(&self) -> QueryStats {
        let hub_entries = self.hub.entries();
        let count_state = |wanted: HubState| {
            hub_entries
                .iter()
                .filter(|(_, data)| data.state.as_ref() == Some(&wanted))
                .count()
        };

        QueryStats {
            db_peers: self.db.entries().len(),
            staged_peers: self.staging.entries().len(),
            hub_peers: hub_entries.len(),
            connected: count_state(HubState::Connected),
            connecting: count_state(HubState::Connecting),
            connectable: self.connectable_peers(PoolSelector::DbAndStaging).len(),
        }
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn merger(&self) -> PeerMerger<'_, D, S> {
        PeerMerger::new(&self.db, &self.staging)
    }

    fn hub_peers(&self, wanted: impl Fn(&HubState) -> bool) -> Vec<Peer> {
        let merger = self.merger();
        let peers: Vec<Peer> = self
            .hub
            .entries()
            .into_iter()
            .filter(|(_, data)| data.state.as_ref().map_or(false, &wanted))
            .map(|(address, data)| merger.resolve(&address, &data))
            .collect();

        debug!("Hub query matched {} peers", peers.len());
        peers
    }

    fn is_in_connection(&self, address: &str) -> bool {
        self.hub
            .get_state(address)
            .map_or(false, |state| state.is_live())
    }
}

/// Store sizes and connection counts at query time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryStats {
    /// Entries in ConnDB
    pub db_peers: usize,

    /// Entries in ConnStaging
    pub staged_peers: usize,

    /// Entries tracked by ConnHub, in any state
    pub hub_peers: usize,

    pub connected: usize,

    pub connecting: usize,

    /// Dial candidates across db and staging
    pub connectable: usize,
}
