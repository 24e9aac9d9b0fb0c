//! Peer Merge Engine
//!
//! An address may be known to several stores at once, e.g. a peer staged
//! for auto-connect that was also added manually to the database. Merging
//! picks exactly one store's attributes per address, in strict order:
//!
//! ```text
//!   db  ──miss──▶  staging  ──miss──▶  hub (always present)
//! ```
//!
//! Fields from different stores are never mixed, with one exception: the
//! hub sees the live handshake identity, so its `key` is copied into the
//! result when the winning store has none.

use tracing::trace;

use crate::sources::{ConnDb, ConnStaging};
use crate::types::{Peer, PeerData, Pool};

/// One lookup in the precedence chain; `None` falls through to the next
pub type ResolveStep<'a, D, S> = fn(&PeerMerger<'a, D, S>, &str) -> Option<PeerData>;

/// Resolves hub entries against the static stores
pub struct PeerMerger<'a, D, S> {
    db: &'a D,
    staging: &'a S,
}

impl<'a, D: ConnDb, S: ConnStaging> PeerMerger<'a, D, S> {
    pub fn new(db: &'a D, staging: &'a S) -> Self {
        Self { db, staging }
    }

    /// Lookups tried in order; the hub record is used when all of them miss
    pub fn resolve_steps() -> [(Pool, ResolveStep<'a, D, S>); 2] {
        [(Pool::Db, Self::try_db), (Pool::Staging, Self::try_staging)]
    }

    /// Canonical record for an address present in the hub
    pub fn resolve(&self, address: &str, hub_data: &PeerData) -> Peer {
        let (pool, data) = Self::resolve_steps()
            .iter()
            .find_map(|(pool, step)| step(self, address).map(|data| (*pool, data)))
            .unwrap_or_else(|| (Pool::Hub, hub_data.clone()));

        trace!("Resolved {} from {}", address, pool);

        let mut peer = Peer::tagged(address, pool, data);
        backfill_key(&mut peer.data, hub_data);
        peer
    }

    fn try_db(&self, address: &str) -> Option<PeerData> {
        if self.db.has(address) {
            self.db.get(address)
        } else {
            None
        }
    }

    fn try_staging(&self, address: &str) -> Option<PeerData> {
        self.staging.get(address)
    }
}

/// Copy the hub's identity key into a record that lacks one.
/// An empty key counts as missing on either side.
fn backfill_key(data: &mut PeerData, hub_data: &PeerData) {
    if present_key(data).is_some() {
        return;
    }
    if let Some(key) = present_key(hub_data) {
        data.key = Some(key.to_string());
    }
}

fn present_key(data: &PeerData) -> Option<&str> {
    data.key.as_deref().filter(|key| !key.is_empty())
}
