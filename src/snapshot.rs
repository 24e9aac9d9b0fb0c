//! Store Snapshots
//!
//! A JSON dump of the three stores, used to run queries offline:
//!
//! ```json
//! {
//!   "db":      [["net:hub.com:1234~noauth", {"source": "friends", "stateChange": 1546324215000}]],
//!   "hub":     [["net:hub.com:1234~noauth", {"state": "connected"}]],
//!   "staging": [["net:192.168.1.13:6789~noauth", {"mode": "lan"}]]
//! }
//! ```
//!
//! Missing sections are empty stores.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::query::ConnQuery;
use crate::sources::MemoryStore;
use crate::types::{Address, PeerData};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceSnapshot {
    #[serde(default)]
    pub db: Vec<(Address, PeerData)>,

    #[serde(default)]
    pub hub: Vec<(Address, PeerData)>,

    #[serde(default)]
    pub staging: Vec<(Address, PeerData)>,
}

impl SourceSnapshot {
    /// Load a snapshot from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let snapshot = Self::from_json(&content)?;
        info!(
            "Loaded snapshot {:?}: {} db, {} hub, {} staged",
            path,
            snapshot.db.len(),
            snapshot.hub.len(),
            snapshot.staging.len()
        );
        Ok(snapshot)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Build a facade over in-memory copies of the three stores
    pub fn into_query(self) -> ConnQuery<MemoryStore, MemoryStore, MemoryStore> {
        ConnQuery::new(
            MemoryStore::from_entries(self.db),
            MemoryStore::from_entries(self.hub),
            MemoryStore::from_entries(self.staging),
        )
    }
}
