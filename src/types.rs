//! Core types for peer connection queries
//!
//! These types describe what the three peer stores (ConnDB, ConnHub and
//! ConnStaging) hold about a peer, and the merged record handed back to
//! callers deciding which peers to dial next.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::QueryError;

// =============================================================================
// PRIMITIVE TYPES
// =============================================================================

/// Multiserver address of a peer (e.g. `net:host:8008~shs:<key>`)
///
/// Opaque to this crate; used as the join key across all stores.
pub type Address = String;

/// Timestamp in milliseconds since the Unix epoch
pub type TimestampMs = u64;

// =============================================================================
// POOLS
// =============================================================================

/// Store a merged peer record was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pool {
    /// Persistent peer database (ConnDB)
    Db,

    /// Live connection registry (ConnHub)
    Hub,

    /// Candidates staged for connection (ConnStaging)
    Staging,
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pool::Db => write!(f, "db"),
            Pool::Hub => write!(f, "hub"),
            Pool::Staging => write!(f, "staging"),
        }
    }
}

/// Which static stores `connectable_peers` draws candidates from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PoolSelector {
    #[default]
    Db,
    Staging,
    #[serde(alias = "db_and_staging")]
    DbAndStaging,
}

impl PoolSelector {
    pub fn uses_db(&self) -> bool {
        matches!(self, PoolSelector::Db | PoolSelector::DbAndStaging)
    }

    pub fn uses_staging(&self) -> bool {
        matches!(self, PoolSelector::Staging | PoolSelector::DbAndStaging)
    }
}

impl FromStr for PoolSelector {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "db" => Ok(PoolSelector::Db),
            "staging" => Ok(PoolSelector::Staging),
            "dbAndStaging" | "db_and_staging" => Ok(PoolSelector::DbAndStaging),
            other => Err(QueryError::InvalidArgument(format!(
                "unknown pool selector '{}', expected db, staging or dbAndStaging",
                other
            ))),
        }
    }
}

impl fmt::Display for PoolSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolSelector::Db => write!(f, "db"),
            PoolSelector::Staging => write!(f, "staging"),
            PoolSelector::DbAndStaging => write!(f, "dbAndStaging"),
        }
    }
}

// =============================================================================
// PEER ATTRIBUTES
// =============================================================================

/// How a peer became known to us
///
/// Serialized as its lowercase tag. Tags this crate does not know are kept
/// verbatim so they survive a query unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PeerSource {
    Seed,
    Pub,
    Manual,
    Friends,
    Local,
    Dht,
    Bt,
    Stored,
    Unknown(String),
}

impl From<String> for PeerSource {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "seed" => PeerSource::Seed,
            "pub" => PeerSource::Pub,
            "manual" => PeerSource::Manual,
            "friends" => PeerSource::Friends,
            "local" => PeerSource::Local,
            "dht" => PeerSource::Dht,
            "bt" => PeerSource::Bt,
            "stored" => PeerSource::Stored,
            _ => PeerSource::Unknown(tag),
        }
    }
}

impl From<PeerSource> for String {
    fn from(source: PeerSource) -> Self {
        match source {
            PeerSource::Seed => "seed".to_string(),
            PeerSource::Pub => "pub".to_string(),
            PeerSource::Manual => "manual".to_string(),
            PeerSource::Friends => "friends".to_string(),
            PeerSource::Local => "local".to_string(),
            PeerSource::Dht => "dht".to_string(),
            PeerSource::Bt => "bt".to_string(),
            PeerSource::Stored => "stored".to_string(),
            PeerSource::Unknown(tag) => tag,
        }
    }
}

/// Connection lifecycle tag kept by the hub
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HubState {
    Connecting,
    Connected,
    Disconnecting,
    /// Any other tag, kept verbatim; never considered live
    Other(String),
}

impl HubState {
    /// Connected or in the middle of connecting
    pub fn is_live(&self) -> bool {
        matches!(self, HubState::Connected | HubState::Connecting)
    }
}

impl From<String> for HubState {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "connecting" => HubState::Connecting,
            "connected" => HubState::Connected,
            "disconnecting" => HubState::Disconnecting,
            _ => HubState::Other(tag),
        }
    }
}

impl From<HubState> for String {
    fn from(state: HubState) -> Self {
        match state {
            HubState::Connecting => "connecting".to_string(),
            HubState::Connected => "connected".to_string(),
            HubState::Disconnecting => "disconnecting".to_string(),
            HubState::Other(tag) => tag,
        }
    }
}

/// Historical connection duration statistics (seconds)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DurationStats {
    /// Mean duration; 0 means no successful connection yet
    pub mean: f64,

    /// Other statistics the store keeps (`stdev`, `count`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DurationStats {
    pub fn new(mean: f64) -> Self {
        Self {
            mean,
            extra: Map::new(),
        }
    }
}

/// Round-trip time statistics (milliseconds)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RttStats {
    pub mean: f64,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RttStats {
    pub fn new(mean: f64) -> Self {
        Self {
            mean,
            extra: Map::new(),
        }
    }
}

/// Application-level ping statistics
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PingStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtt: Option<RttStats>,

    /// Clock skew statistics, opaque to queries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skew: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Attributes of a peer as held by one of the stores
///
/// Recognized fields are typed; anything else a store attaches (e.g. the
/// staging `mode`) is kept verbatim in `extra` and serialized back inline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerData {
    /// Store this record was resolved from (set by the merge engine)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool: Option<Pool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PeerSource>,

    /// Hub lifecycle tag; absent for peers the hub does not track
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<HubState>,

    /// Last state transition; absent if never attempted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_change: Option<TimestampMs>,

    /// Consecutive failed connection attempts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<DurationStats>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ping: Option<PingStats>,

    /// Identity key of the peer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub announcers: Option<u32>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PeerData {
    /// Attributes as reported by the hub for a live connection
    pub fn hub(state: HubState) -> Self {
        Self {
            state: Some(state),
            ..Default::default()
        }
    }

    pub fn with_source(mut self, source: PeerSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_state_change(mut self, state_change: TimestampMs) -> Self {
        self.state_change = Some(state_change);
        self
    }

    pub fn with_failure(mut self, failure: u32) -> Self {
        self.failure = Some(failure);
        self
    }

    pub fn with_duration_mean(mut self, mean: f64) -> Self {
        self.duration = Some(DurationStats::new(mean));
        self
    }

    pub fn with_rtt_mean(mut self, mean: f64) -> Self {
        let ping = self.ping.get_or_insert_with(PingStats::default);
        ping.rtt = Some(RttStats::new(mean));
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_extra(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }
}

// =============================================================================
// PEER RECORD
// =============================================================================

/// A peer as returned by queries: address plus merged attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Peer {
    pub address: Address,

    #[serde(flatten)]
    pub data: PeerData,
}

impl Peer {
    pub fn new(address: impl Into<Address>, data: PeerData) -> Self {
        Self {
            address: address.into(),
            data,
        }
    }

    /// Build a record tagged with the pool it was taken from
    pub fn tagged(address: impl Into<Address>, pool: Pool, mut data: PeerData) -> Self {
        data.pool = Some(pool);
        Self::new(address, data)
    }

    pub fn pool(&self) -> Option<Pool> {
        self.data.pool
    }
}
