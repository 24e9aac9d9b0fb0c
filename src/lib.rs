//! KratOs Connection Queries
//!
//! Read-only query layer over the peer stores of a KratOs node. It never
//! dials, never writes, and never schedules; it answers "which peers could
//! we dial now?" from whatever the stores report at call time.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  KRATOS CONN QUERY                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ConnQuery (facade)    ←── all / connected / connectable    │
//! │  PeerMerger            ←── db > staging > hub, key backfill │
//! │  queries::time         ←── exp backoff, group debounce      │
//! │  queries::health       ←── attempt history predicates       │
//! │  queries::sorting      ←── oldest stateChange first         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ConnDb  │  ConnHub  │  ConnStaging   (owned elsewhere)     │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod merge;
pub mod queries;
pub mod query;
pub mod snapshot;
pub mod sources;
pub mod types;

pub use config::ConnQueryConfig;
pub use error::{QueryError, Result};
pub use merge::PeerMerger;
pub use queries::{
    has_no_attempts, has_only_failed_attempts, has_pinged, has_successful_attempts, now_millis,
    passes_exp_backoff, passes_group_debounce, sort_by_state_change, BackoffPolicy, HealthFilter,
};
pub use query::{ConnQuery, QueryStats};
pub use snapshot::SourceSnapshot;
pub use sources::{ConnDb, ConnHub, ConnStaging, MemoryStore};
pub use types::{
    Address, DurationStats, HubState, Peer, PeerData, PeerSource, PingStats, Pool, PoolSelector,
    RttStats, TimestampMs,
};
