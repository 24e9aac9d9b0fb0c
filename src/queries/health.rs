//! Connection history predicates
//!
//! For any peer with well-formed attributes exactly one of
//! `has_no_attempts`, `has_only_failed_attempts` and
//! `has_successful_attempts` holds. `has_pinged` is independent.

use serde::{Deserialize, Serialize};

use crate::types::Peer;

/// Never attempted: no (or zero) `stateChange`
pub fn has_no_attempts(peer: &Peer) -> bool {
    peer.data.state_change.unwrap_or(0) == 0
}

/// Attempted, but no connection ever lasted
pub fn has_only_failed_attempts(peer: &Peer) -> bool {
    let attempted = peer.data.state_change.unwrap_or(0) != 0;
    let never_lasted = peer.data.duration.as_ref().map_or(true, |d| d.mean == 0.0);
    attempted && never_lasted
}

/// At least one connection lasted a measurable time
pub fn has_successful_attempts(peer: &Peer) -> bool {
    peer.data.duration.as_ref().map_or(false, |d| d.mean > 0.0)
}

/// Peer has answered our pings before
pub fn has_pinged(peer: &Peer) -> bool {
    peer.data
        .ping
        .as_ref()
        .and_then(|ping| ping.rtt.as_ref())
        .map_or(false, |rtt| rtt.mean > 0.0)
}

/// Named health predicate, selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum HealthFilter {
    NoAttempts,
    OnlyFailed,
    Successful,
    Pinged,
}

impl HealthFilter {
    pub fn matches(&self, peer: &Peer) -> bool {
        match self {
            HealthFilter::NoAttempts => has_no_attempts(peer),
            HealthFilter::OnlyFailed => has_only_failed_attempts(peer),
            HealthFilter::Successful => has_successful_attempts(peer),
            HealthFilter::Pinged => has_pinged(peer),
        }
    }
}
