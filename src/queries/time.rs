//! Time-based admission checks
//!
//! All timestamps are milliseconds since the Unix epoch. Absent
//! `stateChange` and `failure` fields count as 0 here, so a peer that was
//! never attempted always passes.

use crate::types::{Peer, TimestampMs};

/// Current wall clock, used when the caller has no timestamp of its own
pub fn now_millis() -> TimestampMs {
    chrono::Utc::now().timestamp_millis().max(0) as TimestampMs
}

/// `min(2^failures * step, max)`, saturating at `u64::MAX`
pub fn exp_backoff_gap(step: u64, failures: u32, max: Option<u64>) -> u64 {
    let growth = 1u64.checked_shl(failures).unwrap_or(u64::MAX);
    let gap = growth.saturating_mul(step);
    match max {
        Some(max) => gap.min(max),
        None => gap,
    }
}

/// Whether a peer's exponential backoff has elapsed at `now`
///
/// The gap counts from the latest `stateChange` and doubles with every
/// consecutive failure, capped at `max` (`None` = unbounded). The check
/// passes strictly after the gap has elapsed.
pub fn passes_exp_backoff(
    step: u64,
    max: Option<u64>,
    now: TimestampMs,
) -> impl Fn(&Peer) -> bool {
    move |peer: &Peer| {
        let prev_attempt = peer.data.state_change.unwrap_or(0);
        let failures = peer.data.failure.unwrap_or(0);
        let next_attempt = prev_attempt.saturating_add(exp_backoff_gap(step, failures, max));
        next_attempt < now
    }
}

/// Group-wide cooldown since the newest `stateChange` of any member
///
/// Returns the group untouched once `group_min_gap` has elapsed since its
/// most recent state change, and an empty group otherwise. Never a subset.
pub fn passes_group_debounce(
    group_min_gap: u64,
    now: TimestampMs,
) -> impl Fn(Vec<Peer>) -> Vec<Peer> {
    move |group: Vec<Peer>| {
        let newest_state_change = group
            .iter()
            .map(|peer| peer.data.state_change.unwrap_or(0))
            .max()
            .unwrap_or(0);

        if now < newest_state_change.saturating_add(group_min_gap) {
            Vec::new()
        } else {
            group
        }
    }
}

/// Backoff parameters bundled for repeated use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    step_ms: u64,
    max_ms: Option<u64>,
}

impl BackoffPolicy {
    /// Any cap is accepted; a cap below `step_ms` bounds every gap
    pub fn new(step_ms: u64, max_ms: Option<u64>) -> Self {
        Self { step_ms, max_ms }
    }

    pub fn step_ms(&self) -> u64 {
        self.step_ms
    }

    pub fn max_ms(&self) -> Option<u64> {
        self.max_ms
    }

    pub fn passes(&self, peer: &Peer, now: TimestampMs) -> bool {
        passes_exp_backoff(self.step_ms, self.max_ms, now)(peer)
    }

    /// Keep only the peers whose backoff has elapsed
    pub fn filter(&self, peers: Vec<Peer>, now: TimestampMs) -> Vec<Peer> {
        let check = passes_exp_backoff(self.step_ms, self.max_ms, now);
        peers.into_iter().filter(|peer| check(peer)).collect()
    }
}
