//! Peer Queries
//!
//! Stateless checks callers chain onto the facade's peer lists when
//! deciding whom to dial next.

pub mod health;
pub mod sorting;
pub mod time;

pub use health::{
    has_no_attempts, has_only_failed_attempts, has_pinged, has_successful_attempts, HealthFilter,
};
pub use sorting::sort_by_state_change;
pub use time::{now_millis, passes_exp_backoff, passes_group_debounce, BackoffPolicy};
