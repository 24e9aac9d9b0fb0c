use crate::types::Peer;

/// Oldest `stateChange` first; stable for equal timestamps.
///
/// A missing `stateChange` sorts as 0, ahead of every attempted peer.
pub fn sort_by_state_change(mut peers: Vec<Peer>) -> Vec<Peer> {
    peers.sort_by_key(|peer| peer.data.state_change.unwrap_or(0));
    peers
}
