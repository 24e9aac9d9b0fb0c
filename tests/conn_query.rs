// Connection Query Integration Tests
// Facade behaviour against a fixture of the three stores

use kratos_conn_query::*;
use std::collections::HashSet;

// =========================================================================
// FIXTURE
// =========================================================================

fn time(seconds: u64) -> u64 {
    // 2019-01-01T06:30:00Z plus the given seconds
    1_546_324_200_000 + seconds * 1_000
}

fn mocked_db() -> MemoryStore {
    MemoryStore::from_entries(vec![
        (
            "net:hub.com:1234~noauth".to_string(),
            PeerData::default()
                .with_source(PeerSource::Friends)
                .with_state_change(time(15))
                .with_failure(1)
                .with_duration_mean(1.1)
                .with_rtt_mean(3.5),
        ),
        (
            "net:hub.com:2345~noauth".to_string(),
            PeerData::default()
                .with_source(PeerSource::Pub)
                .with_state_change(time(15))
                .with_failure(4),
        ),
        (
            "net:hub.com:3456~noauth".to_string(),
            PeerData::default()
                .with_source(PeerSource::Manual)
                .with_state_change(time(15))
                .with_duration_mean(1.1),
        ),
        (
            "net:hub.com:4567~noauth".to_string(),
            PeerData::default()
                .with_source(PeerSource::Manual)
                .with_state_change(time(17))
                .with_duration_mean(1.1)
                .with_rtt_mean(3.5),
        ),
    ])
}

fn mocked_hub() -> MemoryStore {
    MemoryStore::from_entries(vec![
        (
            "net:hub.com:1234~noauth".to_string(),
            PeerData::hub(HubState::Connected).with_key("@hub1234.ed25519"),
        ),
        ("net:hub.com:2345~noauth".to_string(), PeerData::hub(HubState::Connecting)),
        ("net:hub.com:3456~noauth".to_string(), PeerData::hub(HubState::Disconnecting)),
        ("net:hub.com:4567~noauth".to_string(), PeerData::hub(HubState::Connected)),
        ("net:192.168.1.12:5678~noauth".to_string(), PeerData::hub(HubState::Connecting)),
    ])
}

fn mocked_staging() -> MemoryStore {
    MemoryStore::from_entries(vec![
        (
            "net:192.168.1.12:5678~noauth".to_string(),
            PeerData::default().with_extra("mode", "lan"),
        ),
        (
            "net:192.168.1.13:6789~noauth".to_string(),
            PeerData::default().with_extra("mode", "lan"),
        ),
    ])
}

fn conn_query() -> ConnQuery<MemoryStore, MemoryStore, MemoryStore> {
    ConnQuery::new(mocked_db(), mocked_hub(), mocked_staging())
}

fn addresses(peers: &[Peer]) -> Vec<&str> {
    let mut addrs: Vec<_> = peers.iter().map(|p| p.address.as_str()).collect();
    addrs.sort();
    addrs
}

// =========================================================================
// PEER LISTS
// =========================================================================

#[test]
fn test_all_peers() {
    let peers = conn_query().all_peers();

    assert_eq!(
        addresses(&peers),
        [
            "net:192.168.1.12:5678~noauth",
            "net:192.168.1.13:6789~noauth",
            "net:hub.com:1234~noauth",
            "net:hub.com:2345~noauth",
            "net:hub.com:3456~noauth",
            "net:hub.com:4567~noauth",
        ]
    );
}

#[test]
fn test_connected_peers() {
    let peers = conn_query().connected_peers();

    assert_eq!(
        addresses(&peers),
        ["net:hub.com:1234~noauth", "net:hub.com:4567~noauth"]
    );
    assert!(peers.iter().all(|p| p.pool() == Some(Pool::Db)));
}

#[test]
fn test_connecting_peers() {
    let peers = conn_query().connecting_peers();

    assert_eq!(
        addresses(&peers),
        ["net:192.168.1.12:5678~noauth", "net:hub.com:2345~noauth"]
    );

    let lan = peers
        .iter()
        .find(|p| p.address == "net:192.168.1.12:5678~noauth")
        .unwrap();
    assert_eq!(lan.pool(), Some(Pool::Staging));
    assert_eq!(lan.data.extra["mode"], "lan");
}

#[test]
fn test_in_connection_peers() {
    let query = conn_query();
    let mut expected = addresses(&query.connected_peers())
        .into_iter()
        .chain(addresses(&query.connecting_peers()))
        .map(str::to_string)
        .collect::<Vec<_>>();
    expected.sort();

    let peers = query.in_connection_peers();
    assert_eq!(addresses(&peers), expected);
}

#[test]
fn test_connectable_per_pool() {
    let query = conn_query();

    let db = query.connectable_peers(PoolSelector::Db);
    assert_eq!(addresses(&db), ["net:hub.com:3456~noauth"]);
    assert_eq!(db[0].pool(), Some(Pool::Db));
    assert_eq!(db[0].data.source, Some(PeerSource::Manual));

    let staging = query.connectable_peers(PoolSelector::Staging);
    assert_eq!(addresses(&staging), ["net:192.168.1.13:6789~noauth"]);
    assert_eq!(staging[0].pool(), Some(Pool::Staging));

    let both = query.connectable_peers(PoolSelector::DbAndStaging);
    assert_eq!(
        addresses(&both),
        ["net:192.168.1.13:6789~noauth", "net:hub.com:3456~noauth"]
    );
}

#[test]
fn test_connectable_default_pool_is_db() {
    let query = conn_query();
    assert_eq!(
        query.connectable_peers(PoolSelector::default()),
        query.connectable_peers(PoolSelector::Db)
    );
}

#[test]
fn test_invalid_pool_selector() {
    let err = "everything".parse::<PoolSelector>().unwrap_err();
    assert!(matches!(err, QueryError::InvalidArgument(_)));
}

// =========================================================================
// INVARIANTS
// =========================================================================

#[test]
fn test_connectable_never_live() {
    let query = conn_query();
    let hub = mocked_hub();

    for pool in [PoolSelector::Db, PoolSelector::Staging, PoolSelector::DbAndStaging] {
        for peer in query.connectable_peers(pool) {
            let state = hub.get_state(&peer.address);
            assert!(
                !state.map_or(false, |s| s.is_live()),
                "{} is live but connectable from {}",
                peer.address,
                pool
            );
        }
    }
}

#[test]
fn test_all_peers_is_disjoint_union() {
    let query = conn_query();
    let all = query.all_peers();

    let unique: HashSet<_> = all.iter().map(|p| p.address.clone()).collect();
    assert_eq!(unique.len(), all.len());

    let mut expected = query.connectable_peers(PoolSelector::DbAndStaging);
    expected.extend(query.in_connection_peers());
    assert_eq!(all, expected);
}

#[test]
fn test_db_key_backfilled_from_hub() {
    let db = MemoryStore::from_entries(vec![(
        "net:manual.com:8008~noauth".to_string(),
        PeerData::default()
            .with_source(PeerSource::Manual)
            .with_state_change(time(15)),
    )]);
    let hub = MemoryStore::from_entries(vec![(
        "net:manual.com:8008~noauth".to_string(),
        PeerData::hub(HubState::Connected).with_key("K"),
    )]);
    let query = ConnQuery::new(db, hub, MemoryStore::new());

    let peers = query.connected_peers();
    assert_eq!(peers.len(), 1);
    assert_eq!(peers[0].pool(), Some(Pool::Db));
    assert_eq!(peers[0].data.source, Some(PeerSource::Manual));
    assert_eq!(peers[0].data.key.as_deref(), Some("K"));
}

#[test]
fn test_stores_by_reference() {
    let db = mocked_db();
    let hub = mocked_hub();
    let staging = mocked_staging();
    let query = ConnQuery::new(&db, &hub, &staging);

    assert_eq!(query.connected_peers().len(), 2);
    assert_eq!(query.stats().hub_peers, 5);
}

// =========================================================================
// COMPOSED QUERIES
// =========================================================================

#[test]
fn test_pick_next_dial_candidates() {
    let query = conn_query();
    let now = time(30);

    let candidates: Vec<Peer> = query
        .connectable_peers(PoolSelector::DbAndStaging)
        .into_iter()
        .filter(passes_exp_backoff(1_000, Some(60_000), now))
        .collect();
    let candidates = sort_by_state_change(candidates);

    // Staged peer was never attempted and sorts first
    assert_eq!(
        candidates.iter().map(|p| p.address.as_str()).collect::<Vec<_>>(),
        ["net:192.168.1.13:6789~noauth", "net:hub.com:3456~noauth"]
    );
    assert!(has_no_attempts(&candidates[0]));
    assert!(has_successful_attempts(&candidates[1]));
}

#[test]
fn test_group_debounce_on_connected() {
    let query = conn_query();
    let connected = query.connected_peers();

    // Newest state change in the group is at 06:30:17
    assert!(passes_group_debounce(10_000, time(26))(connected.clone()).is_empty());
    assert_eq!(passes_group_debounce(10_000, time(27))(connected.clone()), connected);
}

#[test]
fn test_health_partition_over_fixture() {
    for peer in conn_query().all_peers() {
        let held = [
            has_no_attempts(&peer),
            has_only_failed_attempts(&peer),
            has_successful_attempts(&peer),
        ];
        assert_eq!(held.iter().filter(|h| **h).count(), 1, "{}", peer.address);
    }

    let pinged: Vec<_> = conn_query()
        .connected_peers()
        .into_iter()
        .filter(has_pinged)
        .collect();
    assert_eq!(pinged.len(), 2);
}
