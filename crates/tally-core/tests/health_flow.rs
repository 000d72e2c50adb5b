mod common;

use common::session;
use std::time::Duration;
use tally_core::health::{PoolSeverity, METRICS_PATH};

fn metrics(used: u64, capacity: u64) -> String {
    format!(
        "# HELP db_pool_size Pool capacity\n# TYPE db_pool_size gauge\ndb_pool_size {}\n\
         # TYPE db_pool_checked_out gauge\ndb_pool_checked_out {}\n",
        capacity, used
    )
}

#[tokio::test(start_paused = true)]
async fn poller_tracks_pool_pressure_every_two_seconds() {
    let (network, session) = session();
    network.push_response(200, &metrics(8, 10));
    network.push_response(200, &metrics(9, 10));
    network.push_response(500, "oops");
    network.push_response(200, &metrics(10, 10));
    let mut status = session.poller().status();

    let started = tokio::time::Instant::now();
    session.start_health();

    let first = (*status.wait_for(Option::is_some).await.unwrap()).unwrap();
    assert_eq!(first.severity, PoolSeverity::Normal);

    let second = (*status
        .wait_for(|s| s.is_some_and(|p| p.used == 9))
        .await
        .unwrap())
    .unwrap();
    assert_eq!(second.severity, PoolSeverity::Warning);

    let last = (*status
        .wait_for(|s| s.is_some_and(|p| p.used == 10))
        .await
        .unwrap())
    .unwrap();
    assert_eq!(last.severity, PoolSeverity::Critical);
    assert!(started.elapsed() >= Duration::from_secs(6));
    assert_eq!(network.requests_to(METRICS_PATH).len(), 4);
    session.shutdown();
}
