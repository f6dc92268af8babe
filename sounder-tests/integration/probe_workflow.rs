//! End-to-end probing workflow against loopback mock trackers

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use httpmock::prelude::*;
use sounder_core::config::SounderConfig;
use sounder_core::tracker::{ProbeDispatcher, ProbeError, aggregate, run_all};
use tokio::net::UdpSocket;

/// Binds a loopback UDP tracker that answers connect requests correctly
/// after `delay`.
async fn spawn_udp_tracker(delay: Duration) -> SocketAddr {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();

    tokio::spawn(async move {
        let mut request = [0u8; 32];
        loop {
            let Ok((len, peer)) = socket.recv_from(&mut request).await else {
                return;
            };
            if len != 16 {
                continue;
            }
            let transaction_id =
                u32::from_be_bytes(request[12..16].try_into().expect("sliced to length"));

            tokio::time::sleep(delay).await;

            let mut reply = Vec::with_capacity(16);
            reply.extend_from_slice(&0u32.to_be_bytes());
            reply.extend_from_slice(&transaction_id.to_be_bytes());
            reply.extend_from_slice(&0xCAFE_F00D_DEAD_BEEFu64.to_be_bytes());
            let _ = socket.send_to(&reply, peer).await;
        }
    });

    addr
}

fn test_config() -> SounderConfig {
    let mut config = SounderConfig::default();
    config.probe.http_timeout = Duration::from_secs(2);
    config.probe.udp_timeout = Duration::from_secs(2);
    config
}

#[tokio::test]
async fn test_udp_tracker_outranks_dead_http_endpoint() {
    let udp_addr = spawn_udp_tracker(Duration::ZERO).await;
    let udp_uri = format!("udp://127.0.0.1:{}/announce", udp_addr.port());

    let http_server = MockServer::start_async().await;
    http_server
        .mock_async(|when, then| {
            when.method(GET).path("/announce");
            then.status(404);
        })
        .await;
    let http_uri = http_server.url("/announce");

    let dispatcher = Arc::new(ProbeDispatcher::new(&test_config()));
    let batch = run_all(
        dispatcher,
        vec![udp_uri.clone(), http_uri.clone()],
        10,
        None,
    )
    .await;

    assert_eq!(batch.len(), 2);
    assert!(batch.get(&udp_uri).unwrap().is_valid());
    assert!(!batch.get(&http_uri).unwrap().is_valid());

    let result = aggregate(&batch, None);
    let uris: Vec<&str> = result.trackers.iter().map(|t| t.uri.as_str()).collect();
    assert_eq!(uris, vec![udp_uri.as_str()]);
    assert!(result.trackers[0].response_time_ms > 0.0);
}

#[tokio::test]
async fn test_ranking_orders_by_measured_latency() {
    let fast_addr = spawn_udp_tracker(Duration::ZERO).await;
    let slow_addr = spawn_udp_tracker(Duration::from_millis(150)).await;
    let fast_uri = format!("udp://127.0.0.1:{}/announce", fast_addr.port());
    let slow_uri = format!("udp://127.0.0.1:{}/announce", slow_addr.port());

    let dispatcher = Arc::new(ProbeDispatcher::new(&test_config()));
    let batch = run_all(
        dispatcher,
        vec![slow_uri.clone(), fast_uri.clone()],
        10,
        None,
    )
    .await;

    let result = aggregate(&batch, None);
    let uris: Vec<&str> = result.trackers.iter().map(|t| t.uri.as_str()).collect();
    assert_eq!(uris, vec![fast_uri.as_str(), slow_uri.as_str()]);
}

#[tokio::test]
async fn test_threshold_filters_slow_trackers_end_to_end() {
    let fast_addr = spawn_udp_tracker(Duration::ZERO).await;
    let slow_addr = spawn_udp_tracker(Duration::from_millis(300)).await;
    let fast_uri = format!("udp://127.0.0.1:{}/announce", fast_addr.port());
    let slow_uri = format!("udp://127.0.0.1:{}/announce", slow_addr.port());

    let dispatcher = Arc::new(ProbeDispatcher::new(&test_config()));
    let batch = run_all(dispatcher, vec![fast_uri.clone(), slow_uri], 10, None).await;

    assert_eq!(batch.valid_count(), 2);

    let result = aggregate(&batch, Some(Duration::from_millis(100)));
    let uris: Vec<&str> = result.trackers.iter().map(|t| t.uri.as_str()).collect();
    assert_eq!(uris, vec![fast_uri.as_str()]);

    // The distribution still reflects both valid endpoints.
    assert_eq!(result.distribution.unwrap().buckets.iter().sum::<usize>(), 2);
}

#[test]
fn test_screened_candidates_never_touch_the_network() {
    tokio_test::block_on(async {
        let denylisted = "udp://tracker.theoks.net:6969/announce".to_string();

        let dispatcher = Arc::new(ProbeDispatcher::new(&test_config()));
        let batch = run_all(
            dispatcher,
            vec![
                denylisted.clone(),
                "wss://tracker.example/announce".to_string(),
                "udp://".to_string(),
            ],
            10,
            None,
        )
        .await;

        assert_eq!(batch.len(), 3);
        assert_eq!(
            batch.get(&denylisted).unwrap().error(),
            Some(&ProbeError::Skipped)
        );
        assert!(matches!(
            batch.get("wss://tracker.example/announce").unwrap().error(),
            Some(ProbeError::UnsupportedScheme { .. })
        ));
        assert!(matches!(
            batch.get("udp://").unwrap().error(),
            Some(ProbeError::Unparseable { .. })
        ));

        let result = aggregate(&batch, None);
        assert!(result.trackers.is_empty());
        assert!(result.distribution.is_none());
    });
}
