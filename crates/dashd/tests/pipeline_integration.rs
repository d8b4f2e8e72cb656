//! Full-pipeline test: bridge -> assembler -> server -> subscribing client.

use std::sync::Arc;
use std::time::Duration;

use dash_bridge::frame_bridge;
use dash_client::{Subscription, SubscriptionConfig};
use dash_core::BusFrame;
use dash_server::{run_publisher, AppState};
use tokio::sync::broadcast;

/// Poll until `check` passes or the deadline expires.
async fn wait_for(mut check: impl FnMut() -> bool) {
    for _ in 0..100 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("condition not reached within deadline");
}

#[tokio::test]
async fn test_frame_flows_from_bridge_to_subscribed_client() {
    let (bridge_tx, bridge_rx) = frame_bridge(64);
    let (broadcast_tx, _) = broadcast::channel::<String>(16);

    let publisher = tokio::spawn(run_publisher(bridge_rx, broadcast_tx.clone(), 25));

    let app = dash_server::server::create_router(AppState::new(broadcast_tx, 8));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let subscription = Arc::new(Subscription::new(SubscriptionConfig {
        url: format!("ws://{addr}/"),
        ..SubscriptionConfig::default()
    }));
    let state = subscription.state();
    let runner = {
        let subscription = Arc::clone(&subscription);
        tokio::spawn(async move { subscription.run().await })
    };

    wait_for(|| state.is_connected()).await;

    // Front-left wheel speed 41.70 km/h, little-endian i16 scaled by 0.01
    let raw = 4170i16.to_le_bytes();
    bridge_tx.relay(&BusFrame::new(0x406, vec![raw[0], raw[1]]));

    wait_for(|| {
        state
            .snapshot()
            .and_then(|s| s.number("dynamics", "flw_speed"))
            .is_some_and(|v| (v - 41.70).abs() < 1e-9)
    })
    .await;

    // Teardown: the subscription reports disconnected but keeps the
    // last document it saw
    subscription.close();
    let _ = tokio::time::timeout(Duration::from_secs(2), runner)
        .await
        .expect("subscription loop exits after close");
    assert!(!state.is_connected());
    assert!(state.snapshot().is_some());

    drop(bridge_tx);
    let _ = tokio::time::timeout(Duration::from_secs(2), publisher)
        .await
        .expect("publisher drains after bridge closes");
    server.abort();
}
