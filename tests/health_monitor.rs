//! Health monitor behaviour against live mock backends.

use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use least_conn_lb::config::{BalancerConfig, ServerConfig};
use least_conn_lb::health::{HealthMonitor, ProbeOutcome};
use least_conn_lb::load_balancer::{Selector, ServerPool};
use least_conn_lb::Shutdown;

mod common;

fn monitor_for(servers: Vec<ServerConfig>, timeout_secs: u64) -> (HealthMonitor, Arc<ServerPool>) {
    let pool = Arc::new(ServerPool::from_config(&servers));
    let mut config = BalancerConfig::new(0, servers, 1);
    config.health_check_timeout = timeout_secs;
    (HealthMonitor::new(pool.clone(), &config), pool)
}

async fn health_flags(pool: &ServerPool) -> Vec<bool> {
    pool.snapshot().await.iter().map(|s| s.is_healthy()).collect()
}

#[tokio::test]
async fn test_flag_follows_latest_probe() {
    let status = Arc::new(AtomicU16::new(500));
    let addr = common::start_switchable_backend("x", status.clone()).await;
    let (monitor, pool) = monitor_for(vec![ServerConfig::new(common::url(addr)).healthy(true)], 2);

    monitor.run_cycle().await;
    assert_eq!(health_flags(&pool).await, vec![false]);

    status.store(200, Ordering::SeqCst);
    monitor.run_cycle().await;
    assert_eq!(health_flags(&pool).await, vec![true]);

    status.store(503, Ordering::SeqCst);
    monitor.run_cycle().await;
    assert_eq!(health_flags(&pool).await, vec![false]);
}

#[tokio::test]
async fn test_timeout_marks_unhealthy_then_recovers() {
    let hang = Arc::new(AtomicBool::new(true));
    let h = hang.clone();
    let addr = common::start_programmable_backend(move |_path| {
        let h = h.clone();
        async move {
            if h.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_secs(10)).await;
            }
            (200, "OK".into())
        }
    })
    .await;

    let (monitor, pool) = monitor_for(vec![ServerConfig::new(common::url(addr)).healthy(true)], 1);

    assert_eq!(monitor.probe(&common::url(addr)).await, ProbeOutcome::Timeout);

    monitor.run_cycle().await;
    assert_eq!(health_flags(&pool).await, vec![false]);

    hang.store(false, Ordering::SeqCst);
    monitor.run_cycle().await;
    assert_eq!(health_flags(&pool).await, vec![true]);
}

#[tokio::test]
async fn test_mixed_pool_single_cycle() {
    let good = common::start_healthy_backend("good").await;
    let bad = common::start_switchable_backend("bad", Arc::new(AtomicU16::new(500))).await;
    let refused = common::closed_addr().await;

    let (monitor, pool) = monitor_for(
        vec![
            ServerConfig::new(common::url(good)),
            ServerConfig::new(common::url(bad)).healthy(true),
            ServerConfig::new(common::url(refused)).healthy(true),
        ],
        2,
    );

    monitor.run_cycle().await;
    assert_eq!(health_flags(&pool).await, vec![true, false, false]);

    assert!(matches!(
        monitor.probe(&common::url(refused)).await,
        ProbeOutcome::Transport(_)
    ));
    assert_eq!(
        monitor.probe(&common::url(bad)).await,
        ProbeOutcome::Status(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
    );
}

#[tokio::test]
async fn test_probes_configured_path() {
    let addr = common::start_programmable_backend(|path| async move {
        if path == "/ready" {
            (200, "ready".into())
        } else {
            (404, "missing".into())
        }
    })
    .await;
    let servers = vec![ServerConfig::new(format!("{}/", common::url(addr)))];
    let pool = Arc::new(ServerPool::from_config(&servers));

    let default_monitor = HealthMonitor::new(pool.clone(), &BalancerConfig::new(0, servers.clone(), 1));
    default_monitor.run_cycle().await;
    assert_eq!(health_flags(&pool).await, vec![false]);

    let mut config = BalancerConfig::new(0, servers, 1);
    config.health_check_path = "/ready".to_string();
    HealthMonitor::new(pool.clone(), &config).run_cycle().await;
    assert_eq!(health_flags(&pool).await, vec![true]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cycle_holds_lock_against_selection() {
    let addr = common::start_programmable_backend(|_path| async move {
        tokio::time::sleep(Duration::from_millis(600)).await;
        (200, "OK".into())
    })
    .await;

    let (monitor, pool) = monitor_for(vec![ServerConfig::new(common::url(addr)).healthy(true)], 5);
    let selector = Selector::new(pool.clone());

    let cycle = tokio::spawn(async move { monitor.run_cycle().await });
    tokio::time::sleep(Duration::from_millis(100)).await;

    let start = Instant::now();
    let reservation = selector.acquire().await.unwrap();
    assert!(
        start.elapsed() >= Duration::from_millis(300),
        "selection ran inside a health cycle"
    );
    reservation.release().await;

    cycle.await.unwrap();
}

#[tokio::test]
async fn test_loop_exits_on_shutdown() {
    let addr = common::start_healthy_backend("x").await;
    let (monitor, pool) = monitor_for(vec![ServerConfig::new(common::url(addr))], 2);

    let shutdown = Shutdown::new();
    let handle = monitor.spawn(shutdown.subscribe());

    common::wait_for_health(&pool, &[true]).await;
    shutdown.trigger();

    tokio::time::timeout(Duration::from_secs(3), handle)
        .await
        .expect("monitor did not stop")
        .unwrap();
}
