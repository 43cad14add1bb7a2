//! End-to-end dispatch tests: a real master gateway serving real worker
//! processes over loopback TCP.

use std::sync::Arc;
use std::time::Duration;

use master::discovery::StaticEndpoints;
use master::load_balancer::LoadBalancingStrategy;
use master::service::MasterService;
use master::worker_pool::{PoolConfig, WorkerPool};
use raycast_rs::map::Map;
use raycast_rs::raycast::{ColumnJob, Pose, RaycastEngine};
use shared::models::player::Player;
use shared::models::raycast::raycast_request::RaycastRequest;
use shared::models::status::status_request::StatusRequest;
use shared::networking::call;
use shared::networking::envelope::{FaultCode, MasterReply, MasterRpc};
use shared::time::epoch_ms;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use worker::service::WorkerService;

async fn spawn_worker(worker_id: i32) -> (String, oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    let service = Arc::new(WorkerService::new(worker_id));
    let (stop, stopped) = oneshot::channel();

    tokio::spawn(async move {
        _ = worker::serve(listener, service, async {
            _ = stopped.await;
        })
        .await;
    });

    (address, stop)
}

async fn spawn_master(endpoints: Vec<String>, pool_config: PoolConfig) -> String {
    let pool = Arc::new(WorkerPool::new(
        Box::new(StaticEndpoints(endpoints)),
        pool_config,
    ));
    let service = Arc::new(MasterService::new(pool, LoadBalancingStrategy::RoundRobin).await);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        _ = master::serve(listener, service, std::future::pending()).await;
    });
    address
}

fn walled_cells(width: i32, height: i32) -> Vec<i32> {
    let mut cells = vec![0; (width * height) as usize];
    for y in 0..height {
        for x in 0..width {
            if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                cells[(y * width + x) as usize] = 1;
            }
        }
    }
    cells
}

fn raycast_request(request_id: &str) -> RaycastRequest {
    RaycastRequest {
        request_id: request_id.to_string(),
        client_id: "client-1".to_string(),
        player: Player::new(2.0, 2.0, 0.0, 0.0, "client-1".to_string(), epoch_ms()),
        screen_width: 8,
        screen_height: 768,
        fov: std::f64::consts::PI / 3.0,
        start_column: 0,
        end_column: 8,
        map: walled_cells(16, 16),
        map_width: 16,
        map_height: 16,
        timestamp: epoch_ms(),
    }
}

async fn send_job(master: &str, request_id: &str) -> MasterReply {
    call(
        master,
        &MasterRpc::ProcessRaycastRequest(raycast_request(request_id)),
    )
    .await
    .unwrap()
}

async fn fetch_status(master: &str) -> shared::models::status::master_status::MasterStatus {
    let reply: MasterReply = call(master, &MasterRpc::GetMasterStatus(StatusRequest {}))
        .await
        .unwrap();
    match reply {
        MasterReply::MasterStatus(status) => status,
        other => panic!("unexpected reply: {:?}", other),
    }
}

#[tokio::test]
async fn one_worker_serves_a_full_column_span() {
    let (worker, _stop) = spawn_worker(3).await;
    let master = spawn_master(vec![worker.clone()], PoolConfig::default()).await;

    let reply = send_job(&master, "r1").await;
    let response = match reply {
        MasterReply::RaycastResponse(response) => response,
        other => panic!("unexpected reply: {:?}", other),
    };

    assert!(response.success);
    assert!(response.error_message.is_empty());
    assert_eq!(response.request_id, "r1");
    assert_eq!(response.client_id, "client-1");
    assert_eq!(response.worker_id, 3);
    assert_eq!(response.worker_endpoint, worker);

    // One result per column, ascending and contiguous from the start.
    assert_eq!(response.results.len(), 8);
    let map_extent_bound = (16.0f64 * 16.0 * 2.0).sqrt();
    for (offset, column) in response.results.iter().enumerate() {
        assert_eq!(column.column, offset as i32);
        assert!((0..6).contains(&column.wall_type));
        assert!(column.distance > 0.0 && column.distance <= map_extent_bound);
    }

    // The dispatched results are bit-identical to a local engine run.
    let engine = RaycastEngine::new();
    let local = engine.render_columns(&ColumnJob {
        pose: Pose::new(2.0, 2.0, 0.0, 0.0),
        screen_width: 8,
        fov: std::f64::consts::PI / 3.0,
        start_column: 0,
        end_column: 8,
        map: Map::walled(16, 16),
    });
    for (remote, local) in response.results.iter().zip(&local) {
        assert_eq!(remote.distance, local.distance);
        assert_eq!(remote.wall_type, local.wall_type);
        assert_eq!(remote.wall_x, local.wall_x);
        assert_eq!((remote.r, remote.g, remote.b), (local.r, local.g, local.b));
    }
}

#[tokio::test]
async fn an_empty_pool_answers_unavailable() {
    let master = spawn_master(vec![], PoolConfig::default()).await;

    let reply = send_job(&master, "r-none").await;
    match reply {
        MasterReply::Fault(fault) => {
            assert_eq!(fault.code, FaultCode::Unavailable);
            assert_eq!(fault.message, "No workers available");
        }
        other => panic!("unexpected reply: {:?}", other),
    }
}

#[tokio::test]
async fn status_counters_follow_successful_dispatches() {
    let (worker, _stop) = spawn_worker(7).await;
    let master = spawn_master(vec![worker], PoolConfig::default()).await;

    let before = fetch_status(&master).await;
    assert_eq!(before.total_workers, 1);
    assert_eq!(before.active_workers, 1);
    assert_eq!(before.total_requests_processed, 0);
    assert_eq!(before.average_response_time_ms, 0.0);
    assert_eq!(before.workers.len(), 1);
    assert_eq!(before.workers[0].worker_id, 7);

    send_job(&master, "r1").await;
    send_job(&master, "r2").await;

    let after = fetch_status(&master).await;
    assert_eq!(after.total_requests_processed, 2);
    assert!(after.average_response_time_ms >= 0.0);
    assert_eq!(after.workers[0].total_jobs_processed, 2);
    assert_eq!(after.workers[0].active_jobs, 0);
}

#[tokio::test]
async fn a_dead_worker_fails_the_request_and_leaves_the_healthy_set() {
    let fast_pool = PoolConfig {
        health_check_timeout: Duration::from_secs(1),
        request_timeout: Duration::from_secs(1),
        ..PoolConfig::default()
    };

    let (worker, stop) = spawn_worker(5).await;
    let master = spawn_master(vec![worker], fast_pool).await;

    stop.send(()).unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    // The in-flight dispatch surfaces the transport failure verbatim,
    // with no retry against another worker.
    let reply = send_job(&master, "r-dead").await;
    match reply {
        MasterReply::Fault(fault) => assert!(matches!(
            fault.code,
            FaultCode::Unavailable | FaultCode::DeadlineExceeded
        )),
        other => panic!("unexpected reply: {:?}", other),
    }

    // The connection stays pooled but is no longer healthy, so the next
    // dispatch fails fast.
    let status = fetch_status(&master).await;
    assert_eq!(status.total_workers, 1);
    assert_eq!(status.active_workers, 0);

    let reply = send_job(&master, "r-after").await;
    match reply {
        MasterReply::Fault(fault) => {
            assert_eq!(fault.code, FaultCode::Unavailable);
            assert_eq!(fault.message, "No workers available");
        }
        other => panic!("unexpected reply: {:?}", other),
    }
}

#[tokio::test]
async fn round_robin_spreads_jobs_across_the_pool() {
    let (first, _first_stop) = spawn_worker(1).await;
    let (second, _second_stop) = spawn_worker(2).await;
    let master = spawn_master(vec![first, second], PoolConfig::default()).await;

    for round in 0..4 {
        send_job(&master, &format!("r{}", round)).await;
    }

    let status = fetch_status(&master).await;
    assert_eq!(status.total_requests_processed, 4);
    for worker in &status.workers {
        assert_eq!(worker.total_jobs_processed, 2);
    }
}

#[tokio::test]
async fn invalid_maps_are_rejected_by_the_worker_not_the_gateway() {
    let (worker, _stop) = spawn_worker(9).await;
    let master = spawn_master(vec![worker], PoolConfig::default()).await;

    let mut request = raycast_request("r-bad");
    request.map.pop();

    let reply: MasterReply = call(&master, &MasterRpc::ProcessRaycastRequest(request))
        .await
        .unwrap();
    match reply {
        MasterReply::Fault(fault) => assert_eq!(fault.code, FaultCode::InvalidArgument),
        other => panic!("unexpected reply: {:?}", other),
    }

    // The gateway itself is still serving.
    let status = fetch_status(&master).await;
    assert_eq!(status.total_workers, 1);
}
