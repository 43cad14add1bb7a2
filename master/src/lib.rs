pub mod config;
pub mod discovery;
pub mod load_balancer;
pub mod service;
pub mod translate;
pub mod worker_pool;

use std::future::Future;
use std::sync::Arc;

use log::{debug, error, info};
use shared::networking::envelope::{MasterReply, MasterRpc, RpcFault};
use shared::networking::result::NetworkingResult;
use shared::networking::{read_message, send_message};
use shared::{env, logger};
use tokio::net::{TcpListener, TcpStream};

use crate::config::MasterConfig;
use crate::service::MasterService;
use crate::worker_pool::WorkerPool;

/// Binds the gateway endpoint and serves raycast and status calls until
/// `shutdown` resolves.
pub async fn run_master(
    config: MasterConfig,
    shutdown: impl Future<Output = ()>,
) -> NetworkingResult<()> {
    env::init();
    logger::init();

    let pool = Arc::new(WorkerPool::new(config.resolver(), config.pool_config()));
    let service = Arc::new(MasterService::new(pool, config.strategy).await);

    let bind_address = config.bind_address();
    let listener = match TcpListener::bind(&bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", bind_address, e);
            return Err(e.into());
        }
    };
    info!("Master gateway listening on {}", bind_address);

    serve(listener, service, shutdown).await
}

/// Accept loop over an already bound listener. Each connection carries
/// one request and gets one reply.
pub async fn serve(
    listener: TcpListener,
    service: Arc<MasterService>,
    shutdown: impl Future<Output = ()>,
) -> NetworkingResult<()> {
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Master gateway stopped");
                return Ok(());
            }
            accepted = listener.accept() => {
                let (mut socket, _) = match accepted {
                    Ok(connection) => connection,
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                        continue;
                    }
                };

                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(&mut socket, &service).await {
                        error!("Connection error: {}", e);
                    }
                });
            }
        }
    }
}

async fn handle_connection(
    socket: &mut TcpStream,
    service: &MasterService,
) -> NetworkingResult<()> {
    debug!("Handling new connection...");

    let reply = match read_message::<MasterRpc>(socket).await {
        Ok(MasterRpc::ProcessRaycastRequest(request)) => {
            match service.process_raycast_request(request).await {
                Ok(response) => MasterReply::RaycastResponse(response),
                Err(fault) => {
                    error!("Raycast request failed: {}", fault);
                    MasterReply::Fault(fault)
                }
            }
        }
        Ok(MasterRpc::GetMasterStatus(_)) => {
            MasterReply::MasterStatus(service.master_status().await)
        }
        Err(e) => {
            error!("Failed to decode request: {}", e);
            MasterReply::Fault(RpcFault::internal("Internal processing error"))
        }
    };

    send_message(socket, &reply).await
}

#[cfg(test)]
mod tests {
    use super::*;

    use shared::models::status::status_request::StatusRequest;
    use shared::networking::call;
    use shared::networking::envelope::FaultCode;

    use crate::discovery::StaticEndpoints;
    use crate::load_balancer::LoadBalancingStrategy;
    use crate::worker_pool::PoolConfig;

    async fn spawn_empty_master() -> String {
        let pool = Arc::new(WorkerPool::new(
            Box::new(StaticEndpoints(vec![])),
            PoolConfig::default(),
        ));
        let service = Arc::new(MasterService::new(pool, LoadBalancingStrategy::RoundRobin).await);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            _ = serve(listener, service, std::future::pending()).await;
        });
        address
    }

    #[tokio::test]
    async fn served_masters_answer_status_calls() {
        let address = spawn_empty_master().await;

        let reply: MasterReply = call(&address, &MasterRpc::GetMasterStatus(StatusRequest {}))
            .await
            .unwrap();

        match reply {
            MasterReply::MasterStatus(status) => {
                assert_eq!(status.total_workers, 0);
                assert_eq!(status.total_requests_processed, 0);
                assert_eq!(status.average_response_time_ms, 0.0);
            }
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[tokio::test]
    async fn undecodable_requests_fault_instead_of_hanging() {
        use tokio::io::AsyncWriteExt;

        let address = spawn_empty_master().await;

        let mut socket = TcpStream::connect(&address).await.unwrap();
        let garbage = br#"{"NoSuchOperation":{}}"#;
        socket.write_u32(garbage.len() as u32).await.unwrap();
        socket.write_all(garbage).await.unwrap();
        socket.flush().await.unwrap();

        let reply: MasterReply = read_message(&mut socket).await.unwrap();
        match reply {
            MasterReply::Fault(fault) => {
                assert_eq!(fault.code, FaultCode::Internal);
                assert_eq!(fault.message, "Internal processing error");
            }
            other => panic!("unexpected reply: {:?}", other),
        }
    }
}
