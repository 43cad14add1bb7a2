pub mod config;
pub mod service;

use std::future::Future;
use std::sync::Arc;

use log::{debug, error, info};
use shared::networking::envelope::{RpcFault, WorkerReply, WorkerRpc};
use shared::networking::result::NetworkingResult;
use shared::networking::{read_message, send_message};
use shared::{env, logger};
use tokio::net::{TcpListener, TcpStream};

use crate::config::WorkerConfig;
use crate::service::WorkerService;

/// Binds the worker endpoint and serves render and status calls until
/// `shutdown` resolves.
pub async fn run_worker(
    config: WorkerConfig,
    shutdown: impl Future<Output = ()>,
) -> NetworkingResult<()> {
    env::init();
    logger::init();

    let service = Arc::new(WorkerService::new(config.worker_id));

    let listener = match TcpListener::bind(&config.listen_address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", config.listen_address, e);
            return Err(e.into());
        }
    };
    info!(
        "Worker {} listening on {}",
        config.worker_id, config.listen_address
    );

    serve(listener, service, shutdown).await
}

/// Accept loop over an already bound listener. Each connection carries
/// one request and gets one reply.
pub async fn serve(
    listener: TcpListener,
    service: Arc<WorkerService>,
    shutdown: impl Future<Output = ()>,
) -> NetworkingResult<()> {
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Worker {} stopped", service.worker_id());
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
    service: &WorkerService,
) -> NetworkingResult<()> {
    debug!("Handling new connection...");

    let reply = match read_message::<WorkerRpc>(socket).await {
        Ok(WorkerRpc::ProcessRenderRequest(request)) => {
            match service.process_render_request(request) {
                Ok(response) => WorkerReply::RenderResponse(response),
                Err(fault) => {
                    error!("Render request failed: {}", fault);
                    WorkerReply::Fault(fault)
                }
            }
        }
        Ok(WorkerRpc::GetWorkerStatus(_)) => WorkerReply::WorkerStatus(service.worker_status()),
        Err(e) => {
            error!("Failed to decode request: {}", e);
            WorkerReply::Fault(RpcFault::internal("Internal processing error"))
        }
    };

    send_message(socket, &reply).await
}

#[cfg(test)]
mod tests {
    use super::*;

    use shared::models::status::status_request::StatusRequest;
    use shared::networking::call;

    #[tokio::test]
    async fn served_workers_answer_status_calls() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let service = Arc::new(WorkerService::new(99));

        tokio::spawn(async move {
            _ = serve(listener, service, std::future::pending()).await;
        });

        let reply: WorkerReply = call(&address, &WorkerRpc::GetWorkerStatus(StatusRequest {}))
            .await
            .unwrap();

        match reply {
            WorkerReply::WorkerStatus(status) => assert_eq!(status.worker_id, 99),
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[tokio::test]
    async fn undecodable_requests_fault_instead_of_hanging() {
        use tokio::io::AsyncWriteExt;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let service = Arc::new(WorkerService::new(1));

        tokio::spawn(async move {
            _ = serve(listener, service, std::future::pending()).await;
        });

        let mut socket = TcpStream::connect(address).await.unwrap();
        let garbage = br#"{"NoSuchOperation":{}}"#;
        socket.write_u32(garbage.len() as u32).await.unwrap();
        socket.write_all(garbage).await.unwrap();
        socket.flush().await.unwrap();

        let reply: WorkerReply = read_message(&mut socket).await.unwrap();
        match reply {
            WorkerReply::Fault(fault) => {
                assert_eq!(fault.message, "Internal processing error");
            }
            other => panic!("unexpected reply: {:?}", other),
        }
    }
}
