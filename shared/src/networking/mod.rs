pub mod envelope;
pub mod error;
pub mod result;

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use self::error::NetworkingError;
use self::result::NetworkingResult;

/// Largest accepted frame payload in bytes.
pub const MAX_FRAME_LEN: u32 = 16 * 1024 * 1024;

pub async fn write_frame(stream: &mut TcpStream, payload: &[u8]) -> NetworkingResult<()> {
    if payload.len() > MAX_FRAME_LEN as usize {
        return Err(NetworkingError::FrameTooLarge(payload.len()));
    }

    stream.write_u32(payload.len() as u32).await?;
    stream.write_all(payload).await?;
    Ok(stream.flush().await?)
}

pub async fn read_frame(stream: &mut TcpStream) -> NetworkingResult<Vec<u8>> {
    let mut length_bytes = [0u8; 4];
    stream.read_exact(&mut length_bytes).await?;
    let length = u32::from_be_bytes(length_bytes);

    if length > MAX_FRAME_LEN {
        return Err(NetworkingError::FrameTooLarge(length as usize));
    }

    let mut payload = vec![0u8; length as usize];
    stream.read_exact(&mut payload).await?;
    Ok(payload)
}

pub async fn send_message<T: Serialize>(stream: &mut TcpStream, message: &T) -> NetworkingResult<()> {
    let payload = serde_json::to_vec(message)?;
    write_frame(stream, &payload).await
}

pub async fn read_message<T: DeserializeOwned>(stream: &mut TcpStream) -> NetworkingResult<T> {
    let payload = read_frame(stream).await?;
    Ok(serde_json::from_slice(&payload)?)
}

/// One request and reply exchange over a fresh connection.
pub async fn call<Req, Reply>(endpoint: &str, request: &Req) -> NetworkingResult<Reply>
where
    Req: Serialize,
    Reply: DeserializeOwned,
{
    debug!("Dialing {}...", endpoint);
    let mut stream = TcpStream::connect(endpoint).await?;
    send_message(&mut stream, request).await?;
    read_message(&mut stream).await
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::net::TcpListener;

    use crate::models::status::status_request::StatusRequest;
    use crate::networking::envelope::{WorkerReply, WorkerRpc};

    #[tokio::test]
    async fn messages_round_trip_over_a_socket() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_message::<WorkerRpc>(&mut socket).await.unwrap()
        });

        let mut client = TcpStream::connect(address).await.unwrap();
        send_message(&mut client, &WorkerRpc::GetWorkerStatus(StatusRequest {}))
            .await
            .unwrap();

        let received = server.await.unwrap();
        assert!(matches!(received, WorkerRpc::GetWorkerStatus(_)));
    }

    #[tokio::test]
    async fn call_exchanges_a_request_for_a_reply() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let _rpc: WorkerRpc = read_message(&mut socket).await.unwrap();
            send_message(
                &mut socket,
                &WorkerReply::Fault(super::envelope::RpcFault::internal("nothing to do")),
            )
            .await
            .unwrap();
        });

        let reply: WorkerReply = call(&address, &WorkerRpc::GetWorkerStatus(StatusRequest {}))
            .await
            .unwrap();
        assert!(matches!(reply, WorkerReply::Fault(_)));
    }

    #[tokio::test]
    async fn oversized_length_prefixes_are_rejected() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_frame(&mut socket).await
        });

        let mut client = TcpStream::connect(address).await.unwrap();
        client.write_u32(MAX_FRAME_LEN + 1).await.unwrap();
        client.flush().await.unwrap();

        let outcome = server.await.unwrap();
        assert!(matches!(outcome, Err(NetworkingError::FrameTooLarge(_))));
    }

    #[tokio::test]
    async fn oversized_payloads_are_refused_before_writing() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        let mut client = TcpStream::connect(address).await.unwrap();
        let payload = vec![0u8; MAX_FRAME_LEN as usize + 1];
        let outcome = write_frame(&mut client, &payload).await;
        assert!(matches!(outcome, Err(NetworkingError::FrameTooLarge(_))));
    }
}
