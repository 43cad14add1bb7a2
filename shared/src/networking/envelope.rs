use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::raycast::raycast_request::RaycastRequest;
use crate::models::raycast::raycast_response::RaycastResponse;
use crate::models::render::render_request::RenderRequest;
use crate::models::render::render_response::RenderResponse;
use crate::models::status::master_status::MasterStatus;
use crate::models::status::status_request::StatusRequest;
use crate::models::status::worker_status::WorkerStatus;

use super::error::NetworkingError;

/// Operations a worker accepts. Serialized as a single-key JSON object
/// keyed by the operation name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WorkerRpc {
    ProcessRenderRequest(RenderRequest),
    GetWorkerStatus(StatusRequest),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WorkerReply {
    RenderResponse(RenderResponse),
    WorkerStatus(WorkerStatus),
    Fault(RpcFault),
}

/// Operations the master gateway accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MasterRpc {
    ProcessRaycastRequest(RaycastRequest),
    GetMasterStatus(StatusRequest),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MasterReply {
    RaycastResponse(RaycastResponse),
    MasterStatus(MasterStatus),
    Fault(RpcFault),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FaultCode {
    Unavailable,
    DeadlineExceeded,
    InvalidArgument,
    Internal,
}

impl FaultCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultCode::Unavailable => "UNAVAILABLE",
            FaultCode::DeadlineExceeded => "DEADLINE_EXCEEDED",
            FaultCode::InvalidArgument => "INVALID_ARGUMENT",
            FaultCode::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for FaultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reply shared by both services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcFault {
    pub code: FaultCode,
    pub message: String,
}

impl RpcFault {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            code: FaultCode::Unavailable,
            message: message.into(),
        }
    }

    pub fn deadline_exceeded(message: impl Into<String>) -> Self {
        Self {
            code: FaultCode::DeadlineExceeded,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self {
            code: FaultCode::InvalidArgument,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: FaultCode::Internal,
            message: message.into(),
        }
    }
}

impl fmt::Display for RpcFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for RpcFault {}

impl From<NetworkingError> for RpcFault {
    fn from(error: NetworkingError) -> Self {
        let message = error.to_string();
        match error {
            NetworkingError::Io(_) => Self {
                code: FaultCode::Unavailable,
                message,
            },
            NetworkingError::Serialization(_) | NetworkingError::FrameTooLarge(_) => Self {
                code: FaultCode::Internal,
                message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpcs_serialize_as_single_key_objects() {
        let json = serde_json::to_value(WorkerRpc::GetWorkerStatus(StatusRequest {})).unwrap();
        assert_eq!(json, serde_json::json!({ "GetWorkerStatus": {} }));

        let json = serde_json::to_value(MasterRpc::GetMasterStatus(StatusRequest {})).unwrap();
        assert_eq!(json, serde_json::json!({ "GetMasterStatus": {} }));
    }

    #[test]
    fn fault_codes_serialize_screaming_snake_case() {
        let json = serde_json::to_value(FaultCode::DeadlineExceeded).unwrap();
        assert_eq!(json, serde_json::json!("DEADLINE_EXCEEDED"));

        let fault = RpcFault::unavailable("No workers available");
        let json = serde_json::to_value(&fault).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "code": "UNAVAILABLE", "message": "No workers available" })
        );
    }

    #[test]
    fn faults_round_trip_through_the_reply_envelope() {
        let reply = WorkerReply::Fault(RpcFault::invalid_argument("bad map"));
        let json = serde_json::to_string(&reply).unwrap();
        let parsed: WorkerReply = serde_json::from_str(&json).unwrap();

        match parsed {
            WorkerReply::Fault(fault) => {
                assert_eq!(fault.code, FaultCode::InvalidArgument);
                assert_eq!(fault.message, "bad map");
            }
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[test]
    fn io_failures_map_to_unavailable_and_the_rest_to_internal() {
        let io = NetworkingError::Io(std::io::Error::from(std::io::ErrorKind::ConnectionRefused));
        assert_eq!(RpcFault::from(io).code, FaultCode::Unavailable);

        let too_large = NetworkingError::FrameTooLarge(usize::MAX);
        assert_eq!(RpcFault::from(too_large).code, FaultCode::Internal);
    }
}
