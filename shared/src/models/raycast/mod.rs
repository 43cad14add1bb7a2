pub mod raycast_request;
pub mod raycast_response;
