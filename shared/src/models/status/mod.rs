pub mod master_status;
pub mod status_request;
pub mod worker_info;
pub mod worker_status;
