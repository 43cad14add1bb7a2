pub mod column_result;
pub mod render_request;
pub mod render_response;
