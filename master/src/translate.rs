use shared::models::raycast::raycast_request::RaycastRequest;
use shared::models::raycast::raycast_response::RaycastResponse;
use shared::models::render::render_request::RenderRequest;
use shared::models::render::render_response::RenderResponse;

/// Maps the client-facing request onto the worker schema. The client id
/// becomes the worker-side player id, everything else carries over.
pub fn render_request(request: &RaycastRequest) -> RenderRequest {
    RenderRequest {
        request_id: request.request_id.clone(),
        player_id: request.client_id.clone(),
        player: request.player.clone(),
        screen_width: request.screen_width,
        screen_height: request.screen_height,
        fov: request.fov,
        start_column: request.start_column,
        end_column: request.end_column,
        map: request.map.clone(),
        map_width: request.map_width,
        map_height: request.map_height,
        timestamp: request.timestamp,
    }
}

/// Wraps a worker response for the client, annotating it with the
/// endpoint that served the request.
pub fn raycast_response(response: RenderResponse, worker_endpoint: String) -> RaycastResponse {
    RaycastResponse {
        request_id: response.request_id,
        client_id: response.player_id,
        worker_id: response.worker_id,
        worker_endpoint,
        success: true,
        error_message: String::new(),
        timestamp: response.timestamp,
        processing_time_ms: response.processing_time_ms,
        results: response.results,
    }
}
