use axum::Json;

/// Health check handler
///
/// The body is wrapped like any other success: `{"data":"ok",...}`.
pub async fn health_handler() -> Json<&'static str> {
    Json("ok")
}
