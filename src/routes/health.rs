use axum::{Json, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use serde_json::json;

/// Liveness only: never touches the database.
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Server is running",
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
}

pub async fn api_info() -> impl IntoResponse {
    Json(json!({
        "message": "Catalog API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "categories": "/api/categories",
            "products": "/api/products",
            "health": "/api/health",
        },
    }))
}
