mod categories;
mod health;
mod products;


use axum::{
    Json, Router,
    extract::OriginalUri,
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::{MethodRouter, get, patch},
};
use serde_json::json;

use crate::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(health::api_info))
        .route("/api/health", get(health::health_check))
        .nest("/api/categories", category_routes())
        .nest("/api/products", product_routes())
        // Nesting does not match a trailing slash.
        .route("/api/categories/", category_collection())
        .route("/api/products/", product_collection())
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
}

fn category_collection() -> MethodRouter<AppState> {
    get(categories::list_categories).post(categories::create_category)
}

fn product_collection() -> MethodRouter<AppState> {
    get(products::list_products).post(products::create_product)
}

fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", category_collection())
        .route("/with-counts", get(categories::list_categories_with_counts))
        .route("/slug/{slug}", get(categories::get_category_by_slug))
        .route(
            "/{id}",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", product_collection())
        .route("/featured", get(products::list_featured_products))
        .route("/category/{category_id}", get(products::list_products_by_category))
        .route(
            "/category/slug/{slug}",
            get(products::list_products_by_category_slug),
        )
        .route("/search", get(products::search_products_by_query))
        .route("/search/{term}", get(products::search_products))
        .route(
            "/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/{id}/stock", patch(products::update_product_stock))
}

async fn not_found(OriginalUri(uri): OriginalUri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "message": "Route not found",
            "path": uri.to_string(),
        })),
    )
}

async fn method_not_allowed(method: Method, OriginalUri(uri): OriginalUri) -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({
            "success": false,
            "message": format!("Method {method} not allowed"),
            "path": uri.to_string(),
        })),
    )
}
