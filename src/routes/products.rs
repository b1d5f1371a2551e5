use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    error::{AppError, Result},
    models::{
        ApiResponse, DeleteParams, DeleteResult, Product, ProductRequest, SearchParams,
        StockRequest,
    },
    utils::extractors::{JsonBody, PathParam, QueryParams},
};

fn product_not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Product with id {} not found", id))
}

fn product_write_error(err: AppError) -> AppError {
    match err {
        AppError::ForeignKeyViolation(_) => AppError::ForeignKeyViolation(
            "The specified category does not exist".to_string(),
        ),
        AppError::DuplicateKey(_) => {
            AppError::DuplicateKey("A product with this SKU already exists".to_string())
        }
        other => other,
    }
}

pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Product>>>> {
    let products = state.products.list_active().await?;
    Ok(Json(ApiResponse::success(products)))
}

pub async fn list_featured_products(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Product>>>> {
    let products = state.products.list_featured().await?;
    Ok(Json(ApiResponse::success(products)))
}

pub async fn list_products_by_category(
    State(state): State<AppState>,
    PathParam(category_id): PathParam<i32>,
) -> Result<Json<ApiResponse<Vec<Product>>>> {
    let products = state.products.get_by_category(category_id).await?;
    Ok(Json(ApiResponse::success(products)))
}

pub async fn list_products_by_category_slug(
    State(state): State<AppState>,
    PathParam(slug): PathParam<String>,
) -> Result<Json<ApiResponse<Vec<Product>>>> {
    let products = state.products.get_by_category_slug(&slug).await?;
    Ok(Json(ApiResponse::success(products)))
}

pub async fn search_products(
    State(state): State<AppState>,
    PathParam(term): PathParam<String>,
) -> Result<Json<ApiResponse<Vec<Product>>>> {
    let products = state.products.search(&term).await?;
    Ok(Json(ApiResponse::success(products)))
}

pub async fn search_products_by_query(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<SearchParams>,
) -> Result<Json<ApiResponse<Vec<Product>>>> {
    let products = state.products.search(&params.q).await?;
    Ok(Json(ApiResponse::success(products)))
}

pub async fn get_product(
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
) -> Result<Json<ApiResponse<Product>>> {
    let product = state
        .products
        .get_by_id(id)
        .await?
        .ok_or_else(|| product_not_found(id))?;

    Ok(Json(ApiResponse::success(product)))
}

pub async fn create_product(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Product>>)> {
    let fields = payload.validate()?;

    let product = state
        .products
        .create(&fields)
        .await
        .map_err(product_write_error)?;

    tracing::info!("Created product {} ({})", product.id, product.name);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(product).with_message("Product created successfully")),
    ))
}

pub async fn update_product(
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
    JsonBody(payload): JsonBody<ProductRequest>,
) -> Result<Json<ApiResponse<Product>>> {
    let fields = payload.validate()?;

    let product = state
        .products
        .update(id, &fields)
        .await
        .map_err(product_write_error)?
        .ok_or_else(|| product_not_found(id))?;

    Ok(Json(
        ApiResponse::success(product).with_message("Product updated successfully"),
    ))
}

pub async fn update_product_stock(
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
    JsonBody(payload): JsonBody<StockRequest>,
) -> Result<Json<ApiResponse<Product>>> {
    let quantity = payload.validate()?;

    let product = state
        .products
        .update_stock(id, quantity)
        .await?
        .ok_or_else(|| product_not_found(id))?;

    Ok(Json(
        ApiResponse::success(product).with_message("Stock updated successfully"),
    ))
}

pub async fn delete_product(
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
    QueryParams(params): QueryParams<DeleteParams>,
) -> Result<Json<ApiResponse<DeleteResult>>> {
    let deleted = if params.hard {
        state.products.hard_delete(id).await?
    } else {
        state.products.delete(id).await?
    };

    if !deleted {
        return Err(product_not_found(id));
    }

    Ok(Json(
        ApiResponse::success(DeleteResult {
            id,
            hard: params.hard,
        })
        .with_message("Product deleted successfully"),
    ))
}
