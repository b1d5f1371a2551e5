use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    error::{AppError, Result},
    models::{
        ApiResponse, Category, CategoryDeleteResult, CategoryRequest, CategoryWithCount,
        DeleteParams,
    },
    utils::extractors::{JsonBody, PathParam, QueryParams},
};

fn category_not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Category with id {} not found", id))
}

fn duplicate_category(err: AppError) -> AppError {
    match err {
        AppError::DuplicateKey(_) => AppError::DuplicateKey(
            "A category with this name or slug already exists".to_string(),
        ),
        other => other,
    }
}

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Category>>>> {
    let categories = state.categories.list_active().await?;
    Ok(Json(ApiResponse::success(categories)))
}

pub async fn list_categories_with_counts(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CategoryWithCount>>>> {
    let categories = state.categories.list_with_product_count().await?;
    Ok(Json(ApiResponse::success(categories)))
}

pub async fn get_category(
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
) -> Result<Json<ApiResponse<Category>>> {
    let category = state
        .categories
        .get_by_id(id)
        .await?
        .ok_or_else(|| category_not_found(id))?;

    Ok(Json(ApiResponse::success(category)))
}

pub async fn get_category_by_slug(
    State(state): State<AppState>,
    PathParam(slug): PathParam<String>,
) -> Result<Json<ApiResponse<Category>>> {
    let category = state
        .categories
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category with slug '{}' not found", slug)))?;

    Ok(Json(ApiResponse::success(category)))
}

pub async fn create_category(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CategoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Category>>)> {
    let fields = payload.validate()?;

    let category = state
        .categories
        .create(&fields)
        .await
        .map_err(duplicate_category)?;

    tracing::info!("Created category {} ({})", category.id, category.name);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(category).with_message("Category created successfully")),
    ))
}

pub async fn update_category(
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
    JsonBody(payload): JsonBody<CategoryRequest>,
) -> Result<Json<ApiResponse<Category>>> {
    let fields = payload.validate()?;

    let category = state
        .categories
        .update(id, &fields)
        .await
        .map_err(duplicate_category)?
        .ok_or_else(|| category_not_found(id))?;

    Ok(Json(
        ApiResponse::success(category).with_message("Category updated successfully"),
    ))
}

/// Removes the category's products first, then the category itself. The two
/// steps are independent statements: if the first fails the category is left
/// untouched, if the second fails the products stay removed.
pub async fn delete_category(
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
    QueryParams(params): QueryParams<DeleteParams>,
) -> Result<Json<ApiResponse<CategoryDeleteResult>>> {
    let products_removed = state.products.delete_by_category(id).await?;

    let deleted = if params.hard {
        state.categories.hard_delete(id).await?
    } else {
        state.categories.delete(id).await?
    };

    if !deleted {
        return Err(category_not_found(id));
    }

    tracing::info!(
        "Deleted category {} (hard: {}) and {} related products",
        id,
        params.hard,
        products_removed
    );

    Ok(Json(
        ApiResponse::success(CategoryDeleteResult {
            id,
            hard: params.hard,
            products_removed,
        })
        .with_message("Category and related products deleted"),
    ))
}
