use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::Result,
    models::{Category, CategoryFields, CategoryWithCount},
    utils::slug::slug_or_derive,
};

/// Persistence operations over `categories`.
///
/// Lookups return `None` for missing or inactive rows; store failures come
/// back as errors. Write methods surface uniqueness collisions as
/// [`AppError::DuplicateKey`](crate::error::AppError::DuplicateKey).
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Active categories ordered by name.
    async fn list_active(&self) -> Result<Vec<Category>>;

    async fn get_by_id(&self, id: i32) -> Result<Option<Category>>;

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>>;

    /// Inserts a category, deriving the slug from the name when none is given.
    async fn create(&self, fields: &CategoryFields) -> Result<Category>;

    /// Replaces every writable column. `None` when no row has this id.
    async fn update(&self, id: i32, fields: &CategoryFields) -> Result<Option<Category>>;

    /// Soft delete. Returns whether the row exists, so repeating it on an
    /// inactive category still reports `true`.
    async fn delete(&self, id: i32) -> Result<bool>;

    async fn hard_delete(&self, id: i32) -> Result<bool>;

    /// Active categories with the number of active products in each.
    async fn list_with_product_count(&self) -> Result<Vec<CategoryWithCount>>;
}

#[derive(Clone)]
pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn list_active(&self) -> Result<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE is_active = TRUE ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE id = $1 AND is_active = TRUE",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE slug = $1 AND is_active = TRUE",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    async fn create(&self, fields: &CategoryFields) -> Result<Category> {
        let slug = slug_or_derive(fields.slug.as_deref(), &fields.name);

        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, description, slug, is_active)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(slug)
        .bind(fields.is_active)
        .fetch_one(&self.pool)
        .await?;

        Ok(category)
    }

    async fn update(&self, id: i32, fields: &CategoryFields) -> Result<Option<Category>> {
        let slug = slug_or_derive(fields.slug.as_deref(), &fields.name);

        let category = sqlx::query_as::<_, Category>(
            "UPDATE categories
             SET name = $1, description = $2, slug = $3, is_active = $4, updated_at = NOW()
             WHERE id = $5
             RETURNING *",
        )
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(slug)
        .bind(fields.is_active)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    async fn delete(&self, id: i32) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE categories SET is_active = FALSE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn hard_delete(&self, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_with_product_count(&self) -> Result<Vec<CategoryWithCount>> {
        let categories = sqlx::query_as::<_, CategoryWithCount>(
            "SELECT
                c.*,
                COUNT(p.id)::bigint AS product_count
             FROM categories c
             LEFT JOIN products p ON p.category_id = c.id AND p.is_active = TRUE
             WHERE c.is_active = TRUE
             GROUP BY c.id
             ORDER BY c.name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }
}
