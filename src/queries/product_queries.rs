use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::Result,
    models::{Product, ProductFields},
};

const FEATURED_LIMIT: i64 = 10;

/// Columns of a product joined with its category. Expects the product
/// relation aliased `p` and the category `c`.
const PRODUCT_COLUMNS: &str = "p.id, p.name, p.description, p.price, p.sale_price,
        p.stock_quantity, p.sku, p.category_id, p.image_url, p.is_active, p.is_featured,
        p.created_at, p.updated_at,
        c.name AS category_name, c.slug AS category_slug";

/// Persistence operations over `products`.
///
/// Every read joins the category so callers get `category_name` and
/// `category_slug` alongside the product (both null when uncategorized).
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn list_active(&self) -> Result<Vec<Product>>;

    async fn get_by_id(&self, id: i32) -> Result<Option<Product>>;

    async fn get_by_category(&self, category_id: i32) -> Result<Vec<Product>>;

    async fn get_by_category_slug(&self, slug: &str) -> Result<Vec<Product>>;

    /// Case-insensitive substring match on name or description. An empty term
    /// matches every active product.
    async fn search(&self, term: &str) -> Result<Vec<Product>>;

    /// Newest featured products, at most ten.
    async fn list_featured(&self) -> Result<Vec<Product>>;

    async fn create(&self, fields: &ProductFields) -> Result<Product>;

    async fn update(&self, id: i32, fields: &ProductFields) -> Result<Option<Product>>;

    /// Soft delete. Returns whether the row exists.
    async fn delete(&self, id: i32) -> Result<bool>;

    async fn hard_delete(&self, id: i32) -> Result<bool>;

    /// Removes every product referencing the category, returning how many.
    async fn delete_by_category(&self, category_id: i32) -> Result<u64>;

    async fn update_stock(&self, id: i32, quantity: i32) -> Result<Option<Product>>;
}

#[derive(Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_list(&self, filter: &str, bind: Option<&str>) -> Result<Vec<Product>> {
        let query = format!(
            "SELECT {PRODUCT_COLUMNS}
             FROM products p
             LEFT JOIN categories c ON p.category_id = c.id
             WHERE {filter}
             ORDER BY p.name ASC"
        );

        let mut q = sqlx::query_as::<_, Product>(&query);
        if let Some(value) = bind {
            q = q.bind(value);
        }

        Ok(q.fetch_all(&self.pool).await?)
    }
}

/// Wraps `term` for `ILIKE`, matching LIKE metacharacters literally.
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn list_active(&self) -> Result<Vec<Product>> {
        self.fetch_list("p.is_active = TRUE", None).await
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Product>> {
        let query = format!(
            "SELECT {PRODUCT_COLUMNS}
             FROM products p
             LEFT JOIN categories c ON p.category_id = c.id
             WHERE p.id = $1 AND p.is_active = TRUE"
        );

        let product = sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    async fn get_by_category(&self, category_id: i32) -> Result<Vec<Product>> {
        let query = format!(
            "SELECT {PRODUCT_COLUMNS}
             FROM products p
             LEFT JOIN categories c ON p.category_id = c.id
             WHERE p.category_id = $1 AND p.is_active = TRUE
             ORDER BY p.name ASC"
        );

        let products = sqlx::query_as::<_, Product>(&query)
            .bind(category_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    async fn get_by_category_slug(&self, slug: &str) -> Result<Vec<Product>> {
        self.fetch_list("c.slug = $1 AND p.is_active = TRUE", Some(slug))
            .await
    }

    async fn search(&self, term: &str) -> Result<Vec<Product>> {
        let pattern = contains_pattern(term);
        self.fetch_list(
            "(p.name ILIKE $1 OR p.description ILIKE $1) AND p.is_active = TRUE",
            Some(pattern.as_str()),
        )
        .await
    }

    async fn list_featured(&self) -> Result<Vec<Product>> {
        let query = format!(
            "SELECT {PRODUCT_COLUMNS}
             FROM products p
             LEFT JOIN categories c ON p.category_id = c.id
             WHERE p.is_featured = TRUE AND p.is_active = TRUE
             ORDER BY p.created_at DESC, p.id DESC
             LIMIT $1"
        );

        let products = sqlx::query_as::<_, Product>(&query)
            .bind(FEATURED_LIMIT)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    async fn create(&self, fields: &ProductFields) -> Result<Product> {
        let query = format!(
            "WITH p AS (
                INSERT INTO products (
                    name, description, price, sale_price, stock_quantity,
                    sku, category_id, image_url, is_active, is_featured
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                RETURNING *
             )
             SELECT {PRODUCT_COLUMNS}
             FROM p
             LEFT JOIN categories c ON p.category_id = c.id"
        );

        let product = sqlx::query_as::<_, Product>(&query)
            .bind(&fields.name)
            .bind(&fields.description)
            .bind(fields.price)
            .bind(fields.sale_price)
            .bind(fields.stock_quantity)
            .bind(&fields.sku)
            .bind(fields.category_id)
            .bind(&fields.image_url)
            .bind(fields.is_active)
            .bind(fields.is_featured)
            .fetch_one(&self.pool)
            .await?;

        Ok(product)
    }

    async fn update(&self, id: i32, fields: &ProductFields) -> Result<Option<Product>> {
        let query = format!(
            "WITH p AS (
                UPDATE products SET
                    name = $1, description = $2, price = $3, sale_price = $4,
                    stock_quantity = $5, sku = $6, category_id = $7, image_url = $8,
                    is_active = $9, is_featured = $10, updated_at = NOW()
                WHERE id = $11
                RETURNING *
             )
             SELECT {PRODUCT_COLUMNS}
             FROM p
             LEFT JOIN categories c ON p.category_id = c.id"
        );

        let product = sqlx::query_as::<_, Product>(&query)
            .bind(&fields.name)
            .bind(&fields.description)
            .bind(fields.price)
            .bind(fields.sale_price)
            .bind(fields.stock_quantity)
            .bind(&fields.sku)
            .bind(fields.category_id)
            .bind(&fields.image_url)
            .bind(fields.is_active)
            .bind(fields.is_featured)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    async fn delete(&self, id: i32) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE products SET is_active = FALSE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn hard_delete(&self, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_category(&self, category_id: i32) -> Result<u64> {
        let result = sqlx::query("DELETE FROM products WHERE category_id = $1")
            .bind(category_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn update_stock(&self, id: i32, quantity: i32) -> Result<Option<Product>> {
        let query = format!(
            "WITH p AS (
                UPDATE products SET stock_quantity = $1, updated_at = NOW()
                WHERE id = $2 AND is_active = TRUE
                RETURNING *
             )
             SELECT {PRODUCT_COLUMNS}
             FROM p
             LEFT JOIN categories c ON p.category_id = c.id"
        );

        let product = sqlx::query_as::<_, Product>(&query)
            .bind(quantity)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }
}
