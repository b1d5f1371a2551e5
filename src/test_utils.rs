//! In-memory repositories for router tests. They enforce the same unique and
//! foreign-key constraints as the migrations, including `ON DELETE SET NULL`
//! on `products.category_id`.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use axum::Router;
use chrono::Utc;

use crate::{
    AppState,
    app,
    config::{AppConfig, CorsConfig, DatabaseConfig, Environment, ServerConfig},
    error::{AppError, Result},
    models::{Category, CategoryFields, CategoryWithCount, Product, ProductFields},
    queries::{CategoryRepository, ProductRepository},
    utils::slug::slug_or_derive,
};

#[derive(Default)]
struct Tables {
    categories: Vec<Category>,
    products: Vec<Product>,
    next_category_id: i32,
    next_product_id: i32,
    fail_product_deletes: bool,
}

#[derive(Clone, Default)]
pub(crate) struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    pub(crate) fn state(&self) -> AppState {
        AppState::new(
            Arc::new(MemoryCategories(self.clone())),
            Arc::new(MemoryProducts(self.clone())),
        )
    }

    pub(crate) fn router(&self) -> Router {
        app::router(&test_config(Environment::Production), self.state()).unwrap()
    }

    /// Makes every product delete fail like a lost connection.
    pub(crate) fn fail_product_deletes(&self) {
        self.lock().fail_product_deletes = true;
    }

    /// Category rows regardless of `is_active`.
    pub(crate) fn category_rows(&self) -> Vec<Category> {
        self.lock().categories.clone()
    }

    /// Product rows regardless of `is_active`.
    pub(crate) fn product_rows(&self) -> Vec<Product> {
        self.lock().products.clone()
    }
}

pub(crate) fn test_config(environment: Environment) -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            max_body_size: 64 * 1024,
        },
        database: DatabaseConfig {
            url: "postgres://localhost/unused".to_string(),
            max_connections: 1,
            acquire_timeout: std::time::Duration::from_secs(1),
        },
        cors: CorsConfig {
            allowed_origins: vec!["http://localhost:5173".to_string()],
        },
        environment,
    }
}

fn store_failure() -> AppError {
    AppError::StoreFailure(sqlx::Error::PoolClosed)
}

impl Tables {
    fn check_category_unique(&self, id: Option<i32>, name: &str, slug: &str) -> Result<()> {
        for other in self.categories.iter().filter(|c| Some(c.id) != id) {
            if other.name == name {
                return Err(AppError::DuplicateKey("categories_name_key".to_string()));
            }
            if other.slug.as_deref() == Some(slug) {
                return Err(AppError::DuplicateKey("categories_slug_key".to_string()));
            }
        }
        Ok(())
    }

    fn check_product_constraints(&self, id: Option<i32>, fields: &ProductFields) -> Result<()> {
        if let Some(category_id) = fields.category_id {
            if !self.categories.iter().any(|c| c.id == category_id) {
                return Err(AppError::ForeignKeyViolation(
                    "products_category_id_fkey".to_string(),
                ));
            }
        }

        if let Some(sku) = fields.sku.as_deref() {
            let taken = self
                .products
                .iter()
                .any(|p| Some(p.id) != id && p.sku.as_deref() == Some(sku));
            if taken {
                return Err(AppError::DuplicateKey("products_sku_key".to_string()));
            }
        }

        Ok(())
    }

    fn joined(&self, product: &Product) -> Product {
        let category = product
            .category_id
            .and_then(|id| self.categories.iter().find(|c| c.id == id));

        Product {
            category_name: category.map(|c| c.name.clone()),
            category_slug: category.and_then(|c| c.slug.clone()),
            ..product.clone()
        }
    }

    fn active_products_where(&self, keep: impl Fn(&Product) -> bool) -> Vec<Product> {
        let mut products: Vec<Product> = self
            .products
            .iter()
            .filter(|p| p.is_active && keep(*p))
            .map(|p| self.joined(p))
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        products
    }
}

pub(crate) struct MemoryCategories(MemoryStore);

#[async_trait]
impl CategoryRepository for MemoryCategories {
    async fn list_active(&self) -> Result<Vec<Category>> {
        let tables = self.0.lock();
        let mut categories: Vec<Category> = tables
            .categories
            .iter()
            .filter(|c| c.is_active)
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Category>> {
        let tables = self.0.lock();
        Ok(tables
            .categories
            .iter()
            .find(|c| c.id == id && c.is_active)
            .cloned())
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let tables = self.0.lock();
        Ok(tables
            .categories
            .iter()
            .find(|c| c.slug.as_deref() == Some(slug) && c.is_active)
            .cloned())
    }

    async fn create(&self, fields: &CategoryFields) -> Result<Category> {
        let mut tables = self.0.lock();
        let slug = slug_or_derive(fields.slug.as_deref(), &fields.name);
        tables.check_category_unique(None, &fields.name, &slug)?;

        tables.next_category_id += 1;
        let now = Utc::now();
        let category = Category {
            id: tables.next_category_id,
            name: fields.name.clone(),
            description: fields.description.clone(),
            slug: Some(slug),
            is_active: fields.is_active,
            created_at: now,
            updated_at: now,
        };
        tables.categories.push(category.clone());
        Ok(category)
    }

    async fn update(&self, id: i32, fields: &CategoryFields) -> Result<Option<Category>> {
        let mut tables = self.0.lock();
        let slug = slug_or_derive(fields.slug.as_deref(), &fields.name);
        if !tables.categories.iter().any(|c| c.id == id) {
            return Ok(None);
        }
        tables.check_category_unique(Some(id), &fields.name, &slug)?;

        let category = tables.categories.iter_mut().find(|c| c.id == id);
        Ok(category.map(|category| {
            category.name = fields.name.clone();
            category.description = fields.description.clone();
            category.slug = Some(slug);
            category.is_active = fields.is_active;
            category.updated_at = Utc::now();
            category.clone()
        }))
    }

    async fn delete(&self, id: i32) -> Result<bool> {
        let mut tables = self.0.lock();
        match tables.categories.iter_mut().find(|c| c.id == id) {
            Some(category) => {
                category.is_active = false;
                category.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn hard_delete(&self, id: i32) -> Result<bool> {
        let mut tables = self.0.lock();
        let before = tables.categories.len();
        tables.categories.retain(|c| c.id != id);
        if tables.categories.len() == before {
            return Ok(false);
        }

        for product in tables.products.iter_mut() {
            if product.category_id == Some(id) {
                product.category_id = None;
            }
        }
        Ok(true)
    }

    async fn list_with_product_count(&self) -> Result<Vec<CategoryWithCount>> {
        let tables = self.0.lock();
        let mut categories: Vec<CategoryWithCount> = tables
            .categories
            .iter()
            .filter(|c| c.is_active)
            .map(|c| CategoryWithCount {
                category: c.clone(),
                product_count: tables
                    .products
                    .iter()
                    .filter(|p| p.is_active && p.category_id == Some(c.id))
                    .count() as i64,
            })
            .collect();
        categories.sort_by(|a, b| a.category.name.cmp(&b.category.name));
        Ok(categories)
    }
}

pub(crate) struct MemoryProducts(MemoryStore);

#[async_trait]
impl ProductRepository for MemoryProducts {
    async fn list_active(&self) -> Result<Vec<Product>> {
        Ok(self.0.lock().active_products_where(|_| true))
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Product>> {
        let tables = self.0.lock();
        Ok(tables
            .products
            .iter()
            .find(|p| p.id == id && p.is_active)
            .map(|p| tables.joined(p)))
    }

    async fn get_by_category(&self, category_id: i32) -> Result<Vec<Product>> {
        Ok(self
            .0
            .lock()
            .active_products_where(|p| p.category_id == Some(category_id)))
    }

    async fn get_by_category_slug(&self, slug: &str) -> Result<Vec<Product>> {
        let tables = self.0.lock();
        let ids: Vec<i32> = tables
            .categories
            .iter()
            .filter(|c| c.slug.as_deref() == Some(slug))
            .map(|c| c.id)
            .collect();
        Ok(tables.active_products_where(|p| p.category_id.is_some_and(|id| ids.contains(&id))))
    }

    async fn search(&self, term: &str) -> Result<Vec<Product>> {
        let needle = term.to_lowercase();
        Ok(self.0.lock().active_products_where(|p| {
            p.name.to_lowercase().contains(&needle)
                || p
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        }))
    }

    async fn list_featured(&self) -> Result<Vec<Product>> {
        let tables = self.0.lock();
        let mut products: Vec<Product> = tables
            .products
            .iter()
            .filter(|p| p.is_active && p.is_featured)
            .map(|p| tables.joined(p))
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        products.truncate(10);
        Ok(products)
    }

    async fn create(&self, fields: &ProductFields) -> Result<Product> {
        let mut tables = self.0.lock();
        tables.check_product_constraints(None, fields)?;

        tables.next_product_id += 1;
        let now = Utc::now();
        let product = Product {
            id: tables.next_product_id,
            name: fields.name.clone(),
            description: fields.description.clone(),
            price: fields.price,
            sale_price: fields.sale_price,
            stock_quantity: fields.stock_quantity,
            sku: fields.sku.clone(),
            category_id: fields.category_id,
            image_url: fields.image_url.clone(),
            is_active: fields.is_active,
            is_featured: fields.is_featured,
            created_at: now,
            updated_at: now,
            category_name: None,
            category_slug: None,
        };
        tables.products.push(product.clone());
        Ok(tables.joined(&product))
    }

    async fn update(&self, id: i32, fields: &ProductFields) -> Result<Option<Product>> {
        let mut tables = self.0.lock();
        if !tables.products.iter().any(|p| p.id == id) {
            return Ok(None);
        }
        tables.check_product_constraints(Some(id), fields)?;

        let Some(product) = tables.products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        product.name = fields.name.clone();
        product.description = fields.description.clone();
        product.price = fields.price;
        product.sale_price = fields.sale_price;
        product.stock_quantity = fields.stock_quantity;
        product.sku = fields.sku.clone();
        product.category_id = fields.category_id;
        product.image_url = fields.image_url.clone();
        product.is_active = fields.is_active;
        product.is_featured = fields.is_featured;
        product.updated_at = Utc::now();
        let updated = product.clone();

        Ok(Some(tables.joined(&updated)))
    }

    async fn delete(&self, id: i32) -> Result<bool> {
        let mut tables = self.0.lock();
        if tables.fail_product_deletes {
            return Err(store_failure());
        }
        match tables.products.iter_mut().find(|p| p.id == id) {
            Some(product) => {
                product.is_active = false;
                product.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn hard_delete(&self, id: i32) -> Result<bool> {
        let mut tables = self.0.lock();
        if tables.fail_product_deletes {
            return Err(store_failure());
        }
        let before = tables.products.len();
        tables.products.retain(|p| p.id != id);
        Ok(tables.products.len() < before)
    }

    async fn delete_by_category(&self, category_id: i32) -> Result<u64> {
        let mut tables = self.0.lock();
        if tables.fail_product_deletes {
            return Err(store_failure());
        }
        let before = tables.products.len();
        tables
            .products
            .retain(|p| p.category_id != Some(category_id));
        Ok((before - tables.products.len()) as u64)
    }

    async fn update_stock(&self, id: i32, quantity: i32) -> Result<Option<Product>> {
        let mut tables = self.0.lock();
        let Some(product) = tables
            .products
            .iter_mut()
            .find(|p| p.id == id && p.is_active)
        else {
            return Ok(None);
        };
        product.stock_quantity = quantity;
        product.updated_at = Utc::now();
        let updated = product.clone();

        Ok(Some(tables.joined(&updated)))
    }
}
