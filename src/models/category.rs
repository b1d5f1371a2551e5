use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::check_length;
use crate::error::{AppError, Result};

const NAME_MAX_CHARS: usize = 100;
const SLUG_MAX_CHARS: usize = 120;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CategoryWithCount {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub category: Category,
    pub product_count: i64,
}

/// Body of `POST /api/categories` and `PUT /api/categories/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub is_active: Option<bool>,
}

/// Validated category columns, written as a whole on create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryFields {
    pub name: String,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub is_active: bool,
}

impl CategoryRequest {
    pub fn validate(self) -> Result<CategoryFields> {
        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AppError::InvalidInput("Category name is required".to_string()))?
            .to_string();
        check_length("Category name", Some(name.as_str()), NAME_MAX_CHARS)?;

        let slug = self
            .slug
            .map(|slug| slug.trim().to_string())
            .filter(|slug| !slug.is_empty());
        check_length("Slug", slug.as_deref(), SLUG_MAX_CHARS)?;

        Ok(CategoryFields {
            name,
            description: self.description,
            slug,
            is_active: self.is_active.unwrap_or(true),
        })
    }
}
