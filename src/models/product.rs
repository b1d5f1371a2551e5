use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, prelude::FromPrimitive};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::check_length;
use crate::error::{AppError, Result};

/// Scale of the `NUMERIC(10, 2)` money columns.
const MONEY_SCALE: u32 = 2;
/// Smallest amount that no longer fits `NUMERIC(10, 2)`.
const MONEY_LIMIT: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

const NAME_MAX_CHARS: usize = 200;
const SKU_MAX_CHARS: usize = 100;
const IMAGE_URL_MAX_CHARS: usize = 500;

/// A product row joined with the name and slug of its category.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub sale_price: Option<Decimal>,
    pub stock_quantity: i32,
    pub sku: Option<String>,
    pub category_id: Option<i32>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
}

/// Body of `POST /api/products` and `PUT /api/products/{id}`.
///
/// Amounts are kept as raw JSON so that both numbers and numeric strings are
/// accepted, and anything else is reported as invalid input rather than a
/// deserialization failure.
#[derive(Debug, Default, Deserialize)]
pub struct ProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Value>,
    pub sale_price: Option<Value>,
    pub stock_quantity: Option<i64>,
    pub sku: Option<String>,
    pub category_id: Option<i32>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
}

/// Validated product columns, written as a whole on create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub stock_quantity: i32,
    pub sku: Option<String>,
    pub category_id: Option<i32>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub is_featured: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct StockRequest {
    pub quantity: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

impl ProductRequest {
    pub fn validate(self) -> Result<ProductFields> {
        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AppError::InvalidInput("Product name is required".to_string()))?
            .to_string();
        check_length("Product name", Some(name.as_str()), NAME_MAX_CHARS)?;

        let price = self
            .price
            .as_ref()
            .and_then(parse_amount)
            .filter(|price| price.is_sign_positive() && !price.is_zero())
            .ok_or_else(|| {
                AppError::InvalidInput("Price must be a positive number".to_string())
            })?;
        check_money_range("Price", price)?;

        let sale_price = match self.sale_price {
            None | Some(Value::Null) => None,
            Some(ref raw) => {
                let amount = parse_amount(raw)
                    .filter(|amount| !amount.is_sign_negative())
                    .ok_or_else(|| {
                        AppError::InvalidInput(
                            "Sale price must be a non-negative number".to_string(),
                        )
                    })?;
                check_money_range("Sale price", amount)?;
                Some(amount)
            }
        };

        let stock_quantity = match self.stock_quantity {
            None => 0,
            Some(quantity) => validate_quantity(quantity)?,
        };

        let sku = self
            .sku
            .map(|sku| sku.trim().to_string())
            .filter(|sku| !sku.is_empty());
        check_length("SKU", sku.as_deref(), SKU_MAX_CHARS)?;
        check_length("Image URL", self.image_url.as_deref(), IMAGE_URL_MAX_CHARS)?;

        Ok(ProductFields {
            name,
            description: self.description,
            price,
            sale_price,
            stock_quantity,
            sku,
            category_id: self.category_id,
            image_url: self.image_url,
            is_active: self.is_active.unwrap_or(true),
            is_featured: self.is_featured.unwrap_or(false),
        })
    }
}

impl StockRequest {
    pub fn validate(self) -> Result<i32> {
        let quantity = self
            .quantity
            .ok_or_else(|| AppError::InvalidInput("Quantity is required".to_string()))?;

        validate_quantity(quantity)
    }
}

fn validate_quantity(quantity: i64) -> Result<i32> {
    i32::try_from(quantity)
        .ok()
        .filter(|quantity| *quantity >= 0)
        .ok_or_else(|| {
            AppError::InvalidInput("Stock quantity must be a non-negative integer".to_string())
        })
}

fn check_money_range(field: &str, amount: Decimal) -> Result<()> {
    if amount >= MONEY_LIMIT {
        return Err(AppError::InvalidInput(format!(
            "{field} must be less than {MONEY_LIMIT}"
        )));
    }
    Ok(())
}

/// Reads a money amount from a JSON number or numeric string, rounded to the
/// column scale.
fn parse_amount(value: &Value) -> Option<Decimal> {
    let amount = match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(Decimal::from(i)),
            None => n.as_f64().and_then(Decimal::from_f64),
        },
        Value::String(s) => s.trim().parse::<Decimal>().ok(),
        _ => None,
    }?;

    Some(amount.round_dp(MONEY_SCALE))
}
