mod category;
mod product;
mod response;

pub use category::*;
pub use product::*;
pub use response::*;

use crate::error::{AppError, Result};

/// Rejects text longer than the `VARCHAR(max)` column it is stored in.
fn check_length(field: &str, value: Option<&str>, max: usize) -> Result<()> {
    match value {
        Some(value) if value.chars().count() > max => Err(AppError::InvalidInput(format!(
            "{field} must be at most {max} characters"
        ))),
        _ => Ok(()),
    }
}
