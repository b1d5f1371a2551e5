pub mod category_queries;
pub mod product_queries;

pub use category_queries::{CategoryRepository, PgCategoryRepository};
pub use product_queries::{PgProductRepository, ProductRepository};
