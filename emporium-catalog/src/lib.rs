pub mod product;
pub mod category;

pub use product::{CatalogError, CatalogReader, Product, ProductDraft};
pub use category::{Category, CategoryDraft};
