pub mod paging;
pub mod repository;
pub mod validation;

pub use paging::{Page, PageQuery, PageRequest, PagingLimits};
pub use repository::{CategoryRepository, ProductFilter, ProductRepository, RepoError};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
