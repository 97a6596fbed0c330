use async_trait::async_trait;
use emporium_catalog::{Category, Product};
use serde::Deserialize;
use uuid::Uuid;

use crate::paging::{Page, PageRequest};

pub type RepoError = Box<dyn std::error::Error + Send + Sync>;

/// Optional narrowing of a product listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    pub category_id: Option<Uuid>,
    /// Case-insensitive substring of the product name.
    pub keyword: Option<String>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category_id) = self.category_id {
            if product.category_id != Some(category_id) {
                return false;
            }
        }
        match self.keyword.as_deref() {
            Some(keyword) if !keyword.is_empty() => product
                .name
                .to_lowercase()
                .contains(&keyword.to_lowercase()),
            _ => true,
        }
    }
}

/// Repository trait for product catalog administration
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create_product(&self, product: &Product) -> Result<(), RepoError>;

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, RepoError>;

    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, RepoError>;

    /// Returns `false` when no product with that id exists.
    async fn update_product(&self, product: &Product) -> Result<bool, RepoError>;

    async fn delete_product(&self, id: Uuid) -> Result<bool, RepoError>;
}

/// Repository trait for category administration
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create_category(&self, category: &Category) -> Result<(), RepoError>;

    async fn get_category(&self, id: Uuid) -> Result<Option<Category>, RepoError>;

    async fn list_categories(&self) -> Result<Vec<Category>, RepoError>;

    async fn update_category(&self, category: &Category) -> Result<bool, RepoError>;

    async fn delete_category(&self, id: Uuid) -> Result<bool, RepoError>;
}
