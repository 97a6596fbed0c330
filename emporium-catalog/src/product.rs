use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authoritative catalog entry. Prices on an order always come from here,
/// never from the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub category_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(draft: ProductDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            category_id: draft.category_id,
            name: draft.name,
            description: draft.description,
            image: draft.image,
            price: draft.price,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace every editable field, keeping identity and creation time.
    pub fn apply(&mut self, draft: ProductDraft) {
        self.category_id = draft.category_id;
        self.name = draft.name;
        self.description = draft.description;
        self.image = draft.image;
        self.price = draft.price;
        self.updated_at = Utc::now();
    }
}

/// Client payload for creating or replacing a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub category_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Read side of the catalog used when pricing orders.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// Fetch every product whose id is in `ids` in a single read.
    /// Unknown ids are absent from the result, not an error.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, CatalogError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog unavailable: {0}")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl CatalogError {
    pub fn unavailable<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Unavailable(Box::new(err))
    }
}
