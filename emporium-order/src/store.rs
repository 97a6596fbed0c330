use async_trait::async_trait;
use emporium_core::{Page, PageRequest, RepoError};
use uuid::Uuid;

use crate::models::{Order, OrderDetail};

/// Filter for order listings.
#[derive(Debug, Clone, Default)]
pub struct OrderQuery {
    /// Case-insensitive substring of the order code.
    pub keyword: Option<String>,
    pub customer_id: Option<String>,
}

impl OrderQuery {
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(customer_id) = self.customer_id.as_deref() {
            if order.customer_id.as_deref() != Some(customer_id) {
                return false;
            }
        }
        match self.keyword.as_deref() {
            Some(keyword) if !keyword.is_empty() => order
                .code
                .to_lowercase()
                .contains(&keyword.to_lowercase()),
            _ => true,
        }
    }
}

/// Persistence for orders and their line items
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist an order and all of its details as one unit.
    async fn create_order(&self, order: &Order, details: &[OrderDetail]) -> Result<(), RepoError>;

    async fn get_order(&self, id: Uuid) -> Result<Option<Order>, RepoError>;

    async fn list_order_details(&self, order_id: Uuid) -> Result<Vec<OrderDetail>, RepoError>;

    /// Newest orders first.
    async fn list_orders(
        &self,
        query: &OrderQuery,
        page: PageRequest,
    ) -> Result<Page<Order>, RepoError>;

    /// Returns `false` when the order does not exist.
    async fn update_order(&self, order: &Order) -> Result<bool, RepoError>;
}
