use std::sync::Arc;

use emporium_catalog::{CatalogError, CatalogReader};
use emporium_core::{Page, PageRequest, RepoError};
use tracing::{info, warn};
use uuid::Uuid;

use crate::code::generate_order_code;
use crate::models::{Order, OrderDetail, OrderPatch, PlacedOrder};
use crate::pricing::{Cart, OrderPricer, PricedOrder};
use crate::store::{OrderQuery, OrderStore};

/// Prices, places and maintains orders
pub struct OrderManager {
    pricer: OrderPricer,
    store: Arc<dyn OrderStore>,
    code_length: usize,
}

impl OrderManager {
    pub fn new(
        catalog: Arc<dyn CatalogReader>,
        store: Arc<dyn OrderStore>,
        code_length: usize,
    ) -> Self {
        Self {
            pricer: OrderPricer::new(catalog),
            store,
            code_length,
        }
    }

    /// Price a cart without persisting anything.
    pub async fn calculate(&self, cart: &Cart) -> Result<PricedOrder, OrderError> {
        Ok(self.pricer.resolve(cart).await?)
    }

    /// Price a cart and persist it as a new order.
    pub async fn place_order(&self, cart: &Cart) -> Result<PlacedOrder, OrderError> {
        let priced = self.pricer.resolve(cart).await?;
        if priced.error {
            warn!(lines = cart.products.len(), "cart could not be priced, order rejected");
            return Err(OrderError::Unprocessable);
        }

        let order = Order::place(
            generate_order_code(self.code_length),
            cart.field_str("customerId").map(str::to_string),
            cart.field_str("phoneNumber").map(str::to_string),
            cart.field_str("address").map(str::to_string),
            priced.total,
        );
        let details: Vec<OrderDetail> = priced
            .products
            .iter()
            .map(|line| OrderDetail::from_line(order.id, line))
            .collect();

        self.store
            .create_order(&order, &details)
            .await
            .map_err(OrderError::Storage)?;

        info!(
            order_id = %order.id,
            code = %order.code,
            total = %order.total,
            lines = details.len(),
            "order placed"
        );

        Ok(PlacedOrder { order, details })
    }

    pub async fn get_order(&self, id: Uuid) -> Result<PlacedOrder, OrderError> {
        let order = self
            .store
            .get_order(id)
            .await
            .map_err(OrderError::Storage)?
            .ok_or_else(|| OrderError::NotFound(id.to_string()))?;
        let details = self
            .store
            .list_order_details(id)
            .await
            .map_err(OrderError::Storage)?;

        Ok(PlacedOrder { order, details })
    }

    pub async fn list_orders(
        &self,
        keyword: Option<String>,
        page: PageRequest,
    ) -> Result<Page<Order>, OrderError> {
        let query = OrderQuery { keyword, customer_id: None };
        self.store
            .list_orders(&query, page)
            .await
            .map_err(OrderError::Storage)
    }

    pub async fn list_customer_orders(
        &self,
        customer_id: &str,
        page: PageRequest,
    ) -> Result<Page<Order>, OrderError> {
        let query = OrderQuery {
            keyword: None,
            customer_id: Some(customer_id.to_string()),
        };
        self.store
            .list_orders(&query, page)
            .await
            .map_err(OrderError::Storage)
    }

    pub async fn update_order(&self, id: Uuid, patch: OrderPatch) -> Result<Order, OrderError> {
        let mut order = self
            .store
            .get_order(id)
            .await
            .map_err(OrderError::Storage)?
            .ok_or_else(|| OrderError::NotFound(id.to_string()))?;

        let previous = order.status;
        order.apply(patch)?;

        let updated = self
            .store
            .update_order(&order)
            .await
            .map_err(OrderError::Storage)?;
        if !updated {
            return Err(OrderError::NotFound(id.to_string()));
        }

        if previous != order.status {
            info!(order_id = %order.id, from = %previous, to = %order.status, "order status changed");
        }
        Ok(order)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Could not process the order")]
    Unprocessable,

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition {
        from: String,
        to: String,
    },

    #[error("Unknown order status: {0}")]
    UnknownStatus(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Order storage failed: {0}")]
    Storage(#[source] RepoError),
}
