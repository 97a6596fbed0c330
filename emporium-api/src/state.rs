use std::sync::Arc;

use emporium_core::{CategoryRepository, PagingLimits, ProductRepository};
use emporium_order::OrderManager;
use emporium_store::app_config::Config;
use emporium_store::{
    DbClient, InMemoryCatalog, InMemoryOrderStore, StoreCategoryRepository,
    StoreOrderRepository, StoreProductRepository,
};

#[derive(Clone)]
pub struct AppState {
    pub products: Arc<dyn ProductRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub orders: Arc<OrderManager>,
    pub paging: PagingLimits,
}

impl AppState {
    /// Everything in process memory; nothing survives a restart.
    pub fn in_memory(code_length: usize, paging: PagingLimits) -> Self {
        let catalog = Arc::new(InMemoryCatalog::new());
        let orders = OrderManager::new(
            catalog.clone(),
            Arc::new(InMemoryOrderStore::new()),
            code_length,
        );

        Self {
            products: catalog.clone(),
            categories: catalog,
            orders: Arc::new(orders),
            paging,
        }
    }

    pub fn postgres(db: &DbClient, config: &Config) -> Self {
        let products = Arc::new(StoreProductRepository::new(db.pool.clone()));
        let orders = OrderManager::new(
            products.clone(),
            Arc::new(StoreOrderRepository::new(db.pool.clone())),
            config.orders.code_length,
        );

        Self {
            products,
            categories: Arc::new(StoreCategoryRepository::new(db.pool.clone())),
            orders: Arc::new(orders),
            paging: config.paging,
        }
    }
}
