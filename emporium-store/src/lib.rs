pub mod app_config;
pub mod database;
pub mod catalog_repo;
pub mod order_repo;
pub mod memory_repo;

pub use database::DbClient;
pub use catalog_repo::{StoreCategoryRepository, StoreProductRepository};
pub use order_repo::StoreOrderRepository;
pub use memory_repo::{InMemoryCatalog, InMemoryOrderStore};
