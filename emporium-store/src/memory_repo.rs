//! Process-local stores, used when no database is configured and in tests.

use async_trait::async_trait;
use emporium_catalog::{CatalogError, CatalogReader, Category, Product};
use emporium_core::{CategoryRepository, Page, PageRequest, ProductFilter, ProductRepository, RepoError};
use emporium_order::{Order, OrderDetail, OrderQuery, OrderStore};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Products and categories kept in insertion order.
#[derive(Default)]
pub struct InMemoryCatalog {
    products: RwLock<Vec<Product>>,
    categories: RwLock<Vec<Category>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogReader for InMemoryCatalog {
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, CatalogError> {
        let products = self.products.read().await;
        Ok(products
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ProductRepository for InMemoryCatalog {
    async fn create_product(&self, product: &Product) -> Result<(), RepoError> {
        let mut products = self.products.write().await;
        if products.iter().any(|p| p.id == product.id) {
            return Err(format!("product {} already exists", product.id).into());
        }
        products.push(product.clone());
        Ok(())
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, RepoError> {
        let products = self.products.read().await;
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, RepoError> {
        let products = self.products.read().await;
        let matching = products
            .iter()
            .rev()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        Ok(Page::slice(matching, page))
    }

    async fn update_product(&self, product: &Product) -> Result<bool, RepoError> {
        let mut products = self.products.write().await;
        match products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => {
                *existing = product.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok(products.len() != before)
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCatalog {
    async fn create_category(&self, category: &Category) -> Result<(), RepoError> {
        let mut categories = self.categories.write().await;
        if categories.iter().any(|c| c.id == category.id) {
            return Err(format!("category {} already exists", category.id).into());
        }
        categories.push(category.clone());
        Ok(())
    }

    async fn get_category(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        let categories = self.categories.read().await;
        Ok(categories.iter().find(|c| c.id == id).cloned())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, RepoError> {
        let mut categories = self.categories.read().await.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn update_category(&self, category: &Category) -> Result<bool, RepoError> {
        let mut categories = self.categories.write().await;
        match categories.iter_mut().find(|c| c.id == category.id) {
            Some(existing) => {
                *existing = category.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut categories = self.categories.write().await;
        let before = categories.len();
        categories.retain(|c| c.id != id);
        if categories.len() == before {
            return Ok(false);
        }
        drop(categories);

        // Same as ON DELETE SET NULL in Postgres
        let mut products = self.products.write().await;
        for product in products.iter_mut().filter(|p| p.category_id == Some(id)) {
            product.category_id = None;
        }
        Ok(true)
    }
}

/// Orders and their details kept in insertion order.
#[derive(Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<Vec<Order>>,
    details: RwLock<Vec<OrderDetail>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create_order(&self, order: &Order, details: &[OrderDetail]) -> Result<(), RepoError> {
        let mut orders = self.orders.write().await;
        let mut stored_details = self.details.write().await;
        if orders.iter().any(|o| o.id == order.id || o.code == order.code) {
            return Err(format!("order {} already exists", order.code).into());
        }
        orders.push(order.clone());
        stored_details.extend_from_slice(details);
        Ok(())
    }

    async fn get_order(&self, id: Uuid) -> Result<Option<Order>, RepoError> {
        let orders = self.orders.read().await;
        Ok(orders.iter().find(|o| o.id == id).cloned())
    }

    async fn list_order_details(&self, order_id: Uuid) -> Result<Vec<OrderDetail>, RepoError> {
        let details = self.details.read().await;
        Ok(details
            .iter()
            .filter(|d| d.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn list_orders(
        &self,
        query: &OrderQuery,
        page: PageRequest,
    ) -> Result<Page<Order>, RepoError> {
        let orders = self.orders.read().await;
        let matching = orders
            .iter()
            .rev()
            .filter(|o| query.matches(o))
            .cloned()
            .collect();
        Ok(Page::slice(matching, page))
    }

    async fn update_order(&self, order: &Order) -> Result<bool, RepoError> {
        let mut orders = self.orders.write().await;
        match orders.iter_mut().find(|o| o.id == order.id) {
            Some(existing) => {
                *existing = order.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
