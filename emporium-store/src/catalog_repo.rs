use async_trait::async_trait;
use chrono::{DateTime, Utc};
use emporium_catalog::{CatalogError, CatalogReader, Category, Product};
use emporium_core::{CategoryRepository, Page, PageRequest, ProductFilter, ProductRepository, RepoError};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

const PRODUCT_COLUMNS: &str =
    "id, category_id, name, description, image, price, created_at, updated_at";

// Matches the optional category and name filters; $1 category, $2 keyword.
// The keyword is a literal substring, not a pattern.
const PRODUCT_FILTER: &str =
    "($1::uuid IS NULL OR category_id = $1) AND ($2::text IS NULL OR strpos(lower(name), lower($2)) > 0)";

pub struct StoreProductRepository {
    pool: PgPool,
}

impl StoreProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    category_id: Option<Uuid>,
    name: String,
    description: Option<String>,
    image: Option<String>,
    price: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            category_id: row.category_id,
            name: row.name,
            description: row.description,
            image: row.image,
            price: row.price,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl CatalogReader for StoreProductRepository {
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, CatalogError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1)"
        ))
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await
        .map_err(CatalogError::unavailable)?;

        Ok(rows.into_iter().map(Product::from).collect())
    }
}

#[async_trait]
impl ProductRepository for StoreProductRepository {
    async fn create_product(&self, product: &Product) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO products (id, category_id, name, description, image, price, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(product.id)
        .bind(product.category_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.image)
        .bind(product.price)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, RepoError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, RepoError> {
        let keyword = filter.keyword.as_deref().filter(|k| !k.is_empty());

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM products WHERE {PRODUCT_FILTER}"
        ))
        .bind(filter.category_id)
        .bind(keyword)
        .fetch_one(&self.pool)
        .await?;

        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE {PRODUCT_FILTER} \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4"
        ))
        .bind(filter.category_id)
        .bind(keyword)
        .bind(i64::from(page.limit))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        let items = rows.into_iter().map(Product::from).collect();
        Ok(Page::new(items, total as u64, page))
    }

    async fn update_product(&self, product: &Product) -> Result<bool, RepoError> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET category_id = $1, name = $2, description = $3, image = $4, price = $5, updated_at = $6
            WHERE id = $7
            "#,
        )
        .bind(product.category_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.image)
        .bind(product.price)
        .bind(product.updated_at)
        .bind(product.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

pub struct StoreCategoryRepository {
    pool: PgPool,
}

impl StoreCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            image: row.image,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl CategoryRepository for StoreCategoryRepository {
    async fn create_category(&self, category: &Category) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT INTO categories (id, name, image, created_at, updated_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.image)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_category(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        let row: Option<CategoryRow> = sqlx::query_as(
            "SELECT id, name, image, created_at, updated_at FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Category::from))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, RepoError> {
        let rows: Vec<CategoryRow> = sqlx::query_as(
            "SELECT id, name, image, created_at, updated_at FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn update_category(&self, category: &Category) -> Result<bool, RepoError> {
        let result = sqlx::query(
            "UPDATE categories SET name = $1, image = $2, updated_at = $3 WHERE id = $4",
        )
        .bind(&category.name)
        .bind(&category.image)
        .bind(category.updated_at)
        .bind(category.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_filter_has_no_wildcards() {
        assert!(!PRODUCT_FILTER.contains("LIKE"));
        assert!(PRODUCT_FILTER.contains("strpos(lower(name), lower($2))"));
    }
}
