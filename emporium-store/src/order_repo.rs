use async_trait::async_trait;
use chrono::{DateTime, Utc};
use emporium_core::{Page, PageRequest, RepoError};
use emporium_order::{Order, OrderDetail, OrderQuery, OrderStatus, OrderStore};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

const ORDER_COLUMNS: &str =
    "id, code, customer_id, total, by_date, phone_number, address, status, created_at, updated_at";

// $1 code keyword, $2 customer id. The keyword is a literal substring, not a pattern.
const ORDER_FILTER: &str =
    "($1::text IS NULL OR strpos(lower(code), lower($1)) > 0) AND ($2::text IS NULL OR customer_id = $2)";

pub struct StoreOrderRepository {
    pool: PgPool,
}

impl StoreOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    code: String,
    customer_id: Option<String>,
    total: Decimal,
    by_date: DateTime<Utc>,
    phone_number: Option<String>,
    address: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepoError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            id: row.id,
            code: row.code,
            customer_id: row.customer_id,
            total: row.total,
            by_date: row.by_date,
            phone_number: row.phone_number.map(Into::into),
            address: row.address.map(Into::into),
            status: row.status.parse::<OrderStatus>()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderDetailRow {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    category_id: Option<Uuid>,
    product_amount: Decimal,
    sub_total: Decimal,
    created_at: DateTime<Utc>,
}

impl From<OrderDetailRow> for OrderDetail {
    fn from(row: OrderDetailRow) -> Self {
        OrderDetail {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            category_id: row.category_id,
            product_amount: row.product_amount,
            sub_total: row.sub_total,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl OrderStore for StoreOrderRepository {
    async fn create_order(&self, order: &Order, details: &[OrderDetail]) -> Result<(), RepoError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, code, customer_id, total, by_date, phone_number, address, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(order.id)
        .bind(&order.code)
        .bind(&order.customer_id)
        .bind(order.total)
        .bind(order.by_date)
        .bind(order.phone_number.as_ref().map(|p| p.as_inner().as_str()))
        .bind(order.address.as_ref().map(|a| a.as_inner().as_str()))
        .bind(order.status.as_str())
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for detail in details {
            sqlx::query(
                r#"
                INSERT INTO order_details (id, order_id, product_id, category_id, product_amount, sub_total, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(detail.id)
            .bind(detail.order_id)
            .bind(detail.product_id)
            .bind(detail.category_id)
            .bind(detail.product_amount)
            .bind(detail.sub_total)
            .bind(detail.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    async fn get_order(&self, id: Uuid) -> Result<Option<Order>, RepoError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }

    async fn list_order_details(&self, order_id: Uuid) -> Result<Vec<OrderDetail>, RepoError> {
        let rows: Vec<OrderDetailRow> = sqlx::query_as(
            r#"
            SELECT id, order_id, product_id, category_id, product_amount, sub_total, created_at
            FROM order_details WHERE order_id = $1 ORDER BY created_at
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderDetail::from).collect())
    }

    async fn list_orders(
        &self,
        query: &OrderQuery,
        page: PageRequest,
    ) -> Result<Page<Order>, RepoError> {
        let keyword = query.keyword.as_deref().filter(|k| !k.is_empty());
        let customer_id = query.customer_id.as_deref();

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM orders WHERE {ORDER_FILTER}"
        ))
        .bind(keyword)
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await?;

        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE {ORDER_FILTER} \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4"
        ))
        .bind(keyword)
        .bind(customer_id)
        .bind(i64::from(page.limit))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(Order::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, total as u64, page))
    }

    async fn update_order(&self, order: &Order) -> Result<bool, RepoError> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET phone_number = $1, address = $2, status = $3, updated_at = $4
            WHERE id = $5
            "#,
        )
        .bind(order.phone_number.as_ref().map(|p| p.as_inner().as_str()))
        .bind(order.address.as_ref().map(|a| a.as_inner().as_str()))
        .bind(order.status.as_str())
        .bind(order.updated_at)
        .bind(order.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
