//! Cart pricing.
//!
//! Turns a client cart into priced order lines using the catalog as the only
//! source of prices. Quantities come from the client, everything else about a
//! product comes from the catalog.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use emporium_catalog::{CatalogError, CatalogReader, Product};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

/// Keys the catalog owns on a priced line. Client fields with these names are
/// discarded when merging.
const CATALOG_KEYS: &[&str] = &[
    "id",
    "productId",
    "categoryId",
    "name",
    "description",
    "image",
    "price",
    "amount",
    "subTotal",
    "createdAt",
    "updatedAt",
];

/// Keys the pricing result sets on the order itself.
const RESULT_KEYS: &[&str] = &["total", "products", "error"];

/// Quantity as sent by the client. Numbers and numeric text are usable,
/// anything else is kept as sent and never prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Number(serde_json::Number),
    Text(String),
    Other(Value),
}

impl Default for Quantity {
    fn default() -> Self {
        Quantity::Other(Value::Null)
    }
}

impl Quantity {
    /// Numeric value of the quantity, `None` when it is not a number.
    pub fn to_decimal(&self) -> Option<Decimal> {
        match self {
            Quantity::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Decimal::from(i))
                } else if let Some(u) = n.as_u64() {
                    Some(Decimal::from(u))
                } else {
                    n.as_f64().and_then(|f| Decimal::try_from(f).ok())
                }
            }
            Quantity::Text(s) => {
                let s = s.trim();
                Decimal::from_str(s)
                    .or_else(|_| Decimal::from_scientific(s))
                    .ok()
            }
            Quantity::Other(_) => None,
        }
    }
}

impl From<i64> for Quantity {
    fn from(value: i64) -> Self {
        Quantity::Number(value.into())
    }
}

/// One requested product in a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Kept as sent; only a string holding a UUID can match the catalog.
    #[serde(default)]
    pub product_id: Value,
    #[serde(default)]
    pub amount: Quantity,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CartLine {
    pub fn new(product_id: impl Into<String>, amount: impl Into<Quantity>) -> Self {
        Self {
            product_id: Value::String(product_id.into()),
            amount: amount.into(),
            extra: Map::new(),
        }
    }

    /// Canonical identifier. Ids are compared by parsed value so that case or
    /// formatting differences in client input still match the catalog.
    pub fn parsed_id(&self) -> Option<Uuid> {
        self.product_id
            .as_str()
            .and_then(|id| Uuid::parse_str(id.trim()).ok())
    }
}

/// Order request as submitted by the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub products: Vec<CartLine>,
    /// Everything else on the request (`customerId`, `phoneNumber`, ...).
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Cart {
    pub fn new(products: Vec<CartLine>) -> Self {
        Self {
            products,
            fields: Map::new(),
        }
    }

    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

/// A cart line resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedLine {
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    pub product_id: Uuid,
    pub category_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub sub_total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of pricing a cart. `error` is set when nothing could be priced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricedOrder {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub products: Vec<PricedLine>,
    pub error: bool,
}

/// Prices carts against an injected catalog.
#[derive(Clone)]
pub struct OrderPricer {
    catalog: Arc<dyn CatalogReader>,
}

impl OrderPricer {
    pub fn new(catalog: Arc<dyn CatalogReader>) -> Self {
        Self { catalog }
    }

    /// Price `cart`. Unknown products and non-numeric quantities never raise;
    /// they are left out and reported through `error` when nothing remains.
    /// Catalog failures are returned as-is.
    pub async fn resolve(&self, cart: &Cart) -> Result<PricedOrder, CatalogError> {
        let ids = requested_ids(&cart.products);
        let catalog = if ids.is_empty() {
            Vec::new()
        } else {
            self.catalog.find_by_ids(&ids).await?
        };
        let by_id: HashMap<Uuid, &Product> = catalog.iter().map(|p| (p.id, p)).collect();

        let matched: Vec<(&CartLine, &Product)> = cart
            .products
            .iter()
            .filter_map(|line| {
                let product = line.parsed_id().and_then(|id| by_id.get(&id).copied());
                if product.is_none() {
                    debug!(product_id = %line.product_id, "cart line does not match any catalog product");
                }
                product.map(|product| (line, product))
            })
            .collect();

        let mut error = matched.is_empty();

        let mut products: Vec<PricedLine> = matched
            .into_iter()
            .filter_map(|(line, product)| price_line(line, product))
            .collect();

        if products.is_empty() {
            error = true;
        }

        let total = match products
            .iter()
            .try_fold(Decimal::ZERO, |acc, line| acc.checked_add(line.sub_total))
        {
            Some(total) => total,
            None => {
                warn!(lines = products.len(), "order total overflows, refusing to price cart");
                products.clear();
                error = true;
                Decimal::ZERO
            }
        };

        let mut fields = cart.fields.clone();
        for key in RESULT_KEYS {
            fields.remove(*key);
        }

        debug!(
            requested = cart.products.len(),
            priced = products.len(),
            %total,
            error,
            "cart priced"
        );

        Ok(PricedOrder {
            fields,
            total,
            products,
            error,
        })
    }
}

/// Distinct parseable ids in first-seen order.
fn requested_ids(lines: &[CartLine]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    lines
        .iter()
        .filter_map(CartLine::parsed_id)
        .filter(|id| seen.insert(*id))
        .collect()
}

fn price_line(line: &CartLine, product: &Product) -> Option<PricedLine> {
    let Some(amount) = line.amount.to_decimal() else {
        warn!(product_id = %product.id, amount = ?line.amount, "rejecting cart line with non-numeric amount");
        return None;
    };
    let Some(sub_total) = amount.checked_mul(product.price) else {
        warn!(product_id = %product.id, %amount, "rejecting cart line whose subtotal overflows");
        return None;
    };

    let mut extra = line.extra.clone();
    for key in CATALOG_KEYS {
        extra.remove(*key);
    }

    Some(PricedLine {
        extra,
        product_id: product.id,
        category_id: product.category_id,
        name: product.name.clone(),
        description: product.description.clone(),
        image: product.image.clone(),
        price: product.price,
        amount,
        sub_total,
        created_at: product.created_at,
        updated_at: product.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeCatalog {
        products: Vec<Product>,
        calls: AtomicUsize,
        offline: bool,
    }

    impl FakeCatalog {
        fn with(products: Vec<Product>) -> Arc<Self> {
            Arc::new(Self { products, calls: AtomicUsize::new(0), offline: false })
        }

        fn offline() -> Arc<Self> {
            Arc::new(Self { products: Vec::new(), calls: AtomicUsize::new(0), offline: true })
        }
    }

    #[async_trait]
    impl CatalogReader for FakeCatalog {
        async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.offline {
                return Err(CatalogError::unavailable(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "connection refused",
                )));
            }
            Ok(self
                .products
                .iter()
                .filter(|p| ids.contains(&p.id))
                .cloned()
                .collect())
        }
    }

    fn product(name: &str, price: i64) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4(),
            category_id: Some(Uuid::new_v4()),
            name: name.to_string(),
            description: None,
            image: Some(format!("{}.png", name.to_lowercase())),
            price: Decimal::from(price),
            created_at: now,
            updated_at: now,
        }
    }

    fn line(product: &Product, amount: i64) -> CartLine {
        CartLine::new(product.id.to_string(), amount)
    }

    #[tokio::test]
    async fn test_single_line_example() {
        let a = product("A", 10);
        let pricer = OrderPricer::new(FakeCatalog::with(vec![a.clone()]));

        let priced = pricer.resolve(&Cart::new(vec![line(&a, 3)])).await.unwrap();

        assert!(!priced.error);
        assert_eq!(priced.total, Decimal::from(30));
        assert_eq!(priced.products.len(), 1);
        let first = &priced.products[0];
        assert_eq!(first.product_id, a.id);
        assert_eq!(first.amount, Decimal::from(3));
        assert_eq!(first.price, Decimal::from(10));
        assert_eq!(first.sub_total, Decimal::from(30));
    }

    #[tokio::test]
    async fn test_total_is_sum_of_subtotals() {
        let tea = product("Tea", 4);
        let cake = product("Cake", 7);
        let pricer = OrderPricer::new(FakeCatalog::with(vec![tea.clone(), cake.clone()]));

        let priced = pricer
            .resolve(&Cart::new(vec![line(&tea, 2), line(&cake, 3)]))
            .await
            .unwrap();

        assert!(!priced.error);
        assert_eq!(priced.total, Decimal::from(2 * 4 + 3 * 7));
        for l in &priced.products {
            assert_eq!(l.sub_total, l.amount * l.price);
        }
    }

    #[tokio::test]
    async fn test_empty_cart_is_an_error_without_catalog_read() {
        let catalog = FakeCatalog::with(vec![product("A", 10)]);
        let pricer = OrderPricer::new(catalog.clone());

        let mut cart = Cart::default();
        cart.fields.insert("customerId".to_string(), json!("c-1"));
        let priced = pricer.resolve(&cart).await.unwrap();

        assert!(priced.error);
        assert_eq!(priced.total, Decimal::ZERO);
        assert!(priced.products.is_empty());
        assert_eq!(priced.fields.get("customerId"), Some(&json!("c-1")));
        assert_eq!(catalog.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_products_are_an_error() {
        let a = product("A", 10);
        let b = product("B", 5);
        let pricer = OrderPricer::new(FakeCatalog::with(vec![a]));

        let priced = pricer.resolve(&Cart::new(vec![line(&b, 2)])).await.unwrap();

        assert!(priced.error);
        assert!(priced.products.is_empty());
        assert_eq!(priced.total, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_malformed_ids_never_match() {
        let a = product("A", 10);
        let catalog = FakeCatalog::with(vec![a.clone()]);
        let pricer = OrderPricer::new(catalog.clone());

        let priced = pricer
            .resolve(&Cart::new(vec![CartLine::new("not-an-id", 1), line(&a, 1)]))
            .await
            .unwrap();

        assert!(!priced.error);
        assert_eq!(priced.products.len(), 1);
        assert_eq!(priced.total, Decimal::from(10));
    }

    #[tokio::test]
    async fn test_duplicates_stay_separate_with_one_read() {
        let a = product("A", 10);
        let catalog = FakeCatalog::with(vec![a.clone()]);
        let pricer = OrderPricer::new(catalog.clone());

        let upper = CartLine::new(a.id.to_string().to_uppercase(), 2);
        let priced = pricer
            .resolve(&Cart::new(vec![line(&a, 1), upper]))
            .await
            .unwrap();

        assert_eq!(priced.products.len(), 2);
        assert!(priced.products.iter().all(|l| l.product_id == a.id));
        assert_eq!(priced.total, Decimal::from(30));
        assert_eq!(catalog.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_text_amounts_are_coerced() {
        let a = product("A", 10);
        let pricer = OrderPricer::new(FakeCatalog::with(vec![a.clone()]));

        let cart = Cart::new(vec![CartLine::new(a.id.to_string(), Quantity::Text(" 2.5 ".to_string()))]);
        let priced = pricer.resolve(&cart).await.unwrap();

        assert!(!priced.error);
        assert_eq!(priced.total, Decimal::from(25));
    }

    #[tokio::test]
    async fn test_non_numeric_amount_rejects_line() {
        let a = product("A", 10);
        let b = product("B", 3);
        let pricer = OrderPricer::new(FakeCatalog::with(vec![a.clone(), b.clone()]));

        let bad = CartLine::new(a.id.to_string(), Quantity::Text("two".to_string()));
        let priced = pricer.resolve(&Cart::new(vec![bad.clone(), line(&b, 2)])).await.unwrap();
        assert!(!priced.error);
        assert_eq!(priced.products.len(), 1);
        assert_eq!(priced.total, Decimal::from(6));

        let priced = pricer.resolve(&Cart::new(vec![bad])).await.unwrap();
        assert!(priced.error);
        assert!(priced.products.is_empty());
        assert_eq!(priced.total, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_mistyped_line_fields_reject_only_that_line() {
        let a = product("A", 10);
        let b = product("B", 3);
        let pricer = OrderPricer::new(FakeCatalog::with(vec![a.clone(), b.clone()]));

        let cart: Cart = serde_json::from_value(json!({
            "products": [
                { "productId": a.id.to_string(), "amount": null },
                { "productId": a.id.to_string(), "amount": true },
                { "productId": a.id.to_string(), "amount": { "n": 1 } },
                { "productId": a.id.to_string() },
                { "productId": 42, "amount": 1 },
                { "amount": 1 },
                { "productId": b.id.to_string(), "amount": 2 }
            ]
        }))
        .unwrap();
        assert_eq!(cart.products.len(), 7);
        assert_eq!(cart.products[0].amount.to_decimal(), None);
        assert_eq!(cart.products[4].parsed_id(), None);

        let priced = pricer.resolve(&cart).await.unwrap();
        assert!(!priced.error);
        assert_eq!(priced.products.len(), 1);
        assert_eq!(priced.products[0].product_id, b.id);
        assert_eq!(priced.total, Decimal::from(6));
    }

    #[tokio::test]
    async fn test_fractional_amounts_keep_full_scale() {
        let a = product("A", 1);
        let pricer = OrderPricer::new(FakeCatalog::with(vec![a.clone()]));
        let tiny = || CartLine::new(a.id.to_string(), Quantity::Text("0.00005".to_string()));

        let priced = pricer
            .resolve(&Cart::new(vec![tiny(), tiny(), tiny()]))
            .await
            .unwrap();

        let expected = Decimal::from_str("0.00015").unwrap();
        assert_eq!(priced.total, expected);
        let sum: Decimal = priced.products.iter().map(|l| l.sub_total).sum();
        assert_eq!(sum, priced.total);
    }

    #[tokio::test]
    async fn test_priced_line_carries_catalog_timestamps() {
        let a = product("A", 10);
        let pricer = OrderPricer::new(FakeCatalog::with(vec![a.clone()]));

        let mut l = line(&a, 1);
        l.extra.insert("createdAt".to_string(), json!("1970-01-01T00:00:00Z"));
        let priced = pricer.resolve(&Cart::new(vec![l])).await.unwrap();

        assert_eq!(priced.products[0].created_at, a.created_at);
        assert_eq!(priced.products[0].updated_at, a.updated_at);
        let json = serde_json::to_value(&priced.products[0]).unwrap();
        assert_eq!(json["createdAt"], serde_json::to_value(a.created_at).unwrap());
        assert!(json.get("updatedAt").is_some());
    }

    #[tokio::test]
    async fn test_catalog_fields_win_over_client_fields() {
        let a = product("Espresso", 3);
        let pricer = OrderPricer::new(FakeCatalog::with(vec![a.clone()]));

        let mut l = line(&a, 1);
        l.extra.insert("price".to_string(), json!(0));
        l.extra.insert("name".to_string(), json!("Free coffee"));
        l.extra.insert("note".to_string(), json!("no sugar"));
        let priced = pricer.resolve(&Cart::new(vec![l])).await.unwrap();

        let json = serde_json::to_value(&priced.products[0]).unwrap();
        assert_eq!(json["price"].as_f64(), Some(3.0));
        assert_eq!(json["name"], json!("Espresso"));
        assert_eq!(json["note"], json!("no sugar"));
        assert_eq!(json["subTotal"].as_f64(), Some(3.0));
    }

    #[tokio::test]
    async fn test_result_overrides_cart_fields() {
        let a = product("A", 10);
        let pricer = OrderPricer::new(FakeCatalog::with(vec![a.clone()]));

        let mut cart = Cart::new(vec![line(&a, 1)]);
        cart.fields.insert("total".to_string(), json!(1));
        cart.fields.insert("address".to_string(), json!("1 Main St"));
        let priced = pricer.resolve(&cart).await.unwrap();

        let json = serde_json::to_value(&priced).unwrap();
        assert_eq!(json["total"].as_f64(), Some(10.0));
        assert_eq!(json["address"], json!("1 Main St"));
        assert_eq!(json["error"], json!(false));
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        let a = product("A", 10);
        let b = product("B", 4);
        let pricer = OrderPricer::new(FakeCatalog::with(vec![a.clone(), b.clone()]));
        let cart = Cart::new(vec![line(&a, 1), line(&b, 5), line(&a, 2)]);

        let first = pricer.resolve(&cart).await.unwrap();
        let second = pricer.resolve(&cart).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_catalog_failure_propagates() {
        let pricer = OrderPricer::new(FakeCatalog::offline());
        let cart = Cart::new(vec![CartLine::new(Uuid::new_v4().to_string(), 1)]);

        let result = pricer.resolve(&cart).await;
        assert!(matches!(result, Err(CatalogError::Unavailable(_))));
    }

    #[test]
    fn test_cart_deserializes_client_payload() {
        let id = Uuid::new_v4();
        let cart: Cart = serde_json::from_value(json!({
            "customerId": "c-42",
            "phoneNumber": "0901234567",
            "products": [
                { "productId": id.to_string(), "amount": 2 },
                { "productId": id.to_string(), "amount": "3", "note": "gift" }
            ]
        }))
        .unwrap();

        assert_eq!(cart.products.len(), 2);
        assert_eq!(cart.products[0].amount.to_decimal(), Some(Decimal::from(2)));
        assert_eq!(cart.products[1].amount.to_decimal(), Some(Decimal::from(3)));
        assert_eq!(cart.products[1].extra.get("note"), Some(&json!("gift")));
        assert_eq!(cart.field_str("customerId"), Some("c-42"));
    }
}
