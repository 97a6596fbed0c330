use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use emporium_shared::Masked;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::manager::OrderError;
use crate::pricing::PricedLine;

/// Order status in the lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Placed,
    Confirmed,
    Shipping,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "PLACED",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Shipping => "SHIPPING",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    /// No further status changes once an order is delivered or cancelled.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PLACED" => Ok(OrderStatus::Placed),
            "CONFIRMED" => Ok(OrderStatus::Confirmed),
            "SHIPPING" => Ok(OrderStatus::Shipping),
            "DELIVERED" => Ok(OrderStatus::Delivered),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(OrderError::UnknownStatus(other.to_string())),
        }
    }
}

/// A persisted customer purchase. Line items live in [`OrderDetail`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub code: String,
    pub customer_id: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub by_date: DateTime<Utc>,
    pub phone_number: Option<Masked<String>>,
    pub address: Option<Masked<String>>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn place(
        code: String,
        customer_id: Option<String>,
        phone_number: Option<String>,
        address: Option<String>,
        total: Decimal,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            code,
            customer_id,
            total,
            by_date: now,
            phone_number: phone_number.map(Masked),
            address: address.map(Masked),
            status: OrderStatus::Placed,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: OrderPatch) -> Result<(), OrderError> {
        if let Some(status) = patch.status {
            if status != self.status && self.status.is_terminal() {
                return Err(OrderError::InvalidTransition {
                    from: self.status.to_string(),
                    to: status.to_string(),
                });
            }
            self.status = status;
        }
        if let Some(phone_number) = patch.phone_number {
            self.phone_number = Some(Masked(phone_number));
        }
        if let Some(address) = patch.address {
            self.address = Some(Masked(address));
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// One priced product within a persisted order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub category_id: Option<Uuid>,
    #[serde(with = "rust_decimal::serde::float")]
    pub product_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub sub_total: Decimal,
    pub created_at: DateTime<Utc>,
}

impl OrderDetail {
    pub fn from_line(order_id: Uuid, line: &PricedLine) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            product_id: line.product_id,
            category_id: line.category_id,
            product_amount: line.amount,
            sub_total: line.sub_total,
            created_at: Utc::now(),
        }
    }
}

/// Fields an operator may change on an existing order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPatch {
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub status: Option<OrderStatus>,
}

/// An order together with its line items.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlacedOrder {
    #[serde(flatten)]
    pub order: Order,
    pub details: Vec<OrderDetail>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> Order {
        Order::place(
            "AB12CD34EF56".to_string(),
            Some("customer-1".to_string()),
            Some("0901234567".to_string()),
            None,
            Decimal::from(30),
        )
    }

    #[test]
    fn test_new_order_is_placed() {
        let order = order();
        assert_eq!(order.status, OrderStatus::Placed);
        assert_eq!(order.by_date, order.created_at);
    }

    #[test]
    fn test_status_lifecycle() {
        let mut order = order();

        for status in [OrderStatus::Confirmed, OrderStatus::Shipping, OrderStatus::Delivered] {
            order.apply(OrderPatch { status: Some(status), ..Default::default() }).unwrap();
            assert_eq!(order.status, status);
        }

        // Delivered is final
        let result = order.apply(OrderPatch { status: Some(OrderStatus::Cancelled), ..Default::default() });
        assert!(matches!(result, Err(OrderError::InvalidTransition { .. })));
        assert_eq!(order.status, OrderStatus::Delivered);
    }

    #[test]
    fn test_terminal_order_still_accepts_contact_changes() {
        let mut order = order();
        order.apply(OrderPatch { status: Some(OrderStatus::Cancelled), ..Default::default() }).unwrap();

        order
            .apply(OrderPatch {
                address: Some("12 Harbour Rd".to_string()),
                status: Some(OrderStatus::Cancelled),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(order.address.as_ref().map(|a| a.as_inner().as_str()), Some("12 Harbour Rd"));
    }

    #[test]
    fn test_status_round_trips_through_text() {
        assert_eq!("SHIPPING".parse::<OrderStatus>().unwrap(), OrderStatus::Shipping);
        assert!("LOST".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_contact_data_is_masked_in_debug() {
        let rendered = format!("{:?}", order());
        assert!(!rendered.contains("0901234567"));
    }
}
