pub mod code;
pub mod manager;
pub mod models;
pub mod pricing;
pub mod store;

pub use manager::{OrderError, OrderManager};
pub use models::{Order, OrderDetail, OrderPatch, OrderStatus, PlacedOrder};
pub use pricing::{Cart, CartLine, OrderPricer, PricedLine, PricedOrder, Quantity};
pub use store::{OrderQuery, OrderStore};
