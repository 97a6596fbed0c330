use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use emporium_core::{PageQuery, PageRequest};
use emporium_order::{Cart, OrderPatch};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::AppError,
    extract::{AppJson, AppPath, AppQuery},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct OrderSearchQuery {
    pub keyword: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/calculate", post(calculate_order))
        .route("/orders/customer/{customer_id}", get(list_customer_orders))
        .route("/orders/{id}", get(get_order).put(update_order))
}

/// POST /api/orders/calculate
/// Price a cart without placing it
pub async fn calculate_order(
    State(state): State<AppState>,
    AppJson(cart): AppJson<Cart>,
) -> Result<Json<Value>, AppError> {
    let priced = state.orders.calculate(&cart).await?;

    Ok(Json(json!({
        "success": true,
        "result": priced,
    })))
}

/// POST /api/orders
pub async fn create_order(
    State(state): State<AppState>,
    AppJson(cart): AppJson<Cart>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let placed = state.orders.place_order(&cart).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "order": placed,
        })),
    ))
}

/// GET /api/orders?keyword=&page=&limit=
pub async fn list_orders(
    State(state): State<AppState>,
    AppQuery(search): AppQuery<OrderSearchQuery>,
    AppQuery(page): AppQuery<PageQuery>,
) -> Result<Json<Value>, AppError> {
    let page = PageRequest::from_query(page, &state.paging);
    let orders = state.orders.list_orders(search.keyword, page).await?;

    Ok(Json(json!({
        "success": true,
        "result": orders,
    })))
}

/// GET /api/orders/:id
/// Order with its line items
pub async fn get_order(
    State(state): State<AppState>,
    AppPath(order_id): AppPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    let order = state.orders.get_order(order_id).await?;

    Ok(Json(json!({
        "success": true,
        "order": order,
    })))
}

/// PUT /api/orders/:id
pub async fn update_order(
    State(state): State<AppState>,
    AppPath(order_id): AppPath<Uuid>,
    AppJson(patch): AppJson<OrderPatch>,
) -> Result<Json<Value>, AppError> {
    let order = state.orders.update_order(order_id, patch).await?;

    Ok(Json(json!({
        "success": true,
        "order": order,
    })))
}

/// GET /api/orders/customer/:customer_id
pub async fn list_customer_orders(
    State(state): State<AppState>,
    AppPath(customer_id): AppPath<String>,
    AppQuery(page): AppQuery<PageQuery>,
) -> Result<Json<Value>, AppError> {
    let page = PageRequest::from_query(page, &state.paging);
    let orders = state.orders.list_customer_orders(&customer_id, page).await?;

    Ok(Json(json!({
        "success": true,
        "result": orders,
    })))
}
