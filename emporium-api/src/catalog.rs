use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use emporium_catalog::{Category, CategoryDraft, Product, ProductDraft};
use emporium_core::validation::{validate_category, validate_product};
use emporium_core::{PageQuery, PageRequest, ProductFilter};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::AppError,
    extract::{AppJson, AppPath, AppQuery},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
}

// ============================================================================
// Products
// ============================================================================

/// GET /api/products?categoryId=&keyword=&page=&limit=
pub async fn list_products(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<ProductFilter>,
    AppQuery(page): AppQuery<PageQuery>,
) -> Result<Json<Value>, AppError> {
    let page = PageRequest::from_query(page, &state.paging);
    let products = state.products.list_products(&filter, page).await?;

    Ok(Json(json!({
        "success": true,
        "result": products,
    })))
}

/// POST /api/products
pub async fn create_product(
    State(state): State<AppState>,
    AppJson(draft): AppJson<ProductDraft>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    validate_product(&draft)?;
    ensure_category_exists(&state, draft.category_id).await?;

    let product = Product::new(draft);
    state.products.create_product(&product).await?;
    tracing::info!(product_id = %product.id, price = %product.price, "product created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "product": product,
        })),
    ))
}

/// GET /api/products/:id
pub async fn get_product(
    State(state): State<AppState>,
    AppPath(product_id): AppPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    let product = find_product(&state, product_id).await?;

    Ok(Json(json!({
        "success": true,
        "product": product,
    })))
}

/// PUT /api/products/:id
/// Replaces every editable field
pub async fn update_product(
    State(state): State<AppState>,
    AppPath(product_id): AppPath<Uuid>,
    AppJson(draft): AppJson<ProductDraft>,
) -> Result<Json<Value>, AppError> {
    validate_product(&draft)?;
    ensure_category_exists(&state, draft.category_id).await?;

    let mut product = find_product(&state, product_id).await?;
    product.apply(draft);
    if !state.products.update_product(&product).await? {
        return Err(product_not_found(product_id));
    }

    Ok(Json(json!({
        "success": true,
        "product": product,
    })))
}

/// DELETE /api/products/:id
pub async fn delete_product(
    State(state): State<AppState>,
    AppPath(product_id): AppPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !state.products.delete_product(product_id).await? {
        return Err(product_not_found(product_id));
    }
    tracing::info!(%product_id, "product deleted");

    Ok(Json(json!({ "success": true })))
}

async fn find_product(state: &AppState, id: Uuid) -> Result<Product, AppError> {
    state
        .products
        .get_product(id)
        .await?
        .ok_or_else(|| product_not_found(id))
}

fn product_not_found(id: Uuid) -> AppError {
    AppError::NotFoundError(format!("Product not found: {}", id))
}

async fn ensure_category_exists(state: &AppState, category_id: Option<Uuid>) -> Result<(), AppError> {
    if let Some(id) = category_id {
        if state.categories.get_category(id).await?.is_none() {
            return Err(AppError::ValidationError(format!("Category does not exist: {}", id)));
        }
    }
    Ok(())
}

// ============================================================================
// Categories
// ============================================================================

/// GET /api/categories
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let categories = state.categories.list_categories().await?;

    Ok(Json(json!({
        "success": true,
        "categories": categories,
    })))
}

/// POST /api/categories
pub async fn create_category(
    State(state): State<AppState>,
    AppJson(draft): AppJson<CategoryDraft>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    validate_category(&draft)?;

    let category = Category::new(draft);
    state.categories.create_category(&category).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "category": category,
        })),
    ))
}

/// GET /api/categories/:id
pub async fn get_category(
    State(state): State<AppState>,
    AppPath(category_id): AppPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    let category = find_category(&state, category_id).await?;

    Ok(Json(json!({
        "success": true,
        "category": category,
    })))
}

/// PUT /api/categories/:id
pub async fn update_category(
    State(state): State<AppState>,
    AppPath(category_id): AppPath<Uuid>,
    AppJson(draft): AppJson<CategoryDraft>,
) -> Result<Json<Value>, AppError> {
    validate_category(&draft)?;

    let mut category = find_category(&state, category_id).await?;
    category.apply(draft);
    if !state.categories.update_category(&category).await? {
        return Err(category_not_found(category_id));
    }

    Ok(Json(json!({
        "success": true,
        "category": category,
    })))
}

/// DELETE /api/categories/:id
pub async fn delete_category(
    State(state): State<AppState>,
    AppPath(category_id): AppPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !state.categories.delete_category(category_id).await? {
        return Err(category_not_found(category_id));
    }

    Ok(Json(json!({ "success": true })))
}

async fn find_category(state: &AppState, id: Uuid) -> Result<Category, AppError> {
    state
        .categories
        .get_category(id)
        .await?
        .ok_or_else(|| category_not_found(id))
}

fn category_not_found(id: Uuid) -> AppError {
    AppError::NotFoundError(format!("Category not found: {}", id))
}
