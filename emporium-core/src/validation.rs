use emporium_catalog::{CategoryDraft, ProductDraft};
use rust_decimal::Decimal;

use crate::{CoreError, CoreResult};

pub fn validate_product(draft: &ProductDraft) -> CoreResult<()> {
    if draft.name.trim().is_empty() {
        return Err(CoreError::ValidationError("product name must not be empty".to_string()));
    }
    if draft.price < Decimal::ZERO {
        return Err(CoreError::ValidationError(format!(
            "product price must not be negative, got {}",
            draft.price
        )));
    }
    Ok(())
}

pub fn validate_category(draft: &CategoryDraft) -> CoreResult<()> {
    if draft.name.trim().is_empty() {
        return Err(CoreError::ValidationError("category name must not be empty".to_string()));
    }
    Ok(())
}
