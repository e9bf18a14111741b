//! Shopping cart state transitions.
//!
//! Each `(user, product)` pair moves between three states: absent, active and
//! inactive. `add` creates or reactivates, `update_quantity` only touches
//! active entries, `remove` and `clear` deactivate and zero the amount. Rows
//! are never deleted, so a later `add` reuses the same row.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    dto::cart::{CartLine, CartSummary},
    models::CartEntry,
    repository::{CartLineRecord, CartRepository, CatalogRepository, StoreError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartStatus {
    Created,
    Updated,
    Removed,
    Cleared,
    Conflict,
    NotFound,
    InvalidInput,
}

#[derive(Debug, Error)]
pub enum CartError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("product {0} is already in the shopping cart, use update to change the amount")]
    Conflict(Uuid),

    #[error("product {0} not found")]
    ProductNotFound(Uuid),

    #[error("product {0} is not in the shopping cart")]
    NotInCart(Uuid),

    #[error("user {0} not found")]
    UserNotFound(Uuid),

    #[error("storage failure")]
    Storage(#[source] StoreError),
}

impl CartError {
    /// `None` for storage failures, which carry no cart status.
    pub fn status(&self) -> Option<CartStatus> {
        match self {
            CartError::InvalidInput(_) => Some(CartStatus::InvalidInput),
            CartError::Conflict(_) => Some(CartStatus::Conflict),
            CartError::ProductNotFound(_) | CartError::NotInCart(_) | CartError::UserNotFound(_) => {
                Some(CartStatus::NotFound)
            }
            CartError::Storage(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CartOutcome<T> {
    pub status: CartStatus,
    pub data: T,
}

impl<T> CartOutcome<T> {
    fn new(status: CartStatus, data: T) -> Self {
        Self { status, data }
    }
}

fn validate_amount(amount: i32) -> Result<(), CartError> {
    if amount < 1 {
        return Err(CartError::InvalidInput(
            "amount must be greater than or equal to 1".to_string(),
        ));
    }
    Ok(())
}

async fn ensure_product<S>(store: &S, product_id: Uuid) -> Result<(), CartError>
where
    S: CatalogRepository + ?Sized,
{
    match store.find_product(product_id).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(CartError::ProductNotFound(product_id)),
        Err(err) => Err(CartError::Storage(err)),
    }
}

/// Resolves which side of the cart row lost its parent. The product may have
/// been deleted since `ensure_product`; otherwise the user row is missing.
async fn missing_reference<S>(
    store: &S,
    user_id: Uuid,
    product_id: Uuid,
    reference: String,
) -> CartError
where
    S: CatalogRepository + ?Sized,
{
    match ensure_product(store, product_id).await {
        Ok(()) => {
            tracing::warn!(%user_id, %product_id, %reference, "cart write for unknown user");
            CartError::UserNotFound(user_id)
        }
        Err(err) => err,
    }
}

pub async fn add_to_cart<S>(
    store: &S,
    user_id: Uuid,
    product_id: Uuid,
    amount: i32,
) -> Result<CartOutcome<CartEntry>, CartError>
where
    S: CartRepository + CatalogRepository + ?Sized,
{
    validate_amount(amount)?;
    ensure_product(store, product_id).await?;

    let entry = match store.activate(user_id, product_id, amount).await {
        Ok(entry) => entry,
        Err(StoreError::Conflict(_)) => {
            tracing::warn!(%user_id, %product_id, "product already in cart");
            return Err(CartError::Conflict(product_id));
        }
        Err(StoreError::MissingReference(reference)) => {
            return Err(missing_reference(store, user_id, product_id, reference).await);
        }
        Err(other) => return Err(CartError::Storage(other)),
    };

    tracing::info!(%user_id, %product_id, amount, "cart entry added");
    Ok(CartOutcome::new(CartStatus::Created, entry))
}

pub async fn update_quantity<S>(
    store: &S,
    user_id: Uuid,
    product_id: Uuid,
    amount: i32,
) -> Result<CartOutcome<CartEntry>, CartError>
where
    S: CartRepository + CatalogRepository + ?Sized,
{
    validate_amount(amount)?;
    ensure_product(store, product_id).await?;

    let entry = store
        .set_amount(user_id, product_id, amount)
        .await
        .map_err(CartError::Storage)?;
    let Some(entry) = entry else {
        tracing::warn!(%user_id, %product_id, "update on product not in cart");
        return Err(CartError::NotInCart(product_id));
    };

    tracing::info!(%user_id, %product_id, amount, "cart entry updated");
    Ok(CartOutcome::new(CartStatus::Updated, entry))
}

/// Deactivates the entry. Removing an already inactive entry succeeds and
/// leaves it as it was; a pair that was never added is `NotInCart`.
pub async fn remove_from_cart<S>(
    store: &S,
    user_id: Uuid,
    product_id: Uuid,
) -> Result<CartOutcome<CartEntry>, CartError>
where
    S: CartRepository + CatalogRepository + ?Sized,
{
    ensure_product(store, product_id).await?;

    let entry = store
        .deactivate(user_id, product_id)
        .await
        .map_err(CartError::Storage)?;
    let Some(entry) = entry else {
        return Err(CartError::NotInCart(product_id));
    };

    tracing::info!(%user_id, %product_id, "cart entry removed");
    Ok(CartOutcome::new(CartStatus::Removed, entry))
}

/// Returns the number of entries that were active before the call.
pub async fn clear_cart<S>(store: &S, user_id: Uuid) -> Result<CartOutcome<u64>, CartError>
where
    S: CartRepository + ?Sized,
{
    let cleared = store
        .deactivate_all(user_id)
        .await
        .map_err(CartError::Storage)?;

    tracing::info!(%user_id, cleared, "cart cleared");
    Ok(CartOutcome::new(CartStatus::Cleared, cleared))
}

pub async fn summarize_cart<S>(store: &S, user_id: Uuid) -> Result<CartSummary, CartError>
where
    S: CartRepository + ?Sized,
{
    let lines = store
        .active_lines(user_id)
        .await
        .map_err(CartError::Storage)?;
    tracing::debug!(%user_id, lines = lines.len(), "cart summarized");
    Ok(build_summary(lines))
}

pub fn build_summary(lines: Vec<CartLineRecord>) -> CartSummary {
    let cart_contents: Vec<CartLine> = lines
        .into_iter()
        .map(|line| CartLine {
            total_price: line.unit_price * Decimal::from(line.amount),
            product_id: line.product_id,
            product_name: line.product_name,
            amount: line.amount,
            product_price: line.unit_price,
        })
        .collect();

    let total_items = cart_contents.iter().map(|line| i64::from(line.amount)).sum();
    let total_price = cart_contents.iter().map(|line| line.total_price).sum();

    CartSummary {
        cart_contents,
        total_items,
        total_price,
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn line(name: &str, price: &str, amount: i32) -> CartLineRecord {
        CartLineRecord {
            product_id: Uuid::new_v4(),
            product_name: name.to_string(),
            unit_price: Decimal::from_str(price).unwrap(),
            amount,
        }
    }

    #[test]
    fn empty_summary_is_zero() {
        let summary = build_summary(Vec::new());
        assert!(summary.cart_contents.is_empty());
        assert_eq!(summary.total_items, 0);
        assert_eq!(summary.total_price, Decimal::ZERO);
    }

    #[test]
    fn line_totals_use_exact_decimals() {
        let summary = build_summary(vec![line("iPhone 13", "799.99", 2)]);
        assert_eq!(summary.cart_contents[0].total_price, Decimal::from_str("1599.98").unwrap());
        assert_eq!(summary.total_items, 2);
        assert_eq!(summary.total_price, Decimal::from_str("1599.98").unwrap());
    }

    #[test]
    fn cents_do_not_drift_across_many_lines() {
        let lines = (0..10).map(|_| line("Sticker", "0.10", 3)).collect();
        let summary = build_summary(lines);
        assert_eq!(summary.total_items, 30);
        assert_eq!(summary.total_price, Decimal::from_str("3.00").unwrap());
    }

    #[test]
    fn amount_below_one_is_rejected() {
        assert!(matches!(validate_amount(0), Err(CartError::InvalidInput(_))));
        assert!(matches!(validate_amount(-4), Err(CartError::InvalidInput(_))));
        assert!(validate_amount(1).is_ok());
    }

    #[test]
    fn errors_report_their_status() {
        let id = Uuid::new_v4();
        assert_eq!(CartError::Conflict(id).status(), Some(CartStatus::Conflict));
        assert_eq!(CartError::NotInCart(id).status(), Some(CartStatus::NotFound));
        assert_eq!(CartError::ProductNotFound(id).status(), Some(CartStatus::NotFound));
        assert_eq!(CartError::UserNotFound(id).status(), Some(CartStatus::NotFound));
        assert_eq!(
            CartError::Storage(StoreError::Conflict("x".into())).status(),
            None
        );
    }
}
