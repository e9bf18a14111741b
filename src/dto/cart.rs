use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CartAmountRequest {
    pub amount: i32,
}

/// One active cart entry with its pricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CartLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub amount: i32,
    pub product_price: Decimal,
    pub total_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CartSummary {
    pub cart_contents: Vec<CartLine>,
    pub total_items: i64,
    pub total_price: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClearedCart {
    pub cleared: u64,
}
