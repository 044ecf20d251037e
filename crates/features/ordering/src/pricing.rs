use crate::error::OrderingError;
use crate::model::OrderLine;
use platter_domain::config::MarketplaceConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Quote {
    pub subtotal: u64,
    pub delivery_fee: u64,
    pub total: u64,
}

/// Delivery is free from `free_delivery_threshold` upwards.
pub(crate) fn quote(lines: &[OrderLine], config: &MarketplaceConfig) -> Result<Quote, OrderingError> {
    let subtotal = lines
        .iter()
        .try_fold(0u64, |sum, line| sum.checked_add(line.line_total))
        .ok_or_else(overflow)?;
    let delivery_fee =
        if subtotal >= config.free_delivery_threshold { 0 } else { config.delivery_fee };
    let total = subtotal.checked_add(delivery_fee).ok_or_else(overflow)?;
    Ok(Quote { subtotal, delivery_fee, total })
}

pub(crate) fn line_total(unit_price: u64, quantity: u32) -> Result<u64, OrderingError> {
    unit_price.checked_mul(u64::from(quantity)).ok_or_else(overflow)
}

fn overflow() -> OrderingError {
    OrderingError::validation("order total is too large")
}
