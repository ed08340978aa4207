//! Price-pair resolution for a single blueprint option.

use rust_decimal::Decimal;

use crate::domain::blueprint::{BlueprintComponent, BlueprintOption};
use crate::domain::metadata::read_numeric;
use crate::domain::value_objects::PricePair;

/// Metadata keys that may carry an explicit sale price, in priority order.
pub const SALE_PRICE_KEYS: [&str; 6] = [
    "sale_price",
    "salePrice",
    "offer_price",
    "offerPrice",
    "discounted_price",
    "discountedPrice",
];

/// Resolves the MRP and sale price of `option`.
///
/// The sale comes from the first sale-price metadata key holding a
/// non-negative number, else `fallback_sale`. The MRP comes from the
/// option's unit price, then the component's unit price, then the
/// component's base price, then `fallback_mrp`. The result is passed through the floor/cap rule of
/// [`PricePair::floored`]. Negative amounts count as absent.
pub fn resolve_price_pair(
    option: &BlueprintOption,
    component: Option<&BlueprintComponent>,
    fallback_mrp: Decimal,
    fallback_sale: Decimal,
) -> PricePair {
    let non_negative = |v: Decimal| (v >= Decimal::ZERO).then_some(v);

    let raw_sale = SALE_PRICE_KEYS
        .iter()
        .find_map(|key| read_numeric(&option.metadata, key).and_then(non_negative))
        .unwrap_or(fallback_sale);

    let raw_mrp = option
        .unit_price
        .and_then(non_negative)
        .or_else(|| component.and_then(|c| c.unit_price).and_then(non_negative))
        .or_else(|| component.and_then(|c| c.base_price).and_then(non_negative))
        .unwrap_or(fallback_mrp);

    PricePair::floored(raw_mrp, raw_sale)
}
