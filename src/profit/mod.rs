//! Feeder-cattle profit calculation.
//!
//! Given a purchase bracket and a heavier sale bracket from the same sex+grade
//! slice, compute value of gain (VOG), return on gain (ROG), net profit per
//! head, and estimated days on feed.
//!
//! Prices are quoted in $/cwt, so head value is `price / 100 * weight`.

use crate::domain::{FeedingAssumptions, MarketEntry, ProfitResult};
use crate::error::ReportError;

/// Compute profit metrics for one purchase/sale pair.
///
/// Fails with `InvalidGain` when the sale bracket is not heavier than the
/// purchase bracket; no result with a non-positive gain is ever returned.
pub fn compute_profit(
    purchase: &MarketEntry,
    sale: &MarketEntry,
    assumptions: &FeedingAssumptions,
) -> Result<ProfitResult, ReportError> {
    let purchase_value = purchase.head_value();
    let sale_value = sale.head_value();

    let gain = sale.avg_weight - purchase.avg_weight;
    if gain <= 0.0 {
        return Err(ReportError::InvalidGain {
            purchase_weight: purchase.avg_weight,
            sale_weight: sale.avg_weight,
        });
    }

    let value_of_gain = (sale_value - purchase_value) / gain;
    let return_on_gain = value_of_gain - assumptions.cost_of_gain();
    let net_profit = return_on_gain * gain;
    let days_on_feed = gain / assumptions.target_adg();

    Ok(ProfitResult {
        purchase_value,
        sale_value,
        gain,
        value_of_gain,
        return_on_gain,
        net_profit,
        days_on_feed,
    })
}
