//! Order pricing and bill settlement.
//!
//! Everything here is pure: catalogue lookups happen in the services, which
//! hand the resolved rates in as [`LineRates`].

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{DiscountType, OrderType, PaymentStatus};

/// Raw quantities and additive charges for one order line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineInput {
    pub quantity: i32,
    pub fabric_meters: Decimal,
    pub alteration: Decimal,
    pub handwork: Decimal,
    pub other_charges: Decimal,
}

/// Catalogue rates resolved for one line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineRates {
    pub stitching_charge: Decimal,
    /// `None` when the line has no fabric selected.
    pub fabric_price_per_meter: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PricedLine {
    pub quantity: i32,
    pub unit_price: Decimal,
    pub fabric_cost: Decimal,
    pub stitching_cost: Decimal,
    pub alteration: Decimal,
    pub handwork: Decimal,
    pub other_charges: Decimal,
    pub total_price: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Discount {
    pub kind: DiscountType,
    pub value: Decimal,
}

impl Discount {
    pub fn none() -> Self {
        Self {
            kind: DiscountType::Fixed,
            value: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub taxable_amount: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Settlement {
    pub paid_amount: Decimal,
    pub pending_amount: Decimal,
    pub payment_status: PaymentStatus,
}

/// Round half away from zero to paise.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Price a single line.
///
/// Fabric orders ignore the stitching charge entirely and always bill one unit.
/// Stitched lines charge `stitching_charge * quantity` plus the whole-line
/// fabric cost; `unit_price` is the per-unit share of both and is for display
/// only.
pub fn price_line(order_type: OrderType, line: &LineInput, rates: &LineRates) -> PricedLine {
    let fabric_cost = match rates.fabric_price_per_meter {
        Some(rate) => round_money(rate * line.fabric_meters),
        None => Decimal::ZERO,
    };
    let extras = line.alteration + line.handwork + line.other_charges;

    if order_type == OrderType::Fabric {
        return PricedLine {
            quantity: 1,
            unit_price: fabric_cost,
            fabric_cost,
            stitching_cost: Decimal::ZERO,
            alteration: line.alteration,
            handwork: line.handwork,
            other_charges: line.other_charges,
            total_price: round_money(fabric_cost + extras),
        };
    }

    let quantity = line.quantity.max(1);
    let units = Decimal::from(quantity);
    let stitching_cost = round_money(rates.stitching_charge * units);
    let unit_price = round_money(stitching_cost / units + fabric_cost / units);

    PricedLine {
        quantity,
        unit_price,
        fabric_cost,
        stitching_cost,
        alteration: line.alteration,
        handwork: line.handwork,
        other_charges: line.other_charges,
        total_price: round_money(fabric_cost + stitching_cost + extras),
    }
}

/// Roll line totals up into order-level money fields.
///
/// The discount never exceeds the subtotal, so the taxable amount cannot go
/// negative.
pub fn summarize<'a, I>(lines: I, discount: Discount, tax_rate: Decimal) -> OrderTotals
where
    I: IntoIterator<Item = &'a PricedLine>,
{
    let subtotal = round_money(lines.into_iter().map(|line| line.total_price).sum());

    let raw_discount = match discount.kind {
        DiscountType::Percentage => subtotal * discount.value / Decimal::ONE_HUNDRED,
        DiscountType::Fixed => discount.value,
    };
    let discount_amount = round_money(raw_discount.max(Decimal::ZERO).min(subtotal));

    let taxable_amount = subtotal - discount_amount;
    let tax_amount = round_money(taxable_amount * tax_rate / Decimal::ONE_HUNDRED);

    OrderTotals {
        subtotal,
        discount_amount,
        taxable_amount,
        tax_rate,
        tax_amount,
        total_amount: taxable_amount + tax_amount,
    }
}

/// Credit `paid` against `total`.
///
/// Status is `Paid` once the credit covers the total and `Pending` otherwise,
/// including part-payments.
pub fn settle(total: Decimal, paid: Decimal) -> Settlement {
    let paid = paid.max(Decimal::ZERO);
    let paid_amount = paid.min(total);
    let pending_amount = (total - paid).max(Decimal::ZERO);
    let payment_status = if paid_amount >= total {
        PaymentStatus::Paid
    } else {
        PaymentStatus::Pending
    };

    Settlement {
        paid_amount,
        pending_amount,
        payment_status,
    }
}
