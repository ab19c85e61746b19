use jmd_backoffice_api::{
    models::{DiscountType, OrderType, PaymentStatus},
    pricing::{Discount, LineInput, LineRates, price_line, round_money, settle, summarize},
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn line(quantity: i32, meters: Decimal) -> LineInput {
    LineInput {
        quantity,
        fabric_meters: meters,
        alteration: dec!(0),
        handwork: dec!(0),
        other_charges: dec!(0),
    }
}

#[test]
fn stitched_line_adds_fabric_and_stitching() {
    let rates = LineRates {
        stitching_charge: dec!(500),
        fabric_price_per_meter: Some(dec!(300)),
    };
    let priced = price_line(OrderType::Stitching, &line(1, dec!(1.5)), &rates);

    assert_eq!(priced.fabric_cost, dec!(450));
    assert_eq!(priced.stitching_cost, dec!(500));
    assert_eq!(priced.unit_price, dec!(950));
    assert_eq!(priced.total_price, dec!(950));
}

#[test]
fn stitching_scales_with_quantity_but_fabric_does_not() {
    let rates = LineRates {
        stitching_charge: dec!(400),
        fabric_price_per_meter: Some(dec!(200)),
    };
    let mut input = line(3, dec!(3));
    input.handwork = dec!(150);
    let priced = price_line(OrderType::Stitching, &input, &rates);

    assert_eq!(priced.stitching_cost, dec!(1200));
    assert_eq!(priced.fabric_cost, dec!(600));
    assert_eq!(priced.unit_price, dec!(600));
    assert_eq!(priced.total_price, dec!(1950));
}

#[test]
fn fabric_order_ignores_stitching_and_forces_single_unit() {
    let rates = LineRates {
        stitching_charge: dec!(800),
        fabric_price_per_meter: Some(dec!(250)),
    };
    let priced = price_line(OrderType::Fabric, &line(4, dec!(2)), &rates);

    assert_eq!(priced.quantity, 1);
    assert_eq!(priced.stitching_cost, dec!(0));
    assert_eq!(priced.unit_price, dec!(500));
    assert_eq!(priced.total_price, dec!(500));
}

#[test]
fn line_without_fabric_has_no_fabric_cost() {
    let rates = LineRates {
        stitching_charge: dec!(700),
        fabric_price_per_meter: None,
    };
    let mut input = line(1, dec!(2));
    input.alteration = dec!(120);
    input.other_charges = dec!(30);
    let priced = price_line(OrderType::Alteration, &input, &rates);

    assert_eq!(priced.fabric_cost, dec!(0));
    assert_eq!(priced.total_price, dec!(850));
}

#[test]
fn percentage_discount_then_tax() {
    let rates = LineRates {
        stitching_charge: dec!(1000),
        fabric_price_per_meter: None,
    };
    let priced = price_line(OrderType::Stitching, &line(1, dec!(0)), &rates);
    let totals = summarize(
        [&priced],
        Discount {
            kind: DiscountType::Percentage,
            value: dec!(10),
        },
        dec!(18),
    );

    assert_eq!(totals.subtotal, dec!(1000));
    assert_eq!(totals.discount_amount, dec!(100));
    assert_eq!(totals.taxable_amount, dec!(900));
    assert_eq!(totals.tax_amount, dec!(162));
    assert_eq!(totals.total_amount, dec!(1062));
}

#[test]
fn fixed_discount_is_clamped_to_subtotal() {
    let rates = LineRates {
        stitching_charge: dec!(300),
        fabric_price_per_meter: None,
    };
    let priced = price_line(OrderType::Readymade, &line(1, dec!(0)), &rates);
    let totals = summarize(
        [&priced],
        Discount {
            kind: DiscountType::Fixed,
            value: dec!(500),
        },
        dec!(18),
    );

    assert_eq!(totals.discount_amount, dec!(300));
    assert_eq!(totals.taxable_amount, dec!(0));
    assert_eq!(totals.total_amount, dec!(0));
}

#[test]
fn empty_order_totals_are_zero() {
    let totals = summarize([], Discount::none(), dec!(18));
    assert_eq!(totals.subtotal, dec!(0));
    assert_eq!(totals.total_amount, dec!(0));
}

#[test]
fn partial_advance_leaves_bill_pending() {
    let settlement = settle(dec!(1062), dec!(500));
    assert_eq!(settlement.paid_amount, dec!(500));
    assert_eq!(settlement.pending_amount, dec!(562));
    assert_eq!(settlement.payment_status, PaymentStatus::Pending);
}

#[test]
fn overpayment_settles_as_paid_with_no_balance() {
    let settlement = settle(dec!(1062), dec!(1100));
    assert_eq!(settlement.paid_amount, dec!(1062));
    assert_eq!(settlement.pending_amount, dec!(0));
    assert_eq!(settlement.payment_status, PaymentStatus::Paid);
}

#[test]
fn money_rounds_half_away_from_zero() {
    assert_eq!(round_money(dec!(10.005)), dec!(10.01));
    assert_eq!(round_money(dec!(10.004)), dec!(10.00));
}
