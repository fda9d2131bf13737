//! Coupon lookup normalisation, eligibility checks and the discount formula.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::coupon::{Coupon, DiscountKind};
use crate::pricing::money::{clamp_currency, format_currency, round_to_cents};

#[derive(Debug, Clone, PartialEq)]
pub enum CouponError {
    EmptyCode,
    NotFound,
    Inactive,
    NotYetValid,
    Expired,
    UsageLimitReached,
    MinimumNotMet { minimum: f64 },
    NotApplicable,
}

impl CouponError {
    /// Stable machine-readable reason, returned next to the message.
    pub fn reason(&self) -> &'static str {
        match self {
            CouponError::EmptyCode => "empty_code",
            CouponError::NotFound => "not_found",
            CouponError::Inactive => "inactive",
            CouponError::NotYetValid => "not_yet_valid",
            CouponError::Expired => "expired",
            CouponError::UsageLimitReached => "usage_limit",
            CouponError::MinimumNotMet { .. } => "minimum_not_met",
            CouponError::NotApplicable => "not_applicable",
        }
    }
}

impl fmt::Display for CouponError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CouponError::EmptyCode => write!(f, "Enter a coupon code"),
            CouponError::NotFound => write!(f, "Coupon not found"),
            CouponError::Inactive => write!(f, "This coupon is no longer active"),
            CouponError::NotYetValid => write!(f, "This coupon is not yet valid"),
            CouponError::Expired => write!(f, "This coupon has expired"),
            CouponError::UsageLimitReached => write!(f, "This coupon has reached its usage limit"),
            CouponError::MinimumNotMet { minimum } => {
                write!(f, "Minimum purchase of {} required", format_currency(*minimum))
            }
            CouponError::NotApplicable => {
                write!(f, "This coupon doesn't apply to any items in your cart")
            }
        }
    }
}

impl std::error::Error for CouponError {}

/// One priced cart line as seen by the coupon rules.
#[derive(Debug, Clone, Copy)]
pub struct PricedLine {
    pub product_id: i64,
    pub line_total: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CouponQuote {
    pub code: String,
    pub kind: DiscountKind,
    pub value: f64,
    pub discount_amount: f64,
    pub free_shipping: bool,
}

pub fn normalize_code(input: &str) -> String {
    input.trim().to_uppercase()
}

/// Discount for `amount`, rounded to cents and never above `amount`.
pub fn calculate_discount(amount: f64, coupon: &Coupon) -> f64 {
    if amount <= 0.0 {
        return 0.0;
    }
    match coupon.kind {
        DiscountKind::Percentage => clamp_currency(amount * coupon.value / 100.0, 0.0, amount),
        DiscountKind::Fixed => clamp_currency(coupon.value, 0.0, amount),
        DiscountKind::FreeShipping => 0.0,
    }
}

/// Checks that do not depend on the cart: activity, validity window, usage.
pub fn check_eligibility(coupon: &Coupon, now: DateTime<Utc>) -> Result<(), CouponError> {
    if !coupon.is_active {
        return Err(CouponError::Inactive);
    }
    if matches!(coupon.valid_from, Some(from) if now < from) {
        return Err(CouponError::NotYetValid);
    }
    // Expiry instant itself is still valid
    if matches!(coupon.expires, Some(expires) if now > expires) {
        return Err(CouponError::Expired);
    }
    if coupon.is_exhausted() {
        return Err(CouponError::UsageLimitReached);
    }
    Ok(())
}

/// Full evaluation of a coupon against a priced cart.
///
/// The minimum-subtotal rule looks at the whole cart, the discount only at
/// the lines the coupon applies to.
pub fn evaluate(
    coupon: &Coupon,
    lines: &[PricedLine],
    now: DateTime<Utc>,
) -> Result<CouponQuote, CouponError> {
    check_eligibility(coupon, now)?;

    let subtotal = round_to_cents(lines.iter().map(|l| l.line_total).sum());
    let applicable = round_to_cents(
        lines
            .iter()
            .filter(|l| coupon.applies_to(l.product_id))
            .map(|l| l.line_total)
            .sum(),
    );

    quote(coupon, subtotal, applicable)
}

/// Evaluation against a bare subtotal. Product scoping is not applied.
pub fn evaluate_subtotal(
    coupon: &Coupon,
    subtotal: f64,
    now: DateTime<Utc>,
) -> Result<CouponQuote, CouponError> {
    check_eligibility(coupon, now)?;
    let subtotal = round_to_cents(subtotal);
    quote(coupon, subtotal, subtotal)
}

fn quote(coupon: &Coupon, subtotal: f64, applicable: f64) -> Result<CouponQuote, CouponError> {
    if let Some(minimum) = coupon.minimum_subtotal {
        if subtotal < minimum {
            return Err(CouponError::MinimumNotMet { minimum });
        }
    }

    let free_shipping = coupon.kind == DiscountKind::FreeShipping;
    let discount_amount = calculate_discount(applicable, coupon);
    let applies = if free_shipping { applicable > 0.0 } else { discount_amount > 0.0 };
    if !applies {
        return Err(CouponError::NotApplicable);
    }

    Ok(CouponQuote {
        code: coupon.code.clone(),
        kind: coupon.kind,
        value: coupon.value,
        discount_amount,
        free_shipping,
    })
}
