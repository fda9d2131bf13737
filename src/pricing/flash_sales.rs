use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::models::flash_sale::FlashSale;
use crate::models::product::Product;
use crate::pricing::money::round_to_cents;

const MAX_SALE_DURATION_HOURS: i64 = 24;
const MIN_SALE_DURATION_MINUTES: i64 = 15;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlashSaleStatus {
    pub is_active: bool,
    pub has_started: bool,
    pub has_ended: bool,
    /// Until start before the sale begins, until end while it runs, 0 after.
    pub time_remaining_ms: i64,
    pub percentage_complete: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
}

pub fn flash_price(original_price: f64, discount_percentage: f64) -> Result<f64, String> {
    if !(0.0..=100.0).contains(&discount_percentage) {
        return Err("Discount percentage must be between 0 and 100".to_string());
    }
    let discount = original_price * discount_percentage / 100.0;
    Ok(round_to_cents(original_price - discount))
}

pub fn status(sale: &FlashSale, now: DateTime<Utc>) -> FlashSaleStatus {
    let has_started = now >= sale.start_time;
    let has_ended = now >= sale.end_time;

    let (time_remaining_ms, percentage_complete) = if has_started && !has_ended {
        let total = (sale.end_time - sale.start_time).num_milliseconds() as f64;
        let elapsed = (now - sale.start_time).num_milliseconds() as f64;
        let pct = if total > 0.0 { elapsed / total * 100.0 } else { 100.0 };
        ((sale.end_time - now).num_milliseconds(), pct)
    } else if !has_started {
        ((sale.start_time - now).num_milliseconds(), 0.0)
    } else {
        (0, 0.0)
    };

    FlashSaleStatus {
        is_active: has_started && !has_ended && sale.is_active,
        has_started,
        has_ended,
        time_remaining_ms: time_remaining_ms.max(0),
        percentage_complete: percentage_complete.clamp(0.0, 100.0),
    }
}

/// `Err` carries the user-facing reason the sale cannot be bought right now.
pub fn availability(sale: &FlashSale, product: &Product, now: DateTime<Utc>) -> Result<(), &'static str> {
    let st = status(sale, now);
    if !st.is_active {
        if !st.has_started {
            return Err("Flash sale has not started yet");
        }
        if st.has_ended {
            return Err("Flash sale has ended");
        }
        return Err("Flash sale is not active");
    }
    if matches!(sale.max_quantity, Some(max) if sale.sold_quantity >= max) {
        return Err("Flash sale is sold out");
    }
    if !product.in_stock() {
        return Err("Product is out of stock");
    }
    Ok(())
}

/// Units still sellable at the flash price; `None` when the sale is uncapped.
pub fn remaining_quantity(sale: &FlashSale) -> Option<i32> {
    sale.max_quantity.map(|max| (max - sale.sold_quantity).max(0))
}

/// Whether the sale can supply all `quantity` units of one line.
pub fn covers(sale: &FlashSale, quantity: i32) -> bool {
    remaining_quantity(sale).map_or(true, |left| quantity <= left)
}

pub fn urgency(time_remaining_ms: i64) -> Urgency {
    const MINUTE_MS: i64 = 60_000;
    if time_remaining_ms <= 15 * MINUTE_MS {
        Urgency::Critical
    } else if time_remaining_ms <= 60 * MINUTE_MS {
        Urgency::High
    } else if time_remaining_ms <= 6 * 60 * MINUTE_MS {
        Urgency::Medium
    } else {
        Urgency::Low
    }
}

pub fn format_time_remaining(time_remaining_ms: i64) -> String {
    if time_remaining_ms <= 0 {
        return "Ended".to_string();
    }
    let total_secs = time_remaining_ms / 1000;
    let (days, hours) = (total_secs / 86_400, (total_secs % 86_400) / 3600);
    let (minutes, seconds) = ((total_secs % 3600) / 60, total_secs % 60);

    if days > 0 {
        format!("{days}d {hours}h")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// Every rule a new sale breaks; empty means valid.
pub fn validate_new(
    title: &str,
    discount_percentage: f64,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    max_quantity: Option<i32>,
    sold_quantity: i32,
    now: DateTime<Utc>,
) -> Vec<String> {
    let mut errors = Vec::new();

    if title.trim().is_empty() {
        errors.push("Title is required".to_string());
    }
    if discount_percentage <= 0.0 || discount_percentage > 100.0 {
        errors.push("Discount percentage must be between 1 and 100".to_string());
    }
    if start_time >= end_time {
        errors.push("End time must be after start time".to_string());
    }
    if end_time <= now {
        errors.push("End time must be in the future".to_string());
    }
    let duration = end_time - start_time;
    if duration > Duration::hours(MAX_SALE_DURATION_HOURS) {
        errors.push("Flash sales cannot exceed 24 hours in duration".to_string());
    }
    if duration < Duration::minutes(MIN_SALE_DURATION_MINUTES) {
        errors.push("Flash sales must be at least 15 minutes long".to_string());
    }
    if let Some(max) = max_quantity {
        if max <= 0 {
            errors.push("Maximum quantity must be greater than 0".to_string());
        }
        if sold_quantity > max {
            errors.push("Sold quantity cannot exceed maximum quantity".to_string());
        }
    }
    if sold_quantity < 0 {
        errors.push("Sold quantity cannot be negative".to_string());
    }

    errors
}
