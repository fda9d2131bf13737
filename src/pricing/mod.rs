//! Pricing rules shared by the cart, checkout and flash-sale handlers.
//!
//! Everything in here is a pure function over the models; the handlers
//! own the locking and the lookups.

pub mod coupons;
pub mod flash_sales;
pub mod money;
