pub mod admin;
pub mod cart;
pub mod checkout;
pub mod coupon;
pub mod flash_sale;
pub mod product;
