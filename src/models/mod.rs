pub mod cart;
pub mod coupon;
pub mod flash_sale;
pub mod order;
pub mod product;
