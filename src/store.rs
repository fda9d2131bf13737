//! In-process storefront state: catalogue, coupons, carts, orders, flash sales.
//!
//! Nothing here is persisted. The store sits behind one `RwLock` in
//! [`crate::state::AppState`]; every method runs under that lock, so a
//! `&mut self` method is atomic with respect to other requests.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::cart::CartItem;
use crate::models::coupon::Coupon;
use crate::models::flash_sale::FlashSale;
use crate::models::order::{shipping_method, Order, OrderItem};
use crate::models::product::Product;
use crate::pricing::coupons::{self, CouponError, CouponQuote, PricedLine};
use crate::pricing::flash_sales;
use crate::pricing::money::round_to_cents;

#[derive(Debug, Default)]
pub struct Store {
    products: BTreeMap<i64, Product>,
    coupons: BTreeMap<i64, Coupon>,
    cart_items: BTreeMap<i64, CartItem>,
    orders: Vec<Order>,
    flash_sales: BTreeMap<i64, FlashSale>,
    last_id: i64,
}

/// A product line with the price the shopper actually pays right now.
#[derive(Debug, Clone)]
pub struct PricedItem {
    pub product: Product,
    pub quantity: i32,
    pub unit_price: f64,
    pub line_total: f64,
    pub flash_sale_id: Option<i64>,
}

impl PricedItem {
    pub fn as_line(&self) -> PricedLine {
        PricedLine { product_id: self.product.id, line_total: self.line_total }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrderDraft {
    pub session_id: Option<String>,
    pub items: Vec<(i64, i32)>,
    pub coupon_code: Option<String>,
    pub shipping_method: Option<String>,
}

impl Store {
    pub fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    // Products

    pub fn products(&self, skip: usize, limit: usize) -> Vec<Product> {
        self.products.values().skip(skip).take(limit).cloned().collect()
    }

    pub fn product(&self, id: i64) -> Option<&Product> {
        self.products.get(&id)
    }

    pub fn product_mut(&mut self, id: i64) -> Option<&mut Product> {
        self.products.get_mut(&id)
    }

    pub fn insert_product(&mut self, product: Product) -> Product {
        self.products.insert(product.id, product.clone());
        product
    }

    /// Removes the product along with cart lines and flash sales pointing at it.
    pub fn remove_product(&mut self, id: i64) -> Option<Product> {
        let removed = self.products.remove(&id)?;
        self.cart_items.retain(|_, item| item.product_id != id);
        self.flash_sales.retain(|_, sale| sale.product_id != id);
        for coupon in self.coupons.values_mut() {
            coupon.applicable_product_ids.retain(|pid| *pid != id);
        }
        Some(removed)
    }

    pub fn products_in_category(&self, category: &str) -> Vec<i64> {
        self.products
            .values()
            .filter(|p| p.category.as_deref().is_some_and(|c| c.eq_ignore_ascii_case(category)))
            .map(|p| p.id)
            .collect()
    }

    // Coupons

    pub fn coupons(&self, active_only: bool, skip: usize, limit: usize) -> Vec<Coupon> {
        self.coupons
            .values()
            .filter(|c| !active_only || c.is_active)
            .skip(skip)
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn coupon(&self, id: i64) -> Option<&Coupon> {
        self.coupons.get(&id)
    }

    pub fn coupon_mut(&mut self, id: i64) -> Option<&mut Coupon> {
        self.coupons.get_mut(&id)
    }

    /// Case-insensitive lookup.
    pub fn coupon_by_code(&self, code: &str) -> Result<&Coupon, CouponError> {
        let code = coupons::normalize_code(code);
        if code.is_empty() {
            return Err(CouponError::EmptyCode);
        }
        self.coupons.values().find(|c| c.code == code).ok_or(CouponError::NotFound)
    }

    pub fn insert_coupon(&mut self, mut coupon: Coupon) -> Result<Coupon, AppError> {
        coupon.code = coupons::normalize_code(&coupon.code);
        if self.coupon_by_code(&coupon.code).is_ok() {
            return Err(AppError::conflict("Coupon code already exists"));
        }
        self.coupons.insert(coupon.id, coupon.clone());
        Ok(coupon)
    }

    pub fn remove_coupon(&mut self, id: i64) -> Option<Coupon> {
        self.coupons.remove(&id)
    }

    /// Consumes one use of the coupon. Fails once the usage limit is reached.
    pub fn redeem_coupon(&mut self, code: &str, now: DateTime<Utc>) -> Result<u32, CouponError> {
        let id = self.coupon_by_code(code)?.id;
        let coupon = self.coupons.get_mut(&id).ok_or(CouponError::NotFound)?;
        coupons::check_eligibility(coupon, now)?;
        coupon.times_used += 1;
        tracing::info!(code = %coupon.code, times_used = coupon.times_used, limit = ?coupon.usage_limit, "Coupon redeemed");
        Ok(coupon.times_used)
    }

    pub fn reset_coupon_usage(&mut self) {
        for coupon in self.coupons.values_mut() {
            coupon.times_used = 0;
        }
    }

    /// Quote for `code` against priced items, without consuming a use.
    pub fn quote_coupon(
        &self,
        code: &str,
        items: &[PricedItem],
        now: DateTime<Utc>,
    ) -> Result<CouponQuote, CouponError> {
        let coupon = self.coupon_by_code(code)?;
        let lines: Vec<PricedLine> = items.iter().map(PricedItem::as_line).collect();
        coupons::evaluate(coupon, &lines, now)
    }

    // Flash sales

    pub fn flash_sales(&self) -> Vec<FlashSale> {
        self.flash_sales.values().cloned().collect()
    }

    pub fn flash_sale(&self, id: i64) -> Option<&FlashSale> {
        self.flash_sales.get(&id)
    }

    pub fn insert_flash_sale(&mut self, sale: FlashSale) -> FlashSale {
        self.flash_sales.insert(sale.id, sale.clone());
        sale
    }

    pub fn remove_flash_sale(&mut self, id: i64) -> Option<FlashSale> {
        self.flash_sales.remove(&id)
    }

    /// The purchasable flash sale for a product at `now`, if any.
    pub fn live_flash_sale(&self, product_id: i64, now: DateTime<Utc>) -> Option<&FlashSale> {
        let product = self.products.get(&product_id)?;
        self.flash_sales
            .values()
            .filter(|s| s.product_id == product_id)
            .find(|s| flash_sales::availability(s, product, now).is_ok())
    }

    // Pricing

    /// Prices `(product_id, quantity)` pairs, applying live flash sales.
    pub fn price_items(&self, items: &[(i64, i32)], now: DateTime<Utc>) -> Result<Vec<PricedItem>, AppError> {
        items
            .iter()
            .map(|&(product_id, quantity)| {
                if quantity <= 0 {
                    return Err(AppError::validation("Quantity must be greater than 0"));
                }
                let product = self
                    .product(product_id)
                    .ok_or_else(|| AppError::not_found(format!("Product {product_id} not found")))?;

                // A line larger than the sale's remaining cap pays the regular price.
                let sale = self
                    .live_flash_sale(product_id, now)
                    .filter(|s| flash_sales::covers(s, quantity));
                let unit_price = match sale {
                    Some(sale) => flash_sales::flash_price(product.price, sale.discount_percentage)
                        .map_err(AppError::internal)?,
                    None => product.price,
                };

                Ok(PricedItem {
                    product: product.clone(),
                    quantity,
                    unit_price,
                    line_total: round_to_cents(unit_price * quantity as f64),
                    flash_sale_id: sale.map(|s| s.id),
                })
            })
            .collect()
    }

    // Cart

    pub fn cart_items(&self, session_id: &str) -> Vec<CartItem> {
        self.cart_items.values().filter(|i| i.session_id == session_id).cloned().collect()
    }

    /// Adds to the session cart, merging with an existing line for the product.
    pub fn add_to_cart(
        &mut self,
        session_id: &str,
        product_id: i64,
        quantity: i32,
        now: DateTime<Utc>,
    ) -> Result<CartItem, AppError> {
        if quantity <= 0 {
            return Err(AppError::validation("Quantity must be greater than 0"));
        }
        let stock = self
            .product(product_id)
            .ok_or_else(|| AppError::not_found("Product not found"))?
            .stock;

        let existing = self
            .cart_items
            .values()
            .find(|i| i.session_id == session_id && i.product_id == product_id)
            .map(|i| i.id);

        let wanted = existing
            .and_then(|id| self.cart_items.get(&id))
            .map_or(0, |i| i.quantity)
            .checked_add(quantity)
            .ok_or_else(|| AppError::validation("Quantity is too large"))?;
        if stock < wanted {
            return Err(AppError::validation("Insufficient stock"));
        }

        let id = match existing {
            Some(id) => id,
            None => {
                let id = self.next_id();
                self.cart_items.insert(
                    id,
                    CartItem {
                        id,
                        session_id: session_id.to_string(),
                        product_id,
                        quantity: 0,
                        created_at: now,
                    },
                );
                id
            }
        };

        let item = self.cart_items.get_mut(&id).ok_or_else(|| AppError::internal("cart line vanished"))?;
        item.quantity = wanted;
        Ok(item.clone())
    }

    pub fn update_cart_item(&mut self, id: i64, quantity: i32) -> Result<CartItem, AppError> {
        if quantity <= 0 {
            return Err(AppError::validation("Quantity must be greater than 0"));
        }
        let product_id = self
            .cart_items
            .get(&id)
            .ok_or_else(|| AppError::not_found("Cart item not found"))?
            .product_id;
        let stock = self.product(product_id).map_or(0, |p| p.stock);
        if stock < quantity {
            return Err(AppError::validation("Insufficient stock"));
        }

        let item = self.cart_items.get_mut(&id).ok_or_else(|| AppError::not_found("Cart item not found"))?;
        item.quantity = quantity;
        Ok(item.clone())
    }

    pub fn remove_cart_item(&mut self, id: i64) -> Option<CartItem> {
        self.cart_items.remove(&id)
    }

    pub fn clear_cart(&mut self, session_id: &str) -> usize {
        let before = self.cart_items.len();
        self.cart_items.retain(|_, i| i.session_id != session_id);
        before - self.cart_items.len()
    }

    // Orders

    /// Validates and places an order in one step: stock, coupon and shipping
    /// are checked before anything is mutated.
    pub fn place_order(&mut self, draft: OrderDraft, now: DateTime<Utc>) -> Result<Order, AppError> {
        if draft.items.is_empty() {
            return Err(AppError::validation("Order must contain at least one item"));
        }

        // Merge repeated product lines so stock is checked on the total.
        let mut merged: Vec<(i64, i32)> = Vec::new();
        let mut index: HashMap<i64, usize> = HashMap::new();
        for &(product_id, quantity) in &draft.items {
            if quantity <= 0 {
                return Err(AppError::validation("Quantity must be greater than 0"));
            }
            match index.get(&product_id) {
                Some(&pos) => {
                    merged[pos].1 = merged[pos]
                        .1
                        .checked_add(quantity)
                        .ok_or_else(|| AppError::validation("Quantity is too large"))?;
                }
                None => {
                    index.insert(product_id, merged.len());
                    merged.push((product_id, quantity));
                }
            }
        }

        let priced = self.price_items(&merged, now)?;
        for item in &priced {
            if item.product.stock < item.quantity {
                return Err(AppError::validation(format!("Insufficient stock for {}", item.product.name)));
            }
        }

        let shipping = match draft.shipping_method.as_deref() {
            Some(id) => Some(shipping_method(id).ok_or_else(|| AppError::validation("Unknown shipping method"))?),
            None => None,
        };

        let coupon_code = draft
            .coupon_code
            .as_deref()
            .map(coupons::normalize_code)
            .filter(|c| !c.is_empty());
        let quote = match coupon_code.as_deref() {
            Some(code) => Some(self.quote_coupon(code, &priced, now)?),
            None => None,
        };

        let subtotal = round_to_cents(priced.iter().map(|i| i.line_total).sum());
        let discount_amount = quote.as_ref().map_or(0.0, |q| q.discount_amount);
        let free_shipping = quote.as_ref().is_some_and(|q| q.free_shipping);
        let shipping_cost = if free_shipping { 0.0 } else { shipping.map_or(0.0, |m| m.price) };
        let total = round_to_cents((subtotal - discount_amount).max(0.0) + shipping_cost);

        // Everything validated; apply side effects.
        if let Some(code) = coupon_code.as_deref() {
            self.redeem_coupon(code, now)?;
        }
        for item in &priced {
            if let Some(product) = self.products.get_mut(&item.product.id) {
                product.stock -= item.quantity;
            }
            if let Some(sale) = item.flash_sale_id.and_then(|id| self.flash_sales.get_mut(&id)) {
                sale.sold_quantity += item.quantity;
            }
        }
        if let Some(session_id) = draft.session_id.as_deref() {
            self.clear_cart(session_id);
        }

        let order = Order {
            id: format!("order_{}", Uuid::new_v4().simple()),
            session_id: draft.session_id,
            items: priced
                .iter()
                .map(|i| OrderItem {
                    product_id: i.product.id,
                    product_name: i.product.name.clone(),
                    quantity: i.quantity,
                    unit_price: i.unit_price,
                    line_total: i.line_total,
                })
                .collect(),
            subtotal,
            discount_amount,
            shipping_method: shipping.map(|m| m.id.to_string()),
            shipping_cost,
            total,
            coupon_code: quote.map(|q| q.code),
            created_at: now,
        };
        self.orders.push(order.clone());
        Ok(order)
    }

    pub fn order(&self, id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    pub fn orders_for_session(&self, session_id: &str, skip: usize, limit: usize) -> Vec<Order> {
        self.orders
            .iter()
            .filter(|o| o.session_id.as_deref() == Some(session_id))
            .skip(skip)
            .take(limit)
            .cloned()
            .collect()
    }
}
