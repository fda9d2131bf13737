// Demo catalogue loaded at startup when SEED_DEMO_DATA is on.
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::models::coupon::{Coupon, DiscountKind};
use crate::models::flash_sale::FlashSale;
use crate::models::product::Product;
use crate::store::Store;

struct DemoProduct {
    name: &'static str,
    description: &'static str,
    price: f64,
    stock: i32,
    category: &'static str,
}

const PRODUCTS: [DemoProduct; 8] = [
    DemoProduct { name: "Laptop Pro 15", description: "High-performance laptop with 16GB RAM and 512GB SSD", price: 1299.99, stock: 10, category: "Electronics" },
    DemoProduct { name: "Wireless Mouse", description: "Ergonomic wireless mouse with precision tracking", price: 49.99, stock: 50, category: "Electronics" },
    DemoProduct { name: "USB-C Hub", description: "7-in-1 USB-C hub with HDMI, USB 3.0, and SD card reader", price: 79.99, stock: 30, category: "Electronics" },
    DemoProduct { name: "Mechanical Keyboard", description: "RGB mechanical keyboard with blue switches", price: 149.99, stock: 20, category: "Electronics" },
    DemoProduct { name: "4K Webcam", description: "Professional 4K webcam with auto-focus and noise cancellation", price: 199.99, stock: 15, category: "Electronics" },
    DemoProduct { name: "Desk Lamp", description: "LED desk lamp with adjustable brightness and color temperature", price: 39.99, stock: 40, category: "Office" },
    DemoProduct { name: "Standing Desk", description: "Electric height-adjustable standing desk", price: 599.99, stock: 5, category: "Office" },
    DemoProduct { name: "Office Chair", description: "Ergonomic office chair with lumbar support", price: 349.99, stock: 8, category: "Office" },
];

pub fn demo_store(now: DateTime<Utc>) -> Store {
    let mut store = Store::default();

    for p in &PRODUCTS {
        let id = store.next_id();
        store.insert_product(Product {
            id,
            name: p.name.to_string(),
            description: Some(p.description.to_string()),
            price: p.price,
            stock: p.stock,
            image_url: Some(format!("https://via.placeholder.com/300x200?text={}", p.name.replace(' ', "+"))),
            category: Some(p.category.to_string()),
            created_at: now,
        });
    }

    let electronics = store.products_in_category("Electronics");
    let far_future = Utc.with_ymd_and_hms(2099, 12, 31, 23, 59, 59).single();
    let long_gone = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).single();

    let coupons = [
        ("SAVE10", "10% off orders over $50", DiscountKind::Percentage, 10.0, Some(50.0), far_future, None, vec![]),
        ("WELCOME20", "20% off orders over $100", DiscountKind::Percentage, 20.0, Some(100.0), far_future, None, vec![]),
        ("FLAT50", "$50 off orders over $200", DiscountKind::Fixed, 50.0, Some(200.0), far_future, None, vec![]),
        ("SAVE20", "20% off, limited to 50 uses", DiscountKind::Percentage, 20.0, None, far_future, Some(50), vec![]),
        ("BIGSAVE20", "20% off orders over $100", DiscountKind::Percentage, 20.0, Some(100.0), None, None, vec![]),
        ("WELCOME5", "$5 off orders over $25", DiscountKind::Fixed, 5.0, Some(25.0), None, None, vec![]),
        ("FREESHIP", "Free shipping on orders over $30", DiscountKind::FreeShipping, 0.0, Some(30.0), None, None, vec![]),
        ("ELECTRONICS15", "15% off electronics", DiscountKind::Percentage, 15.0, Some(200.0), Some(now + Duration::days(45)), None, electronics),
        ("EXPIRED5", "Expired promotion", DiscountKind::Percentage, 5.0, None, long_gone, Some(10), vec![]),
    ];

    for (code, description, kind, value, minimum_subtotal, expires, usage_limit, applicable) in coupons {
        let id = store.next_id();
        let coupon = Coupon {
            id,
            code: code.to_string(),
            description: description.to_string(),
            kind,
            value,
            minimum_subtotal,
            valid_from: None,
            expires,
            usage_limit,
            times_used: 0,
            is_active: true,
            applicable_product_ids: applicable,
            created_at: now,
        };
        if let Err(e) = store.insert_coupon(coupon) {
            tracing::warn!(code, error = %e, "Skipping demo coupon");
        }
    }

    let hub = store.products(0, usize::MAX).into_iter().find(|p| p.name == "USB-C Hub").map(|p| p.id);
    let lamp = store.products(0, usize::MAX).into_iter().find(|p| p.name == "Desk Lamp").map(|p| p.id);
    let sales = [
        (hub, "Hub hour", 25.0, now, now + Duration::hours(1), Some(20)),
        (lamp, "Evening lamp deal", 40.0, now + Duration::hours(6), now + Duration::hours(9), None),
    ];
    for (product_id, title, discount_percentage, start_time, end_time, max_quantity) in sales {
        let Some(product_id) = product_id else { continue };
        let id = store.next_id();
        store.insert_flash_sale(FlashSale {
            id,
            product_id,
            title: title.to_string(),
            description: None,
            discount_percentage,
            start_time,
            end_time,
            max_quantity,
            sold_quantity: 0,
            is_active: true,
        });
    }

    store
}
