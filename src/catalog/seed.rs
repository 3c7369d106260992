//! Demo inventory the storefront boots with.

use crate::models::{Product, ProductCategory};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[allow(clippy::too_many_arguments)]
fn product(
    id: &str,
    name: &str,
    description: &str,
    price: Decimal,
    category: ProductCategory,
    rating: f64,
    reviews: u32,
    in_stock: bool,
    features: &[&str],
) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        price,
        category,
        image: format!("https://images.storefront.example/products/{id}.jpg"),
        rating,
        reviews,
        in_stock,
        features: features.iter().map(|f| f.to_string()).collect(),
    }
}

pub fn demo_products() -> Vec<Product> {
    use ProductCategory::*;

    vec![
        product(
            "1",
            "MacBook Pro 16-inch Laptop",
            "Apple M3 Pro chip with an 18-core GPU and a Liquid Retina XDR display.",
            dec!(2499.99),
            Electronics,
            4.8,
            1247,
            true,
            &["M3 Pro chip", "18GB unified memory", "512GB SSD", "22-hour battery"],
        ),
        product(
            "2",
            "Gaming Laptop RTX 4070",
            "15.6-inch 165Hz gaming laptop with a GeForce RTX 4070.",
            dec!(1599.99),
            Electronics,
            4.6,
            532,
            true,
            &["RTX 4070", "32GB DDR5", "1TB NVMe SSD", "165Hz display"],
        ),
        product(
            "3",
            "iPhone 15 Pro Smartphone",
            "Titanium design, A17 Pro chip and a 48MP main camera.",
            dec!(999.99),
            Electronics,
            4.7,
            2156,
            true,
            &["A17 Pro chip", "48MP camera", "USB-C", "Action button"],
        ),
        product(
            "4",
            "Samsung Galaxy S24 Phone",
            "AI-powered Android flagship with a 6.2-inch Dynamic AMOLED screen.",
            dec!(849.99),
            Electronics,
            4.5,
            987,
            true,
            &["Snapdragon 8 Gen 3", "50MP camera", "120Hz display"],
        ),
        product(
            "5",
            "Pixel 8a Budget Phone",
            "Affordable Android phone with a great camera and seven years of updates.",
            dec!(499.00),
            Electronics,
            4.4,
            644,
            false,
            &["Tensor G3", "64MP camera", "7 years of updates"],
        ),
        product(
            "6",
            "Wireless Noise-Cancelling Headphones",
            "Over-ear headphones with adaptive noise cancellation and 30-hour battery.",
            dec!(349.99),
            Electronics,
            4.6,
            1873,
            true,
            &["Active noise cancellation", "30-hour battery", "Multipoint Bluetooth"],
        ),
        product(
            "7",
            "The Pragmatic Programmer",
            "20th anniversary edition of the classic guide to software craftsmanship.",
            dec!(49.99),
            Books,
            4.8,
            3021,
            true,
            &["Hardcover", "352 pages", "2nd edition"],
        ),
        product(
            "8",
            "Atomic Habits",
            "An easy and proven way to build good habits and break bad ones.",
            dec!(16.99),
            Books,
            4.9,
            8842,
            true,
            &["Paperback", "320 pages"],
        ),
        product(
            "9",
            "Dune",
            "Frank Herbert's science fiction masterpiece.",
            dec!(12.99),
            Books,
            4.7,
            5410,
            true,
            &["Paperback", "896 pages"],
        ),
        product(
            "10",
            "Clean Code",
            "A handbook of agile software craftsmanship.",
            dec!(39.99),
            Books,
            4.4,
            2287,
            true,
            &["Paperback", "464 pages"],
        ),
        product(
            "11",
            "Organic Cotton T-Shirt",
            "Soft crew-neck tee made from 100% organic cotton.",
            dec!(24.99),
            Clothing,
            4.3,
            412,
            true,
            &["100% organic cotton", "Machine washable", "Regular fit"],
        ),
        product(
            "12",
            "Slim Fit Denim Jeans",
            "Stretch denim jeans with a modern slim fit.",
            dec!(69.99),
            Clothing,
            4.4,
            689,
            true,
            &["Stretch denim", "Five pockets", "Slim fit"],
        ),
        product(
            "13",
            "Waterproof Rain Jacket",
            "Lightweight, packable shell with sealed seams.",
            dec!(129.99),
            Clothing,
            4.5,
            301,
            true,
            &["Waterproof", "Packable hood", "Breathable"],
        ),
        product(
            "14",
            "Robot Vacuum Cleaner",
            "Self-emptying robot vacuum with lidar navigation.",
            dec!(399.99),
            HomeAndGarden,
            4.4,
            756,
            true,
            &["Lidar mapping", "Self-emptying base", "App control"],
        ),
        product(
            "15",
            "Ergonomic Office Chair",
            "Fully adjustable mesh chair with lumbar support.",
            dec!(289.99),
            HomeAndGarden,
            4.6,
            1034,
            true,
            &["Adjustable lumbar support", "Breathable mesh", "4D armrests"],
        ),
        product(
            "16",
            "Stainless Steel Cookware Set",
            "10-piece tri-ply cookware set, oven safe to 500F.",
            dec!(199.99),
            HomeAndGarden,
            4.5,
            478,
            false,
            &["10 pieces", "Tri-ply construction", "Dishwasher safe"],
        ),
        product(
            "17",
            "Non-Slip Yoga Mat",
            "6mm cushioned mat with alignment lines.",
            dec!(34.99),
            Sports,
            4.6,
            2210,
            true,
            &["6mm thick", "Non-slip surface", "Carry strap"],
        ),
        product(
            "18",
            "Carbon Road Bike",
            "Lightweight carbon frame road bike with electronic shifting.",
            dec!(1899.99),
            Sports,
            4.7,
            143,
            true,
            &["Carbon frame", "Electronic shifting", "Disc brakes"],
        ),
        product(
            "19",
            "Adjustable Dumbbell Set",
            "Pair of dumbbells adjustable from 5 to 52.5 lbs.",
            dec!(299.99),
            Sports,
            4.5,
            925,
            true,
            &["5-52.5 lbs", "Quick-change dial", "Space saving"],
        ),
        product(
            "20",
            "Desktop Computer Tower",
            "Mid-tower desktop with a Ryzen 7 processor for work and play.",
            dec!(1199.99),
            Electronics,
            4.3,
            201,
            true,
            &["Ryzen 7", "32GB RAM", "2TB SSD"],
        ),
    ]
}
