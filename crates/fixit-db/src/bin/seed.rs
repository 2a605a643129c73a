//! # Seed Data Generator
//!
//! Fills a development database with a month of shop activity.
//!
//! ## Usage
//! ```bash
//! # 60 repair orders (default) plus sales and expenditures
//! cargo run -p fixit-db --bin seed
//!
//! # More orders, fixed RNG seed for a reproducible dataset
//! cargo run -p fixit-db --bin seed -- --orders 200 --seed 7
//!
//! # Specify database path
//! cargo run -p fixit-db --bin seed -- --db ./data/fixit.db
//! ```
//!
//! ## Generated Data
//! Spread over the last 30 days:
//! - Repair orders across every status, about half with the balance
//!   already collected
//! - Two sales per order on average (covers, glass, chargers)
//! - One expenditure every other day (parts, rent, tea)

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::env;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use fixit_core::{
    Expenditure, OrderInput, OrderStatus, PaymentMode, RepairOrder, Sale, DEFAULT_SALE_CATEGORY,
};
use fixit_db::{Database, DbConfig};

const DEVICES: &[(&str, &[&str])] = &[
    ("Samsung", &["Galaxy M31", "Galaxy A52", "Galaxy S21", "Galaxy F23"]),
    ("Apple", &["iPhone 11", "iPhone 12", "iPhone XR", "iPhone 13"]),
    ("Xiaomi", &["Redmi Note 9", "Redmi Note 11", "Poco X3", "Mi 11X"]),
    ("OnePlus", &["Nord CE 2", "OnePlus 9R", "OnePlus 8T"]),
    ("Vivo", &["Y20", "V21", "T1"]),
];

const PROBLEMS: &[(&str, i64)] = &[
    ("Screen cracked", 250_000),
    ("Battery drains fast", 120_000),
    ("Charging port loose", 60_000),
    ("Water damage", 180_000),
    ("Speaker not working", 70_000),
    ("Back glass broken", 90_000),
    ("Stuck on boot logo", 50_000),
];

const CUSTOMERS: &[&str] = &[
    "Asha Rao", "Ravi Kumar", "Priya Nair", "Imran Shaikh", "Meena Iyer", "Karan Mehta",
    "Sunita Das", "Arjun Pillai", "Neha Joshi", "Vikram Singh",
];

const ACCESSORIES: &[(&str, &str, i64)] = &[
    ("Tempered glass", "Accessories", 15_000),
    ("Silicone cover", "Accessories", 25_000),
    ("20W charger", "Chargers", 89_900),
    ("USB-C cable", "Cables", 29_900),
    ("Earphones", "Audio", 49_900),
    ("Memory card 64GB", "", 59_900),
];

const EXPENSES: &[(&str, i64)] = &[
    ("Parts", 150_000),
    ("Rent", 1_500_000),
    ("Electricity", 250_000),
    ("Tea & snacks", 8_000),
    ("Tools", 60_000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut order_count: usize = 60;
    let mut db_path = String::from("./fixit_dev.db");
    let mut rng_seed: Option<u64> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--orders" | "-o" => {
                if i + 1 < args.len() {
                    order_count = args[i + 1].parse().unwrap_or(60);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--seed" | "-s" => {
                if i + 1 < args.len() {
                    rng_seed = args[i + 1].parse().ok();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("FixIt Shop Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -o, --orders <N>   Number of repair orders (default: 60)");
                println!("  -d, --db <PATH>    Database file path (default: ./fixit_dev.db)");
                println!("  -s, --seed <N>     RNG seed for a reproducible dataset");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 FixIt Shop Seed Data Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!("Orders:   {}", order_count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM repair_orders")
        .fetch_one(db.pool())
        .await?;
    if existing > 0 {
        println!("⚠ Database already has {} repair orders", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let mut rng = match rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let now = Utc::now();
    let start = std::time::Instant::now();

    println!();
    println!("Generating repair orders...");
    for _ in 0..order_count {
        let order = generate_order(&mut rng, now);
        if let Err(e) = db.orders().insert(&order).await {
            eprintln!("Failed to insert order {}: {}", order.id, e);
        }
    }

    println!("Generating sales...");
    let sale_count = order_count * 2;
    for _ in 0..sale_count {
        let sale = generate_sale(&mut rng, now);
        if let Err(e) = db.sales().insert(&sale).await {
            eprintln!("Failed to insert sale {}: {}", sale.id, e);
        }
    }

    println!("Generating expenditures...");
    let mut expenditure_count = 0;
    for day in (0..30).step_by(2) {
        let expenditure = generate_expenditure(&mut rng, now - Duration::days(day));
        if let Err(e) = db.expenditures().insert(&expenditure).await {
            eprintln!("Failed to insert expenditure {}: {}", expenditure.id, e);
            continue;
        }
        expenditure_count += 1;
    }

    let elapsed = start.elapsed();
    println!();
    println!(
        "✓ Generated {} orders, {} sales, {} expenditures in {:?}",
        order_count, sale_count, expenditure_count, elapsed
    );

    let counts = db.orders().status_counts().await?;
    println!("  Active repairs: {}", counts.active);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Some instant within the last 30 days.
fn random_instant(rng: &mut StdRng, now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::minutes(rng.gen_range(0..30 * 24 * 60))
}

fn generate_order(rng: &mut StdRng, now: DateTime<Utc>) -> RepairOrder {
    let (brand, models) = DEVICES[rng.gen_range(0..DEVICES.len())];
    let model = models[rng.gen_range(0..models.len())];
    let (problem, base_cost) = PROBLEMS[rng.gen_range(0..PROBLEMS.len())];
    let customer = CUSTOMERS[rng.gen_range(0..CUSTOMERS.len())];
    let created_at = random_instant(rng, now);

    // Round to whole rupees, the way the counter quotes
    let estimated_cost_paise = (base_cost + rng.gen_range(-20_000..=40_000)) / 100 * 100;
    let advance_paise = estimated_cost_paise * rng.gen_range(0..=5) / 10 / 100 * 100;

    let mut order = RepairOrder::intake(
        Uuid::new_v4().to_string(),
        OrderInput {
            customer_name: customer.to_string(),
            customer_phone: format!("98{:08}", rng.gen_range(0..CUSTOMERS.len() * 7)),
            device_brand: brand.to_string(),
            device_model: model.to_string(),
            problem: problem.to_string(),
            estimated_cost_paise,
            advance_paise,
            payment_mode_advance: random_mode(rng),
            payment_mode_balance: random_mode(rng),
            warranty: rng.gen_bool(0.4).then(|| "30 Days".to_string()),
            ..Default::default()
        },
        None,
        None,
        created_at,
    );

    order.status = *OrderStatus::ALL
        .choose(rng)
        .unwrap_or(&OrderStatus::New);

    if order.status == OrderStatus::Delivered || rng.gen_bool(0.2) {
        let elapsed = (now - created_at).num_minutes().max(1);
        order.balance_collected_at = Some(created_at + Duration::minutes(rng.gen_range(0..elapsed)));
    }

    order
}

fn generate_sale(rng: &mut StdRng, now: DateTime<Utc>) -> Sale {
    let (item, category, price) = ACCESSORIES[rng.gen_range(0..ACCESSORIES.len())];
    let quantity = rng.gen_range(1..=3);
    let category = if category.is_empty() {
        DEFAULT_SALE_CATEGORY
    } else {
        category
    };

    Sale {
        id: Uuid::new_v4().to_string(),
        item_name: item.to_string(),
        category: category.to_string(),
        quantity,
        unit_price_paise: price,
        total_price_paise: price * quantity,
        payment_mode: random_mode(rng),
        customer_name: None,
        customer_phone: None,
        created_by: None,
        created_at: random_instant(rng, now),
    }
}

fn generate_expenditure(rng: &mut StdRng, day: DateTime<Utc>) -> Expenditure {
    let (category, amount) = EXPENSES[rng.gen_range(0..EXPENSES.len())];
    Expenditure {
        id: Uuid::new_v4().to_string(),
        category: category.to_string(),
        amount_paise: amount,
        description: None,
        date: day,
        created_by: None,
        created_at: day,
    }
}

fn random_mode(rng: &mut StdRng) -> PaymentMode {
    PaymentMode::ALL[rng.gen_range(0..PaymentMode::ALL.len())]
}
