//! # Seed Data Generator
//!
//! Populates the database with a small sample catalogue for development.
//!
//! ## Usage
//! ```bash
//! # Use PANTRY_DATABASE_PATH (default ./pantry.db)
//! cargo run -p pantry-db --bin seed
//!
//! # Specify database path
//! cargo run -p pantry-db --bin seed -- --db ./data/pantry.db
//! ```
//!
//! Products are written through `ProductRepository::store`, so the seed
//! exercises the same statements as any other caller.

use std::env;

use pantry_db::{Database, DbConfig, Product, ProductRepository};
use tracing_subscriber::EnvFilter;

/// Sample catalogue: (name, type, count, price)
const CATALOGUE: &[(&str, &str, i64, f64)] = &[
    ("yogurt", "entero", 20, 20.5),
    ("crema", "manos", 10, 40.0),
    ("jabon", "manos", 35, 12.75),
    ("leche", "descremada", 48, 9.9),
    ("queso", "rallado", 12, 31.0),
    ("shampoo", "cabello", 8, 55.25),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut config = DbConfig::from_env()?;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-d" | "--db" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "-h" | "--help" => {
                println!("Pantry Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $PANTRY_DATABASE_PATH or ./pantry.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Pantry Seed Data Generator");
    println!("==========================");
    println!("Database: {}", config.database_path.display());
    println!();

    let db = Database::new(config).await?;
    let repo = db.products();

    println!("✓ Connected to database");
    println!("✓ Schema provisioned");

    let existing = repo.get_all().await?.len();
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        db.close().await;
        return Ok(());
    }

    let mut stored = 0;
    for (name, kind, count, price) in CATALOGUE {
        match repo.store(Product::new(*name, *kind, *count, *price)).await {
            Ok(product) => {
                println!(
                    "  #{:<3} {:<10} {:<12} {:>4} @ {:>7.2}",
                    product.id, product.name, product.kind, product.count, product.price
                );
                stored += 1;
            }
            Err(e) => eprintln!("Failed to insert {}: {}", name, e),
        }
    }

    println!();
    println!("✓ Stored {} products", stored);

    // Verify lookup by name
    let crema = repo.get_by_name("crema").await?;
    println!("  Lookup 'crema': id {}", crema.id);

    db.close().await;
    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - Default: `info,pantry=debug,sqlx=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pantry=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
