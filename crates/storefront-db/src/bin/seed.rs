//! # Seed Reference Data
//!
//! Populates a database file with the storefront reference catalog.
//!
//! ## Usage
//! ```bash
//! # Seed ./storefront.db (default)
//! cargo run -p storefront-db --bin seed
//!
//! # Another database file
//! cargo run -p storefront-db --bin seed -- --db ./data/storefront.db
//!
//! # Drop the schema first and seed from scratch
//! cargo run -p storefront-db --bin seed -- --reset
//! ```
//!
//! Seeding is skipped per collection when it already has rows.

use std::env;

use storefront_db::{migrations, Database, DbConfig};
use tokio_util::sync::CancellationToken;

const USAGE: &str = "\
Seed the storefront reference catalog

usage: seed [--db <PATH>] [--reset]

  -d, --db <PATH>   database file (default ./storefront.db)
  -r, --reset       drop the catalog schema and start over
  -h, --help        print this text";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut db_path = String::from("./storefront.db");
    let mut reset = false;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" | "-d" => {
                db_path = args.next().ok_or("--db expects a path")?;
            }
            "--reset" | "-r" => reset = true,
            "--help" | "-h" => {
                println!("{USAGE}");
                return Ok(());
            }
            other => return Err(format!("unknown argument '{other}'\n\n{USAGE}").into()),
        }
    }

    println!("🌱 Storefront Seed Data");
    println!("=======================");
    println!("Target: {db_path}");
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Opened {db_path} and applied migrations");

    if reset {
        migrations::drop_schema(db.pool()).await?;
        db.run_migrations().await?;
        println!("✓ Schema recreated");
    }

    let report = db.seeder().seed_all().await?;
    if report.is_noop() {
        println!("⚠ Database already has data, nothing inserted.");
        println!("  Run with --reset to start over.");
    } else {
        println!("✓ Inserted {} categories", report.categories);
        println!("✓ Inserted {} special offers", report.offers);
    }

    let token = CancellationToken::new();
    let active = db.offers().list_active(&token).await?;
    let categories = db.categories().list_all(&token).await?;
    let (known, applied) = migrations::migration_status(db.pool()).await?;
    println!();
    println!("  Migrations:    {applied}/{known} applied");
    println!("  Active offers: {}", active.len());
    println!("  Categories:    {}", categories.len());

    db.close().await;
    println!();
    println!("✓ Done");

    Ok(())
}
