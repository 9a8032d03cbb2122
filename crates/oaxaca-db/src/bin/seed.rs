//! # Seed Data Generator
//!
//! Provisions the floor and a staff roster for development.
//!
//! ## Usage
//! ```bash
//! # 12 tables, 4 waiters (defaults)
//! cargo run -p oaxaca-db --bin seed
//!
//! # Custom floor
//! cargo run -p oaxaca-db --bin seed -- --tables 20 --waiters 6
//!
//! # Specify database path
//! cargo run -p oaxaca-db --bin seed -- --db ./data/oaxaca.db
//! ```
//!
//! Running it twice is harmless: existing tables are kept and the roster is
//! only created when the staff table is empty.

use std::env;

use oaxaca_core::{StaffType, DEFAULT_TABLE_COUNT};
use oaxaca_db::{Database, DbConfig};

const WAITER_NAMES: &[&str] = &[
    "Rosa", "Iker", "Lupita", "Mateo", "Ximena", "Diego", "Camila", "Emilio", "Renata", "Santiago",
];

const KITCHEN_NAMES: &[&str] = &["Tomas", "Guadalupe"];

const MANAGER_NAME: &str = "Marta";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./oaxaca_dev.db");
    let mut tables: u32 = DEFAULT_TABLE_COUNT;
    let mut waiters: usize = 4;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--tables" | "-t" => {
                if i + 1 < args.len() {
                    tables = args[i + 1].parse()?;
                    i += 1;
                }
            }
            "--waiters" | "-w" => {
                if i + 1 < args.len() {
                    waiters = args[i + 1].parse()?;
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Oaxaca Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>      Database file path (default: ./oaxaca_dev.db)");
                println!(
                    "  -t, --tables <N>     Tables to provision (default: {})",
                    DEFAULT_TABLE_COUNT
                );
                println!(
                    "  -w, --waiters <N>    Waiters to create, max {} (default: 4)",
                    WAITER_NAMES.len()
                );
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Oaxaca Seed Data Generator");
    println!("==========================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let created = db.tables().provision(tables).await?;
    println!(
        "✓ Floor has {} tables ({} new)",
        db.tables().count().await?,
        created
    );

    let roster = db.staff().list().await?;
    if !roster.is_empty() {
        println!("⚠ Staff roster already has {} members", roster.len());
        println!("  Skipping roster to avoid duplicates.");
        return Ok(());
    }

    for name in WAITER_NAMES.iter().take(waiters) {
        db.staff().add(name, StaffType::Waiter).await?;
    }
    for name in KITCHEN_NAMES {
        db.staff().add(name, StaffType::Kitchen).await?;
    }
    db.staff().add(MANAGER_NAME, StaffType::Manager).await?;

    println!(
        "✓ Added {} waiters, {} kitchen staff, 1 manager",
        waiters.min(WAITER_NAMES.len()),
        KITCHEN_NAMES.len()
    );
    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
