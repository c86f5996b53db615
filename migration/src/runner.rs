use colored::*;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::prelude::*;
use std::time::Instant;

const STATUS_COLUMN: usize = 80;

async fn connect(url: &str) -> DatabaseConnection {
    Database::connect(url).await.expect("DB connection failed")
}

fn padded(label: &str) -> String {
    let dots = ".".repeat(STATUS_COLUMN.saturating_sub(label.len()));
    format!("{}{} ", label, dots)
}

/// Applies every pending migration, one line of status per migration.
pub async fn run_pending<M: MigratorTrait>(url: &str) {
    let db = connect(url).await;

    let pending = M::get_pending_migrations(&db)
        .await
        .expect("Failed to read migration table");

    if pending.is_empty() {
        println!("{}", "Nothing to migrate".dimmed());
        return;
    }

    println!("Running {} migration(s)...", pending.len());
    for migration in &pending {
        let start = Instant::now();
        let label = padded(&format!("Applying {}", migration.name().bold()));
        match M::up(&db, Some(1)).await {
            Ok(()) => {
                let time_str = format!("({:.2?})", start.elapsed()).dimmed();
                println!("{}{} {}", label, "done".green(), time_str);
            }
            Err(e) => {
                println!("{}{} {}", label, "failed".red(), e);
                std::process::exit(1);
            }
        }
    }
}

pub async fn print_status<M: MigratorTrait>(url: &str) {
    let db = connect(url).await;

    let applied = M::get_applied_migrations(&db)
        .await
        .expect("Failed to read migration table");
    let pending = M::get_pending_migrations(&db)
        .await
        .expect("Failed to read migration table");

    for m in &applied {
        println!("{}{}", padded(m.name()), "applied".green());
    }
    for m in &pending {
        println!("{}{}", padded(m.name()), "pending".yellow());
    }
}
