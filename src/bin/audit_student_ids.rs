use portal::config::AppConfig;
use portal::db::{self, repository};
use portal::identity;
use portal::models::Category;

fn is_dry_run() -> bool {
    !std::env::args().any(|a| a == "--apply")
}

/// Reports student IDs whose suffix cannot be parsed and raises each
/// category counter to the highest ID actually stored (with `--apply`).
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::new_from_env()?;
    let pool = db::connect(&config.database_url, config.max_connections).await?;

    let dry_run = is_dry_run();
    let mut malformed_total = 0;

    for category in Category::ALL {
        let mut conn = pool.acquire().await?;
        let ids = repository::fetch_student_ids(&mut conn, category).await?;

        let scan = identity::scan_suffixes(category, ids.iter().map(String::as_str));
        for bad in &scan.malformed {
            println!("[{}] malformed student id: {}", category, bad);
        }
        malformed_total += scan.malformed.len();

        let counter = repository::read_student_id_counter(&mut conn, category).await?;
        let stored = counter.unwrap_or(0);
        let highest = i64::try_from(scan.highest)?;

        if highest > stored {
            if dry_run {
                println!(
                    "[DRY RUN] Would raise {} counter {} -> {}",
                    category, stored, highest
                );
            } else {
                repository::store_student_id_counter(&mut conn, category, highest).await?;
                println!("Raised {} counter {} -> {}", category, stored, highest);
            }
        }

        println!(
            "{}: {} students, highest suffix {}, counter {}",
            category,
            ids.len(),
            highest,
            counter.map_or_else(|| "unset".to_string(), |c| c.to_string())
        );
    }

    println!("Malformed ids: {}", malformed_total);

    Ok(())
}
