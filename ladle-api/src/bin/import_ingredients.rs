//! Offline ingredient importer
//!
//! Loads the ingredient reference data from a two-column text file into
//! the database. Each line is `name,measurement_unit`; blank lines and
//! lines starting with `#` are skipped. Rows that already exist are
//! counted but not treated as errors, so re-running the importer on the
//! same file is safe.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p ladle-api --bin import_ingredients -- data/ingredients.csv
//! ```

use anyhow::{bail, Context};
use ladle_api::config::Config;
use ladle_shared::db::{
    migrations::run_migrations,
    pool::{create_pool, DatabaseConfig},
};
use ladle_shared::models::ingredient::Ingredient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "import_ingredients=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let path = match std::env::args().nth(1) {
        Some(path) => path,
        None => bail!("Usage: import_ingredients <file>"),
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read ingredient file '{}'", path))?;

    let config = Config::from_env()?;
    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&pool).await?;

    let mut imported = 0u64;
    let mut skipped = 0u64;

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (name, unit) = parse_line(line)
            .with_context(|| format!("Malformed line {} in '{}'", index + 1, path))?;

        if Ingredient::import(&pool, name, unit).await? {
            imported += 1;
        } else {
            skipped += 1;
        }
    }

    tracing::info!(imported, skipped, "Ingredient import finished");

    Ok(())
}

/// Splits a `name,measurement_unit` line on the last comma
///
/// Splitting on the last comma lets ingredient names themselves contain
/// commas ("salt, coarse" stays one name with unit "g").
fn parse_line(line: &str) -> anyhow::Result<(&str, &str)> {
    let (name, unit) = line
        .rsplit_once(',')
        .context("Expected 'name,measurement_unit'")?;

    let name = name.trim();
    let unit = unit.trim();
    if name.is_empty() || unit.is_empty() {
        bail!("Name and measurement unit must both be non-empty");
    }

    Ok((name, unit))
}
