//! Bulk loads reference ingredients from a `name,measurement_unit` CSV file.
//!
//! Usage: `load_ingredients <path/to/ingredients.csv>`

use std::{env, path::Path};

use anyhow::Context;
use foodgram_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[derive(Debug, PartialEq)]
struct IngredientRecord {
    name: String,
    measurement_unit: String,
}

fn read_ingredients(path: &Path) -> anyhow::Result<Vec<IngredientRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    parse_records(&mut reader)
}

fn parse_records<R: std::io::Read>(
    reader: &mut csv::Reader<R>,
) -> anyhow::Result<Vec<IngredientRecord>> {
    let mut records = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("malformed CSV at record {}", line + 1))?;
        let (Some(name), Some(unit)) = (record.get(0), record.get(1)) else {
            anyhow::bail!("record {} must have a name and a measurement unit", line + 1);
        };
        if name.is_empty() {
            continue;
        }
        records.push(IngredientRecord {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
        });
    }
    Ok(records)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_env_filter("info").init();

    let path = env::args()
        .nth(1)
        .context("usage: load_ingredients <path/to/ingredients.csv>")?;
    let records = read_ingredients(Path::new(&path))?;

    let config = AppConfig::from_env()?;
    let pool = create_pool(&config.database_url).await?;

    let mut tx = pool.begin().await?;
    for record in &records {
        sqlx::query("INSERT INTO ingredients (id, name, measurement_unit) VALUES ($1, $2, $3)")
            .bind(Uuid::new_v4())
            .bind(&record.name)
            .bind(&record.measurement_unit)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    tracing::info!(count = records.len(), file = %path, "ingredients loaded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(data: &str) -> anyhow::Result<Vec<IngredientRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_reader(data.as_bytes());
        parse_records(&mut reader)
    }

    #[test]
    fn trims_fields() {
        let records = parse("абрикосовое варенье , г\n  flour,g\n").unwrap();
        assert_eq!(
            records,
            vec![
                IngredientRecord {
                    name: "абрикосовое варенье".into(),
                    measurement_unit: "г".into(),
                },
                IngredientRecord {
                    name: "flour".into(),
                    measurement_unit: "g".into(),
                },
            ]
        );
    }

    #[test]
    fn rejects_rows_without_unit() {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader("salt\n".as_bytes());
        assert!(parse_records(&mut reader).is_err());
    }
}
