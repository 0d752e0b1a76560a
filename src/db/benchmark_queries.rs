use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use crate::external::price_provider::ExternalPricePoint;
use crate::models::{BenchmarkPricePoint, CacheCoverage};

// 4 bind parameters per row; keeps each statement well under Postgres' limit.
const UPSERT_BATCH_SIZE: usize = 500;

/// Earliest and latest cached dates for a symbol.
pub async fn fetch_date_bounds(
    pool: &PgPool,
    symbol: &str,
) -> Result<(Option<NaiveDate>, Option<NaiveDate>), sqlx::Error> {
    sqlx::query_as::<_, (Option<NaiveDate>, Option<NaiveDate>)>(
        r#"
        SELECT MIN(date), MAX(date)
        FROM benchmark_prices
        WHERE symbol = $1
        "#,
    )
    .bind(symbol)
    .fetch_one(pool)
    .await
}

/// Insert points, silently skipping any `(symbol, date)` already cached.
///
/// Returns the number of rows actually inserted.
pub async fn insert_ignore_conflicts(
    pool: &PgPool,
    symbol: &str,
    points: &[ExternalPricePoint],
) -> Result<u64, sqlx::Error> {
    if points.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await.map_err(|e| {
        error!("Failed to begin transaction for symbol {}: {}", symbol, e);
        e
    })?;

    let mut inserted = 0;

    for batch in points.chunks(UPSERT_BATCH_SIZE) {
        let mut sql = String::from("INSERT INTO benchmark_prices (id, symbol, date, close) VALUES ");

        let tuples: Vec<String> = (0..batch.len())
            .map(|i| {
                let base = i * 4;
                format!("(${}, ${}, ${}, ${})", base + 1, base + 2, base + 3, base + 4)
            })
            .collect();
        sql.push_str(&tuples.join(", "));
        sql.push_str(" ON CONFLICT (symbol, date) DO NOTHING");

        let mut query = sqlx::query(&sql);
        for p in batch {
            query = query.bind(Uuid::new_v4()).bind(symbol).bind(p.date).bind(p.close);
        }

        let result = query.execute(&mut *tx).await.map_err(|e| {
            error!("Failed to insert {} price points for symbol {}: {}", batch.len(), symbol, e);
            e
        })?;
        inserted += result.rows_affected();
    }

    tx.commit().await.map_err(|e| {
        error!("Failed to commit transaction for symbol {}: {}", symbol, e);
        e
    })?;

    Ok(inserted)
}

/// Cached points with `start <= date <= end`, oldest first.
pub async fn fetch_range(
    pool: &PgPool,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<BenchmarkPricePoint>, sqlx::Error> {
    sqlx::query_as::<_, BenchmarkPricePoint>(
        r#"
        SELECT id, symbol, date, close, created_at
        FROM benchmark_prices
        WHERE symbol = $1 AND date >= $2 AND date <= $3
        ORDER BY date ASC
        "#,
    )
    .bind(symbol)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await
}

pub async fn fetch_coverage(pool: &PgPool, symbol: &str) -> Result<CacheCoverage, sqlx::Error> {
    let (first_date, last_date, row_count) =
        sqlx::query_as::<_, (Option<NaiveDate>, Option<NaiveDate>, i64)>(
            r#"
            SELECT MIN(date), MAX(date), COUNT(*)
            FROM benchmark_prices
            WHERE symbol = $1
            "#,
        )
        .bind(symbol)
        .fetch_one(pool)
        .await?;

    Ok(CacheCoverage {
        symbol: symbol.to_string(),
        first_date,
        last_date,
        row_count,
    })
}
