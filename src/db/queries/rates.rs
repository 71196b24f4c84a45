//! Location cost multiplier queries

use anyhow::Result;
use sqlx::PgPool;

/// Multiplier for a destination city, matched case-insensitively.
/// Returns `None` when the city has no configured rate.
pub async fn multiplier_for(pool: &PgPool, city: &str) -> Result<Option<f64>> {
    let row: Option<(f64,)> = sqlx::query_as(
        "SELECT multiplier FROM location_rates WHERE LOWER(city) = LOWER($1)",
    )
    .bind(city.trim())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(m,)| m))
}
