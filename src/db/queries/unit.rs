//! Unit database queries

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::types::Unit;

/// Find units whose location text matches any of the given ILIKE patterns.
/// Matches depot, current location and the imported metadata blob.
pub async fn find_by_location_patterns(
    pool: &PgPool,
    patterns: &[String],
    limit: i64,
) -> Result<Vec<Unit>> {
    let units = sqlx::query_as::<_, Unit>(
        r#"
        SELECT
            u.id, u.code, u.depot, u.current_location, u.customer_id,
            c.company_name AS customer_name, u.extra, u.created_at
        FROM units u
        LEFT JOIN customers c ON c.id = u.customer_id
        WHERE u.depot ILIKE ANY($1)
           OR u.current_location ILIKE ANY($1)
           OR u.extra::text ILIKE ANY($1)
        ORDER BY u.created_at
        LIMIT $2
        "#,
    )
    .bind(patterns)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(units)
}

/// Get unit by ID
pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<Unit>> {
    let unit = sqlx::query_as::<_, Unit>(
        r#"
        SELECT
            u.id, u.code, u.depot, u.current_location, u.customer_id,
            c.company_name AS customer_name, u.extra, u.created_at
        FROM units u
        LEFT JOIN customers c ON c.id = u.customer_id
        WHERE u.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(unit)
}
