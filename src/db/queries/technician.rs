//! Technician database queries

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::types::Technician;

const TECHNICIAN_COLUMNS: &str = r#"
    id, name, base_location, service_areas, skills, average_rating, status,
    hotel_allowance, personal_allowance, local_travel_allowance,
    created_at, updated_at
"#;

/// List all schedulable technicians. Off-duty technicians are included so
/// they can be scored and flagged unavailable; inactive ones are deactivated
/// accounts and stay hidden.
pub async fn list_schedulable(pool: &PgPool) -> Result<Vec<Technician>> {
    let technicians = sqlx::query_as::<_, Technician>(&format!(
        "SELECT {} FROM technicians WHERE status <> 'inactive' ORDER BY name",
        TECHNICIAN_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    Ok(technicians)
}

/// Get technician by ID
pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<Technician>> {
    let technician = sqlx::query_as::<_, Technician>(&format!(
        "SELECT {} FROM technicians WHERE id = $1",
        TECHNICIAN_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(technician)
}
