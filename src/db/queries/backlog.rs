//! Service backlog queries: alerts and service requests

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::types::{Alert, NewPmRequest, ServiceRequest};

/// Open (unresolved) alerts for the given units
pub async fn open_alerts_for_units(pool: &PgPool, unit_ids: &[Uuid]) -> Result<Vec<Alert>> {
    let alerts = sqlx::query_as::<_, Alert>(
        r#"
        SELECT id, unit_id, title, severity, estimated_service_minutes, resolved_at, created_at
        FROM alerts
        WHERE unit_id = ANY($1) AND resolved_at IS NULL
        ORDER BY created_at
        "#,
    )
    .bind(unit_ids)
    .fetch_all(pool)
    .await?;

    Ok(alerts)
}

/// Open, unassigned service requests for the given units
pub async fn pending_requests_for_units(
    pool: &PgPool,
    unit_ids: &[Uuid],
) -> Result<Vec<ServiceRequest>> {
    let requests = sqlx::query_as::<_, ServiceRequest>(
        r#"
        SELECT
            id, unit_id, customer_id, kind, status, priority, description,
            scheduled_date, scheduled_time_window, estimated_duration_minutes,
            assigned_technician_id, completed_at, created_at, updated_at
        FROM service_requests
        WHERE unit_id = ANY($1)
          AND status IN ('pending', 'approved', 'scheduled')
          AND assigned_technician_id IS NULL
        ORDER BY created_at
        "#,
    )
    .bind(unit_ids)
    .fetch_all(pool)
    .await?;

    Ok(requests)
}

/// Most recent completed-service timestamp per unit
pub async fn last_completed_service_dates(
    pool: &PgPool,
    unit_ids: &[Uuid],
) -> Result<Vec<(Uuid, Option<DateTime<Utc>>)>> {
    let rows: Vec<(Uuid, Option<DateTime<Utc>>)> = sqlx::query_as(
        r#"
        SELECT unit_id, MAX(completed_at)
        FROM service_requests
        WHERE unit_id = ANY($1) AND completed_at IS NOT NULL
        GROUP BY unit_id
        "#,
    )
    .bind(unit_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Units that already carry an open PM request
pub async fn units_with_open_pm_request(pool: &PgPool, unit_ids: &[Uuid]) -> Result<Vec<Uuid>> {
    let rows: Vec<(Uuid,)> = sqlx::query_as(
        r#"
        SELECT DISTINCT unit_id
        FROM service_requests
        WHERE unit_id = ANY($1)
          AND kind = 'pm'
          AND status NOT IN ('completed', 'cancelled')
          AND completed_at IS NULL
        "#,
    )
    .bind(unit_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Create a pending PM service request
pub async fn create_pm_request(pool: &PgPool, request: &NewPmRequest) -> Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO service_requests (id, unit_id, customer_id, kind, status, priority, description)
        VALUES ($1, $2, $3, 'pm', 'pending', $4, $5)
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(request.unit_id)
    .bind(request.customer_id)
    .bind(request.priority)
    .bind(&request.description)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Mark a service request scheduled with an assignee, date and time window
pub async fn schedule_request(
    pool: &PgPool,
    request_id: Uuid,
    technician_id: Uuid,
    date: NaiveDate,
    time_window: &str,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE service_requests
        SET status = 'scheduled',
            assigned_technician_id = $2,
            scheduled_date = $3,
            scheduled_time_window = $4,
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(request_id)
    .bind(technician_id)
    .bind(date)
    .bind(time_window)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        anyhow::bail!("service request {} not found", request_id);
    }
    Ok(())
}
