//! Trip, trip cost and trip task queries

use anyhow::Result;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::types::{
    NewTrip, NewTripCost, NewTripTask, Trip, TripCost, TripCostUpdate, TripStatus, TripTask,
};

const TRIP_COLUMNS: &str = r#"
    id, technician_id, origin, destination_city, start_date, end_date,
    purpose, notes, trip_status, booking_status, created_by, created_at, updated_at
"#;

const COST_COLUMNS: &str = r#"
    id, trip_id,
    travel_fare, travel_fare_is_manual,
    stay_cost, stay_cost_is_manual,
    daily_allowance, daily_allowance_is_manual,
    local_travel_cost, local_travel_cost_is_manual,
    misc_cost, misc_cost_is_manual,
    total_estimated_cost, currency, created_at, updated_at
"#;

const TASK_COLUMNS: &str = r#"
    id, trip_id, unit_id, site_name, customer_id, task_type, priority,
    scheduled_date, estimated_duration_hours, status, service_request_id,
    alert_id, notes, source, created_at, updated_at
"#;

/// Non-cancelled trips of a technician overlapping the given window
pub async fn overlapping(
    pool: &PgPool,
    technician_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<Trip>> {
    let trips = sqlx::query_as::<_, Trip>(&format!(
        r#"
        SELECT {}
        FROM trips
        WHERE technician_id = $1
          AND trip_status != 'cancelled'
          AND start_date <= $3
          AND end_date >= $2
        ORDER BY start_date
        "#,
        TRIP_COLUMNS
    ))
    .bind(technician_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(trips)
}

/// Insert a trip with its cost row and tasks in one transaction
pub async fn create_with_details(
    pool: &PgPool,
    trip: &NewTrip,
    costs: &NewTripCost,
    tasks: &[NewTripTask],
) -> Result<(Trip, TripCost, Vec<TripTask>)> {
    let mut tx = pool.begin().await?;

    let trip_row = insert_trip(&mut tx, trip).await?;
    let cost_row = insert_costs(&mut tx, trip_row.id, costs).await?;
    let mut task_rows = Vec::with_capacity(tasks.len());
    for task in tasks {
        task_rows.push(insert_task(&mut tx, trip_row.id, task).await?);
    }

    tx.commit().await?;
    Ok((trip_row, cost_row, task_rows))
}

async fn insert_trip(tx: &mut Transaction<'_, Postgres>, trip: &NewTrip) -> Result<Trip> {
    let row = sqlx::query_as::<_, Trip>(&format!(
        r#"
        INSERT INTO trips (
            id, technician_id, origin, destination_city, start_date, end_date,
            purpose, notes, created_by
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {}
        "#,
        TRIP_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(trip.technician_id)
    .bind(&trip.origin)
    .bind(&trip.destination_city)
    .bind(trip.start_date)
    .bind(trip.end_date)
    .bind(&trip.purpose)
    .bind(&trip.notes)
    .bind(trip.created_by)
    .fetch_one(&mut **tx)
    .await?;

    Ok(row)
}

async fn insert_costs(
    tx: &mut Transaction<'_, Postgres>,
    trip_id: Uuid,
    costs: &NewTripCost,
) -> Result<TripCost> {
    let row = sqlx::query_as::<_, TripCost>(&format!(
        r#"
        INSERT INTO trip_costs (
            id, trip_id,
            travel_fare, travel_fare_is_manual,
            stay_cost, stay_cost_is_manual,
            daily_allowance, daily_allowance_is_manual,
            local_travel_cost, local_travel_cost_is_manual,
            misc_cost, misc_cost_is_manual,
            total_estimated_cost, currency
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        RETURNING {}
        "#,
        COST_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(trip_id)
    .bind(costs.travel_fare.value)
    .bind(costs.travel_fare.is_manual)
    .bind(costs.stay_cost.value)
    .bind(costs.stay_cost.is_manual)
    .bind(costs.daily_allowance.value)
    .bind(costs.daily_allowance.is_manual)
    .bind(costs.local_travel_cost.value)
    .bind(costs.local_travel_cost.is_manual)
    .bind(costs.misc_cost.value)
    .bind(costs.misc_cost.is_manual)
    .bind(costs.total_estimated_cost)
    .bind(&costs.currency)
    .fetch_one(&mut **tx)
    .await?;

    Ok(row)
}

async fn insert_task(
    tx: &mut Transaction<'_, Postgres>,
    trip_id: Uuid,
    task: &NewTripTask,
) -> Result<TripTask> {
    let row = sqlx::query_as::<_, TripTask>(&format!(
        r#"
        INSERT INTO trip_tasks (
            id, trip_id, unit_id, site_name, customer_id, task_type, priority,
            scheduled_date, estimated_duration_hours, service_request_id,
            alert_id, notes, source
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING {}
        "#,
        TASK_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(trip_id)
    .bind(task.unit_id)
    .bind(&task.site_name)
    .bind(task.customer_id)
    .bind(task.task_type)
    .bind(task.priority)
    .bind(task.scheduled_date)
    .bind(task.estimated_duration_hours)
    .bind(task.service_request_id)
    .bind(task.alert_id)
    .bind(&task.notes)
    .bind(task.source)
    .fetch_one(&mut **tx)
    .await?;

    Ok(row)
}

/// Get trip by ID
pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<Trip>> {
    let trip = sqlx::query_as::<_, Trip>(&format!(
        "SELECT {} FROM trips WHERE id = $1",
        TRIP_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(trip)
}

/// Get the cost row for a trip
pub async fn costs_for(pool: &PgPool, trip_id: Uuid) -> Result<Option<TripCost>> {
    let costs = sqlx::query_as::<_, TripCost>(&format!(
        "SELECT {} FROM trip_costs WHERE trip_id = $1",
        COST_COLUMNS
    ))
    .bind(trip_id)
    .fetch_optional(pool)
    .await?;

    Ok(costs)
}

/// List tasks of a trip, scheduled date first
pub async fn tasks_for(pool: &PgPool, trip_id: Uuid) -> Result<Vec<TripTask>> {
    let tasks = sqlx::query_as::<_, TripTask>(&format!(
        "SELECT {} FROM trip_tasks WHERE trip_id = $1 ORDER BY scheduled_date, priority",
        TASK_COLUMNS
    ))
    .bind(trip_id)
    .fetch_all(pool)
    .await?;

    Ok(tasks)
}

/// Overwrite cost values, leaving the manual flags untouched
pub async fn update_costs(
    pool: &PgPool,
    trip_id: Uuid,
    update: &TripCostUpdate,
) -> Result<Option<TripCost>> {
    let costs = sqlx::query_as::<_, TripCost>(&format!(
        r#"
        UPDATE trip_costs
        SET travel_fare = $2,
            stay_cost = $3,
            daily_allowance = $4,
            local_travel_cost = $5,
            misc_cost = $6,
            total_estimated_cost = $7,
            updated_at = NOW()
        WHERE trip_id = $1
        RETURNING {}
        "#,
        COST_COLUMNS
    ))
    .bind(trip_id)
    .bind(update.travel_fare)
    .bind(update.stay_cost)
    .bind(update.daily_allowance)
    .bind(update.local_travel_cost)
    .bind(update.misc_cost)
    .bind(update.total_estimated_cost)
    .fetch_optional(pool)
    .await?;

    Ok(costs)
}

/// Set a trip's lifecycle status
pub async fn update_status(pool: &PgPool, id: Uuid, status: TripStatus) -> Result<Option<Trip>> {
    let trip = sqlx::query_as::<_, Trip>(&format!(
        r#"
        UPDATE trips
        SET trip_status = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING {}
        "#,
        TRIP_COLUMNS
    ))
    .bind(id)
    .bind(status)
    .fetch_optional(pool)
    .await?;

    Ok(trip)
}

/// Link a task to the service request created for it
pub async fn set_task_service_request(
    pool: &PgPool,
    task_id: Uuid,
    request_id: Uuid,
) -> Result<()> {
    let result = sqlx::query(
        "UPDATE trip_tasks SET service_request_id = $2, updated_at = NOW() WHERE id = $1",
    )
    .bind(task_id)
    .bind(request_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        anyhow::bail!("trip task {} not found", task_id);
    }
    Ok(())
}

/// Mark a task completed
pub async fn complete_task(pool: &PgPool, task_id: Uuid) -> Result<Option<TripTask>> {
    let task = sqlx::query_as::<_, TripTask>(&format!(
        r#"
        UPDATE trip_tasks
        SET status = 'completed', updated_at = NOW()
        WHERE id = $1
        RETURNING {}
        "#,
        TASK_COLUMNS
    ))
    .bind(task_id)
    .fetch_optional(pool)
    .await?;

    Ok(task)
}
