//! Storage seams for the planning engine
//!
//! The planner only sees these traits; `PgStore` wires them to the Postgres
//! queries. Tests substitute in-memory fakes.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::queries;
use crate::error::PlanResult;
use crate::types::{
    Alert, NewPmRequest, NewTrip, NewTripCost, NewTripTask, ServiceRequest, Technician, Trip,
    TripCost, TripCostUpdate, TripStatus, TripTask, Unit,
};

/// Read access to the unit fleet.
#[async_trait]
pub trait UnitRegistry: Send + Sync {
    /// Units whose location text matches any of the given `ILIKE` patterns.
    async fn find_units_by_location_patterns(
        &self,
        patterns: &[String],
        limit: i64,
    ) -> PlanResult<Vec<Unit>>;

    async fn get_unit(&self, id: Uuid) -> PlanResult<Option<Unit>>;
}

/// Read/write access to the service backlog (alerts, service requests).
#[async_trait]
pub trait BacklogRepository: Send + Sync {
    async fn find_open_alerts(&self, unit_ids: &[Uuid]) -> PlanResult<Vec<Alert>>;

    /// Pending or approved, unassigned requests for the units.
    async fn find_pending_requests(&self, unit_ids: &[Uuid]) -> PlanResult<Vec<ServiceRequest>>;

    /// Most recent completed-service date per unit. Units never serviced are
    /// absent from the map.
    async fn last_completed_service_dates(
        &self,
        unit_ids: &[Uuid],
    ) -> PlanResult<HashMap<Uuid, NaiveDate>>;

    /// Units that already carry an open (non-terminal) PM request.
    async fn units_with_open_pm_request(&self, unit_ids: &[Uuid]) -> PlanResult<HashSet<Uuid>>;

    async fn create_pm_request(&self, request: &NewPmRequest) -> PlanResult<Uuid>;

    /// Mark a request scheduled with an assignee, date and time window.
    async fn schedule_request(
        &self,
        request_id: Uuid,
        technician_id: Uuid,
        date: NaiveDate,
        time_window: &str,
    ) -> PlanResult<()>;
}

/// Read access to the technician roster.
#[async_trait]
pub trait TechnicianDirectory: Send + Sync {
    /// Every technician who can be scored for a trip, off-duty ones included.
    async fn list_schedulable_technicians(&self) -> PlanResult<Vec<Technician>>;

    async fn get_technician(&self, id: Uuid) -> PlanResult<Option<Technician>>;
}

/// Trip persistence.
#[async_trait]
pub trait TripStore: Send + Sync {
    /// Non-cancelled trips of a technician overlapping the window.
    async fn trips_overlapping(
        &self,
        technician_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> PlanResult<Vec<Trip>>;

    /// Insert trip, cost row and tasks in one transaction.
    async fn create_trip(
        &self,
        trip: &NewTrip,
        costs: &NewTripCost,
        tasks: &[NewTripTask],
    ) -> PlanResult<(Trip, TripCost, Vec<TripTask>)>;

    async fn get_trip(&self, id: Uuid) -> PlanResult<Option<Trip>>;

    async fn get_trip_costs(&self, trip_id: Uuid) -> PlanResult<Option<TripCost>>;

    async fn list_trip_tasks(&self, trip_id: Uuid) -> PlanResult<Vec<TripTask>>;

    /// Overwrite cost values (flags untouched). Returns the updated row.
    async fn update_trip_costs(
        &self,
        trip_id: Uuid,
        update: &TripCostUpdate,
    ) -> PlanResult<Option<TripCost>>;

    async fn update_trip_status(&self, id: Uuid, status: TripStatus) -> PlanResult<Option<Trip>>;

    /// Link a task to the service request created for it post-commit.
    async fn set_task_service_request(&self, task_id: Uuid, request_id: Uuid) -> PlanResult<()>;

    async fn complete_task(&self, task_id: Uuid) -> PlanResult<Option<TripTask>>;
}

/// Destination cost multipliers.
#[async_trait]
pub trait LocationRates: Send + Sync {
    /// Multiplier for a city, `None` when the city has no configured rate.
    async fn multiplier_for(&self, city: &str) -> PlanResult<Option<f64>>;
}

/// All five seams backed by one Postgres pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnitRegistry for PgStore {
    async fn find_units_by_location_patterns(
        &self,
        patterns: &[String],
        limit: i64,
    ) -> PlanResult<Vec<Unit>> {
        Ok(queries::unit::find_by_location_patterns(&self.pool, patterns, limit).await?)
    }

    async fn get_unit(&self, id: Uuid) -> PlanResult<Option<Unit>> {
        Ok(queries::unit::get(&self.pool, id).await?)
    }
}

#[async_trait]
impl BacklogRepository for PgStore {
    async fn find_open_alerts(&self, unit_ids: &[Uuid]) -> PlanResult<Vec<Alert>> {
        Ok(queries::backlog::open_alerts_for_units(&self.pool, unit_ids).await?)
    }

    async fn find_pending_requests(&self, unit_ids: &[Uuid]) -> PlanResult<Vec<ServiceRequest>> {
        Ok(queries::backlog::pending_requests_for_units(&self.pool, unit_ids).await?)
    }

    async fn last_completed_service_dates(
        &self,
        unit_ids: &[Uuid],
    ) -> PlanResult<HashMap<Uuid, NaiveDate>> {
        let rows = queries::backlog::last_completed_service_dates(&self.pool, unit_ids).await?;
        Ok(rows
            .into_iter()
            .filter_map(|(unit_id, completed_at)| {
                completed_at.map(|ts| (unit_id, ts.date_naive()))
            })
            .collect())
    }

    async fn units_with_open_pm_request(&self, unit_ids: &[Uuid]) -> PlanResult<HashSet<Uuid>> {
        let ids = queries::backlog::units_with_open_pm_request(&self.pool, unit_ids).await?;
        Ok(ids.into_iter().collect())
    }

    async fn create_pm_request(&self, request: &NewPmRequest) -> PlanResult<Uuid> {
        Ok(queries::backlog::create_pm_request(&self.pool, request).await?)
    }

    async fn schedule_request(
        &self,
        request_id: Uuid,
        technician_id: Uuid,
        date: NaiveDate,
        time_window: &str,
    ) -> PlanResult<()> {
        Ok(queries::backlog::schedule_request(
            &self.pool,
            request_id,
            technician_id,
            date,
            time_window,
        )
        .await?)
    }
}

#[async_trait]
impl TechnicianDirectory for PgStore {
    async fn list_schedulable_technicians(&self) -> PlanResult<Vec<Technician>> {
        Ok(queries::technician::list_schedulable(&self.pool).await?)
    }

    async fn get_technician(&self, id: Uuid) -> PlanResult<Option<Technician>> {
        Ok(queries::technician::get(&self.pool, id).await?)
    }
}

#[async_trait]
impl TripStore for PgStore {
    async fn trips_overlapping(
        &self,
        technician_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> PlanResult<Vec<Trip>> {
        Ok(queries::trip::overlapping(&self.pool, technician_id, start, end).await?)
    }

    async fn create_trip(
        &self,
        trip: &NewTrip,
        costs: &NewTripCost,
        tasks: &[NewTripTask],
    ) -> PlanResult<(Trip, TripCost, Vec<TripTask>)> {
        Ok(queries::trip::create_with_details(&self.pool, trip, costs, tasks).await?)
    }

    async fn get_trip(&self, id: Uuid) -> PlanResult<Option<Trip>> {
        Ok(queries::trip::get(&self.pool, id).await?)
    }

    async fn get_trip_costs(&self, trip_id: Uuid) -> PlanResult<Option<TripCost>> {
        Ok(queries::trip::costs_for(&self.pool, trip_id).await?)
    }

    async fn list_trip_tasks(&self, trip_id: Uuid) -> PlanResult<Vec<TripTask>> {
        Ok(queries::trip::tasks_for(&self.pool, trip_id).await?)
    }

    async fn update_trip_costs(
        &self,
        trip_id: Uuid,
        update: &TripCostUpdate,
    ) -> PlanResult<Option<TripCost>> {
        Ok(queries::trip::update_costs(&self.pool, trip_id, update).await?)
    }

    async fn update_trip_status(&self, id: Uuid, status: TripStatus) -> PlanResult<Option<Trip>> {
        Ok(queries::trip::update_status(&self.pool, id, status).await?)
    }

    async fn set_task_service_request(&self, task_id: Uuid, request_id: Uuid) -> PlanResult<()> {
        Ok(queries::trip::set_task_service_request(&self.pool, task_id, request_id).await?)
    }

    async fn complete_task(&self, task_id: Uuid) -> PlanResult<Option<TripTask>> {
        Ok(queries::trip::complete_task(&self.pool, task_id).await?)
    }
}

#[async_trait]
impl LocationRates for PgStore {
    async fn multiplier_for(&self, city: &str) -> PlanResult<Option<f64>> {
        Ok(queries::rates::multiplier_for(&self.pool, city).await?)
    }
}
