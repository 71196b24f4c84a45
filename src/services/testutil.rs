//! In-memory store used by service tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::error::{PlanError, PlanResult};
use crate::services::store::{
    BacklogRepository, LocationRates, TechnicianDirectory, TripStore, UnitRegistry,
};
use crate::types::{
    Alert, BookingStatus, NewPmRequest, NewTrip, NewTripCost, NewTripTask, RequestKind,
    RequestStatus, ServiceRequest, TaskStatus, Technician, TechnicianStatus, Trip, TripCost,
    TripCostUpdate, TripStatus, TripTask, Unit,
};

#[derive(Default)]
pub struct MemoryStore {
    pub units: Mutex<Vec<Unit>>,
    pub alerts: Mutex<Vec<Alert>>,
    pub requests: Mutex<Vec<ServiceRequest>>,
    pub last_service: Mutex<HashMap<Uuid, NaiveDate>>,
    pub technicians: Mutex<Vec<Technician>>,
    pub trips: Mutex<Vec<Trip>>,
    pub trip_costs: Mutex<Vec<TripCost>>,
    pub trip_tasks: Mutex<Vec<TripTask>>,
    pub rates: Mutex<HashMap<String, f64>>,
    /// When set, PM request creation and scheduling fail.
    pub fail_pm_writes: Mutex<bool>,
    /// When set, rate lookups fail.
    pub fail_rate_lookups: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_unit(&self, unit: Unit) {
        self.units.lock().unwrap().push(unit);
    }

    pub fn add_technician(&self, technician: Technician) {
        self.technicians.lock().unwrap().push(technician);
    }

    pub fn set_rate(&self, city: &str, multiplier: f64) {
        self.rates.lock().unwrap().insert(city.to_lowercase(), multiplier);
    }

    pub fn set_last_service(&self, unit_id: Uuid, date: NaiveDate) {
        self.last_service.lock().unwrap().insert(unit_id, date);
    }
}

pub fn make_unit(location: &str) -> Unit {
    Unit {
        id: Uuid::new_v4(),
        code: "MWCU5081000".to_string(),
        depot: Some(format!("{} Depot", location)),
        current_location: Some(location.to_string()),
        customer_id: None,
        customer_name: None,
        extra: None,
        created_at: Utc::now() - chrono::Duration::days(400),
    }
}

pub fn make_technician(name: &str, base: &str) -> Technician {
    Technician {
        id: Uuid::new_v4(),
        name: name.to_string(),
        base_location: base.to_string(),
        service_areas: vec![],
        skills: vec!["refrigeration".to_string()],
        average_rating: Some(4.0),
        status: TechnicianStatus::Active,
        hotel_allowance: 1000.0,
        personal_allowance: 500.0,
        local_travel_allowance: 300.0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn matches_any(text: Option<&str>, needles: &[String]) -> bool {
    match text {
        Some(text) => {
            let lower = text.to_lowercase();
            needles.iter().any(|n| lower.contains(n.as_str()))
        }
        None => false,
    }
}

const OPEN_REQUEST_STATUSES: [RequestStatus; 3] =
    [RequestStatus::Pending, RequestStatus::Approved, RequestStatus::Scheduled];

#[async_trait]
impl UnitRegistry for MemoryStore {
    async fn find_units_by_location_patterns(
        &self,
        patterns: &[String],
        limit: i64,
    ) -> PlanResult<Vec<Unit>> {
        let needles: Vec<String> = patterns
            .iter()
            .map(|p| p.trim_matches('%').to_lowercase())
            .collect();
        Ok(self
            .units
            .lock()
            .unwrap()
            .iter()
            .filter(|u| {
                matches_any(u.current_location.as_deref(), &needles)
                    || matches_any(u.depot.as_deref(), &needles)
            })
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn get_unit(&self, id: Uuid) -> PlanResult<Option<Unit>> {
        Ok(self.units.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl BacklogRepository for MemoryStore {
    async fn find_open_alerts(&self, unit_ids: &[Uuid]) -> PlanResult<Vec<Alert>> {
        Ok(self
            .alerts
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.resolved_at.is_none() && unit_ids.contains(&a.unit_id))
            .cloned()
            .collect())
    }

    async fn find_pending_requests(&self, unit_ids: &[Uuid]) -> PlanResult<Vec<ServiceRequest>> {
        Ok(self
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| {
                unit_ids.contains(&r.unit_id)
                    && OPEN_REQUEST_STATUSES.contains(&r.status)
                    && r.assigned_technician_id.is_none()
            })
            .cloned()
            .collect())
    }

    async fn last_completed_service_dates(
        &self,
        unit_ids: &[Uuid],
    ) -> PlanResult<HashMap<Uuid, NaiveDate>> {
        Ok(self
            .last_service
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| unit_ids.contains(id))
            .map(|(id, date)| (*id, *date))
            .collect())
    }

    async fn units_with_open_pm_request(&self, unit_ids: &[Uuid]) -> PlanResult<HashSet<Uuid>> {
        Ok(self
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| {
                r.kind == RequestKind::Pm
                    && r.completed_at.is_none()
                    && !matches!(r.status, RequestStatus::Completed | RequestStatus::Cancelled)
                    && unit_ids.contains(&r.unit_id)
            })
            .map(|r| r.unit_id)
            .collect())
    }

    async fn create_pm_request(&self, request: &NewPmRequest) -> PlanResult<Uuid> {
        if *self.fail_pm_writes.lock().unwrap() {
            return Err(PlanError::Storage(anyhow!("pm request insert failed")));
        }
        let id = Uuid::new_v4();
        self.requests.lock().unwrap().push(ServiceRequest {
            id,
            unit_id: request.unit_id,
            customer_id: request.customer_id,
            kind: RequestKind::Pm,
            status: RequestStatus::Pending,
            priority: Some(request.priority),
            description: Some(request.description.clone()),
            scheduled_date: None,
            scheduled_time_window: None,
            estimated_duration_minutes: None,
            assigned_technician_id: None,
            completed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        Ok(id)
    }

    async fn schedule_request(
        &self,
        request_id: Uuid,
        technician_id: Uuid,
        date: NaiveDate,
        time_window: &str,
    ) -> PlanResult<()> {
        if *self.fail_pm_writes.lock().unwrap() {
            return Err(PlanError::Storage(anyhow!("schedule update failed")));
        }
        let mut requests = self.requests.lock().unwrap();
        let request = requests
            .iter_mut()
            .find(|r| r.id == request_id)
            .ok_or(PlanError::NotFound("service request"))?;
        request.status = RequestStatus::Scheduled;
        request.assigned_technician_id = Some(technician_id);
        request.scheduled_date = Some(date);
        request.scheduled_time_window = Some(time_window.to_string());
        request.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl TechnicianDirectory for MemoryStore {
    async fn list_schedulable_technicians(&self) -> PlanResult<Vec<Technician>> {
        Ok(self
            .technicians
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.status != TechnicianStatus::Inactive)
            .cloned()
            .collect())
    }

    async fn get_technician(&self, id: Uuid) -> PlanResult<Option<Technician>> {
        Ok(self.technicians.lock().unwrap().iter().find(|t| t.id == id).cloned())
    }
}

#[async_trait]
impl TripStore for MemoryStore {
    async fn trips_overlapping(
        &self,
        technician_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> PlanResult<Vec<Trip>> {
        Ok(self
            .trips
            .lock()
            .unwrap()
            .iter()
            .filter(|t| {
                t.technician_id == technician_id
                    && t.trip_status != TripStatus::Cancelled
                    && t.start_date <= end
                    && t.end_date >= start
            })
            .cloned()
            .collect())
    }

    async fn create_trip(
        &self,
        trip: &NewTrip,
        costs: &NewTripCost,
        tasks: &[NewTripTask],
    ) -> PlanResult<(Trip, TripCost, Vec<TripTask>)> {
        let now = Utc::now();
        let trip_row = Trip {
            id: Uuid::new_v4(),
            technician_id: trip.technician_id,
            origin: trip.origin.clone(),
            destination_city: trip.destination_city.clone(),
            start_date: trip.start_date,
            end_date: trip.end_date,
            purpose: trip.purpose.clone(),
            notes: trip.notes.clone(),
            trip_status: TripStatus::Planned,
            booking_status: BookingStatus::NotStarted,
            created_by: trip.created_by,
            created_at: now,
            updated_at: now,
        };
        let cost_row = TripCost {
            id: Uuid::new_v4(),
            trip_id: trip_row.id,
            travel_fare: costs.travel_fare.value,
            travel_fare_is_manual: costs.travel_fare.is_manual,
            stay_cost: costs.stay_cost.value,
            stay_cost_is_manual: costs.stay_cost.is_manual,
            daily_allowance: costs.daily_allowance.value,
            daily_allowance_is_manual: costs.daily_allowance.is_manual,
            local_travel_cost: costs.local_travel_cost.value,
            local_travel_cost_is_manual: costs.local_travel_cost.is_manual,
            misc_cost: costs.misc_cost.value,
            misc_cost_is_manual: costs.misc_cost.is_manual,
            total_estimated_cost: costs.total_estimated_cost,
            currency: costs.currency.clone(),
            created_at: now,
            updated_at: now,
        };
        let task_rows: Vec<TripTask> = tasks
            .iter()
            .map(|t| TripTask {
                id: Uuid::new_v4(),
                trip_id: trip_row.id,
                unit_id: t.unit_id,
                site_name: t.site_name.clone(),
                customer_id: t.customer_id,
                task_type: t.task_type,
                priority: t.priority,
                scheduled_date: t.scheduled_date,
                estimated_duration_hours: t.estimated_duration_hours,
                status: TaskStatus::Pending,
                service_request_id: t.service_request_id,
                alert_id: t.alert_id,
                notes: t.notes.clone(),
                source: t.source,
                created_at: now,
                updated_at: now,
            })
            .collect();

        self.trips.lock().unwrap().push(trip_row.clone());
        self.trip_costs.lock().unwrap().push(cost_row.clone());
        self.trip_tasks.lock().unwrap().extend(task_rows.clone());
        Ok((trip_row, cost_row, task_rows))
    }

    async fn get_trip(&self, id: Uuid) -> PlanResult<Option<Trip>> {
        Ok(self.trips.lock().unwrap().iter().find(|t| t.id == id).cloned())
    }

    async fn get_trip_costs(&self, trip_id: Uuid) -> PlanResult<Option<TripCost>> {
        Ok(self
            .trip_costs
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.trip_id == trip_id)
            .cloned())
    }

    async fn list_trip_tasks(&self, trip_id: Uuid) -> PlanResult<Vec<TripTask>> {
        Ok(self
            .trip_tasks
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.trip_id == trip_id)
            .cloned()
            .collect())
    }

    async fn update_trip_costs(
        &self,
        trip_id: Uuid,
        update: &TripCostUpdate,
    ) -> PlanResult<Option<TripCost>> {
        let mut costs = self.trip_costs.lock().unwrap();
        let Some(row) = costs.iter_mut().find(|c| c.trip_id == trip_id) else {
            return Ok(None);
        };
        row.travel_fare = update.travel_fare;
        row.stay_cost = update.stay_cost;
        row.daily_allowance = update.daily_allowance;
        row.local_travel_cost = update.local_travel_cost;
        row.misc_cost = update.misc_cost;
        row.total_estimated_cost = update.total_estimated_cost;
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn update_trip_status(&self, id: Uuid, status: TripStatus) -> PlanResult<Option<Trip>> {
        let mut trips = self.trips.lock().unwrap();
        let Some(trip) = trips.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        trip.trip_status = status;
        trip.updated_at = Utc::now();
        Ok(Some(trip.clone()))
    }

    async fn set_task_service_request(&self, task_id: Uuid, request_id: Uuid) -> PlanResult<()> {
        let mut tasks = self.trip_tasks.lock().unwrap();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or(PlanError::NotFound("trip task"))?;
        task.service_request_id = Some(request_id);
        task.updated_at = Utc::now();
        Ok(())
    }

    async fn complete_task(&self, task_id: Uuid) -> PlanResult<Option<TripTask>> {
        let mut tasks = self.trip_tasks.lock().unwrap();
        let Some(task) = tasks.iter_mut().find(|t| t.id == task_id) else {
            return Ok(None);
        };
        task.status = TaskStatus::Completed;
        task.updated_at = Utc::now();
        Ok(Some(task.clone()))
    }
}

#[async_trait]
impl LocationRates for MemoryStore {
    async fn multiplier_for(&self, city: &str) -> PlanResult<Option<f64>> {
        if *self.fail_rate_lookups.lock().unwrap() {
            return Err(PlanError::Storage(anyhow!("rate lookup failed")));
        }
        Ok(self.rates.lock().unwrap().get(&city.trim().to_lowercase()).copied())
    }
}
