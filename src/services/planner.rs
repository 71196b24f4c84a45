//! Trip planning orchestration
//!
//! Ties candidate collection, technician scoring and cost estimation into the
//! operations exposed over the wire: previews are pure reads, saving a trip is
//! one transaction, PM request creation and scheduling run after commit and
//! degrade to warnings.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use tracing::{info, warn};

use crate::config::PlanningConfig;
use crate::error::{PlanError, PlanResult};
use crate::services::candidates::{CandidateCollector, Scope};
use crate::services::costs::{estimate_costs, round_currency, trip_days, CostEstimate};
use crate::services::scoring::{score_technicians, TechnicianScore};
use crate::services::store::{
    BacklogRepository, LocationRates, TechnicianDirectory, TripStore, UnitRegistry,
};
use crate::types::{
    AutoPlanByTechnicianRequest, AutoPlanRequest, AutoPlanResponse, CompleteTaskRequest,
    CostBreakdown, CostField, CostFieldsInput, NewPmRequest, NewTrip, NewTripCost, NewTripTask,
    SaveTripRequest, SaveTripResponse, SideEffectWarning, SuggestTechniciansRequest,
    SuggestTechniciansResponse, TaskCandidate, TaskInput, TaskPriority, TaskSource, TaskType,
    Technician, TechnicianStatus, TechnicianSummary, TravelWindow, TripDetailResponse,
    TripIdRequest, TripTask, UpdateTripStatusRequest,
};

/// Time window stamped onto PM service requests scheduled from a trip.
const PM_SCHEDULE_WINDOW: &str = "09:00-17:00";

pub struct TripPlanner {
    units: Arc<dyn UnitRegistry>,
    backlog: Arc<dyn BacklogRepository>,
    technicians: Arc<dyn TechnicianDirectory>,
    trips: Arc<dyn TripStore>,
    rates: Arc<dyn LocationRates>,
    config: PlanningConfig,
}

impl TripPlanner {
    pub fn new(
        units: Arc<dyn UnitRegistry>,
        backlog: Arc<dyn BacklogRepository>,
        technicians: Arc<dyn TechnicianDirectory>,
        trips: Arc<dyn TripStore>,
        rates: Arc<dyn LocationRates>,
        config: PlanningConfig,
    ) -> Self {
        Self { units, backlog, technicians, trips, rates, config }
    }

    fn collector(&self) -> CandidateCollector {
        CandidateCollector::new(self.units.clone(), self.backlog.clone(), self.config.clone())
    }

    /// Preview an auto-planned trip to a destination city.
    pub async fn auto_plan(&self, request: AutoPlanRequest) -> PlanResult<AutoPlanResponse> {
        let destination = validate_destination(&request.destination_city)?;
        validate_window(request.start_date, request.end_date)?;

        let scored = score_technicians(
            &self.technicians,
            &self.trips,
            &destination,
            request.start_date,
            request.end_date,
        )
        .await?;

        let technician = match request.technician_id {
            Some(id) => {
                let technician = self
                    .technicians
                    .get_technician(id)
                    .await?
                    .ok_or(PlanError::NotFound("technician"))?;
                self.ensure_schedulable(&technician, request.start_date, request.end_date)
                    .await?;
                technician
            }
            None => scored
                .iter()
                .find(|s| s.available)
                .map(|s| s.technician.clone())
                .ok_or(PlanError::NoAvailableTechnician)?,
        };

        self.build_plan(
            technician,
            &scored,
            destination,
            Scope::Destination(request.destination_city.trim().to_string()),
            request.start_date,
            request.end_date,
        )
        .await
    }

    /// Preview a trip across a technician's own service areas.
    ///
    /// A technician with work nowhere in their areas gets an empty plan, not
    /// an error; costs are still estimated for the window.
    pub async fn auto_plan_by_technician(
        &self,
        request: AutoPlanByTechnicianRequest,
    ) -> PlanResult<AutoPlanResponse> {
        validate_window(request.start_date, request.end_date)?;

        let technician = self
            .technicians
            .get_technician(request.technician_id)
            .await?
            .ok_or(PlanError::NotFound("technician"))?;

        self.ensure_schedulable(&technician, request.start_date, request.end_date)
            .await?;

        let areas = technician.resolved_service_areas();
        if areas.is_empty() {
            return Err(PlanError::Configuration(format!(
                "technician {} has no base location or service areas configured",
                technician.name
            )));
        }

        let destination = match request.destination_city {
            Some(city) => validate_destination(&city)?,
            None => areas[0].clone(),
        };

        let scored = score_technicians(
            &self.technicians,
            &self.trips,
            &destination,
            request.start_date,
            request.end_date,
        )
        .await?;

        self.build_plan(
            technician,
            &scored,
            destination,
            Scope::ServiceAreas(areas),
            request.start_date,
            request.end_date,
        )
        .await
    }

    /// Ranked technician list for operator-driven selection.
    pub async fn suggest_technicians(
        &self,
        request: SuggestTechniciansRequest,
    ) -> PlanResult<SuggestTechniciansResponse> {
        let destination = validate_destination(&request.destination_city)?;
        validate_window(request.start_date, request.end_date)?;

        let scored = score_technicians(
            &self.technicians,
            &self.trips,
            &destination,
            request.start_date,
            request.end_date,
        )
        .await?;

        Ok(SuggestTechniciansResponse {
            suggestions: scored.iter().map(TechnicianScore::suggestion).collect(),
        })
    }

    /// Persist a trip with its cost row and tasks, then create and schedule
    /// PM service requests for the saved PM tasks.
    pub async fn save_trip(
        &self,
        request: SaveTripRequest,
        created_by: Option<uuid::Uuid>,
    ) -> PlanResult<SaveTripResponse> {
        let destination = validate_destination(&request.destination_city)?;
        validate_window(request.start_date, request.end_date)?;

        let technician = self
            .technicians
            .get_technician(request.technician_id)
            .await?
            .ok_or(PlanError::NotFound("technician"))?;
        self.ensure_schedulable(&technician, request.start_date, request.end_date)
            .await?;

        let multiplier = self.multiplier_for(&destination).await;
        let estimate = estimate_costs(
            &technician,
            multiplier,
            request.start_date,
            request.end_date,
            &self.config,
        );
        let currency = request
            .currency
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(&self.config.default_currency)
            .to_string();
        let costs = merge_cost_inputs(&request.costs, &estimate, currency);

        let tasks = prepare_tasks(
            request.tasks,
            request.start_date,
            request.end_date,
            &self.config,
        );

        let new_trip = NewTrip {
            technician_id: technician.id,
            origin: request.origin,
            destination_city: destination,
            start_date: request.start_date,
            end_date: request.end_date,
            purpose: request.purpose,
            notes: request.notes,
            created_by,
        };

        let (trip, cost_row, saved_tasks) =
            self.trips.create_trip(&new_trip, &costs, &tasks).await?;
        info!(trip_id = %trip.id, technician = %technician.name, tasks = saved_tasks.len(), "trip saved");

        let (scheduled, warnings) = self
            .schedule_pm_requests(&technician, &saved_tasks)
            .await;

        Ok(SaveTripResponse {
            trip,
            costs: cost_row.breakdown(),
            tasks: saved_tasks,
            scheduled_pm_requests: scheduled,
            warnings,
        })
    }

    /// Re-derive auto cost fields from current rates; manual fields keep
    /// their values and flags.
    pub async fn recalculate_costs(&self, request: TripIdRequest) -> PlanResult<CostBreakdown> {
        let trip = self
            .trips
            .get_trip(request.id)
            .await?
            .ok_or(PlanError::NotFound("trip"))?;
        let current = self
            .trips
            .get_trip_costs(trip.id)
            .await?
            .ok_or(PlanError::NotFound("trip costs"))?;
        let technician = self
            .technicians
            .get_technician(trip.technician_id)
            .await?
            .ok_or(PlanError::NotFound("technician"))?;

        let multiplier = self.multiplier_for(&trip.destination_city).await;
        let estimate = estimate_costs(
            &technician,
            multiplier,
            trip.start_date,
            trip.end_date,
            &self.config,
        );

        let pick = |is_manual: bool, stored: f64, fresh: f64| {
            if is_manual { round_currency(stored) } else { fresh }
        };
        let travel_fare = pick(current.travel_fare_is_manual, current.travel_fare, estimate.travel_fare);
        let stay_cost = pick(current.stay_cost_is_manual, current.stay_cost, estimate.stay);
        let daily_allowance = pick(
            current.daily_allowance_is_manual,
            current.daily_allowance,
            estimate.daily_allowance,
        );
        let local_travel_cost = pick(
            current.local_travel_cost_is_manual,
            current.local_travel_cost,
            estimate.local_travel,
        );
        let misc_cost = pick(current.misc_cost_is_manual, current.misc_cost, estimate.miscellaneous);
        let total = round_currency(
            travel_fare + stay_cost + daily_allowance + local_travel_cost + misc_cost,
        );

        let updated = self
            .trips
            .update_trip_costs(
                trip.id,
                &crate::types::TripCostUpdate {
                    travel_fare,
                    stay_cost,
                    daily_allowance,
                    local_travel_cost,
                    misc_cost,
                    total_estimated_cost: total,
                },
            )
            .await?
            .ok_or(PlanError::NotFound("trip costs"))?;

        Ok(updated.breakdown())
    }

    pub async fn trip_detail(&self, request: TripIdRequest) -> PlanResult<TripDetailResponse> {
        let trip = self
            .trips
            .get_trip(request.id)
            .await?
            .ok_or(PlanError::NotFound("trip"))?;
        let costs = self.trips.get_trip_costs(trip.id).await?.map(|c| c.breakdown());
        let tasks = self.trips.list_trip_tasks(trip.id).await?;
        Ok(TripDetailResponse { trip, costs, tasks })
    }

    /// Move a trip along its lifecycle. Illegal transitions are conflicts.
    pub async fn update_trip_status(
        &self,
        request: UpdateTripStatusRequest,
    ) -> PlanResult<crate::types::Trip> {
        let trip = self
            .trips
            .get_trip(request.id)
            .await?
            .ok_or(PlanError::NotFound("trip"))?;
        if !trip.trip_status.can_transition_to(request.status) {
            return Err(PlanError::Conflict(format!(
                "cannot move trip from {} to {}",
                trip.trip_status.as_str(),
                request.status.as_str()
            )));
        }
        self.trips
            .update_trip_status(trip.id, request.status)
            .await?
            .ok_or(PlanError::NotFound("trip"))
    }

    pub async fn complete_task(&self, request: CompleteTaskRequest) -> PlanResult<TripTask> {
        self.trips
            .complete_task(request.id)
            .await?
            .ok_or(PlanError::NotFound("trip task"))
    }

    async fn build_plan(
        &self,
        technician: Technician,
        scored: &[TechnicianScore],
        destination: String,
        scope: Scope,
        start: NaiveDate,
        end: NaiveDate,
    ) -> PlanResult<AutoPlanResponse> {
        let as_of = Utc::now().date_naive();
        let candidates = self.collector().collect(&scope, start, end, as_of).await?;
        let tasks = bucket_tasks(candidates, start, end, self.config.max_tasks_per_day);

        let multiplier = self.multiplier_for(&destination).await;
        let estimate = estimate_costs(&technician, multiplier, start, end, &self.config);
        let (days, nights) = trip_days(start, end);

        Ok(AutoPlanResponse {
            technician: TechnicianSummary::from(&technician),
            technician_suggestions: scored
                .iter()
                .take(3)
                .map(TechnicianScore::suggestion)
                .collect(),
            destination_city: destination,
            travel_window: TravelWindow { start, end, days, nights },
            costs: breakdown_from_estimate(&estimate, self.config.default_currency.clone()),
            tasks,
            multiplier,
        })
    }

    /// An explicitly requested technician must be on duty and free for the
    /// window; either violation is a conflict the caller has to resolve.
    async fn ensure_schedulable(
        &self,
        technician: &Technician,
        start: NaiveDate,
        end: NaiveDate,
    ) -> PlanResult<()> {
        if technician.status == TechnicianStatus::OffDuty {
            return Err(PlanError::Conflict(format!(
                "{} is off duty",
                technician.name
            )));
        }
        let overlapping = self
            .trips
            .trips_overlapping(technician.id, start, end)
            .await?;
        if let Some(existing) = overlapping.first() {
            return Err(PlanError::Conflict(format!(
                "{} already has a trip to {} from {} to {}",
                technician.name, existing.destination_city, existing.start_date, existing.end_date
            )));
        }
        Ok(())
    }

    /// Rate lookup failures never sink a plan; a missing or unreadable city
    /// rate falls back to 1.0.
    async fn multiplier_for(&self, city: &str) -> f64 {
        match self.rates.multiplier_for(city).await {
            Ok(Some(multiplier)) => multiplier,
            Ok(None) => 1.0,
            Err(err) => {
                warn!(city, error = %err, "rate lookup failed, using multiplier 1.0");
                1.0
            }
        }
    }

    /// Create and schedule PM service requests for saved PM tasks. Runs after
    /// the trip committed; each failure becomes a warning, never an error.
    async fn schedule_pm_requests(
        &self,
        technician: &Technician,
        tasks: &[TripTask],
    ) -> (Vec<uuid::Uuid>, Vec<SideEffectWarning>) {
        let mut scheduled = Vec::new();
        let mut warnings = Vec::new();

        for task in tasks.iter().filter(|t| t.task_type == TaskType::Pm) {
            let result = self.schedule_one_pm(technician, task).await;
            match result {
                Ok(request_id) => scheduled.push(request_id),
                Err(err) => {
                    warn!(task_id = %task.id, unit_id = %task.unit_id, error = %err, "PM scheduling failed");
                    warnings.push(SideEffectWarning {
                        task_id: task.id,
                        unit_id: task.unit_id,
                        reason: err.to_string(),
                    });
                }
            }
        }

        (scheduled, warnings)
    }

    async fn schedule_one_pm(
        &self,
        technician: &Technician,
        task: &TripTask,
    ) -> PlanResult<uuid::Uuid> {
        let request_id = match task.service_request_id {
            Some(id) => id,
            None => {
                let id = self
                    .backlog
                    .create_pm_request(&NewPmRequest {
                        unit_id: task.unit_id,
                        customer_id: task.customer_id,
                        priority: task.priority,
                        description: task
                            .notes
                            .clone()
                            .unwrap_or_else(|| "Preventive maintenance".to_string()),
                    })
                    .await?;
                self.trips.set_task_service_request(task.id, id).await?;
                id
            }
        };
        self.backlog
            .schedule_request(request_id, technician.id, task.scheduled_date, PM_SCHEDULE_WINDOW)
            .await?;
        Ok(request_id)
    }
}

fn breakdown_from_estimate(estimate: &CostEstimate, currency: String) -> CostBreakdown {
    CostBreakdown {
        travel_fare: CostField::auto(estimate.travel_fare),
        stay_cost: CostField::auto(estimate.stay),
        daily_allowance: CostField::auto(estimate.daily_allowance),
        local_travel_cost: CostField::auto(estimate.local_travel),
        misc_cost: CostField::auto(estimate.miscellaneous),
        total_estimated_cost: estimate.total,
        currency,
    }
}

fn validate_destination(city: &str) -> PlanResult<String> {
    let trimmed = city.trim();
    if trimmed.is_empty() {
        return Err(PlanError::Validation("destination city is required".to_string()));
    }
    Ok(trimmed.to_string())
}

fn validate_window(start: NaiveDate, end: NaiveDate) -> PlanResult<()> {
    if end < start {
        return Err(PlanError::Validation(format!(
            "end date {} is before start date {}",
            end, start
        )));
    }
    Ok(())
}

/// Order candidates (PM first, sorted by priority; others keep collection
/// order), assign dates round-robin across the window with at most
/// `max_per_day` tasks per day, and drop the overflow.
pub fn bucket_tasks(
    candidates: Vec<TaskCandidate>,
    start: NaiveDate,
    end: NaiveDate,
    max_per_day: usize,
) -> Vec<TaskCandidate> {
    let (days, _) = trip_days(start, end);
    let capacity = days as usize * max_per_day.max(1);

    let (mut pm, other): (Vec<_>, Vec<_>) = candidates
        .into_iter()
        .partition(|c| c.task_type == TaskType::Pm);
    pm.sort_by_key(|c| c.priority.rank());

    pm.into_iter()
        .chain(other)
        .take(capacity)
        .enumerate()
        .map(|(i, mut candidate)| {
            candidate.scheduled_date = start + Duration::days((i / max_per_day.max(1)) as i64);
            candidate
        })
        .collect()
}

/// Merge the payload's cost fields with the fresh estimate: a supplied field
/// is persisted as given, manual flag and all; omitted fields take the
/// estimate. The total is always recomputed from the five fields.
fn merge_cost_inputs(
    input: &CostFieldsInput,
    estimate: &CostEstimate,
    currency: String,
) -> NewTripCost {
    let merge = |field: &Option<CostField>, fresh: f64| match field {
        Some(f) => CostField { value: round_currency(f.value), is_manual: f.is_manual },
        None => CostField::auto(fresh),
    };

    let travel_fare = merge(&input.travel_fare, estimate.travel_fare);
    let stay_cost = merge(&input.stay_cost, estimate.stay);
    let daily_allowance = merge(&input.daily_allowance, estimate.daily_allowance);
    let local_travel_cost = merge(&input.local_travel_cost, estimate.local_travel);
    let misc_cost = merge(&input.misc_cost, estimate.miscellaneous);
    let total = round_currency(
        travel_fare.value
            + stay_cost.value
            + daily_allowance.value
            + local_travel_cost.value
            + misc_cost.value,
    );

    NewTripCost {
        travel_fare,
        stay_cost,
        daily_allowance,
        local_travel_cost,
        misc_cost,
        total_estimated_cost: total,
        currency,
    }
}

/// Turn save-payload task entries into insert rows: fill defaults, clamp
/// dates into the trip window, and keep one task per unit with manual
/// entries beating auto ones.
fn prepare_tasks(
    inputs: Vec<TaskInput>,
    start: NaiveDate,
    end: NaiveDate,
    config: &PlanningConfig,
) -> Vec<NewTripTask> {
    let mut by_unit: Vec<NewTripTask> = Vec::new();

    for input in inputs {
        let task_type = input.task_type.unwrap_or(TaskType::Inspection);
        let duration = input.estimated_duration_hours.unwrap_or(match task_type {
            TaskType::Pm => config.pm_task_duration_hours,
            _ => config.default_task_duration_hours,
        });
        let scheduled = input
            .scheduled_date
            .unwrap_or(start)
            .clamp(start, end);
        let task = NewTripTask {
            unit_id: input.unit_id,
            site_name: input.site_name,
            customer_id: input.customer_id,
            task_type,
            priority: input.priority.unwrap_or(TaskPriority::Medium),
            scheduled_date: scheduled,
            estimated_duration_hours: duration,
            service_request_id: input.service_request_id,
            alert_id: input.alert_id,
            notes: input.notes,
            source: if input.is_manual { TaskSource::Manual } else { TaskSource::Auto },
        };

        match by_unit.iter_mut().find(|t| t.unit_id == task.unit_id) {
            Some(existing) => {
                if existing.source == TaskSource::Auto && task.source == TaskSource::Manual {
                    *existing = task;
                }
            }
            None => by_unit.push(task),
        }
    }

    by_unit
}
