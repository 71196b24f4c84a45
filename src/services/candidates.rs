//! Work candidate collection
//!
//! Scans units in scope and turns the service backlog into task candidates:
//! PM-due units first, then open alerts, then pending service requests. One
//! candidate per unit; the first source to claim a unit wins.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::config::PlanningConfig;
use crate::error::{PlanError, PlanResult};
use crate::services::pm::evaluate_pm;
use crate::services::store::{BacklogRepository, UnitRegistry};
use crate::types::{RequestKind, TaskCandidate, TaskPriority, TaskSource, TaskType, Unit};

/// Geographic scope of a collection run.
#[derive(Debug, Clone)]
pub enum Scope {
    /// Single destination city.
    Destination(String),
    /// A technician's resolved service areas.
    ServiceAreas(Vec<String>),
}

impl Scope {
    /// `ILIKE` patterns matching any location text containing an area name.
    /// Errors when the scope resolves to nothing to match on.
    pub fn patterns(&self) -> PlanResult<Vec<String>> {
        let areas: Vec<&str> = match self {
            Scope::Destination(city) => vec![city.as_str()],
            Scope::ServiceAreas(areas) => areas.iter().map(|a| a.as_str()).collect(),
        };
        let patterns: Vec<String> = areas
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .map(|a| format!("%{}%", a))
            .collect();
        if patterns.is_empty() {
            return Err(PlanError::Configuration(
                "no destination or service areas to search".to_string(),
            ));
        }
        Ok(patterns)
    }
}

pub struct CandidateCollector {
    units: Arc<dyn UnitRegistry>,
    backlog: Arc<dyn BacklogRepository>,
    config: PlanningConfig,
}

impl CandidateCollector {
    pub fn new(
        units: Arc<dyn UnitRegistry>,
        backlog: Arc<dyn BacklogRepository>,
        config: PlanningConfig,
    ) -> Self {
        Self { units, backlog, config }
    }

    /// Collect task candidates for all units in scope.
    ///
    /// Candidates default their scheduled date to `start` (pending requests
    /// keep their own date when set); the planner re-buckets dates across the
    /// window afterwards.
    pub async fn collect(
        &self,
        scope: &Scope,
        start: NaiveDate,
        _end: NaiveDate,
        as_of: NaiveDate,
    ) -> PlanResult<Vec<TaskCandidate>> {
        let patterns = scope.patterns()?;
        let units = self
            .units
            .find_units_by_location_patterns(&patterns, self.config.unit_scan_limit)
            .await?;
        if units.is_empty() {
            return Ok(Vec::new());
        }
        let unit_ids: Vec<_> = units.iter().map(|u| u.id).collect();
        debug!(units = unit_ids.len(), "collecting task candidates");

        let last_service = self.backlog.last_completed_service_dates(&unit_ids).await?;
        let has_open_pm = self.backlog.units_with_open_pm_request(&unit_ids).await?;

        let mut selected: Vec<TaskCandidate> = Vec::new();
        let mut claimed: std::collections::HashSet<uuid::Uuid> = std::collections::HashSet::new();
        let mut add = |candidate: TaskCandidate, claimed: &mut std::collections::HashSet<uuid::Uuid>| {
            if claimed.insert(candidate.unit_id) {
                selected.push(candidate);
            }
        };

        // PM-due units first. Units that already carry an open PM request are
        // skipped; their pending request surfaces below instead.
        let mut pm_due: Vec<(&Unit, i64, TaskPriority)> = Vec::new();
        for unit in &units {
            if has_open_pm.contains(&unit.id) {
                continue;
            }
            let status = evaluate_pm(
                last_service.get(&unit.id).copied(),
                unit.created_at.date_naive(),
                as_of,
                self.config.pm_threshold_days,
                self.config.pm_critical_grace_days,
            );
            if status.due {
                pm_due.push((unit, status.days_since, status.severity));
            }
        }
        pm_due.sort_by_key(|(_, days, severity)| (severity.rank(), std::cmp::Reverse(*days)));
        for (unit, days_since, severity) in pm_due {
            add(
                TaskCandidate {
                    unit_id: unit.id,
                    site_name: unit.site_name(),
                    customer_id: unit.customer_id,
                    task_type: TaskType::Pm,
                    priority: severity,
                    scheduled_date: start,
                    estimated_duration_hours: self.config.pm_task_duration_hours,
                    service_request_id: None,
                    alert_id: None,
                    notes: Some(format!(
                        "Preventive maintenance due - {} days since last service ({}-day threshold)",
                        days_since, self.config.pm_threshold_days
                    )),
                    source: TaskSource::Auto,
                },
                &mut claimed,
            );
        }

        let unit_by_id: std::collections::HashMap<_, _> =
            units.iter().map(|u| (u.id, u)).collect();

        for alert in self.backlog.find_open_alerts(&unit_ids).await? {
            let Some(unit) = unit_by_id.get(&alert.unit_id) else { continue };
            let duration = alert
                .estimated_service_minutes
                .map(|m| (m as f64 / 60.0).ceil())
                .unwrap_or(self.config.default_task_duration_hours);
            add(
                TaskCandidate {
                    unit_id: unit.id,
                    site_name: unit.site_name(),
                    customer_id: unit.customer_id,
                    task_type: TaskType::Alert,
                    priority: alert.severity.into(),
                    scheduled_date: start,
                    estimated_duration_hours: duration,
                    service_request_id: None,
                    alert_id: Some(alert.id),
                    notes: Some(format!("Open alert: {}", alert.title)),
                    source: TaskSource::Auto,
                },
                &mut claimed,
            );
        }

        for request in self.backlog.find_pending_requests(&unit_ids).await? {
            let Some(unit) = unit_by_id.get(&request.unit_id) else { continue };
            let task_type = match request.kind {
                RequestKind::Pm => TaskType::Pm,
                RequestKind::Repair => TaskType::Alert,
                RequestKind::Inspection => TaskType::Inspection,
            };
            let duration = request
                .estimated_duration_minutes
                .map(|m| (m as f64 / 60.0).ceil())
                .unwrap_or(self.config.default_task_duration_hours);
            let notes = request.description.as_deref().map(|d| {
                let short: String = d.chars().take(100).collect();
                format!("Pending service request: {}", short)
            });
            add(
                TaskCandidate {
                    unit_id: unit.id,
                    site_name: unit.site_name(),
                    customer_id: unit.customer_id.or(request.customer_id),
                    task_type,
                    priority: request.priority.unwrap_or(TaskPriority::Medium),
                    scheduled_date: request.scheduled_date.unwrap_or(start),
                    estimated_duration_hours: duration,
                    service_request_id: Some(request.id),
                    alert_id: None,
                    notes,
                    source: TaskSource::Auto,
                },
                &mut claimed,
            );
        }

        Ok(selected)
    }
}
