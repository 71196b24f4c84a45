//! Request and response payloads for planning operations

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::task::{TaskCandidate, TaskInput, TripTask};
use super::technician::TechnicianSummary;
use super::trip::{CostBreakdown, CostFieldsInput, Trip, TripStatus};

/// Request an auto-planned trip preview for a destination city
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoPlanRequest {
    pub destination_city: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Pin a specific technician instead of auto-selecting.
    pub technician_id: Option<Uuid>,
}

/// Request an auto-planned trip preview scoped to a technician's own
/// service areas
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoPlanByTechnicianRequest {
    pub technician_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Optional destination override; defaults to the primary service area.
    pub destination_city: Option<String>,
}

/// One entry of the ranked technician list returned for operator override
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicianSuggestion {
    pub id: Uuid,
    pub name: String,
    pub score: f64,
    pub available: bool,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: i64,
    pub nights: i64,
}

/// Non-persisted preview bundle produced by auto-planning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoPlanResponse {
    pub technician: TechnicianSummary,
    pub technician_suggestions: Vec<TechnicianSuggestion>,
    pub destination_city: String,
    pub travel_window: TravelWindow,
    pub costs: CostBreakdown,
    pub tasks: Vec<TaskCandidate>,
    pub multiplier: f64,
}

/// Persist a planned trip with its tasks and costs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveTripRequest {
    pub technician_id: Uuid,
    pub destination_city: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub origin: Option<String>,
    pub purpose: Option<String>,
    pub notes: Option<String>,
    pub currency: Option<String>,
    #[serde(default)]
    pub costs: CostFieldsInput,
    #[serde(default)]
    pub tasks: Vec<TaskInput>,
}

/// Non-fatal failure of a post-commit side effect (PM request creation or
/// scheduling). The trip itself was saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideEffectWarning {
    pub task_id: Uuid,
    pub unit_id: Uuid,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveTripResponse {
    pub trip: Trip,
    pub costs: CostBreakdown,
    pub tasks: Vec<TripTask>,
    /// Service requests scheduled for PM tasks after the save committed.
    pub scheduled_pm_requests: Vec<Uuid>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<SideEffectWarning>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripIdRequest {
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripDetailResponse {
    pub trip: Trip,
    pub costs: Option<CostBreakdown>,
    pub tasks: Vec<TripTask>,
}

/// Transition a trip to a new lifecycle status (cancellation included)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTripStatusRequest {
    pub id: Uuid,
    pub status: TripStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteTaskRequest {
    pub id: Uuid,
}

/// Request a scored technician list for a destination and window
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestTechniciansRequest {
    pub destination_city: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestTechniciansResponse {
    pub suggestions: Vec<TechnicianSuggestion>,
}
