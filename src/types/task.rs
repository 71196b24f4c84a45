//! Trip task types
//!
//! A trip task is one unit of field work bundled into a technician trip:
//! preventive maintenance, an alert response, or an inspection visit.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Kind of work a trip task represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "task_type", rename_all = "snake_case")]
pub enum TaskType {
    Pm,
    Alert,
    Inspection,
}

/// Task priority. Serialized uppercase to match the operator-facing convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "task_priority", rename_all = "UPPERCASE")]
pub enum TaskPriority {
    Critical,
    High,
    Medium,
    Low,
}

impl TaskPriority {
    /// Sort rank, lower is more urgent.
    pub fn rank(&self) -> u8 {
        match self {
            TaskPriority::Critical => 0,
            TaskPriority::High => 1,
            TaskPriority::Medium => 2,
            TaskPriority::Low => 3,
        }
    }
}

/// How a task entered the plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "task_source", rename_all = "snake_case")]
pub enum TaskSource {
    Auto,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Completed,
}

/// Persisted trip task row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TripTask {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub unit_id: Uuid,
    pub site_name: Option<String>,
    pub customer_id: Option<Uuid>,
    pub task_type: TaskType,
    pub priority: TaskPriority,
    pub scheduled_date: NaiveDate,
    pub estimated_duration_hours: f64,
    pub status: TaskStatus,
    pub service_request_id: Option<Uuid>,
    pub alert_id: Option<Uuid>,
    pub notes: Option<String>,
    pub source: TaskSource,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Work candidate gathered by the collector. Lives in memory until a plan is
/// saved, at which point it becomes a [`TripTask`] row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCandidate {
    pub unit_id: Uuid,
    pub site_name: String,
    pub customer_id: Option<Uuid>,
    pub task_type: TaskType,
    pub priority: TaskPriority,
    pub scheduled_date: NaiveDate,
    pub estimated_duration_hours: f64,
    pub service_request_id: Option<Uuid>,
    pub alert_id: Option<Uuid>,
    pub notes: Option<String>,
    pub source: TaskSource,
}

/// Task entry in a save-trip payload. Either carried over from an auto plan
/// or edited/added manually by the operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    pub unit_id: Uuid,
    pub site_name: Option<String>,
    pub customer_id: Option<Uuid>,
    pub task_type: Option<TaskType>,
    pub priority: Option<TaskPriority>,
    pub scheduled_date: Option<NaiveDate>,
    pub estimated_duration_hours: Option<f64>,
    pub service_request_id: Option<Uuid>,
    pub alert_id: Option<Uuid>,
    pub notes: Option<String>,
    #[serde(default)]
    pub is_manual: bool,
}

/// Insert shape for a trip task
#[derive(Debug, Clone)]
pub struct NewTripTask {
    pub unit_id: Uuid,
    pub site_name: Option<String>,
    pub customer_id: Option<Uuid>,
    pub task_type: TaskType,
    pub priority: TaskPriority,
    pub scheduled_date: NaiveDate,
    pub estimated_duration_hours: f64,
    pub service_request_id: Option<Uuid>,
    pub alert_id: Option<Uuid>,
    pub notes: Option<String>,
    pub source: TaskSource,
}
