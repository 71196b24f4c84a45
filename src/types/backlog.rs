//! Service backlog types: open alerts and service requests
//!
//! Backlog items are owned by the service-desk side of the platform; the
//! planning engine reads them to build trip candidates and writes back only
//! through PM request creation and scheduling.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::task::TaskPriority;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "alert_severity", rename_all = "snake_case")]
pub enum AlertSeverity {
    Critical,
    High,
    Medium,
    Low,
}

impl From<AlertSeverity> for TaskPriority {
    fn from(severity: AlertSeverity) -> Self {
        match severity {
            AlertSeverity::Critical => TaskPriority::Critical,
            AlertSeverity::High => TaskPriority::High,
            _ => TaskPriority::Medium,
        }
    }
}

/// Open or resolved alert raised against a unit
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: Uuid,
    pub unit_id: Uuid,
    pub title: String,
    pub severity: AlertSeverity,
    pub estimated_service_minutes: Option<i32>,
    /// Open alerts have no resolution timestamp.
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "request_status", rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "request_kind", rename_all = "snake_case")]
pub enum RequestKind {
    Pm,
    Repair,
    Inspection,
}

/// Service request row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    pub id: Uuid,
    pub unit_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub kind: RequestKind,
    pub status: RequestStatus,
    pub priority: Option<TaskPriority>,
    pub description: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
    pub scheduled_time_window: Option<String>,
    pub estimated_duration_minutes: Option<i32>,
    pub assigned_technician_id: Option<Uuid>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for auto-created preventive maintenance requests
#[derive(Debug, Clone)]
pub struct NewPmRequest {
    pub unit_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub priority: TaskPriority,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_maps_to_priority() {
        assert_eq!(TaskPriority::from(AlertSeverity::Critical), TaskPriority::Critical);
        assert_eq!(TaskPriority::from(AlertSeverity::High), TaskPriority::High);
        assert_eq!(TaskPriority::from(AlertSeverity::Medium), TaskPriority::Medium);
        assert_eq!(TaskPriority::from(AlertSeverity::Low), TaskPriority::Medium);
    }

    #[test]
    fn test_request_status_serde() {
        assert_eq!(serde_json::to_string(&RequestStatus::InProgress).unwrap(), "\"in_progress\"");
        let parsed: RequestStatus = serde_json::from_str("\"scheduled\"").unwrap();
        assert_eq!(parsed, RequestStatus::Scheduled);
    }
}
