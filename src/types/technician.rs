//! Technician types
//!
//! Technicians are managed by the workforce system; this engine reads them to
//! score, select and price trips.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "technician_status", rename_all = "snake_case")]
pub enum TechnicianStatus {
    Active,
    OffDuty,
    Inactive,
}

/// Technician entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Technician {
    pub id: Uuid,
    pub name: String,
    /// Free-text home base, e.g. "Chennai" or "Guindy, Chennai".
    pub base_location: String,
    /// Explicit service areas beyond the base location.
    pub service_areas: Vec<String>,
    pub skills: Vec<String>,
    pub average_rating: Option<f64>,
    pub status: TechnicianStatus,
    /// Per-night hotel allowance.
    pub hotel_allowance: f64,
    /// Per-day personal (food etc.) allowance.
    pub personal_allowance: f64,
    /// Per-day local travel allowance, scaled by the destination multiplier.
    pub local_travel_allowance: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Technician {
    /// Service areas resolved from the base location plus the explicit list.
    ///
    /// The base location contributes both its full text and its first
    /// comma-delimited segment ("Guindy, Chennai" also matches "Guindy").
    /// Returns an empty vec when nothing is configured; callers treat that as
    /// a configuration error.
    pub fn resolved_service_areas(&self) -> Vec<String> {
        let mut areas: Vec<String> = Vec::new();
        let mut push = |area: &str| {
            let trimmed = area.trim();
            if !trimmed.is_empty() && !areas.iter().any(|a| a.eq_ignore_ascii_case(trimmed)) {
                areas.push(trimmed.to_string());
            }
        };

        push(&self.base_location);
        if let Some(first_segment) = self.base_location.split(',').next() {
            push(first_segment);
        }
        for area in &self.service_areas {
            push(area);
        }
        areas
    }
}

/// Compact technician view embedded in plan responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicianSummary {
    pub id: Uuid,
    pub name: String,
    pub base_location: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub service_areas: Vec<String>,
}

impl From<&Technician> for TechnicianSummary {
    fn from(technician: &Technician) -> Self {
        Self {
            id: technician.id,
            name: technician.name.clone(),
            base_location: technician.base_location.clone(),
            service_areas: technician.service_areas.clone(),
        }
    }
}
