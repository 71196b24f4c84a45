//! Trip and trip cost types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::services::costs::round_currency;

/// Trip lifecycle status.
///
/// `planned -> booked -> completed`, with `cancelled` reachable from
/// `planned` or `booked`. Cancellation is the only deletion path; trip rows
/// are never removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "trip_status", rename_all = "snake_case")]
pub enum TripStatus {
    Planned,
    Booked,
    Completed,
    Cancelled,
}

impl TripStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Planned => "planned",
            TripStatus::Booked => "booked",
            TripStatus::Completed => "completed",
            TripStatus::Cancelled => "cancelled",
        }
    }

    /// Whether a transition to `next` is allowed.
    pub fn can_transition_to(&self, next: TripStatus) -> bool {
        matches!(
            (self, next),
            (TripStatus::Planned, TripStatus::Booked)
                | (TripStatus::Booked, TripStatus::Completed)
                | (TripStatus::Planned, TripStatus::Cancelled)
                | (TripStatus::Booked, TripStatus::Cancelled)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
pub enum BookingStatus {
    NotStarted,
    InProgress,
    Confirmed,
}

/// Trip entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: Uuid,
    pub technician_id: Uuid,
    pub origin: Option<String>,
    pub destination_city: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub purpose: Option<String>,
    pub notes: Option<String>,
    pub trip_status: TripStatus,
    pub booking_status: BookingStatus,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert shape for a trip
#[derive(Debug, Clone)]
pub struct NewTrip {
    pub technician_id: Uuid,
    pub origin: Option<String>,
    pub destination_city: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub purpose: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
}

/// One cost field: a monetary value plus a flag marking it as operator-set.
/// Manual fields survive recalculation untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostField {
    pub value: f64,
    #[serde(default)]
    pub is_manual: bool,
}

impl CostField {
    pub fn auto(value: f64) -> Self {
        Self { value, is_manual: false }
    }
}

impl Default for CostField {
    fn default() -> Self {
        Self { value: 0.0, is_manual: false }
    }
}

/// Persisted cost row, one per trip
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TripCost {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub travel_fare: f64,
    pub travel_fare_is_manual: bool,
    pub stay_cost: f64,
    pub stay_cost_is_manual: bool,
    pub daily_allowance: f64,
    pub daily_allowance_is_manual: bool,
    pub local_travel_cost: f64,
    pub local_travel_cost_is_manual: bool,
    pub misc_cost: f64,
    pub misc_cost_is_manual: bool,
    pub total_estimated_cost: f64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TripCost {
    /// Client-facing breakdown of this row.
    pub fn breakdown(&self) -> CostBreakdown {
        CostBreakdown {
            travel_fare: CostField { value: self.travel_fare, is_manual: self.travel_fare_is_manual },
            stay_cost: CostField { value: self.stay_cost, is_manual: self.stay_cost_is_manual },
            daily_allowance: CostField {
                value: self.daily_allowance,
                is_manual: self.daily_allowance_is_manual,
            },
            local_travel_cost: CostField {
                value: self.local_travel_cost,
                is_manual: self.local_travel_cost_is_manual,
            },
            misc_cost: CostField { value: self.misc_cost, is_manual: self.misc_cost_is_manual },
            total_estimated_cost: round_currency(self.total_estimated_cost),
            currency: self.currency.clone(),
        }
    }
}

/// Cost breakdown as exchanged with clients: five value/flag pairs and the
/// derived total. The total is never independently settable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub travel_fare: CostField,
    pub stay_cost: CostField,
    pub daily_allowance: CostField,
    pub local_travel_cost: CostField,
    pub misc_cost: CostField,
    pub total_estimated_cost: f64,
    pub currency: String,
}

impl CostBreakdown {
    /// Sum of the five fields, rounded to 2 decimals.
    pub fn field_sum(&self) -> f64 {
        round_currency(
            self.travel_fare.value
                + self.stay_cost.value
                + self.daily_allowance.value
                + self.local_travel_cost.value
                + self.misc_cost.value,
        )
    }
}

/// Cost fields of a save-trip payload. Missing fields default to zero/auto.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostFieldsInput {
    pub travel_fare: Option<CostField>,
    pub stay_cost: Option<CostField>,
    pub daily_allowance: Option<CostField>,
    pub local_travel_cost: Option<CostField>,
    pub misc_cost: Option<CostField>,
}

/// Insert shape for the cost row
#[derive(Debug, Clone)]
pub struct NewTripCost {
    pub travel_fare: CostField,
    pub stay_cost: CostField,
    pub daily_allowance: CostField,
    pub local_travel_cost: CostField,
    pub misc_cost: CostField,
    pub total_estimated_cost: f64,
    pub currency: String,
}

/// Value update applied during recalculation. Manual flags are deliberately
/// absent; recalculation never changes them.
#[derive(Debug, Clone)]
pub struct TripCostUpdate {
    pub travel_fare: f64,
    pub stay_cost: f64,
    pub daily_allowance: f64,
    pub local_travel_cost: f64,
    pub misc_cost: f64,
    pub total_estimated_cost: f64,
}
