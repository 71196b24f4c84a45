//! Trip cost estimation
//!
//! All money math happens on f64 rounded to two decimals at every step, so
//! stored components always re-add to the stored total.

use chrono::NaiveDate;

use crate::config::PlanningConfig;
use crate::types::Technician;

/// Round to two decimal places. Applied to every component and to the total.
pub fn round_currency(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Inclusive day count and overnight count for a travel window.
///
/// A same-day trip is one day and still one night (the planner assumes an
/// overnight stay even for single-day travel away from base).
pub fn trip_days(start: NaiveDate, end: NaiveDate) -> (i64, i64) {
    let days = ((end - start).num_days() + 1).max(1);
    let nights = (days - 1).max(1);
    (days, nights)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostEstimate {
    pub travel_fare: f64,
    pub stay: f64,
    pub daily_allowance: f64,
    pub local_travel: f64,
    pub miscellaneous: f64,
    pub total: f64,
}

impl CostEstimate {
    pub fn component_sum(&self) -> f64 {
        round_currency(
            self.travel_fare + self.stay + self.daily_allowance + self.local_travel
                + self.miscellaneous,
        )
    }
}

/// Estimate trip costs from the technician's allowance rates and the
/// destination's cost multiplier. The multiplier only scales local travel;
/// stay and daily allowance use the technician's flat rates.
pub fn estimate_costs(
    technician: &Technician,
    multiplier: f64,
    start: NaiveDate,
    end: NaiveDate,
    config: &PlanningConfig,
) -> CostEstimate {
    let (days, nights) = trip_days(start, end);

    let travel_fare = round_currency(config.default_travel_fare);
    let stay = round_currency(nights as f64 * technician.hotel_allowance);
    let daily_allowance = round_currency(days as f64 * technician.personal_allowance);
    let local_travel =
        round_currency(days as f64 * technician.local_travel_allowance * multiplier);
    let miscellaneous = 0.0;

    let total = round_currency(travel_fare + stay + daily_allowance + local_travel + miscellaneous);

    CostEstimate {
        travel_fare,
        stay,
        daily_allowance,
        local_travel,
        miscellaneous,
        total,
    }
}
