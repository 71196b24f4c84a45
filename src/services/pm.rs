//! Preventive maintenance due detection
//!
//! Pure date arithmetic; callers supply the last completed service date (or
//! the unit's creation date as baseline) so no storage access happens here.
//! Units that already carry an open PM request are the collector's problem,
//! not this module's.

use chrono::NaiveDate;

use crate::types::TaskPriority;

/// Outcome of a PM-due evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PmStatus {
    pub due: bool,
    /// Whole days since the baseline (last service or unit creation).
    pub days_since: i64,
    pub severity: TaskPriority,
}

/// Evaluate whether preventive maintenance is due.
///
/// The baseline is the most recent completed service date; a unit that was
/// never serviced falls back to its creation date. Due when `days_since`
/// reaches `threshold_days`; escalates to CRITICAL once `days_since` is
/// strictly past `threshold_days + critical_grace_days`.
pub fn evaluate_pm(
    last_service: Option<NaiveDate>,
    unit_created: NaiveDate,
    as_of: NaiveDate,
    threshold_days: i64,
    critical_grace_days: i64,
) -> PmStatus {
    let baseline = last_service.unwrap_or(unit_created);
    let days_since = (as_of - baseline).num_days();

    let severity = if days_since > threshold_days + critical_grace_days {
        TaskPriority::Critical
    } else {
        TaskPriority::High
    };

    PmStatus {
        due: days_since >= threshold_days,
        days_since,
        severity,
    }
}
