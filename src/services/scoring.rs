//! Technician ranking for a destination
//!
//! Scoring itself is a pure function over a technician row plus an overlap
//! flag; the async wrapper pulls active technicians and their trip overlaps
//! through the store traits and sorts the results.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::error::PlanResult;
use crate::services::store::{TechnicianDirectory, TripStore};
use crate::types::{Technician, TechnicianStatus, TechnicianSuggestion};

#[derive(Debug, Clone)]
pub struct TechnicianScore {
    pub technician: Technician,
    pub score: f64,
    pub reasons: Vec<String>,
    pub available: bool,
}

impl TechnicianScore {
    pub fn suggestion(&self) -> TechnicianSuggestion {
        TechnicianSuggestion {
            id: self.technician.id,
            name: self.technician.name.clone(),
            score: self.score,
            available: self.available,
            reasons: self.reasons.clone(),
        }
    }
}

/// Score one technician against a destination city.
///
/// Location bonus is +60 when the destination text contains the whole base
/// location, falling back to +30 when any comma-delimited segment of the base
/// location appears in the destination; at most one of the two is awarded.
/// Availability adds +25, skills `min(2 per skill, 15)`, rating
/// `min(2 per star, 10)`. Reasons accumulate in the same order so the wire
/// response reads like an explanation.
pub fn score_technician(
    technician: &Technician,
    destination_city: &str,
    has_overlap: bool,
) -> (f64, Vec<String>) {
    let mut score = 0.0;
    let mut reasons = Vec::new();
    let destination = destination_city.trim().to_lowercase();

    let base = technician.base_location.trim().to_lowercase();
    let segment_match = || {
        base.split(',')
            .map(|segment| segment.trim())
            .filter(|segment| !segment.is_empty())
            .any(|segment| destination.contains(segment))
    };
    if !base.is_empty() && !destination.is_empty() {
        if destination.contains(&base) {
            score += 60.0;
            reasons.push("Base location matches destination".to_string());
        } else if segment_match() {
            score += 30.0;
            reasons.push("Destination near base location".to_string());
        }
    }

    if !has_overlap {
        score += 25.0;
        reasons.push("Available for the requested dates".to_string());
    } else {
        reasons.push("Has an overlapping trip".to_string());
    }

    let skill_bonus = (technician.skills.len() as f64 * 2.0).min(15.0);
    if skill_bonus > 0.0 {
        score += skill_bonus;
        reasons.push(format!("{} listed skills", technician.skills.len()));
    }

    if let Some(rating) = technician.average_rating {
        let rating_bonus = (rating * 2.0).min(10.0);
        if rating_bonus > 0.0 {
            score += rating_bonus;
            reasons.push(format!("Average rating {:.1}", rating));
        }
    }

    (score, reasons)
}

/// Rank the technician roster for a destination and travel window.
///
/// Off-duty technicians are scored like everyone else but marked unavailable,
/// so they still show up in suggestions without being auto-selected. Sorted by
/// score descending; the sort is stable, so ties keep roster order.
pub async fn score_technicians(
    directory: &Arc<dyn TechnicianDirectory>,
    trips: &Arc<dyn TripStore>,
    destination_city: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> PlanResult<Vec<TechnicianScore>> {
    let technicians = directory.list_schedulable_technicians().await?;
    let mut scored = Vec::with_capacity(technicians.len());

    for technician in technicians {
        let overlaps = trips
            .trips_overlapping(technician.id, start, end)
            .await?;
        let has_overlap = !overlaps.is_empty();
        let (score, reasons) = score_technician(&technician, destination_city, has_overlap);
        let available = !has_overlap && technician.status != TechnicianStatus::OffDuty;
        scored.push(TechnicianScore {
            technician,
            score,
            reasons,
            available,
        });
    }

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(scored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testutil::{make_technician, MemoryStore};
    use chrono::Utc;
    use uuid::Uuid;

    fn technician(base: &str, areas: &[&str], skills: &[&str], rating: Option<f64>) -> Technician {
        Technician {
            id: Uuid::new_v4(),
            name: "Ravi Kumar".to_string(),
            base_location: base.to_string(),
            service_areas: areas.iter().map(|s| s.to_string()).collect(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            average_rating: rating,
            status: TechnicianStatus::Active,
            hotel_allowance: 1000.0,
            personal_allowance: 500.0,
            local_travel_allowance: 300.0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_full_match_score() {
        let tech = technician(
            "Pune",
            &["Mumbai"],
            &["hydraulics", "refrigeration", "electrical"],
            Some(4.5),
        );
        // Base 60, available 25, skills 6, rating 9.
        let (score, reasons) = score_technician(&tech, "Pune", false);
        assert_eq!(score, 100.0);
        assert_eq!(reasons.len(), 4);
    }

    #[test]
    fn test_segment_match_scores_lower_than_full_match() {
        let tech = technician("Pune, Maharashtra", &[], &[], None);
        // "Pune, Maharashtra" is not contained in "Pune", but the "Pune"
        // segment is, so only the weaker bonus applies.
        let (score, reasons) = score_technician(&tech, "Pune", false);
        assert_eq!(score, 55.0);
        assert!(reasons.iter().any(|r| r.contains("near base location")));
    }

    #[test]
    fn test_no_location_bonus_for_unrelated_city() {
        let tech = technician("Pune, Maharashtra", &["Mumbai"], &[], None);
        let (score, _) = score_technician(&tech, "Kolkata", false);
        assert_eq!(score, 25.0);
    }

    #[test]
    fn test_overlap_removes_availability_bonus() {
        let tech = technician("Pune", &[], &[], None);
        let (busy, reasons) = score_technician(&tech, "Pune", true);
        let (free, _) = score_technician(&tech, "Pune", false);
        assert_eq!(free - busy, 25.0);
        assert!(reasons.iter().any(|r| r.contains("overlapping")));
    }

    #[test]
    fn test_skill_bonus_caps_at_fifteen() {
        let skills: Vec<&str> = vec!["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"];
        let tech = technician("Delhi", &[], &skills, None);
        let (score, _) = score_technician(&tech, "Pune", false);
        // Availability 25 + capped skill bonus 15.
        assert_eq!(score, 40.0);
    }

    #[test]
    fn test_rating_bonus_caps_at_ten() {
        let tech = technician("Delhi", &[], &[], Some(5.0));
        let (score, _) = score_technician(&tech, "Pune", false);
        assert_eq!(score, 35.0);
    }

    #[test]
    fn test_case_insensitive_city_match() {
        let tech = technician("pune", &[], &[], None);
        let (score, _) = score_technician(&tech, "  PUNE ", false);
        assert_eq!(score, 85.0);
    }

    #[tokio::test]
    async fn test_off_duty_technician_is_scored_but_unavailable() {
        let store = Arc::new(MemoryStore::new());
        let mut off_duty = make_technician("Asha Verma", "Pune");
        off_duty.status = TechnicianStatus::OffDuty;
        store.add_technician(off_duty);

        let start = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        let scored = score_technicians(
            &(store.clone() as Arc<dyn TechnicianDirectory>),
            &(store as Arc<dyn TripStore>),
            "Pune",
            start,
            start + chrono::Duration::days(4),
        )
        .await
        .unwrap();

        assert_eq!(scored.len(), 1);
        assert!(!scored[0].available);
        assert!(scored[0].score > 0.0);
    }

    #[tokio::test]
    async fn test_score_ties_keep_roster_order() {
        let store = Arc::new(MemoryStore::new());
        let first = make_technician("Zoya Khan", "Delhi");
        let second = make_technician("Arun Nair", "Delhi");
        let first_id = first.id;
        let second_id = second.id;
        store.add_technician(first);
        store.add_technician(second);

        let start = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        let scored = score_technicians(
            &(store.clone() as Arc<dyn TechnicianDirectory>),
            &(store as Arc<dyn TripStore>),
            "Pune",
            start,
            start + chrono::Duration::days(4),
        )
        .await
        .unwrap();

        assert_eq!(scored[0].score, scored[1].score);
        assert_eq!(scored[0].technician.id, first_id);
        assert_eq!(scored[1].technician.id, second_id);
    }
}
