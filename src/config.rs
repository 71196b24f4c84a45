//! Configuration management

use anyhow::{Context, Result};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// NATS server URL
    pub nats_url: String,

    /// PostgreSQL connection string
    pub database_url: String,

    /// Planning knobs consumed by the trip engine
    pub planning: PlanningConfig,
}

/// Tunables of the planning engine. Owned by operations, consumed here.
#[derive(Debug, Clone)]
pub struct PlanningConfig {
    /// Days since last service after which preventive maintenance is due.
    pub pm_threshold_days: i64,
    /// Days past the threshold after which a due PM escalates to CRITICAL.
    pub pm_critical_grace_days: i64,
    /// Cap on tasks bucketed into a single trip day.
    pub max_tasks_per_day: usize,
    /// Currency code applied when a payload does not specify one.
    pub default_currency: String,
    /// Flat travel fare estimate. No distance/fare API is integrated; this is
    /// a documented placeholder, not a defect.
    pub default_travel_fare: f64,
    /// Duration assigned to generated PM tasks.
    pub pm_task_duration_hours: f64,
    /// Fallback duration for alert and inspection tasks.
    pub default_task_duration_hours: f64,
    /// Row cap for unit scans during candidate collection.
    pub unit_scan_limit: i64,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            pm_threshold_days: 90,
            pm_critical_grace_days: 30,
            max_tasks_per_day: 3,
            default_currency: "INR".to_string(),
            default_travel_fare: 1000.0,
            pm_task_duration_hours: 2.0,
            default_task_duration_hours: 1.0,
            unit_scan_limit: 1000,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let nats_url = std::env::var("NATS_URL")
            .unwrap_or_else(|_| "nats://localhost:4222".to_string());

        let database_url = std::env::var("DATABASE_URL")
            .context("DATABASE_URL must be set")?;

        let mut planning = PlanningConfig::default();
        if let Some(days) = parse_env("PM_THRESHOLD_DAYS")? {
            planning.pm_threshold_days = days;
        }
        if let Some(cap) = parse_env("MAX_TASKS_PER_DAY")? {
            planning.max_tasks_per_day = cap;
        }
        if let Ok(currency) = std::env::var("DEFAULT_CURRENCY") {
            if !currency.trim().is_empty() {
                planning.default_currency = currency.trim().to_string();
            }
        }
        if let Some(fare) = parse_env("DEFAULT_TRAVEL_FARE")? {
            planning.default_travel_fare = fare;
        }

        Ok(Self {
            nats_url,
            database_url,
            planning,
        })
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => {
            let value = raw
                .trim()
                .parse::<T>()
                .with_context(|| format!("{} must be a valid number (got {:?})", name, raw))?;
            Ok(Some(value))
        }
        Err(_) => Ok(None),
    }
}
