//! Serviceable unit types

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// A serviceable physical unit (container) tracked by the fleet system.
/// Read-only to the planning engine.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: Uuid,
    pub code: String,
    pub depot: Option<String>,
    pub current_location: Option<String>,
    pub customer_id: Option<Uuid>,
    /// Joined from the customer row for display purposes.
    pub customer_name: Option<String>,
    /// Opaque metadata imported from upstream systems (spreadsheet columns,
    /// telemetry tags). Not part of any planning invariant; only its text is
    /// consulted during location matching.
    pub extra: Option<Json<HashMap<String, serde_json::Value>>>,
    pub created_at: DateTime<Utc>,
}

impl Unit {
    /// Display name for task lists: customer first, then depot, then code.
    pub fn site_name(&self) -> String {
        self.customer_name
            .clone()
            .or_else(|| self.depot.clone())
            .unwrap_or_else(|| self.code.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(customer: Option<&str>, depot: Option<&str>) -> Unit {
        Unit {
            id: Uuid::nil(),
            code: "MWCU5081000".to_string(),
            depot: depot.map(|s| s.to_string()),
            current_location: None,
            customer_id: None,
            customer_name: customer.map(|s| s.to_string()),
            extra: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_site_name_prefers_customer() {
        assert_eq!(
            unit(Some("Acme Cold Chain"), Some("Chennai Depot")).site_name(),
            "Acme Cold Chain"
        );
    }

    #[test]
    fn test_site_name_falls_back_to_depot_then_code() {
        assert_eq!(unit(None, Some("Chennai Depot")).site_name(), "Chennai Depot");
        assert_eq!(unit(None, None).site_name(), "MWCU5081000");
    }
}
