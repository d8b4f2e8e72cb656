//! Decoded telemetry snapshots.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One decoded, timestamped telemetry document.
///
/// `data` is an open-ended nested mapping of domain name to field name to
/// value; no domain or field is guaranteed present. Snapshots are only
/// ever replaced wholesale on receipt of a new message, never merged or
/// mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    /// Monotonically assigned document id.
    pub id: i64,
    /// Seconds, monotonic within a session. Not required to be strictly
    /// increasing across reconnects.
    pub timestamp: f64,
    /// Domain -> field -> value.
    #[serde(default)]
    pub data: BTreeMap<String, BTreeMap<String, Value>>,
}

impl TelemetrySnapshot {
    /// Look up a numeric field, `None` when the domain or field is absent
    /// or the value is not a number.
    pub fn number(&self, domain: &str, field: &str) -> Option<f64> {
        self.data.get(domain)?.get(field)?.as_f64()
    }

    /// Look up a boolean field, `None` when absent or not a boolean.
    pub fn boolean(&self, domain: &str, field: &str) -> Option<bool> {
        self.data.get(domain)?.get(field)?.as_bool()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> TelemetrySnapshot {
        serde_json::from_value(json!({
            "id": 1190,
            "timestamp": 12.400797,
            "data": {
                "dynamics": { "flw_speed": 41.7 },
                "diagnostics_low": { "shutdown_leg1": true }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_number_lookup() {
        let snap = sample();
        assert_eq!(snap.number("dynamics", "flw_speed"), Some(41.7));
        assert_eq!(snap.number("dynamics", "frw_speed"), None);
        assert_eq!(snap.number("pack", "hv_soc"), None);
        // Wrong type resolves to None, not an error
        assert_eq!(snap.number("diagnostics_low", "shutdown_leg1"), None);
    }

    #[test]
    fn test_boolean_lookup() {
        let snap = sample();
        assert_eq!(snap.boolean("diagnostics_low", "shutdown_leg1"), Some(true));
        assert_eq!(snap.boolean("diagnostics_low", "shutdown_leg2"), None);
        assert_eq!(snap.boolean("dynamics", "flw_speed"), None);
    }

    #[test]
    fn test_serde_round_trip() {
        let snap = sample();
        let wire = serde_json::to_string(&snap).unwrap();
        let back: TelemetrySnapshot = serde_json::from_str(&wire).unwrap();
        assert_eq!(back, snap);
    }

    #[test]
    fn test_missing_data_defaults_empty() {
        let snap: TelemetrySnapshot =
            serde_json::from_str(r#"{"id": 1, "timestamp": 0.5}"#).unwrap();
        assert!(snap.data.is_empty());
    }
}
