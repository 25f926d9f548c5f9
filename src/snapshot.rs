//! JSON documents written to disk and published to the broker.

use {
    anyhow::{anyhow, Result},
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
};

/// The observable fields of the monitor captured at one instant.
///
/// Fields that were never measured serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub last_update_time: DateTime<Utc>,
    pub last_longitude: Option<f64>,
    pub last_latitude: Option<f64>,
    pub last_particulate_reading: Option<f64>,
}

impl Snapshot {
    /// JSON has no NaN or infinity and serde_json would write them as
    /// `null`, indistinguishable from a field that was never measured.
    pub fn ensure_finite(&self) -> Result<()> {
        let fields = [
            ("last_longitude", self.last_longitude),
            ("last_latitude", self.last_latitude),
            ("last_particulate_reading", self.last_particulate_reading),
        ];

        for (name, value) in fields.iter() {
            if let Some(value) = value {
                if !value.is_finite() {
                    return Err(anyhow!("{} is not finite: {}", name, value));
                }
            }
        }

        Ok(())
    }
}

/// Device shadow update, `{"state": {"reported": <snapshot>}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowUpdate {
    pub state: ShadowState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowState {
    pub reported: Snapshot,
}

impl From<Snapshot> for ShadowUpdate {
    fn from(reported: Snapshot) -> Self {
        Self {
            state: ShadowState { reported },
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, chrono::TimeZone, serde_json::json};

    fn snapshot() -> Snapshot {
        Snapshot {
            last_update_time: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
            last_longitude: Some(-118.2437),
            last_latitude: Some(34.0522),
            last_particulate_reading: None,
        }
    }

    #[test]
    fn unset_fields_are_null() {
        let value = serde_json::to_value(snapshot()).unwrap();
        assert_eq!(
            value,
            json!({
                "last_update_time": "2024-05-01T12:30:00Z",
                "last_longitude": -118.2437,
                "last_latitude": 34.0522,
                "last_particulate_reading": null,
            })
        );
    }

    #[test]
    fn non_finite_fields_are_rejected() {
        assert!(snapshot().ensure_finite().is_ok());

        let mut nan = snapshot();
        nan.last_particulate_reading = Some(f64::NAN);
        let err = nan.ensure_finite().unwrap_err();
        assert!(err.to_string().contains("last_particulate_reading"));

        let mut infinite = snapshot();
        infinite.last_latitude = Some(f64::INFINITY);
        assert!(infinite.ensure_finite().is_err());
    }

    #[test]
    fn shadow_nests_under_state_reported() {
        let value = serde_json::to_value(ShadowUpdate::from(snapshot())).unwrap();
        assert_eq!(value["state"]["reported"]["last_latitude"], json!(34.0522));
        assert_eq!(value["state"].as_object().unwrap().len(), 1);
        assert_eq!(value["state"]["reported"].as_object().unwrap().len(), 4);
    }
}
