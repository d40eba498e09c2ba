use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    #[serde(rename = "placeID")]
    pub place_id: i64,
}

/// One telemetry row. Only `value` is shown, other columns are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Measurement {
    pub value: Value,
}

impl Measurement {
    /// Strings render without quotes, anything else as JSON.
    pub fn display_value(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorState {
    pub name: String,
    pub on: bool,
}

/// Sensor states in the order the control service listed them.
pub fn sensor_states_from_map(map: Map<String, Value>) -> Vec<SensorState> {
    map.into_iter()
        .map(|(name, value)| SensorState {
            on: truthy(&value),
            name,
        })
        .collect()
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Null => false,
    }
}

/// Body of the single-sensor PUT.
#[derive(Debug, Clone, Serialize)]
pub struct SensorUpdate<'a> {
    #[serde(rename = "placeID")]
    pub place_id: i64,
    #[serde(rename = "sensorName")]
    pub sensor_name: &'a str,
    pub status: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensor_states_keep_service_order() {
        let map: Map<String, Value> =
            serde_json::from_str(r#"{"temperature": true, "humidity": false, "smoke": 1}"#).unwrap();
        let states = sensor_states_from_map(map);

        let names: Vec<_> = states.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["temperature", "humidity", "smoke"]);
        assert!(states[0].on);
        assert!(!states[1].on);
        assert!(states[2].on);
    }

    #[test]
    fn sensor_update_uses_wire_names() {
        let body = SensorUpdate {
            place_id: 7,
            sensor_name: "smoke",
            status: true,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({ "placeID": 7, "sensorName": "smoke", "status": true })
        );
    }

    #[test]
    fn measurement_value_display() {
        let m: Measurement = serde_json::from_str(r#"{"value": 21.5, "unit": "C"}"#).unwrap();
        assert_eq!(m.display_value(), "21.5");

        let m: Measurement = serde_json::from_str(r#"{"value": "high"}"#).unwrap();
        assert_eq!(m.display_value(), "high");
    }
}
