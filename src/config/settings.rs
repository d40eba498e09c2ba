use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Keys the registry is allowed to overwrite. `serviceName` is ours alone.
pub const RECOGNIZED_KEYS: [&str; 17] = [
    "historicalDataIP",
    "ip",
    "productCatalogURL",
    "registrationEndpoint",
    "messageBrokerIP",
    "messageBrokerPort",
    "registerInterval",
    "status",
    "uacIP",
    "warningTopic",
    "getPlaceAdminAPI",
    "getPlacesByUsernameAPI",
    "getReportAPI",
    "getSensorMeasurementAPI",
    "manageSensorsAPI",
    "manageSingleSensorAPI",
    "token",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Name announced to the registry as `deviceName`
    pub service_name: String,

    #[serde(rename = "historicalDataIP")]
    pub historical_data_ip: String,
    pub ip: String,
    #[serde(rename = "productCatalogURL")]
    pub product_catalog_url: String,
    pub registration_endpoint: String,
    #[serde(rename = "messageBrokerIP")]
    pub message_broker_ip: String,
    pub message_broker_port: u16,
    /// Seconds between two registration heartbeats
    pub register_interval: u64,
    /// Opaque registry status, kept as whatever the registry sent
    pub status: Value,
    #[serde(rename = "uacIP")]
    pub uac_ip: String,
    pub warning_topic: String,

    #[serde(rename = "getPlaceAdminAPI")]
    pub get_place_admin_api: String,
    #[serde(rename = "getPlacesByUsernameAPI")]
    pub get_places_by_username_api: String,
    #[serde(rename = "getReportAPI")]
    pub get_report_api: String,
    #[serde(rename = "getSensorMeasurementAPI")]
    pub get_sensor_measurement_api: String,
    #[serde(rename = "manageSensorsAPI")]
    pub manage_sensors_api: String,
    #[serde(rename = "manageSingleSensorAPI")]
    pub manage_single_sensor_api: String,

    /// Telegram bot token
    pub token: String,
}

impl Settings {
    pub fn from_map(map: Map<String, Value>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(map))
    }

    pub fn to_map(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            // A struct always serializes to an object.
            _ => Ok(Map::new()),
        }
    }

    /// Take every recognized key from `response` when present, keep ours otherwise.
    pub fn merged_with(&self, response: &Map<String, Value>) -> Result<Self, serde_json::Error> {
        let mut map = self.to_map()?;
        for key in RECOGNIZED_KEYS {
            if let Some(value) = response.get(key) {
                // The file holds one assignment per line.
                if matches!(value, Value::String(s) if s.contains(['\n', '\r'])) {
                    return Err(serde::de::Error::custom(format!(
                        "value of `{}` spans several lines",
                        key
                    )));
                }
                map.insert(key.to_string(), value.clone());
            }
        }
        Self::from_map(map)
    }

    pub fn registration_url(&self) -> String {
        format!("{}{}", self.product_catalog_url, self.registration_endpoint)
    }
}

/// Split a `key = value` line. Comments, blank lines and anything without a
/// plain identifier on the left are not assignments.
pub fn parse_line(line: &str) -> Option<(&str, Value)> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    let (key, raw) = trimmed.split_once('=')?;
    let key = key.trim();
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }

    Some((key, parse_value(raw)))
}

pub fn parse_value(raw: &str) -> Value {
    let raw = raw.trim();

    for quote in ['\'', '"'] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            return Value::String(raw[1..raw.len() - 1].to_string());
        }
    }

    match raw {
        "true" | "True" => return Value::Bool(true),
        "false" | "False" => return Value::Bool(false),
        _ => {}
    }

    if let Ok(n) = raw.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Some(n) = raw.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(n);
    }

    Value::String(raw.to_string())
}

/// Strings are single-quoted, everything else is written literally.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{}'", s),
        other => other.to_string(),
    }
}
