use std::fmt;
use std::str::FromStr;

/// Sensors offered in the read submenu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Temperature,
    Humidity,
    Smoke,
}

impl SensorKind {
    pub const ALL: [SensorKind; 3] = [Self::Temperature, Self::Humidity, Self::Smoke];

    /// Name used by the telemetry store.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Smoke => "smoke",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Temperature => "Temperature",
            Self::Humidity => "Humidity",
            Self::Smoke => "Smoke",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str().eq_ignore_ascii_case(s))
    }
}

/// What an inline button asks for.
///
/// Encoded as `kind[:field...]`. Free-text fields always come last so a
/// sensor name may contain `:` or `_` without breaking the parse. A bare
/// integer is a place selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    BackToHelp,
    BackToPlaces,
    DownloadReport,
    ReadSensors,
    FetchAdmins,
    ManageSensors,
    ReadSensor { sensor: SensorKind, place_id: i64 },
    ToggleSensor { place_id: i64, sensor: String },
    SelectPlace { place_id: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCallback(pub String);

impl fmt::Display for UnknownCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized callback data '{}'", self.0)
    }
}

impl std::error::Error for UnknownCallback {}

impl fmt::Display for CallbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BackToHelp => f.write_str("back_to_help"),
            Self::BackToPlaces => f.write_str("back_to_places"),
            Self::DownloadReport => f.write_str("download_report"),
            Self::ReadSensors => f.write_str("read_sensors"),
            Self::FetchAdmins => f.write_str("fetch_admins"),
            Self::ManageSensors => f.write_str("manage_sensors"),
            Self::ReadSensor { sensor, place_id } => {
                write!(f, "read:{}:{}", place_id, sensor.as_str())
            }
            Self::ToggleSensor { place_id, sensor } => write!(f, "toggle:{}:{}", place_id, sensor),
            Self::SelectPlace { place_id } => write!(f, "{}", place_id),
        }
    }
}

impl FromStr for CallbackAction {
    type Err = UnknownCallback;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownCallback(data.to_string());

        // Exact tags first, then prefixed intents, then the place fallback.
        let exact = match data {
            "back_to_help" => Some(Self::BackToHelp),
            "back_to_places" => Some(Self::BackToPlaces),
            "download_report" => Some(Self::DownloadReport),
            "read_sensors" => Some(Self::ReadSensors),
            "fetch_admins" => Some(Self::FetchAdmins),
            "manage_sensors" => Some(Self::ManageSensors),
            _ => None,
        };
        if let Some(action) = exact {
            return Ok(action);
        }

        if let Some(rest) = data.strip_prefix("read:") {
            let (place_id, sensor) = rest.split_once(':').ok_or_else(unknown)?;
            return Ok(Self::ReadSensor {
                place_id: place_id.parse().map_err(|_| unknown())?,
                sensor: SensorKind::from_str_loose(sensor).ok_or_else(unknown)?,
            });
        }

        if let Some(rest) = data.strip_prefix("toggle:") {
            let (place_id, sensor) = rest.split_once(':').ok_or_else(unknown)?;
            if sensor.is_empty() {
                return Err(unknown());
            }
            return Ok(Self::ToggleSensor {
                place_id: place_id.parse().map_err(|_| unknown())?,
                sensor: sensor.to_string(),
            });
        }

        data.trim()
            .parse()
            .map(|place_id| Self::SelectPlace { place_id })
            .map_err(|_| unknown())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(data: &str) -> CallbackAction {
        data.parse().unwrap()
    }

    #[test]
    fn exact_tags() {
        assert_eq!(parse("back_to_help"), CallbackAction::BackToHelp);
        assert_eq!(parse("back_to_places"), CallbackAction::BackToPlaces);
        assert_eq!(parse("read_sensors"), CallbackAction::ReadSensors);
        assert_eq!(parse("manage_sensors"), CallbackAction::ManageSensors);
    }

    #[test]
    fn bare_number_selects_a_place() {
        assert_eq!(parse("42"), CallbackAction::SelectPlace { place_id: 42 });
        assert!("hello".parse::<CallbackAction>().is_err());
    }

    #[test]
    fn sensor_names_may_contain_separators() {
        let action = CallbackAction::ToggleSensor {
            place_id: 5,
            sensor: "co2_level:north".to_string(),
        };
        let encoded = action.to_string();
        assert_eq!(encoded, "toggle:5:co2_level:north");
        assert_eq!(parse(&encoded), action);
    }

    #[test]
    fn read_sensor_encodes_kind_and_place() {
        let action = CallbackAction::ReadSensor {
            sensor: SensorKind::Humidity,
            place_id: 12,
        };
        assert_eq!(parse(&action.to_string()), action);
        assert!("read:12:pressure".parse::<CallbackAction>().is_err());
        assert!("read:x:smoke".parse::<CallbackAction>().is_err());
    }

    #[test]
    fn malformed_toggle_is_rejected() {
        assert!("toggle:5".parse::<CallbackAction>().is_err());
        assert!("toggle:5:".parse::<CallbackAction>().is_err());
        assert!("toggle:abc:smoke".parse::<CallbackAction>().is_err());
    }

    #[test]
    fn encodings_fit_telegram_limit() {
        for sensor in SensorKind::ALL {
            let data = CallbackAction::ReadSensor {
                sensor,
                place_id: i64::MAX,
            }
            .to_string();
            assert!(data.len() <= 64);
        }
    }
}
