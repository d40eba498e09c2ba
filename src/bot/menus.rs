use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::backend::models::{Place, SensorState};
use crate::bot::callback_data::{CallbackAction, SensorKind};

// ── Texts ──────────────────────────────────────────────────────────

pub const HELP_TEXT: &str = "Welcome to the bot!\n\n\
     Here are the available commands and options:\n\n\
     /start - Start the bot and select a place\n\
     /help - Show this help message\n\
     In the main menu, you can select a place from the list.\n\
     In the place selection menu, you can choose an action for the selected place.";

pub const CHOOSE_PLACE: &str = "Choose a place:";
pub const CHOOSE_SENSOR: &str = "Choose a sensor to read:";
pub const MANAGE_SENSORS: &str = "Manage Sensors:";

pub const NO_USERNAME: &str = "Error: You need to create a username in Telegram settings.";
pub const NO_PLACES: &str = "No places found for your username. Please contact the administrator.";
pub const NO_PLACE_SELECTED: &str = "No place selected. Please select a place first.";

pub const REPORT_PENDING: &str = "Generating the report, please wait...";
pub const REPORT_FAILED: &str = "Failed to download the report.";
pub const REPORT_FILE_NAME: &str = "report.pdf";

pub const SENSOR_DATA_FAILED: &str = "Failed to retrieve sensor data.";
pub const ADMINS_FAILED: &str = "Failed to retrieve admins.";
pub const SENSOR_STATES_FAILED: &str = "Failed to retrieve sensor states.";
pub const SENSOR_UPDATE_FAILED: &str = "Failed to update the sensor state.";

pub fn place_selected(place_id: i64) -> String {
    format!("Place {} selected. Choose an action:", place_id)
}

pub fn last_measurement(sensor: SensorKind, value: &str) -> String {
    format!("The last {} measurement: {}", sensor.as_str(), value)
}

pub fn no_measurement(sensor: SensorKind) -> String {
    format!("No data available for {}.", sensor.as_str())
}

pub fn admins_list(place_id: i64, admins: &[String]) -> String {
    format!("Admins for place ID {}:\n\n{}", place_id, admins.join("\n"))
}

pub fn no_admins(place_id: i64) -> String {
    format!("No admins found for place ID {}.", place_id)
}

pub fn sensor_toggled(sensor: &str, on: bool) -> String {
    format!("Sensor '{}' is now {}.", sensor, if on { "on" } else { "off" })
}

// ── Keyboards ──────────────────────────────────────────────────────

fn button(label: impl Into<String>, action: CallbackAction) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label, action.to_string())
}

/// One row of place buttons in the order given, then a back row.
pub fn places_keyboard(places: &[Place]) -> InlineKeyboardMarkup {
    let row = places
        .iter()
        .map(|p| {
            button(
                format!("Place ID: {}", p.place_id),
                CallbackAction::SelectPlace {
                    place_id: p.place_id,
                },
            )
        })
        .collect();

    InlineKeyboardMarkup::new(vec![
        row,
        vec![button("Back", CallbackAction::BackToHelp)],
    ])
}

pub fn actions_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![button("Download Report", CallbackAction::DownloadReport)],
        vec![button("Read Sensors Measurements", CallbackAction::ReadSensors)],
        vec![button("Fetch Admins", CallbackAction::FetchAdmins)],
        vec![button("Manage Sensors", CallbackAction::ManageSensors)],
        vec![button("Back", CallbackAction::BackToPlaces)],
    ])
}

pub fn sensors_keyboard(place_id: i64) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = SensorKind::ALL
        .into_iter()
        .map(|sensor| {
            vec![button(
                format!("Read {}", sensor.label()),
                CallbackAction::ReadSensor { sensor, place_id },
            )]
        })
        .collect();
    rows.push(vec![button("Back", CallbackAction::BackToPlaces)]);
    InlineKeyboardMarkup::new(rows)
}

/// "Turn off X" for a sensor that is on, "Turn on X" otherwise.
pub fn toggle_label(state: &SensorState) -> String {
    let action = if state.on { "Turn off" } else { "Turn on" };
    format!("{} {}", action, capitalize(&state.name))
}

pub fn manage_keyboard(place_id: i64, states: &[SensorState]) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = states
        .iter()
        .map(|state| {
            vec![button(
                toggle_label(state),
                CallbackAction::ToggleSensor {
                    place_id,
                    sensor: state.name.clone(),
                },
            )]
        })
        .collect();
    rows.push(vec![button("Back", CallbackAction::BackToPlaces)]);
    InlineKeyboardMarkup::new(rows)
}

/// First letter upper-cased, the rest lower-cased.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use teloxide::types::InlineKeyboardButtonKind;

    /// `(label, callback data)` for every button, row by row.
    pub(crate) fn buttons(markup: &InlineKeyboardMarkup) -> Vec<Vec<(String, String)>> {
        markup
            .inline_keyboard
            .iter()
            .map(|row| {
                row.iter()
                    .map(|b| {
                        let data = match &b.kind {
                            InlineKeyboardButtonKind::CallbackData(d) => d.clone(),
                            _ => String::new(),
                        };
                        (b.text.clone(), data)
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn capitalize_matches_title_case() {
        assert_eq!(capitalize("temperature"), "Temperature");
        assert_eq!(capitalize("CO2"), "Co2");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn places_keyboard_keeps_order_and_adds_back() {
        let places = [Place { place_id: 9 }, Place { place_id: 2 }];
        let rows = buttons(&places_keyboard(&places));

        assert_eq!(
            rows,
            vec![
                vec![
                    ("Place ID: 9".to_string(), "9".to_string()),
                    ("Place ID: 2".to_string(), "2".to_string()),
                ],
                vec![("Back".to_string(), "back_to_help".to_string())],
            ]
        );
    }

    #[test]
    fn manage_labels_follow_state() {
        let states = [
            SensorState {
                name: "temperature".into(),
                on: true,
            },
            SensorState {
                name: "humidity".into(),
                on: false,
            },
        ];
        let rows = buttons(&manage_keyboard(3, &states));

        assert_eq!(rows[0][0].0, "Turn off Temperature");
        assert_eq!(rows[0][0].1, "toggle:3:temperature");
        assert_eq!(rows[1][0].0, "Turn on Humidity");
        assert_eq!(rows[2][0].1, "back_to_places");
    }

    #[test]
    fn sensors_keyboard_lists_static_sensors() {
        let rows = buttons(&sensors_keyboard(4));
        let labels: Vec<_> = rows.iter().map(|r| r[0].0.as_str()).collect();
        assert_eq!(labels, ["Read Temperature", "Read Humidity", "Read Smoke", "Back"]);
        assert_eq!(rows[0][0].1, "read:4:temperature");
    }
}
