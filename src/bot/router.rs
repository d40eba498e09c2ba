use teloxide::types::{InlineKeyboardMarkup, UserId};

use crate::backend::models::SensorState;
use crate::backend::BackendClient;
use crate::bot::callback_data::{CallbackAction, SensorKind};
use crate::bot::menus;
use crate::bot::session::{MenuState, SessionStore};

/// Something to show the user, independent of how it gets delivered.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// A new message.
    Send {
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    },
    /// Replace the message the pressed button belongs to.
    Edit {
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    },
    Document {
        file_name: &'static str,
        bytes: Vec<u8>,
    },
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Send {
            text: text.into(),
            keyboard: None,
        }
    }
}

/// Who pressed a button and what the message currently says.
#[derive(Debug, Clone, Copy)]
pub struct CallbackContext<'a> {
    pub user: UserId,
    pub username: Option<&'a str>,
    pub current_text: Option<&'a str>,
}

/// Routes commands and button presses to their handlers and owns the
/// per-user sessions.
pub struct MenuRouter {
    api: BackendClient,
    sessions: SessionStore,
}

impl MenuRouter {
    pub fn new(api: BackendClient) -> Self {
        Self {
            api,
            sessions: SessionStore::new(),
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    // ── Commands ───────────────────────────────────────────────────

    /// `/start`: reset the session and list the caller's places.
    pub async fn start(&self, user: UserId, username: Option<&str>) -> Reply {
        let Some(username) = username else {
            return Reply::text(menus::NO_USERNAME);
        };

        self.sessions.reset(user, username);

        match self.places_keyboard(username).await {
            Some(keyboard) => {
                self.sessions.set_menu(user, MenuState::PlaceList);
                Reply::Send {
                    text: menus::CHOOSE_PLACE.to_string(),
                    keyboard: Some(keyboard),
                }
            }
            None => Reply::text(menus::NO_PLACES),
        }
    }

    pub fn help(&self, user: UserId) -> Reply {
        self.sessions.set_menu(user, MenuState::Root);
        Reply::text(menus::HELP_TEXT)
    }

    // ── Callbacks ──────────────────────────────────────────────────

    pub async fn handle_callback(
        &self,
        ctx: &CallbackContext<'_>,
        action: CallbackAction,
    ) -> Vec<Reply> {
        let menu = self.sessions.get(ctx.user).map(|s| s.menu).unwrap_or_default();
        tracing::debug!("User {} at {:?} pressed {:?}", ctx.user.0, menu, action);

        match action {
            CallbackAction::BackToHelp => vec![self.help(ctx.user)],
            CallbackAction::BackToPlaces => self.back_to_places(ctx).await,
            CallbackAction::DownloadReport => vec![self.download_report().await],
            CallbackAction::SelectPlace { place_id } => {
                self.sessions.select_place(ctx.user, place_id);
                redraw(
                    ctx,
                    menus::place_selected(place_id),
                    menus::actions_keyboard(),
                )
            }
            action => {
                // Everything below is scoped to a selected place.
                let Some(selected) = self.sessions.place_id(ctx.user) else {
                    return vec![Reply::text(menus::NO_PLACE_SELECTED)];
                };
                self.place_action(ctx, selected, action).await
            }
        }
    }

    async fn place_action(
        &self,
        ctx: &CallbackContext<'_>,
        selected: i64,
        action: CallbackAction,
    ) -> Vec<Reply> {
        match action {
            CallbackAction::ReadSensors => {
                self.sessions.set_menu(ctx.user, MenuState::SensorList);
                redraw(ctx, menus::CHOOSE_SENSOR, menus::sensors_keyboard(selected))
            }
            CallbackAction::ReadSensor { sensor, place_id } => {
                self.sessions.set_menu(ctx.user, MenuState::PlaceActions);
                vec![self.read_sensor(sensor, place_id).await]
            }
            CallbackAction::FetchAdmins => vec![self.fetch_admins(selected).await],
            CallbackAction::ManageSensors => self.manage_sensors(ctx, selected).await,
            CallbackAction::ToggleSensor { place_id, sensor } => {
                self.toggle_sensor(ctx, place_id, &sensor).await
            }
            other => {
                tracing::warn!("{:?} is not a place action", other);
                Vec::new()
            }
        }
    }

    // ── Handlers ───────────────────────────────────────────────────

    async fn back_to_places(&self, ctx: &CallbackContext<'_>) -> Vec<Reply> {
        let username = match (self.sessions.username(ctx.user), ctx.username) {
            (Some(stored), _) => stored,
            (None, Some(current)) => {
                self.sessions.remember_username(ctx.user, current);
                current.to_string()
            }
            (None, None) => return vec![Reply::text(menus::NO_USERNAME)],
        };

        match self.places_keyboard(&username).await {
            Some(keyboard) => {
                self.sessions.set_menu(ctx.user, MenuState::PlaceList);
                redraw(ctx, menus::CHOOSE_PLACE, keyboard)
            }
            None => vec![Reply::text(menus::NO_PLACES)],
        }
    }

    /// `None` when the directory failed or knows no places for `username`.
    async fn places_keyboard(&self, username: &str) -> Option<InlineKeyboardMarkup> {
        match self.api.places_by_username(username).await {
            Ok(places) if places.is_empty() => None,
            Ok(places) => Some(menus::places_keyboard(&places)),
            Err(e) => {
                tracing::warn!("Place lookup for '{}' failed: {}", username, e);
                None
            }
        }
    }

    async fn download_report(&self) -> Reply {
        match self.api.report().await {
            Ok(bytes) => Reply::Document {
                file_name: menus::REPORT_FILE_NAME,
                bytes,
            },
            Err(e) => {
                tracing::warn!("Report download failed: {}", e);
                Reply::text(menus::REPORT_FAILED)
            }
        }
    }

    async fn read_sensor(&self, sensor: SensorKind, place_id: i64) -> Reply {
        match self.api.latest_measurement(sensor.as_str(), place_id).await {
            Ok(Some(m)) => Reply::text(menus::last_measurement(sensor, &m.display_value())),
            Ok(None) => Reply::text(menus::no_measurement(sensor)),
            Err(e) => {
                tracing::warn!("Reading {} at place {} failed: {}", sensor.as_str(), place_id, e);
                Reply::text(menus::SENSOR_DATA_FAILED)
            }
        }
    }

    async fn fetch_admins(&self, place_id: i64) -> Reply {
        match self.api.place_admins(place_id).await {
            Ok(admins) if admins.is_empty() => Reply::text(menus::no_admins(place_id)),
            Ok(admins) => Reply::text(menus::admins_list(place_id, &admins)),
            Err(e) => {
                tracing::warn!("Admin lookup for place {} failed: {}", place_id, e);
                Reply::text(menus::ADMINS_FAILED)
            }
        }
    }

    async fn manage_sensors(&self, ctx: &CallbackContext<'_>, place_id: i64) -> Vec<Reply> {
        match self.api.sensor_states(place_id).await {
            Ok(states) => {
                self.sessions.set_menu(ctx.user, MenuState::SensorManage);
                redraw(
                    ctx,
                    menus::MANAGE_SENSORS,
                    menus::manage_keyboard(place_id, &states),
                )
            }
            Err(e) => {
                tracing::warn!("Sensor states for place {} failed: {}", place_id, e);
                vec![Reply::text(menus::SENSOR_STATES_FAILED)]
            }
        }
    }

    /// Flip one sensor based on a fresh read of its state.
    ///
    /// Read and write are separate requests: a toggle from elsewhere in
    /// between is overwritten. A sensor missing from the map counts as off.
    async fn toggle_sensor(
        &self,
        ctx: &CallbackContext<'_>,
        place_id: i64,
        sensor: &str,
    ) -> Vec<Reply> {
        let mut states = match self.api.sensor_states(place_id).await {
            Ok(states) => states,
            Err(e) => {
                tracing::warn!("Sensor states for place {} failed: {}", place_id, e);
                return vec![Reply::text(menus::SENSOR_STATES_FAILED)];
            }
        };

        let next = !states.iter().any(|s| s.name == sensor && s.on);

        if let Err(e) = self.api.set_sensor_state(place_id, sensor, next).await {
            tracing::warn!("Switching {} at place {} failed: {}", sensor, place_id, e);
            return vec![Reply::text(menus::SENSOR_UPDATE_FAILED)];
        }

        tracing::info!("Sensor {} at place {} switched {}", sensor, place_id, if next { "on" } else { "off" });
        set_state(&mut states, sensor, next);
        self.sessions.set_menu(ctx.user, MenuState::SensorManage);

        redraw(
            ctx,
            menus::sensor_toggled(sensor, next),
            menus::manage_keyboard(place_id, &states),
        )
    }
}

/// Record `on` for `sensor`, appending it when the service did not list it.
fn set_state(states: &mut Vec<SensorState>, sensor: &str, on: bool) {
    match states.iter_mut().find(|s| s.name == sensor) {
        Some(state) => state.on = on,
        None => states.push(SensorState {
            name: sensor.to_string(),
            on,
        }),
    }
}

/// Edit the menu message unless it already shows `text`.
fn redraw(
    ctx: &CallbackContext<'_>,
    text: impl Into<String>,
    keyboard: InlineKeyboardMarkup,
) -> Vec<Reply> {
    let text = text.into();
    if ctx.current_text == Some(text.as_str()) {
        return Vec::new();
    }
    vec![Reply::Edit {
        text,
        keyboard: Some(keyboard),
    }]
}
