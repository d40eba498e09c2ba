use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use teloxide::types::UserId;

/// Where a user is in the menu tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuState {
    #[default]
    Root,
    PlaceList,
    PlaceActions,
    SensorList,
    SensorManage,
}

/// Per-user navigation state. Lives until the process exits.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    pub username: Option<String>,
    pub place_id: Option<i64>,
    pub menu: MenuState,
}

/// Sessions keyed by Telegram user. The lock is never held across an await.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<UserId, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start over from the root with a fresh username.
    pub fn reset(&self, user: UserId, username: &str) {
        self.with(user, |s| {
            *s = Session {
                username: Some(username.to_string()),
                ..Session::default()
            }
        });
    }

    pub fn get(&self, user: UserId) -> Option<Session> {
        self.lock().get(&user).cloned()
    }

    pub fn username(&self, user: UserId) -> Option<String> {
        self.get(user).and_then(|s| s.username)
    }

    pub fn place_id(&self, user: UserId) -> Option<i64> {
        self.get(user).and_then(|s| s.place_id)
    }

    pub fn select_place(&self, user: UserId, place_id: i64) {
        self.with(user, |s| {
            s.place_id = Some(place_id);
            s.menu = MenuState::PlaceActions;
        });
    }

    pub fn set_menu(&self, user: UserId, menu: MenuState) {
        self.with(user, |s| s.menu = menu);
    }

    pub fn remember_username(&self, user: UserId, username: &str) {
        self.with(user, |s| s.username = Some(username.to_string()));
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Drop every session.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn with(&self, user: UserId, f: impl FnOnce(&mut Session)) {
        f(self.lock().entry(user).or_default());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<UserId, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_selected_place() {
        let store = SessionStore::new();
        let user = UserId(1);

        store.reset(user, "alice");
        store.select_place(user, 7);
        assert_eq!(store.place_id(user), Some(7));
        assert_eq!(store.get(user).unwrap().menu, MenuState::PlaceActions);

        store.reset(user, "alice2");
        let session = store.get(user).unwrap();
        assert_eq!(session.place_id, None);
        assert_eq!(session.username.as_deref(), Some("alice2"));
        assert_eq!(session.menu, MenuState::Root);
    }

    #[test]
    fn sessions_are_per_user() {
        let store = SessionStore::new();
        store.select_place(UserId(1), 1);
        store.select_place(UserId(2), 2);

        assert_eq!(store.place_id(UserId(1)), Some(1));
        assert_eq!(store.place_id(UserId(2)), Some(2));
        assert_eq!(store.place_id(UserId(3)), None);
        assert_eq!(store.len(), 2);

        store.clear();
        assert_eq!(store.len(), 0);
    }
}
