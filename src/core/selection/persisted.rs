//! Client state that survives restarts

use crate::adapters::storage::{load, save, KeyValueStore};
use crate::domain::{FavoriteAuthors, Patient, Result, Session};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use std::sync::Arc;

pub const SESSION_KEY: &str = "session";
pub const DAY_KEY: &str = "day";
pub const AUTO_DATE_KEY: &str = "auto_date";
pub const PATIENTS_KEY: &str = "patients";
pub const FAVORITE_AUTHORS_KEY: &str = "favorite_authors";

/// Typed access to the persisted keys
///
/// Reads never fail: a missing or unreadable value is treated as absent and
/// an unreadable one is logged.
#[derive(Clone)]
pub struct PersistedState {
    store: Arc<dyn KeyValueStore>,
}

impl PersistedState {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match load(self.store.as_ref(), key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "Ignoring unreadable persisted value");
                None
            }
        }
    }

    pub fn session(&self) -> Option<Session> {
        self.read(SESSION_KEY)
    }

    pub fn save_session(&self, session: &Session) -> Result<()> {
        save(self.store.as_ref(), SESSION_KEY, session)
    }

    pub fn day(&self) -> Option<NaiveDate> {
        self.read(DAY_KEY)
    }

    pub fn save_day(&self, day: NaiveDate) -> Result<()> {
        save(self.store.as_ref(), DAY_KEY, &day)
    }

    pub fn auto_date(&self) -> Option<bool> {
        self.read(AUTO_DATE_KEY)
    }

    pub fn save_auto_date(&self, enabled: bool) -> Result<()> {
        save(self.store.as_ref(), AUTO_DATE_KEY, &enabled)
    }

    pub fn patients(&self) -> Option<Vec<Patient>> {
        self.read(PATIENTS_KEY)
    }

    pub fn save_patients(&self, patients: &[Patient]) -> Result<()> {
        save(self.store.as_ref(), PATIENTS_KEY, patients)
    }

    pub fn favorite_authors(&self) -> FavoriteAuthors {
        self.read(FAVORITE_AUTHORS_KEY).unwrap_or_default()
    }

    pub fn save_favorite_authors(&self, favorites: &FavoriteAuthors) -> Result<()> {
        save(self.store.as_ref(), FAVORITE_AUTHORS_KEY, favorites)
    }

    /// Forget the signed-in user and their cached patients
    pub fn clear_session(&self) -> Result<()> {
        self.store.remove(SESSION_KEY)?;
        self.store.remove(PATIENTS_KEY)
    }
}
