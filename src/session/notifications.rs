//! Notification center
//!
//! In-app notifications (price alerts, new listings, system messages) and
//! the user's delivery preferences, both persisted in the session store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::storage::{self, KeyValueStore};

/// Storage key for the notification list
pub const NOTIFICATIONS_KEY: &str = "notifications";
/// Storage key for the delivery preferences
pub const PREFERENCES_KEY: &str = "notificationPreferences";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
    PriceAlert,
    NewListing,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Creation time in Unix milliseconds, unique within the center
    pub id: i64,
    pub title: String,
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: NotificationKind,
    pub read: bool,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationPreferences {
    pub price_alerts: bool,
    pub new_listings: bool,
    pub system_updates: bool,
    pub email: bool,
    pub browser: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            price_alerts: true,
            new_listings: true,
            system_updates: true,
            email: true,
            browser: true,
        }
    }
}

/// Partial update; `None` fields keep their current value.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesUpdate {
    pub price_alerts: Option<bool>,
    pub new_listings: Option<bool>,
    pub system_updates: Option<bool>,
    pub email: Option<bool>,
    pub browser: Option<bool>,
}

impl NotificationPreferences {
    fn apply(&mut self, update: PreferencesUpdate) {
        let pairs = [
            (&mut self.price_alerts, update.price_alerts),
            (&mut self.new_listings, update.new_listings),
            (&mut self.system_updates, update.system_updates),
            (&mut self.email, update.email),
            (&mut self.browser, update.browser),
        ];
        for (field, value) in pairs {
            if let Some(value) = value {
                *field = value;
            }
        }
    }
}

// == Notification Center ==
/// Newest-first list of notifications.
#[derive(Debug, Default)]
pub struct NotificationCenter {
    notifications: Vec<Notification>,
    preferences: NotificationPreferences,
}

impl NotificationCenter {
    pub fn load(store: &dyn KeyValueStore) -> Self {
        Self {
            notifications: storage::load(store, NOTIFICATIONS_KEY, Vec::new()),
            preferences: storage::load(store, PREFERENCES_KEY, NotificationPreferences::default()),
        }
    }

    pub fn list(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn preferences(&self) -> NotificationPreferences {
        self.preferences
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }

    /// Whether new notifications should also be pushed to the browser.
    pub fn push_to_browser(&self) -> bool {
        self.preferences.browser
    }

    /// Records a new unread notification at the front of the list.
    pub fn add(
        &mut self,
        store: &mut dyn KeyValueStore,
        title: impl Into<String>,
        message: impl Into<String>,
        kind: NotificationKind,
    ) -> Result<Notification> {
        let date = Utc::now();
        let id = self.next_id(date.timestamp_millis());
        let notification = Notification {
            id,
            title: title.into(),
            message: message.into(),
            kind,
            read: false,
            date,
        };

        let mut next = Vec::with_capacity(self.notifications.len() + 1);
        next.push(notification.clone());
        next.extend(self.notifications.iter().cloned());
        self.commit(store, next)?;
        debug!(id, ?kind, "notification added");
        Ok(notification)
    }

    /// Returns whether a notification with `id` exists.
    pub fn mark_read(&mut self, store: &mut dyn KeyValueStore, id: i64) -> Result<bool> {
        let Some(pos) = self.notifications.iter().position(|n| n.id == id) else {
            return Ok(false);
        };
        let mut next = self.notifications.clone();
        next[pos].read = true;
        self.commit(store, next)?;
        Ok(true)
    }

    pub fn mark_all_read(&mut self, store: &mut dyn KeyValueStore) -> Result<()> {
        let next = self
            .notifications
            .iter()
            .cloned()
            .map(|n| Notification { read: true, ..n })
            .collect();
        self.commit(store, next)
    }

    /// Returns whether a notification with `id` existed.
    pub fn delete(&mut self, store: &mut dyn KeyValueStore, id: i64) -> Result<bool> {
        if !self.notifications.iter().any(|n| n.id == id) {
            return Ok(false);
        }
        let next = self.notifications.iter().filter(|n| n.id != id).cloned().collect();
        self.commit(store, next)?;
        Ok(true)
    }

    pub fn update_preferences(
        &mut self,
        store: &mut dyn KeyValueStore,
        update: PreferencesUpdate,
    ) -> Result<NotificationPreferences> {
        let mut next = self.preferences;
        next.apply(update);
        storage::save(store, PREFERENCES_KEY, &next)?;
        self.preferences = next;
        Ok(next)
    }

    /// Millisecond ids, bumped past the newest existing id when several
    /// notifications arrive within the same millisecond.
    fn next_id(&self, now_ms: i64) -> i64 {
        let newest = self.notifications.iter().map(|n| n.id).max().unwrap_or(i64::MIN);
        now_ms.max(newest.saturating_add(1))
    }

    /// Replaces the list only once `next` is saved.
    fn commit(&mut self, store: &mut dyn KeyValueStore, next: Vec<Notification>) -> Result<()> {
        storage::save(store, NOTIFICATIONS_KEY, &next)?;
        self.notifications = next;
        Ok(())
    }
}
