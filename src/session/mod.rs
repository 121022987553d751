//! Session Module
//!
//! Per-user dashboard state: favorites, the comparison set and the
//! notification center, all persisted through one [`KeyValueStore`].

mod comparison;
mod favorites;
mod notifications;

pub use comparison::{ComparisonSet, ToggleOutcome, COMPARISON_KEY, DEFAULT_MAX_COMPARE};
pub use favorites::{Favorites, FAVORITES_KEY};
pub use notifications::{
    Notification, NotificationCenter, NotificationKind, NotificationPreferences, PreferencesUpdate,
    NOTIFICATIONS_KEY, PREFERENCES_KEY,
};

use crate::compare::CarListing;
use crate::error::Result;
use crate::storage::KeyValueStore;

// == Session ==
/// Owns the store and the state loaded from it.
pub struct Session {
    store: Box<dyn KeyValueStore>,
    favorites: Favorites,
    comparison: ComparisonSet,
    notifications: NotificationCenter,
}

impl Session {
    /// Loads all session state from `store`.
    pub fn open(store: Box<dyn KeyValueStore>, max_compare: usize) -> Self {
        let favorites = Favorites::load(store.as_ref());
        let comparison = ComparisonSet::load(store.as_ref(), max_compare);
        let notifications = NotificationCenter::load(store.as_ref());
        Self {
            store,
            favorites,
            comparison,
            notifications,
        }
    }

    pub fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    pub fn toggle_favorite(&mut self, listing: CarListing) -> Result<bool> {
        self.favorites.toggle(self.store.as_mut(), listing)
    }

    pub fn remove_favorite(&mut self, id: &str) -> Result<bool> {
        self.favorites.remove(self.store.as_mut(), id)
    }

    pub fn replace_favorites(&mut self, listings: Vec<CarListing>) -> Result<()> {
        self.favorites.replace(self.store.as_mut(), listings)
    }

    pub fn comparison(&self) -> &ComparisonSet {
        &self.comparison
    }

    pub fn toggle_comparison(&mut self, listing: CarListing) -> Result<ToggleOutcome> {
        self.comparison.toggle(self.store.as_mut(), listing)
    }

    pub fn remove_from_comparison(&mut self, id: &str) -> Result<bool> {
        self.comparison.remove(self.store.as_mut(), id)
    }

    pub fn clear_comparison(&mut self) -> Result<()> {
        self.comparison.clear(self.store.as_mut())
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn notify(
        &mut self,
        title: impl Into<String>,
        message: impl Into<String>,
        kind: NotificationKind,
    ) -> Result<Notification> {
        self.notifications.add(self.store.as_mut(), title, message, kind)
    }

    pub fn mark_notification_read(&mut self, id: i64) -> Result<bool> {
        self.notifications.mark_read(self.store.as_mut(), id)
    }

    pub fn mark_all_notifications_read(&mut self) -> Result<()> {
        self.notifications.mark_all_read(self.store.as_mut())
    }

    pub fn delete_notification(&mut self, id: i64) -> Result<bool> {
        self.notifications.delete(self.store.as_mut(), id)
    }

    pub fn update_preferences(&mut self, update: PreferencesUpdate) -> Result<NotificationPreferences> {
        self.notifications.update_preferences(self.store.as_mut(), update)
    }
}
