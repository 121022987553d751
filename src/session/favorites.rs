//! Favorite listings.

use tracing::info;

use crate::compare::{CarListing, ListingId};
use crate::error::{CarboardError, Result};
use crate::storage::{self, KeyValueStore};

/// Storage key for the favorites list
pub const FAVORITES_KEY: &str = "carFavorites";

/// Listings the user starred, in the order they were added.
#[derive(Debug, Default)]
pub struct Favorites {
    listings: Vec<CarListing>,
}

impl Favorites {
    pub fn load(store: &dyn KeyValueStore) -> Self {
        Self {
            listings: storage::load(store, FAVORITES_KEY, Vec::new()),
        }
    }

    pub fn list(&self) -> &[CarListing] {
        &self.listings
    }

    pub fn contains(&self, id: &ListingId) -> bool {
        self.listings.iter().any(|l| l.id.as_ref() == Some(id))
    }

    /// Adds the listing, or removes it if it is already a favorite. Returns
    /// whether it is a favorite afterwards.
    pub fn toggle(&mut self, store: &mut dyn KeyValueStore, listing: CarListing) -> Result<bool> {
        let id = listing
            .id
            .clone()
            .ok_or_else(|| CarboardError::InvalidRequest("listing has no id".to_string()))?;

        if self.contains(&id) {
            let next = self
                .listings
                .iter()
                .filter(|l| l.id.as_ref() != Some(&id))
                .cloned()
                .collect();
            self.commit(store, next)?;
            info!(%id, "removed from favorites");
            return Ok(false);
        }

        let title = listing.title();
        let mut next = self.listings.clone();
        next.push(listing);
        self.commit(store, next)?;
        info!(%id, %title, "added to favorites");
        Ok(true)
    }

    /// Removes the listing with textual id `id`. Returns whether it was
    /// present.
    pub fn remove(&mut self, store: &mut dyn KeyValueStore, id: &str) -> Result<bool> {
        if !self.listings.iter().any(|l| l.has_id(id)) {
            return Ok(false);
        }
        let next = self.listings.iter().filter(|l| !l.has_id(id)).cloned().collect();
        self.commit(store, next)?;
        Ok(true)
    }

    /// Replaces every favorite with `listings`, as fetched from the user's
    /// account. Listings without an id, and repeated ids, are dropped.
    pub fn replace(&mut self, store: &mut dyn KeyValueStore, listings: Vec<CarListing>) -> Result<()> {
        let mut next: Vec<CarListing> = Vec::with_capacity(listings.len());
        for listing in listings {
            let Some(id) = listing.id.as_ref() else { continue };
            if !next.iter().any(|l| l.id.as_ref() == Some(id)) {
                next.push(listing);
            }
        }
        let count = next.len();
        self.commit(store, next)?;
        info!(count, "favorites replaced");
        Ok(())
    }

    /// Replaces the list only once `next` is saved.
    fn commit(&mut self, store: &mut dyn KeyValueStore, next: Vec<CarListing>) -> Result<()> {
        storage::save(store, FAVORITES_KEY, &next)?;
        self.listings = next;
        Ok(())
    }
}
