//! Comparison set: the few listings shown side by side.

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::compare::{comparison_rows, CarListing, ComparisonRow, FieldValue, ListingId, NOT_SPECIFIED};
use crate::error::{CarboardError, Result};
use crate::storage::{self, KeyValueStore};

/// Storage key for the comparison set
pub const COMPARISON_KEY: &str = "carsToCompare";

/// Default number of listings that can be compared at once
pub const DEFAULT_MAX_COMPARE: usize = 3;

/// What a toggle did to the comparison set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    Added,
    Removed,
}

#[derive(Debug)]
pub struct ComparisonSet {
    listings: Vec<CarListing>,
    capacity: usize,
}

impl ComparisonSet {
    /// Loads the stored set. A stored set larger than `capacity` (capacity
    /// lowered between runs) is truncated.
    pub fn load(store: &dyn KeyValueStore, capacity: usize) -> Self {
        let mut listings: Vec<CarListing> = storage::load(store, COMPARISON_KEY, Vec::new());
        listings.truncate(capacity);
        Self { listings, capacity }
    }

    pub fn listings(&self) -> &[CarListing] {
        &self.listings
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.listings.len())
    }

    /// Removes the listing if it is already in the set, otherwise adds it
    /// after filling in display defaults.
    pub fn toggle(
        &mut self,
        store: &mut dyn KeyValueStore,
        listing: CarListing,
    ) -> Result<ToggleOutcome> {
        if let Some(id) = listing.id.as_ref() {
            if let Some(pos) = self.listings.iter().position(|l| l.id.as_ref() == Some(id)) {
                let mut next = self.listings.clone();
                let removed = next.remove(pos);
                self.commit(store, next)?;
                info!(%id, title = %removed.title(), "removed from comparison");
                return Ok(ToggleOutcome::Removed);
            }
        }

        if self.listings.len() >= self.capacity {
            return Err(CarboardError::ComparisonFull(self.capacity));
        }

        let listing = normalize_for_comparison(listing, Utc::now().timestamp_millis());
        let (id, title) = (listing.id.clone(), listing.title());
        let mut next = self.listings.clone();
        next.push(listing);
        self.commit(store, next)?;
        info!(?id, %title, "added to comparison");
        Ok(ToggleOutcome::Added)
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

    pub fn clear(&mut self, store: &mut dyn KeyValueStore) -> Result<()> {
        store.remove(COMPARISON_KEY)?;
        self.listings.clear();
        Ok(())
    }

    /// Replaces the set only once `next` is saved.
    fn commit(&mut self, store: &mut dyn KeyValueStore, next: Vec<CarListing>) -> Result<()> {
        storage::save(store, COMPARISON_KEY, &next)?;
        self.listings = next;
        Ok(())
    }

    /// Best-value highlighting for each row of the comparison table.
    pub fn best_rows(&self) -> Vec<ComparisonRow> {
        comparison_rows(&self.listings)
    }
}

/// Fills the fields the comparison table always shows. Absent text becomes
/// the "not specified" marker and absent price or mileage becomes `0`,
/// which the comparator in turn treats as missing.
fn normalize_for_comparison(mut listing: CarListing, now_ms: i64) -> CarListing {
    if listing.id.is_none() {
        listing.id = Some(match listing.external_id.as_deref() {
            Some(external) if !external.is_empty() => ListingId::from(external),
            _ => ListingId::Text(format!("car-{now_ms}")),
        });
    }

    for field in [
        &mut listing.brand,
        &mut listing.model,
        &mut listing.transmission,
        &mut listing.region,
    ] {
        if field.as_deref().map_or(true, str::is_empty) {
            *field = Some(NOT_SPECIFIED.to_string());
        }
    }

    if is_blank(&listing.year) || listing.year == FieldValue::Number(0.0) {
        listing.year = FieldValue::not_specified();
    }
    if is_blank(&listing.price) {
        listing.price = FieldValue::Number(0.0);
    }
    if is_blank(&listing.mileage) {
        listing.mileage = FieldValue::Number(0.0);
    }

    listing
}

fn is_blank(value: &FieldValue) -> bool {
    match value {
        FieldValue::Null => true,
        FieldValue::Text(text) => text.is_empty(),
        _ => false,
    }
}
