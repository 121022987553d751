//! Compare Module
//!
//! Best-value highlighting for the listing comparison table.

mod comparator;
mod listing;
mod policy;
mod value;


pub use comparator::{best_index, best_index_for, comparison_rows, ComparisonRow, TABLE_ATTRIBUTES};
pub use listing::{CarListing, ComparableEntity, ListingId};
pub use policy::{Attribute, Direction};
pub use value::{FieldValue, NOT_SPECIFIED};
