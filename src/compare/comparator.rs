//! Best-Value Comparator
//!
//! Picks which entity in a comparison set has the most favourable value for
//! an attribute, for highlighting in the comparison table.

use serde::Serialize;

use super::{Attribute, ComparableEntity};

/// Rows of the comparison table, in display order.
pub const TABLE_ATTRIBUTES: [&str; 9] = [
    "price",
    "year",
    "engine_type",
    "engine_volume",
    "transmission",
    "mileage",
    "body_type",
    "color",
    "region",
];

// == Best Index ==
/// Returns the index of the entity with the best valid value for
/// `attribute`, or `None` when there is no well-defined best.
///
/// There is no winner when the attribute is not comparable, when fewer than
/// two entities are given, when fewer than two of them carry a valid value,
/// or when every valid value is the same. Among equal best values the
/// earliest entity wins.
pub fn best_index<E: ComparableEntity>(entities: &[E], attribute: &str) -> Option<usize> {
    let attribute = Attribute::from_key(attribute)?;
    best_index_for(entities, attribute)
}

/// [`best_index`] for an already resolved attribute.
pub fn best_index_for<E: ComparableEntity>(entities: &[E], attribute: Attribute) -> Option<usize> {
    if entities.len() <= 1 {
        return None;
    }

    let valid: Vec<(usize, f64)> = entities
        .iter()
        .enumerate()
        .filter_map(|(index, entity)| {
            entity
                .field(attribute)
                .comparable_number(attribute)
                .map(|value| (index, value))
        })
        .collect();

    let (&first, rest) = valid.split_first()?;
    if rest.is_empty() || rest.iter().all(|&(_, value)| value == first.1) {
        return None;
    }

    let direction = attribute.direction();
    let (best, _) = rest.iter().fold(first, |best, &candidate| {
        if direction.is_better(candidate.1, best.1) {
            candidate
        } else {
            best
        }
    });
    Some(best)
}

// == Comparison Rows ==
/// Highlighting decision for one row of the comparison table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    /// Attribute shown in the row
    pub attribute: &'static str,
    /// Whether the row is ranked at all
    pub comparable: bool,
    /// Index of the highlighted entity, if any
    pub best_index: Option<usize>,
}

/// Computes the highlighted entity for every row of the comparison table.
pub fn comparison_rows<E: ComparableEntity>(entities: &[E]) -> Vec<ComparisonRow> {
    TABLE_ATTRIBUTES
        .iter()
        .map(|&attribute| ComparisonRow {
            attribute,
            comparable: Attribute::from_key(attribute).is_some(),
            best_index: best_index(entities, attribute),
        })
        .collect()
}
