//! Export Module
//!
//! CSV export of search results and the JSON document produced when a
//! comparison is exported.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::compare::{CarListing, FieldValue};

/// Renders rows of listing objects as CSV.
///
/// The header is the key list of the first row, in its original order, and
/// every row is written against that header. Strings containing a comma
/// are quoted; nulls and missing keys become empty cells. Returns `None`
/// for empty input.
pub fn listings_to_csv(rows: &[Value]) -> Option<String> {
    let keys: Vec<&String> = rows.first()?.as_object()?.keys().collect();

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(keys.iter().map(|k| k.as_str()).collect::<Vec<_>>().join(","));

    for row in rows {
        let cells: Vec<String> = keys.iter().map(|key| csv_cell(row.get(key.as_str()))).collect();
        lines.push(cells.join(","));
    }

    Some(lines.join("\n"))
}

fn csv_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) if text.contains(',') => format!("\"{text}\""),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

/// `prefix_YYYY-MM-DD.ext`
pub fn export_file_name(prefix: &str, date: NaiveDate, extension: &str) -> String {
    format!("{prefix}_{}.{extension}", date.format("%Y-%m-%d"))
}

// == Comparison Export ==
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonExport {
    pub date: DateTime<Utc>,
    pub comparison: Vec<ExportedListing>,
}

/// The subset of listing fields written to a comparison export.
#[derive(Debug, Clone, Serialize)]
pub struct ExportedListing {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: FieldValue,
    pub price: FieldValue,
    pub engine_type: Option<String>,
    pub engine_volume: FieldValue,
    pub transmission: Option<String>,
    pub mileage: FieldValue,
    pub body_type: Option<String>,
    pub color: Option<String>,
    pub region: Option<String>,
    pub listing_url: Option<String>,
}

impl From<&CarListing> for ExportedListing {
    fn from(listing: &CarListing) -> Self {
        Self {
            brand: listing.brand.clone(),
            model: listing.model.clone(),
            year: listing.year.clone(),
            price: listing.price.clone(),
            engine_type: listing.engine_type.clone(),
            engine_volume: listing.engine_volume.clone(),
            transmission: listing.transmission.clone(),
            mileage: listing.mileage.clone(),
            body_type: listing.body_type.clone(),
            color: listing.color.clone(),
            region: listing.region.clone(),
            listing_url: listing.listing_url.clone(),
        }
    }
}

pub fn comparison_export(listings: &[CarListing], at: DateTime<Utc>) -> ComparisonExport {
    ComparisonExport {
        date: at,
        comparison: listings.iter().map(ExportedListing::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_csv_header_follows_first_row() {
        let rows = vec![
            json!({"brand": "Audi", "price": 12000, "region": "Rīga"}),
            json!({"region": "Valmiera", "brand": "Opel", "price": null}),
        ];

        let csv = listings_to_csv(&rows).unwrap();
        assert_eq!(csv, "brand,price,region\nAudi,12000,Rīga\nOpel,,Valmiera");
    }

    #[test]
    fn test_csv_quotes_commas_and_skips_missing() {
        let rows = vec![
            json!({"model": "A4, Avant", "mileage": 1.5}),
            json!({"other": true}),
        ];

        let csv = listings_to_csv(&rows).unwrap();
        assert_eq!(csv, "model,mileage\n\"A4, Avant\",1.5\n,");
    }

    #[test]
    fn test_csv_empty_input() {
        assert_eq!(listings_to_csv(&[]), None);
        assert_eq!(listings_to_csv(&[json!(1)]), None);
    }

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(export_file_name("car_comparison", date, "json"), "car_comparison_2024-03-09.json");
    }

    #[test]
    fn test_comparison_export_shape() {
        let listing: CarListing = serde_json::from_value(json!({
            "id": 3,
            "brand": "Volvo",
            "model": "V60",
            "year": 2017,
            "price": 14500,
            "url": "https://example.lv/v60",
            "seller": "dealer"
        }))
        .unwrap();
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();

        let exported = serde_json::to_value(comparison_export(&[listing], at)).unwrap();

        assert_eq!(exported["date"], "2024-03-09T12:00:00Z");
        let car = &exported["comparison"][0];
        assert_eq!(car["brand"], "Volvo");
        assert_eq!(car["price"], 14500.0);
        assert_eq!(car["listing_url"], "https://example.lv/v60");
        assert_eq!(car["mileage"], Value::Null);
        assert!(car.get("id").is_none());
        assert!(car.get("seller").is_none());
    }
}
