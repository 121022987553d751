//! Comparison Policy
//!
//! Which listing attributes can be ranked, and in which direction.

use serde::Serialize;

// == Direction ==
/// Whether a larger or a smaller value is the favourable one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

impl Direction {
    /// Returns true when `candidate` strictly beats `current`. Equal values
    /// never win, so the earliest of tied extremes is kept.
    pub fn is_better(self, candidate: f64, current: f64) -> bool {
        match self {
            Direction::HigherIsBetter => candidate > current,
            Direction::LowerIsBetter => candidate < current,
        }
    }
}

// == Attribute ==
/// A listing attribute covered by the comparison policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Price,
    Year,
    Mileage,
    EngineVolume,
}

impl Attribute {
    pub const ALL: [Attribute; 4] = [
        Attribute::Price,
        Attribute::Year,
        Attribute::Mileage,
        Attribute::EngineVolume,
    ];

    /// Resolves an attribute name. Both the camelCase and snake_case
    /// spellings of the engine volume are accepted; anything else is not
    /// comparable.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "price" => Some(Attribute::Price),
            "year" => Some(Attribute::Year),
            "mileage" => Some(Attribute::Mileage),
            "engineVolume" | "engine_volume" => Some(Attribute::EngineVolume),
            _ => None,
        }
    }

    /// JSON field names the attribute may be stored under, preferred first.
    pub fn json_keys(self) -> &'static [&'static str] {
        match self {
            Attribute::Price => &["price"],
            Attribute::Year => &["year"],
            Attribute::Mileage => &["mileage"],
            Attribute::EngineVolume => &["engine_volume", "engineVolume"],
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            Attribute::Year => Direction::HigherIsBetter,
            Attribute::Price | Attribute::Mileage | Attribute::EngineVolume => {
                Direction::LowerIsBetter
            }
        }
    }

    /// Whether a value of exactly zero counts as a real value. Zero price,
    /// mileage or engine volume means "not entered".
    pub fn accepts_zero(self) -> bool {
        matches!(self, Attribute::Year)
    }
}
