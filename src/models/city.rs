//! City model and the static geographic metadata table

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::PredictorError;

/// Cities the model was trained on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum City {
    Islamabad,
    Lahore,
    Quetta,
}

/// Geographic metadata for a city
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CityMetadata {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Elevation above sea level in meters
    pub elevation: f64,
}

const CITY_TABLE: [(City, CityMetadata); 3] = [
    (
        City::Islamabad,
        CityMetadata {
            latitude: 33.6844,
            longitude: 73.0479,
            elevation: 540.0,
        },
    ),
    (
        City::Lahore,
        CityMetadata {
            latitude: 31.5204,
            longitude: 74.3587,
            elevation: 217.0,
        },
    ),
    (
        City::Quetta,
        CityMetadata {
            latitude: 30.1798,
            longitude: 66.9750,
            elevation: 1680.0,
        },
    ),
];

impl City {
    pub const ALL: [City; 3] = [City::Islamabad, City::Lahore, City::Quetta];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            City::Islamabad => "Islamabad",
            City::Lahore => "Lahore",
            City::Quetta => "Quetta",
        }
    }

    /// Metadata from the static table
    #[must_use]
    pub fn metadata(self) -> CityMetadata {
        // Table rows follow variant declaration order.
        CITY_TABLE[self as usize].1
    }
}

/// Look up metadata for a free-form city name.
///
/// Matching ignores ASCII case and surrounding whitespace. Names outside the
/// table fail with [`PredictorError::UnknownCity`].
pub fn lookup(name: &str) -> crate::Result<CityMetadata> {
    name.parse::<City>().map(City::metadata)
}

impl FromStr for City {
    type Err = PredictorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        City::ALL
            .into_iter()
            .find(|city| city.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| PredictorError::unknown_city(trimmed))
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
