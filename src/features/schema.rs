//! Versioned feature schemas
//!
//! A schema is the column contract between the assembled feature record and
//! one trained model artifact. Artifacts declare the schema they were trained
//! on and the service refuses to pair a record with a different one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::PredictorError;

const BASIC_FEATURES: &[&str] = &[
    "city",
    "year",
    "month",
    "day",
    "humidity",
    "dew_point",
    "pressure",
    "wspd",
];

const GEO_SEASON_FEATURES: &[&str] = &[
    "city",
    "season",
    "year",
    "month",
    "day",
    "latitude",
    "longitude",
    "elevation",
    "humidity",
    "dew_point",
    "pressure",
    "cloud_cover",
    "wspd",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSchema {
    /// City, date and surface observations only
    Basic,
    /// Basic columns plus season, cloud cover and the city's geographic metadata
    GeoSeason,
}

impl FeatureSchema {
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            FeatureSchema::Basic => "basic",
            FeatureSchema::GeoSeason => "geo_season",
        }
    }

    /// Column names the model expects, in training order
    #[must_use]
    pub fn features(self) -> &'static [&'static str] {
        match self {
            FeatureSchema::Basic => BASIC_FEATURES,
            FeatureSchema::GeoSeason => GEO_SEASON_FEATURES,
        }
    }

    /// Columns carrying text values rather than numbers
    #[must_use]
    pub fn is_categorical(self, feature: &str) -> bool {
        match self {
            FeatureSchema::Basic => feature == "city",
            FeatureSchema::GeoSeason => matches!(feature, "city" | "season"),
        }
    }

    #[must_use]
    pub fn uses_season(self) -> bool {
        matches!(self, FeatureSchema::GeoSeason)
    }

    #[must_use]
    pub fn uses_cloud_cover(self) -> bool {
        matches!(self, FeatureSchema::GeoSeason)
    }

    /// Pre-filled day on the form
    #[must_use]
    pub fn default_day(self) -> u32 {
        match self {
            FeatureSchema::Basic => 15,
            FeatureSchema::GeoSeason => 12,
        }
    }
}

impl FromStr for FeatureSchema {
    type Err = PredictorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "basic" => Ok(FeatureSchema::Basic),
            "geo_season" => Ok(FeatureSchema::GeoSeason),
            other => Err(PredictorError::config(format!(
                "Unknown feature schema '{other}'. Must be one of: basic, geo_season"
            ))),
        }
    }
}

impl fmt::Display for FeatureSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
