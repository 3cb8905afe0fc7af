//! User input collected by the form

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::FeatureSchema;
use crate::PredictorError;
use crate::models::{City, Season};

pub const YEAR_RANGE: RangeInclusive<i32> = 2000..=2100;
pub const MONTH_RANGE: RangeInclusive<u32> = 1..=12;
pub const DAY_RANGE: RangeInclusive<u32> = 1..=31;
pub const PERCENT_RANGE: RangeInclusive<u32> = 0..=100;
pub const DEW_POINT_RANGE: RangeInclusive<f64> = -20.0..=40.0;
pub const PRESSURE_RANGE: RangeInclusive<f64> = 900.0..=1100.0;
pub const WIND_SPEED_RANGE: RangeInclusive<f64> = 0.0..=100.0;

/// Current values of every form field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherInput {
    pub city: City,
    pub season: Option<Season>,
    pub year: i32,
    pub month: u32,
    /// Not checked against the month's length
    pub day: u32,
    /// Relative humidity in percent
    pub humidity: u32,
    /// Dew point in Celsius
    pub dew_point: f64,
    /// Sea-level pressure in hPa
    pub pressure: f64,
    /// Cloud cover in percent
    pub cloud_cover: Option<u32>,
    /// Wind speed in km/h
    pub wind_speed: f64,
}

impl WeatherInput {
    /// Form defaults for a schema; the season is left to the month
    #[must_use]
    pub fn defaults(schema: FeatureSchema) -> Self {
        Self {
            city: City::Islamabad,
            season: None,
            year: 2025,
            month: 6,
            day: schema.default_day(),
            humidity: 50,
            dew_point: 10.0,
            pressure: 1010.0,
            cloud_cover: schema.uses_cloud_cover().then_some(20),
            wind_speed: 10.0,
        }
    }

    /// Check every field against its range and the schema's required fields
    pub fn validate(&self, schema: FeatureSchema) -> crate::Result<()> {
        check_range("year", self.year, &YEAR_RANGE)?;
        check_range("month", self.month, &MONTH_RANGE)?;
        check_range("day", self.day, &DAY_RANGE)?;
        check_range("humidity", self.humidity, &PERCENT_RANGE)?;
        check_range("dew_point", self.dew_point, &DEW_POINT_RANGE)?;
        check_range("pressure", self.pressure, &PRESSURE_RANGE)?;
        check_range("wind_speed", self.wind_speed, &WIND_SPEED_RANGE)?;

        match self.cloud_cover {
            Some(cloud_cover) => check_range("cloud_cover", cloud_cover, &PERCENT_RANGE)?,
            None if schema.uses_cloud_cover() => {
                return Err(PredictorError::validation(format!(
                    "cloud_cover is required by the {schema} schema"
                )));
            }
            None => {}
        }

        Ok(())
    }

    /// Selected season, or the one the month falls in
    pub fn effective_season(&self) -> crate::Result<Season> {
        match self.season {
            Some(season) => Ok(season),
            None => Season::from_month(self.month),
        }
    }
}

fn check_range<T>(field: &str, value: T, range: &RangeInclusive<T>) -> crate::Result<()>
where
    T: PartialOrd + std::fmt::Display,
{
    if range.contains(&value) {
        Ok(())
    } else {
        Err(PredictorError::validation(format!(
            "{field} must be between {} and {}, got {value}",
            range.start(),
            range.end()
        )))
    }
}
