//! Feature assembly
//!
//! Turns the current form values into the single-row record the model
//! consumes. The set of columns is fixed by the [`FeatureSchema`] the model
//! artifact was trained on.

pub mod input;
pub mod record;
pub mod schema;

pub use input::WeatherInput;
pub use record::{FeatureRecord, FeatureValue};
pub use schema::FeatureSchema;

/// Build the feature record for `input` under `schema`.
///
/// Pure and deterministic. Geographic columns come from the city metadata
/// table; a missing season is derived from the month.
pub fn assemble(schema: FeatureSchema, input: &WeatherInput) -> crate::Result<FeatureRecord> {
    input.validate(schema)?;

    let mut record = FeatureRecord::new();
    record.insert("city", input.city.name());
    record.insert("year", i64::from(input.year));
    record.insert("month", i64::from(input.month));
    record.insert("day", i64::from(input.day));
    record.insert("humidity", i64::from(input.humidity));
    record.insert("dew_point", input.dew_point);
    record.insert("pressure", input.pressure);
    record.insert("wspd", input.wind_speed);

    if schema == FeatureSchema::GeoSeason {
        let meta = input.city.metadata();
        record.insert("season", input.effective_season()?.name());
        record.insert("latitude", meta.latitude);
        record.insert("longitude", meta.longitude);
        record.insert("elevation", meta.elevation);
        // validate() guarantees presence for this schema
        if let Some(cloud_cover) = input.cloud_cover {
            record.insert("cloud_cover", i64::from(cloud_cover));
        }
    }

    record.ensure_columns(schema.features())?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PredictorError;
    use crate::models::{City, Season};

    fn lahore_input() -> WeatherInput {
        WeatherInput {
            city: City::Lahore,
            season: None,
            year: 2025,
            month: 6,
            day: 15,
            humidity: 50,
            dew_point: 10.0,
            pressure: 1010.0,
            cloud_cover: Some(20),
            wind_speed: 10.0,
        }
    }

    #[test]
    fn test_basic_record_columns() {
        let record = assemble(FeatureSchema::Basic, &lahore_input()).unwrap();
        assert_eq!(record.len(), FeatureSchema::Basic.features().len());
        assert_eq!(record.get("city"), Some(&FeatureValue::from("Lahore")));
        assert_eq!(record.get("wspd"), Some(&FeatureValue::Number(10.0)));
        assert!(record.get("cloud_cover").is_none());
        assert!(record.get("latitude").is_none());
    }

    #[test]
    fn test_geo_season_record_uses_city_metadata() {
        let record = assemble(FeatureSchema::GeoSeason, &lahore_input()).unwrap();
        assert_eq!(record.len(), FeatureSchema::GeoSeason.features().len());
        assert_eq!(record.get("latitude"), Some(&FeatureValue::Number(31.5204)));
        assert_eq!(record.get("longitude"), Some(&FeatureValue::Number(74.3587)));
        assert_eq!(record.get("elevation"), Some(&FeatureValue::Number(217.0)));
        assert_eq!(record.get("season"), Some(&FeatureValue::from("Summer")));
        assert_eq!(record.get("cloud_cover"), Some(&FeatureValue::Integer(20)));
    }

    #[test]
    fn test_selected_season_wins_over_month() {
        let mut input = lahore_input();
        input.season = Some(Season::Winter);
        let record = assemble(FeatureSchema::GeoSeason, &input).unwrap();
        assert_eq!(record.get("season"), Some(&FeatureValue::from("Winter")));
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let input = lahore_input();
        let first = assemble(FeatureSchema::GeoSeason, &input).unwrap();
        let second = assemble(FeatureSchema::GeoSeason, &input).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_invalid_input_is_rejected() {
        let mut input = lahore_input();
        input.pressure = 850.0;
        let err = assemble(FeatureSchema::Basic, &input).unwrap_err();
        assert!(matches!(err, PredictorError::Validation { .. }));
    }
}
