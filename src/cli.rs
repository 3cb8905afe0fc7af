//! Command line interface

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::features::{FeatureSchema, WeatherInput};
use crate::models::Season;

#[derive(Debug, Parser)]
#[command(
    name = "temperature-predictor",
    version,
    about = "Smart weather temperature predictor for Islamabad, Lahore and Quetta"
)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Model artifact, overriding the configured path
    #[arg(short, long, global = true)]
    pub model: Option<PathBuf>,

    /// Debug logging for this crate
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the interactive form (default)
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run a single prediction and print the result
    Predict(PredictArgs),
    /// List supported cities and their coordinates
    Cities,
    /// Print the configured feature schema
    Schema,
}

/// Form fields as flags; anything omitted takes the form default
#[derive(Debug, Args)]
pub struct PredictArgs {
    #[arg(long)]
    pub city: String,
    #[arg(long)]
    pub season: Option<String>,
    #[arg(long)]
    pub year: Option<i32>,
    #[arg(long)]
    pub month: Option<u32>,
    #[arg(long)]
    pub day: Option<u32>,
    /// Relative humidity in percent
    #[arg(long)]
    pub humidity: Option<u32>,
    /// Dew point in °C
    #[arg(long, allow_negative_numbers = true)]
    pub dew_point: Option<f64>,
    /// Pressure in hPa
    #[arg(long)]
    pub pressure: Option<f64>,
    /// Cloud cover in percent
    #[arg(long)]
    pub cloud_cover: Option<u32>,
    /// Wind speed in km/h
    #[arg(long)]
    pub wind_speed: Option<f64>,
}

impl PredictArgs {
    pub fn to_input(&self, schema: FeatureSchema) -> crate::Result<WeatherInput> {
        let defaults = WeatherInput::defaults(schema);
        Ok(WeatherInput {
            city: self.city.parse()?,
            season: self.season.as_deref().map(str::parse::<Season>).transpose()?,
            year: self.year.unwrap_or(defaults.year),
            month: self.month.unwrap_or(defaults.month),
            day: self.day.unwrap_or(defaults.day),
            humidity: self.humidity.unwrap_or(defaults.humidity),
            dew_point: self.dew_point.unwrap_or(defaults.dew_point),
            pressure: self.pressure.unwrap_or(defaults.pressure),
            cloud_cover: self.cloud_cover.or(defaults.cloud_cover),
            wind_speed: self.wind_speed.unwrap_or(defaults.wind_speed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{FeatureValue, assemble};
    use crate::models::City;

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_predict_args() {
        let cli = Cli::try_parse_from([
            "temperature-predictor",
            "predict",
            "--city",
            "Quetta",
            "--dew-point",
            "-5",
            "--month",
            "1",
        ])
        .unwrap();
        let Some(Command::Predict(args)) = cli.command else {
            panic!("expected predict command");
        };
        let input = args.to_input(FeatureSchema::GeoSeason).unwrap();
        assert_eq!(input.city, City::Quetta);
        assert_eq!(input.dew_point, -5.0);
        assert_eq!(input.month, 1);
        assert_eq!(input.day, 12);
        assert_eq!(input.cloud_cover, Some(20));
    }

    fn parse_predict(args: &[&str]) -> PredictArgs {
        let cli = Cli::try_parse_from(
            ["temperature-predictor", "predict"].iter().chain(args).copied(),
        )
        .unwrap();
        let Some(Command::Predict(args)) = cli.command else {
            panic!("expected predict command");
        };
        args
    }

    #[test]
    fn test_omitted_season_follows_month() {
        let args = parse_predict(&["--city", "Quetta", "--month", "1"]);
        let input = args.to_input(FeatureSchema::GeoSeason).unwrap();
        assert!(input.season.is_none());
        let record = assemble(FeatureSchema::GeoSeason, &input).unwrap();
        assert_eq!(record.get("season"), Some(&FeatureValue::from("Winter")));
    }

    #[test]
    fn test_explicit_season_is_kept() {
        let args = parse_predict(&["--city", "Quetta", "--month", "1", "--season", "autumn"]);
        let input = args.to_input(FeatureSchema::GeoSeason).unwrap();
        assert_eq!(input.season, Some(Season::Autumn));
    }

    #[test]
    fn test_unknown_season_is_rejected() {
        let args = parse_predict(&["--city", "Quetta", "--season", "Monsoon"]);
        assert!(args.to_input(FeatureSchema::GeoSeason).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["temperature-predictor", "cities", "--verbose"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Command::Cities)));
    }

    #[test]
    fn test_predict_requires_city() {
        assert!(Cli::try_parse_from(["temperature-predictor", "predict"]).is_err());
    }
}
