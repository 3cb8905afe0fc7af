//! Temperature predictor
//!
//! This library collects weather parameters for one of three cities,
//! assembles them into the feature record a trained regression forest
//! expects, and renders the predicted minimum, maximum and average
//! temperature.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod features;
pub mod inference;
pub mod logging;
pub mod models;
pub mod predictor;
pub mod web;

// Re-export core types for public API
pub use config::PredictorConfig;
pub use error::PredictorError;
pub use features::{FeatureRecord, FeatureSchema, WeatherInput};
pub use inference::{ForestModel, TemperatureModel};
pub use models::{City, CityMetadata, Season, TemperaturePrediction};
pub use predictor::{FlowState, PredictionService};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, PredictorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
