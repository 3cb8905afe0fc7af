//! Model contract
//!
//! The trained regressor is an opaque collaborator: it takes rows of named
//! features and returns one (tmin, tmax, tavg) triple per row.

pub mod forest;

pub use forest::ForestModel;

use crate::features::{FeatureRecord, FeatureSchema};
use crate::models::TemperaturePrediction;

/// A loaded, read-only temperature regressor
pub trait TemperatureModel: Send + Sync {
    /// Human readable artifact name, for logs
    fn name(&self) -> &str;

    /// Schema the model was trained on
    fn schema(&self) -> FeatureSchema;

    /// Predict one triple per input row
    fn predict(&self, rows: &[FeatureRecord]) -> crate::Result<Vec<TemperaturePrediction>>;
}
