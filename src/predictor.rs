//! Prediction flow
//!
//! [`PredictionService`] owns the loaded model for the lifetime of the
//! process and turns form input into a displayable outcome. Callers decide
//! how to render from the returned value; nothing here panics or escapes on
//! a failed prediction.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::PredictorError;
use crate::features::{self, FeatureSchema, WeatherInput};
use crate::inference::{ForestModel, TemperatureModel};
use crate::models::{Metric, TemperaturePrediction};

pub const SUCCESS_MESSAGE: &str = "Prediction complete!";
pub const FAILURE_PREFIX: &str = "Prediction failed: ";

/// What the form shows after an interaction
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FlowState {
    /// Initial state, and the state every outcome returns to
    AwaitingInput,
    DisplayingResult {
        prediction: TemperaturePrediction,
        metrics: Vec<Metric>,
        message: &'static str,
    },
    DisplayingError { message: String },
}

impl FlowState {
    fn from_outcome(outcome: crate::Result<TemperaturePrediction>) -> Self {
        match outcome {
            Ok(prediction) => FlowState::DisplayingResult {
                prediction,
                metrics: prediction.metrics().to_vec(),
                message: SUCCESS_MESSAGE,
            },
            Err(e) => FlowState::DisplayingError {
                message: format!("{FAILURE_PREFIX}{e}"),
            },
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, FlowState::DisplayingError { .. })
    }

    /// Plain text rendering: one labelled line per metric, or the error
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            FlowState::AwaitingInput => String::new(),
            FlowState::DisplayingResult { metrics, .. } => metrics
                .iter()
                .map(|m| format!("{}: {}", m.label, m.value))
                .collect::<Vec<_>>()
                .join("\n"),
            FlowState::DisplayingError { message } => message.clone(),
        }
    }
}

/// Long-lived prediction context built once at startup
pub struct PredictionService {
    model: Arc<dyn TemperatureModel>,
}

impl PredictionService {
    pub fn new(model: Arc<dyn TemperatureModel>) -> Self {
        Self { model }
    }

    /// Load the artifact at `path` and check it was trained on `pinned`.
    ///
    /// Any failure here is a startup failure; the caller must not accept
    /// input afterwards.
    pub fn load(path: impl AsRef<Path>, pinned: FeatureSchema) -> crate::Result<Self> {
        let path = path.as_ref();
        let model = ForestModel::load(path)?;
        if model.schema() != pinned {
            return Err(PredictorError::model_artifact(
                path,
                format!(
                    "artifact was trained on schema '{}' but '{pinned}' is configured",
                    model.schema()
                ),
            ));
        }
        info!(model = model.name(), schema = %pinned, "Prediction service ready");
        Ok(Self::new(Arc::new(model)))
    }

    #[must_use]
    pub fn schema(&self) -> FeatureSchema {
        self.model.schema()
    }

    #[must_use]
    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Assemble features and run the model for a single row
    pub fn predict(&self, input: &WeatherInput) -> crate::Result<TemperaturePrediction> {
        let schema = self.model.schema();
        let record = features::assemble(schema, input)?;
        debug!(city = %input.city, %schema, "Predicting");

        let predictions = self.model.predict(std::slice::from_ref(&record))?;
        match predictions.as_slice() {
            [prediction] => Ok(*prediction),
            other => Err(PredictorError::inference(format!(
                "expected one prediction, model returned {}",
                other.len()
            ))),
        }
    }

    /// Handle one user-triggered prediction
    pub fn submit(&self, input: &WeatherInput) -> FlowState {
        self.resolve(self.predict(input))
    }

    /// Turn any outcome, including input that never parsed, into a state
    pub fn resolve(&self, outcome: crate::Result<TemperaturePrediction>) -> FlowState {
        if let Err(e) = &outcome {
            warn!(error = %e, "Prediction failed");
        }
        FlowState::from_outcome(outcome)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::features::FeatureRecord;
    use crate::models::City;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Deterministic model returning the same triple for every row
    pub(crate) struct StubModel {
        pub schema: FeatureSchema,
        pub output: [f64; 3],
        pub calls: AtomicUsize,
        /// Rows seen by the most recent call
        pub last_rows: Mutex<Vec<FeatureRecord>>,
    }

    impl StubModel {
        pub(crate) fn new(schema: FeatureSchema, output: [f64; 3]) -> Self {
            Self {
                schema,
                output,
                calls: AtomicUsize::new(0),
                last_rows: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn last_row(&self) -> Option<FeatureRecord> {
            self.last_rows.lock().unwrap().first().cloned()
        }
    }

    impl TemperatureModel for StubModel {
        fn name(&self) -> &str {
            "stub"
        }

        fn schema(&self) -> FeatureSchema {
            self.schema
        }

        fn predict(&self, rows: &[FeatureRecord]) -> crate::Result<Vec<TemperaturePrediction>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_rows.lock().unwrap() = rows.to_vec();
            Ok(rows.iter().map(|_| TemperaturePrediction::from(self.output)).collect())
        }
    }

    pub(crate) struct FailingModel;

    impl TemperatureModel for FailingModel {
        fn name(&self) -> &str {
            "failing"
        }

        fn schema(&self) -> FeatureSchema {
            FeatureSchema::Basic
        }

        fn predict(&self, _rows: &[FeatureRecord]) -> crate::Result<Vec<TemperaturePrediction>> {
            Err(PredictorError::inference("model exploded"))
        }
    }

    struct EmptyModel;

    impl TemperatureModel for EmptyModel {
        fn name(&self) -> &str {
            "empty"
        }

        fn schema(&self) -> FeatureSchema {
            FeatureSchema::Basic
        }

        fn predict(&self, _rows: &[FeatureRecord]) -> crate::Result<Vec<TemperaturePrediction>> {
            Ok(Vec::new())
        }
    }

    pub(crate) fn lahore_input() -> WeatherInput {
        WeatherInput {
            city: City::Lahore,
            season: None,
            year: 2025,
            month: 6,
            day: 15,
            humidity: 50,
            dew_point: 10.0,
            pressure: 1010.0,
            cloud_cover: None,
            wind_speed: 10.0,
        }
    }

    #[test]
    fn test_stub_prediction_is_displayed() {
        let service = PredictionService::new(Arc::new(StubModel::new(
            FeatureSchema::Basic,
            [10.0, 20.0, 15.0],
        )));

        let state = service.submit(&lahore_input());
        let FlowState::DisplayingResult {
            metrics, message, ..
        } = &state
        else {
            panic!("expected a result, got {state:?}");
        };
        let shown: Vec<_> = metrics.iter().map(|m| (m.label, m.value.as_str())).collect();
        assert_eq!(
            shown,
            [("Tmin", "10.00 °C"), ("Tmax", "20.00 °C"), ("Tavg", "15.00 °C")]
        );
        assert_eq!(*message, SUCCESS_MESSAGE);
        assert_eq!(state.to_text(), "Tmin: 10.00 °C\nTmax: 20.00 °C\nTavg: 15.00 °C");
    }

    #[test]
    fn test_failing_model_shows_error() {
        let service = PredictionService::new(Arc::new(FailingModel));
        let state = service.submit(&lahore_input());
        assert!(state.is_error());
        let text = state.to_text();
        assert!(text.starts_with(FAILURE_PREFIX));
        assert!(text.contains("model exploded"));
    }

    #[test]
    fn test_invalid_input_shows_error_without_calling_model() {
        let stub = Arc::new(StubModel::new(FeatureSchema::Basic, [1.0, 2.0, 3.0]));
        let service = PredictionService::new(stub.clone());
        let mut input = lahore_input();
        input.humidity = 150;
        assert!(service.submit(&input).is_error());
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_wrong_row_count_is_an_error() {
        let service = PredictionService::new(Arc::new(EmptyModel));
        let err = service.predict(&lahore_input()).unwrap_err();
        assert!(err.to_string().contains("expected one prediction"));
    }

    #[test]
    fn test_repeated_requests_render_identically() {
        let service = PredictionService::new(Arc::new(StubModel::new(
            FeatureSchema::GeoSeason,
            [3.5, 12.25, 8.125],
        )));
        let mut input = lahore_input();
        input.cloud_cover = Some(20);
        let first = service.submit(&input);
        let second = service.submit(&input);
        assert_eq!(first, second);
        assert_eq!(first.to_text(), second.to_text());
    }

    #[test]
    fn test_load_missing_artifact_is_startup_failure() {
        let result = PredictionService::load("missing/model.json", FeatureSchema::GeoSeason);
        let err = result.err().unwrap();
        assert!(err.is_startup_failure());
    }

    #[test]
    fn test_load_rejects_unpinned_schema() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/models/temperature_predictor_v3.json");
        let err = PredictionService::load(path, FeatureSchema::Basic).err().unwrap();
        assert!(err.is_startup_failure());
        assert!(err.to_string().contains("trained on schema 'geo_season'"));

        let service = PredictionService::load(path, FeatureSchema::GeoSeason).unwrap();
        assert_eq!(service.schema(), FeatureSchema::GeoSeason);
        assert_eq!(service.model_name(), "temperature_predictor_v3");
    }
}
