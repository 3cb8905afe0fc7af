//! JSON API mounted under `/api`

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::{
    features::WeatherInput,
    models::{City, Metric, Season, TemperaturePrediction},
    predictor::FlowState,
    web::AppState,
};

#[derive(Serialize, Deserialize)]
pub struct ApiCity {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
}

impl From<City> for ApiCity {
    fn from(city: City) -> Self {
        let meta = city.metadata();
        Self {
            name: city.name().to_string(),
            latitude: meta.latitude,
            longitude: meta.longitude,
            elevation: meta.elevation,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct ApiSchema {
    pub id: String,
    pub model: String,
    pub features: Vec<String>,
}

/// JSON prediction request; omitted fields take the form defaults
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictRequest {
    pub city: String,
    pub season: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub humidity: Option<u32>,
    pub dew_point: Option<f64>,
    pub pressure: Option<f64>,
    pub cloud_cover: Option<u32>,
    pub wspd: Option<f64>,
}

#[derive(Serialize)]
pub struct PredictResponse {
    pub prediction: TemperaturePrediction,
    pub display: Vec<Metric>,
    pub message: &'static str,
}

#[derive(Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

impl PredictRequest {
    fn into_input(self, defaults: WeatherInput) -> crate::Result<WeatherInput> {
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
            wind_speed: self.wspd.unwrap_or(defaults.wind_speed),
        })
    }
}

pub fn router() -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/cities", get(get_cities))
        .route("/schema", get(get_schema))
        .route("/predict", post(predict))
        .layer(cors)
}

async fn get_cities() -> Json<Vec<ApiCity>> {
    Json(City::ALL.into_iter().map(ApiCity::from).collect())
}

async fn get_schema(State(state): State<AppState>) -> Json<ApiSchema> {
    let schema = state.service.schema();
    Json(ApiSchema {
        id: schema.id().to_string(),
        model: state.service.model_name().to_string(),
        features: schema.features().iter().map(|f| f.to_string()).collect(),
    })
}

type ApiFailure = (StatusCode, Json<ApiError>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiFailure {
    (
        status,
        Json(ApiError {
            error: error.into(),
        }),
    )
}

async fn predict(
    State(state): State<AppState>,
    request: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiFailure> {
    let Json(request) = request.map_err(|rejection| {
        warn!(error = %rejection, "Rejected prediction request");
        api_error(rejection.status(), rejection.body_text())
    })?;
    let defaults = WeatherInput::defaults(state.service.schema());
    let flow = match request.into_input(defaults) {
        Ok(input) => state.service.submit(&input),
        Err(e) => state.service.resolve(Err(e)),
    };

    match flow {
        FlowState::DisplayingResult {
            prediction,
            metrics,
            message,
        } => Ok(Json(PredictResponse {
            prediction,
            display: metrics,
            message,
        })),
        FlowState::DisplayingError { message } => {
            Err(api_error(StatusCode::UNPROCESSABLE_ENTITY, message))
        }
        FlowState::AwaitingInput => Err(api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Prediction did not run",
        )),
    }
}
