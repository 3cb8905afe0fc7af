//! Interactive form served over HTTP

use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use axum::{
    Form, Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use minijinja::{Environment, context};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::api;
use crate::config::ServerConfig;
use crate::features::WeatherInput;
use crate::models::{City, Season};
use crate::predictor::{FlowState, PredictionService};
use crate::PredictorError;

const INDEX_TEMPLATE: &str = "index.html";

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PredictionService>,
    templates: Arc<Environment<'static>>,
}

impl AppState {
    pub fn new(service: Arc<PredictionService>) -> Result<Self> {
        let mut templates = Environment::new();
        templates
            .add_template(INDEX_TEMPLATE, include_str!("../templates/index.html"))
            .context("Failed to compile page template")?;
        Ok(Self {
            service,
            templates: Arc::new(templates),
        })
    }
}

/// Raw form fields exactly as the browser posts them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSubmission {
    pub city: String,
    pub season: String,
    pub year: String,
    pub month: String,
    pub day: String,
    pub humidity: String,
    pub dew_point: String,
    pub pressure: String,
    pub cloud_cover: String,
    pub wspd: String,
}

impl From<&WeatherInput> for FormSubmission {
    fn from(input: &WeatherInput) -> Self {
        Self {
            city: input.city.to_string(),
            season: input.season.map(|s| s.to_string()).unwrap_or_default(),
            year: input.year.to_string(),
            month: input.month.to_string(),
            day: input.day.to_string(),
            humidity: input.humidity.to_string(),
            dew_point: input.dew_point.to_string(),
            pressure: input.pressure.to_string(),
            cloud_cover: input.cloud_cover.map(|c| c.to_string()).unwrap_or_default(),
            wspd: input.wind_speed.to_string(),
        }
    }
}

impl FormSubmission {
    /// Parse every field; blank season and cloud cover mean "not given"
    pub fn parse(&self) -> crate::Result<WeatherInput> {
        Ok(WeatherInput {
            city: self.city.parse::<City>()?,
            season: optional(&self.season)
                .map(str::parse::<Season>)
                .transpose()?,
            year: parse_field("year", &self.year)?,
            month: parse_field("month", &self.month)?,
            day: parse_field("day", &self.day)?,
            humidity: parse_field("humidity", &self.humidity)?,
            dew_point: parse_field("dew_point", &self.dew_point)?,
            pressure: parse_field("pressure", &self.pressure)?,
            cloud_cover: optional(&self.cloud_cover)
                .map(|raw| parse_field("cloud_cover", raw))
                .transpose()?,
            wind_speed: parse_field("wspd", &self.wspd)?,
        })
    }
}

fn optional(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn parse_field<T: FromStr>(name: &str, raw: &str) -> crate::Result<T> {
    raw.trim().parse::<T>().map_err(|_| {
        PredictorError::validation(format!("{name} must be a number, got '{}'", raw.trim()))
    })
}

pub fn router(state: AppState, body_limit_kb: u32) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(submit))
        .route("/health", get(health))
        .nest("/api", api::router())
        .layer(RequestBodyLimitLayer::new(body_limit_kb as usize * 1024))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index(State(state): State<AppState>) -> Response {
    let defaults = WeatherInput::defaults(state.service.schema());
    render_page(&state, &FormSubmission::from(&defaults), &FlowState::AwaitingInput)
}

async fn submit(State(state): State<AppState>, Form(form): Form<FormSubmission>) -> Response {
    let flow = match form.parse() {
        Ok(input) => state.service.submit(&input),
        Err(e) => state.service.resolve(Err(e)),
    };
    render_page(&state, &form, &flow)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "model": state.service.model_name(),
        "schema": state.service.schema().id(),
    }))
}

fn render_page(state: &AppState, form: &FormSubmission, flow: &FlowState) -> Response {
    let schema = state.service.schema();
    let page = state
        .templates
        .get_template(INDEX_TEMPLATE)
        .and_then(|template| {
            template.render(context! {
                form => form,
                flow => flow,
                cities => City::ALL.map(City::name),
                seasons => Season::ALL.map(Season::name),
                uses_season => schema.uses_season(),
                uses_cloud_cover => schema.uses_cloud_cover(),
                model => state.service.model_name(),
                schema => schema.id(),
            })
        });

    match page {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render page");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
        }
    }
}

/// Bind and serve until Ctrl-C
pub async fn run(state: AppState, server: &ServerConfig) -> Result<()> {
    let app = router(state, server.body_limit_kb);
    let addr = tokio::net::lookup_host((server.host.as_str(), server.port))
        .await
        .with_context(|| format!("Failed to resolve {}:{}", server.host, server.port))?
        .next()
        .ok_or_else(|| anyhow!("No address for {}:{}", server.host, server.port))?;

    match (&server.tls_cert, &server.tls_key) {
        (Some(cert), Some(key)) => serve_tls(app, addr, cert, key).await,
        _ => {
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("Failed to bind {addr}"))?;
            info!("Web server running at http://{}", addr);
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
                .context("Web server failed")
        }
    }
}

#[cfg(feature = "tls")]
async fn serve_tls(app: Router, addr: SocketAddr, cert: &Path, key: &Path) -> Result<()> {
    let tls = axum_server::tls_rustls::RustlsConfig::from_pem_file(cert, key)
        .await
        .with_context(|| format!("Failed to load TLS certificate {}", cert.display()))?;
    info!("Web server running at https://{}", addr);
    axum_server::bind_rustls(addr, tls)
        .serve(app.into_make_service())
        .await
        .context("Web server failed")
}

#[cfg(not(feature = "tls"))]
async fn serve_tls(_app: Router, _addr: SocketAddr, _cert: &Path, _key: &Path) -> Result<()> {
    Err(PredictorError::config("TLS is configured but this build lacks the `tls` feature").into())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
