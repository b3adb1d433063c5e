use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use crate::api::{GeocodingProvider, WeatherProvider};
use crate::error::InsightsError;
use crate::geolocation::FixedGeolocator;
use crate::location_resolver::{LocationResolver, Resolution};
use crate::map::MapSession;
use crate::models::{Coordinates, ForecastChart, Insights};
use crate::pipeline::AcquisitionPipeline;
use crate::render::{InsightsView, SunView};
use crate::sun::SunSchedule;

pub struct AppState<G, W> {
    pub pipeline: Arc<AcquisitionPipeline<G, W>>,
    pub fallback: Coordinates,
    pub presets: Arc<Vec<String>>,
}

impl<G, W> Clone for AppState<G, W> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
            fallback: self.fallback,
            presets: Arc::clone(&self.presets),
        }
    }
}

/// JSON error body with a status derived from the error kind
struct ApiError(InsightsError);

impl From<InsightsError> for ApiError {
    fn from(error: InsightsError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            InsightsError::Validation { .. } => StatusCode::BAD_REQUEST,
            InsightsError::NotFound { .. } => StatusCode::NOT_FOUND,
            InsightsError::WeatherFetch { .. }
            | InsightsError::LocationFetch { .. }
            | InsightsError::Search { .. }
            | InsightsError::Data { .. } => StatusCode::BAD_GATEWAY,
            InsightsError::Geolocation { .. } => StatusCode::SERVICE_UNAVAILABLE,
            InsightsError::Config { .. } | InsightsError::Io { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        tracing::warn!("Request failed with {}: {}", status, self.0);
        (status, Json(json!({ "error": self.0.user_message() }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PositionParams {
    lat: Option<f64>,
    lon: Option<f64>,
}

fn insights_response(insights: &Insights, notice: Option<String>) -> Response {
    let chart = ForecastChart::from_weather(&insights.weather);
    let mut map = MapSession::new();
    map.place_marker(insights.coordinates, insights.location.name.clone());
    let sun = SunSchedule::for_weather(&insights.weather, insights.coordinates).map(|schedule| {
        SunView::new(schedule, &insights.weather.timezone, insights.weather.current.dt)
    });

    Json(InsightsView {
        location: &insights.location,
        weather: &insights.weather,
        chart: &chart,
        map: &map,
        sun,
        notice,
    })
    .into_response()
}

async fn search<G, W>(
    State(state): State<AppState<G, W>>,
    Query(params): Query<SearchParams>,
) -> Result<Response, ApiError>
where
    G: GeocodingProvider + Send + Sync + 'static,
    W: WeatherProvider + Send + Sync + 'static,
{
    let query = params.q.unwrap_or_default();
    let resolver = LocationResolver::new(state.pipeline.geocoder(), state.fallback);
    let resolution = resolver.resolve_search(&query).await?;
    let insights = state.pipeline.run(resolution).await?;
    Ok(insights_response(&insights, None))
}

/// Insights for `lat`/`lon`; without a position the server has no device to ask
/// and answers for the fallback coordinates with a notice
async fn position<G, W>(
    State(state): State<AppState<G, W>>,
    params: Result<Query<PositionParams>, QueryRejection>,
) -> Result<Response, ApiError>
where
    G: GeocodingProvider + Send + Sync + 'static,
    W: WeatherProvider + Send + Sync + 'static,
{
    let Query(params) =
        params.map_err(|rejection| InsightsError::validation(rejection.body_text()))?;

    let resolution = match (params.lat, params.lon) {
        (Some(lat), Some(lon)) => {
            let coordinates = Coordinates::new(lat, lon);
            if !coordinates.is_valid() {
                return Err(
                    InsightsError::validation(format!("invalid position {coordinates}")).into(),
                );
            }
            Resolution {
                coordinates,
                geocode: None,
                notice: None,
            }
        }
        (None, None) => {
            LocationResolver::new(state.pipeline.geocoder(), state.fallback)
                .resolve_device(&FixedGeolocator::unsupported())
                .await
        }
        _ => return Err(InsightsError::validation("both lat and lon are required").into()),
    };

    let notice = resolution.notice.as_ref().map(InsightsError::user_message);
    let insights = state.pipeline.run(resolution).await?;
    Ok(insights_response(&insights, notice))
}

async fn presets<G, W>(State(state): State<AppState<G, W>>) -> Json<Vec<String>>
where
    G: Send + Sync + 'static,
    W: Send + Sync + 'static,
{
    Json(state.presets.as_ref().clone())
}

pub fn router<G, W>(state: AppState<G, W>) -> Router
where
    G: GeocodingProvider + Send + Sync + 'static,
    W: WeatherProvider + Send + Sync + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/insights/search", get(search::<G, W>))
        .route("/insights/position", get(position::<G, W>))
        .route("/presets", get(presets::<G, W>))
        .with_state(state);

    Router::new().nest("/api", api).layer(cors)
}

pub async fn run<G, W>(state: AppState<G, W>, port: u16) -> Result<()>
where
    G: GeocodingProvider + Send + Sync + 'static,
    W: WeatherProvider + Send + Sync + 'static,
{
    let app = router(state);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://localhost:{}", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down web server");
        })
        .await
        .context("Web server failed")
}
