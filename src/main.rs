//! TecBunny Custom Setup - quote service for the CCTV setup configurator

use anyhow::Result;
use axum::{extract::State, http::StatusCode, response::{IntoResponse, Response}, routing::{get, post}, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tecbunny_setup::config::ServiceConfig;
use tecbunny_setup::domain::events::ConfiguratorEvent;
use tecbunny_setup::{CameraCount, Configurator, OptionView, PricingCatalog, Resolution, SelectionError, Selections, SystemKind, Totals};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Clone)] pub struct AppState { pub catalog: Arc<PricingCatalog> }

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();
    let config = ServiceConfig::from_env()?;
    let loader = config.clone();
    let catalog = tokio::task::spawn_blocking(move || loader.load_catalog()).await?;
    let state = AppState { catalog: Arc::new(catalog) };

    tracing::info!("🚀 TecBunny custom setup listening on 0.0.0.0:{}", config.port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?, app(state)).await?;
    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "tecbunny-setup"})) }))
        .route("/api/v1/custom-setup/catalog", get(get_catalog))
        .route("/api/v1/custom-setup/quote", post(create_quote))
        .layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()).with_state(state)
}

async fn get_catalog(State(s): State<AppState>) -> Response {
    Json(s.catalog.as_ref()).into_response()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    #[serde(default)] pub system: SystemKind,
    pub camera_count: Option<CameraCount>,
    pub recorder_id: Option<String>,
    pub power_id: Option<String>,
    pub cable_id: Option<String>,
    pub resolution: Option<Resolution>,
    pub dual_light: Option<bool>,
    pub hdd_id: Option<String>,
    pub monitor_included: Option<bool>,
    pub installation_included: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse<'a> {
    pub quote_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub system: SystemKind,
    pub camera_count: CameraCount,
    pub selections: &'a Selections,
    pub recorder_options: Vec<OptionView<'a>>,
    pub power_options: Vec<OptionView<'a>>,
    pub adjustments: Vec<ConfiguratorEvent>,
    pub totals: Totals,
}

fn apply_request(c: &mut Configurator, r: &QuoteRequest, catalog: &PricingCatalog) -> Result<(), SelectionError> {
    c.set_system(r.system);
    if let Some(count) = r.camera_count { c.set_camera_count(count.value() as i64, catalog); }
    if let Some(id) = &r.recorder_id { c.select_recorder(id, catalog)?; }
    if let Some(id) = &r.power_id { c.select_power(id, catalog)?; }
    if let Some(id) = &r.cable_id { c.select_cable(id, catalog)?; }
    if let Some(res) = r.resolution { c.select_resolution(res, catalog)?; }
    if let Some(dual) = r.dual_light { c.set_dual_light(dual); }
    if let Some(id) = &r.hdd_id { c.select_storage(id, catalog)?; }
    if let Some(monitor) = r.monitor_included { c.set_monitor_included(monitor); }
    if let Some(install) = r.installation_included { c.set_installation_included(install); }
    Ok(())
}

async fn create_quote(State(s): State<AppState>, Json(r): Json<QuoteRequest>) -> Result<Response, (StatusCode, String)> {
    let catalog = s.catalog.as_ref();
    let mut configurator = Configurator::new(catalog);
    apply_request(&mut configurator, &r, catalog).map_err(|e| {
        tracing::debug!(error = %e, "quote request rejected");
        (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
    })?;
    let adjustments = configurator
        .take_events()
        .into_iter()
        .filter(|e| matches!(e, ConfiguratorEvent::SelectionUpgraded { .. }))
        .collect();
    let response = QuoteResponse {
        quote_id: Uuid::now_v7(),
        generated_at: Utc::now(),
        system: configurator.system(),
        camera_count: configurator.camera_count(),
        selections: configurator.selections(),
        recorder_options: configurator.recorder_options(catalog),
        power_options: configurator.power_options(catalog),
        adjustments,
        totals: configurator.totals(catalog),
    };
    tracing::info!(quote_id = %response.quote_id, system = %response.system, cameras = response.camera_count.value(), sale = %response.totals.summary.sale, "quote computed");
    Ok(Json(response).into_response())
}
