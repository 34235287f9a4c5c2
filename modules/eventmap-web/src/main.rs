use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use tokio::sync::watch;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use eonet_client::{EonetClient, EventStatus, EventsQuery};
use eventmap_common::Config;
use eventmap_core::map::{build_features, feature_collection};
use eventmap_core::{EonetFeed, EventFeed, EventStore, MapOptions, UiEvent};

mod session;
mod templates;
use session::SessionRegistry;
use templates::*;

// --- App State ---

/// Where the one-shot startup fetch stands. Sessions wait on this.
#[derive(Debug, Clone)]
enum LoadState {
    Loading,
    Ready(Arc<EventStore>),
    Failed(String),
}

struct AppState {
    store: watch::Receiver<LoadState>,
    sessions: SessionRegistry,
    map_options: MapOptions,
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("eventmap=info".parse()?))
        .init();

    let config = Config::from_env()?;

    let query = EventsQuery {
        status: config.eonet_status.as_deref().and_then(EventStatus::parse),
        limit: config.eonet_limit,
        days: config.eonet_days,
    };
    let feed = EonetFeed::new(EonetClient::with_base_url(&config.eonet_api_url), query);

    let state = Arc::new(AppState {
        store: spawn_store_load(Arc::new(feed)),
        sessions: SessionRegistry::new(config.max_sessions),
        map_options: MapOptions::from_config(&config),
    });

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!("EONET viewer starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}

fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(viewer_page))
        .route("/api/events", get(api_events))
        .route("/api/sessions", post(open_session))
        .route("/api/sessions/{id}/events", post(session_event))
        .route("/api/sessions/{id}/close", post(close_session))
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}

/// Fetch once in the background; the receiver flips to Ready or Failed.
fn spawn_store_load(feed: Arc<dyn EventFeed>) -> watch::Receiver<LoadState> {
    let (tx, rx) = watch::channel(LoadState::Loading);
    tokio::spawn(async move {
        let next = match EventStore::load(feed.as_ref()).await {
            Ok(store) => LoadState::Ready(Arc::new(store)),
            Err(e) => {
                warn!(error = %e, "Failed to load events, viewer will stay empty");
                LoadState::Failed(e.to_string())
            }
        };
        tx.send_replace(next);
    });
    rx
}

async fn loaded_store(state: &AppState) -> Result<Arc<EventStore>, String> {
    let mut rx = state.store.clone();
    let current = rx
        .wait_for(|s| !matches!(s, LoadState::Loading))
        .await
        .map_err(|_| "event loader stopped".to_string())?;
    match &*current {
        LoadState::Ready(store) => Ok(Arc::clone(store)),
        LoadState::Failed(reason) => Err(reason.clone()),
        LoadState::Loading => Err("events still loading".to_string()),
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

// --- Handlers ---

async fn viewer_page() -> impl IntoResponse {
    Html(render_viewer())
}

async fn api_events(State(state): State<Arc<AppState>>) -> Response {
    match loaded_store(&state).await {
        Ok(store) => Json(feature_collection(&build_features(store.events()))).into_response(),
        Err(reason) => error_response(StatusCode::SERVICE_UNAVAILABLE, &reason),
    }
}

async fn open_session(State(state): State<Arc<AppState>>) -> Response {
    let store = match loaded_store(&state).await {
        Ok(store) => store,
        Err(reason) => {
            warn!(reason = %reason, "Refusing session, events unavailable");
            return error_response(StatusCode::SERVICE_UNAVAILABLE, &reason);
        }
    };

    let (id, batch) = state.sessions.open(store, state.map_options.clone()).await;
    Json(serde_json::json!({
        "session_id": id,
        "view": batch.view,
        "map": batch.map,
    }))
    .into_response()
}

async fn session_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(event): Json<UiEvent>,
) -> Response {
    match state.sessions.dispatch(id, event).await {
        Some(batch) => Json(batch).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "unknown session"),
    }
}

async fn close_session(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> StatusCode {
    state.sessions.close(id).await;
    StatusCode::NO_CONTENT
}
