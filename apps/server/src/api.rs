//! HTTP and WebSocket boundary.
//!
//! REST endpoints for prices, alerts and refresh control, plus a WebSocket
//! stream of notifications.

use crate::state::SharedState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use cryptowatch_alerts::{AlertRequest, ValidationError};
use cryptowatch_core::{AlertRule, PriceRecord};
use cryptowatch_engine::{RefreshOutcome, StatsSummary};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info, warn};

/// Price record with display fields.
#[derive(Debug, Clone, Serialize)]
pub struct PriceView {
    #[serde(flatten)]
    pub record: PriceRecord,
    pub price_display: String,
    pub change_display: String,
    pub is_gain: bool,
}

impl From<PriceRecord> for PriceView {
    fn from(record: PriceRecord) -> Self {
        Self {
            price_display: record.price_display(),
            change_display: record.change_display(),
            is_gain: record.is_gain(),
            record,
        }
    }
}

/// Threshold as sent by clients: a JSON number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ThresholdInput {
    Number(f64),
    Text(String),
}

/// Body of `POST /alerts`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAlertBody {
    #[serde(default)]
    pub asset_id: String,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub threshold_price: Option<ThresholdInput>,
}

impl From<CreateAlertBody> for AlertRequest {
    fn from(body: CreateAlertBody) -> Self {
        let threshold = match body.threshold_price {
            Some(ThresholdInput::Number(n)) => n.to_string(),
            Some(ThresholdInput::Text(s)) => s,
            None => String::new(),
        };
        AlertRequest::from_text(body.asset_id, body.condition.unwrap_or_default(), threshold)
    }
}

#[derive(Debug, Serialize)]
pub struct ValidationBody {
    pub field: &'static str,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteBody {
    pub removed: bool,
}

#[derive(Debug, Serialize)]
pub struct RefreshBody {
    pub outcome: RefreshOutcome,
}

/// Handler error: validation failures map to 422.
#[derive(Debug)]
pub struct ApiError(ValidationError);

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ValidationBody {
            field: self.0.field(),
            error: self.0.to_string(),
        };
        (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
    }
}

/// Build the router.
pub fn create_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/prices", get(list_prices))
        .route("/alerts", get(list_alerts).post(create_alert))
        .route("/alerts/:id", get(get_alert).delete(delete_alert))
        .route("/refresh", get(refresh_status).post(trigger_refresh))
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(state)
}

/// Bind and serve in the background.
pub async fn start_server(
    state: SharedState,
    port: u16,
) -> Result<tokio::task::JoinHandle<()>, std::io::Error> {
    let app = create_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP server listening on http://{}", addr);

    Ok(tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("HTTP server error: {}", e);
        }
    }))
}

async fn health_handler() -> &'static str {
    "OK"
}

async fn list_prices(State(state): State<SharedState>) -> Json<Vec<PriceView>> {
    Json(
        state
            .monitor
            .prices()
            .into_iter()
            .map(PriceView::from)
            .collect(),
    )
}

async fn list_alerts(State(state): State<SharedState>) -> Json<Vec<AlertRule>> {
    Json(state.monitor.alerts())
}

async fn create_alert(
    State(state): State<SharedState>,
    Json(body): Json<CreateAlertBody>,
) -> Result<(StatusCode, Json<AlertRule>), ApiError> {
    let rule = state.monitor.create_alert(&body.into())?;
    Ok((StatusCode::CREATED, Json(rule)))
}

async fn get_alert(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<AlertRule>, StatusCode> {
    state.monitor.alert(&id).map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn delete_alert(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Json<DeleteBody> {
    Json(DeleteBody {
        removed: state.monitor.delete_alert(&id),
    })
}

async fn trigger_refresh(State(state): State<SharedState>) -> Json<RefreshBody> {
    Json(RefreshBody {
        outcome: state.monitor.refresh_now().await,
    })
}

async fn refresh_status(State(state): State<SharedState>) -> Json<StatsSummary> {
    Json(state.monitor.stats())
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<SharedState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Forward notifications to one client until it disconnects.
async fn handle_socket(socket: WebSocket, state: SharedState) {
    let (mut sender, mut receiver) = socket.split();
    let mut notifications = state.monitor.subscribe();

    debug!("WebSocket client connected");

    let send_task = tokio::spawn(async move {
        loop {
            match notifications.recv().await {
                Ok(notification) => {
                    let Ok(json) = serde_json::to_string(&notification) else {
                        continue;
                    };
                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    debug!(missed = missed, "WebSocket client lagging, skipping notifications");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Close(_)) => break,
            Err(e) => {
                warn!("WebSocket error: {}", e);
                break;
            }
            _ => {}
        }
    }

    send_task.abort();
    debug!("WebSocket client disconnected");
}
