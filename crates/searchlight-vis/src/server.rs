//! Axum web server with WebSocket streaming of card updates.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

use searchlight_steps::{AlgorithmId, AlgorithmInfo};

use crate::board::Board;
use crate::driver::{CardSnapshot, Tick};
use crate::error::{Error, Result};
use crate::playback::PlaybackConfig;

/// Server settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisConfig {
    pub port: u16,
    pub playback: PlaybackConfig,
}

impl Default for VisConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            playback: PlaybackConfig::default(),
        }
    }
}

/// Shared application state.
pub struct AppState {
    board: Board,
}

/// Visualization server.
pub struct VisServer {
    config: VisConfig,
    state: Arc<AppState>,
}

impl VisServer {
    /// Create a server with one card per built-in algorithm.
    pub fn new(config: VisConfig) -> Self {
        Self {
            config,
            state: Arc::new(AppState {
                board: Board::builtin(config.playback),
            }),
        }
    }

    /// Get the shared card board.
    pub fn board(&self) -> &Board {
        &self.state.board
    }

    /// Build the router for the server.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(index_handler))
            .route("/api/catalog", get(catalog_handler))
            .route("/api/cards", get(cards_handler))
            .route("/api/cards/{id}", get(card_handler))
            .route("/api/cards/{id}/step", post(step_handler))
            .route("/api/cards/{id}/play", post(play_handler))
            .route("/api/cards/{id}/reset", post(reset_handler))
            .route("/api/cards/{id}/target", post(target_handler))
            .route("/api/cards/{id}/shuffle", post(shuffle_handler))
            .route("/api/filter", post(filter_handler))
            .route("/ws", get(ws_handler))
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Run the server on the configured port.
    pub async fn serve(self) -> Result<()> {
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Searchlight running on http://localhost:{}", self.config.port);
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::UnknownCard(_) => StatusCode::NOT_FOUND,
            e if e.is_user_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Serve the bundled frontend.
async fn index_handler() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

/// Catalog response.
#[derive(Serialize)]
struct CatalogResponse {
    algorithms: Vec<AlgorithmInfo>,
    tags: Vec<&'static str>,
    filter: String,
    visible: Vec<AlgorithmId>,
}

async fn catalog_handler(State(state): State<Arc<AppState>>) -> Json<CatalogResponse> {
    let board = &state.board;
    Json(CatalogResponse {
        algorithms: board.catalog().entries().to_vec(),
        tags: board.catalog().tags(),
        filter: board.filter().await,
        visible: board.visible().await,
    })
}

async fn cards_handler(State(state): State<Arc<AppState>>) -> Json<Vec<CardSnapshot>> {
    Json(state.board.snapshots().await)
}

async fn card_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<AlgorithmId>,
) -> Result<Json<CardSnapshot>> {
    Ok(Json(state.board.card(id)?.snapshot().await))
}

#[derive(Serialize)]
struct StepResponse {
    tick: Tick,
    card: CardSnapshot,
}

async fn step_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<AlgorithmId>,
) -> Result<Json<StepResponse>> {
    let driver = state.board.card(id)?;
    let tick = driver.advance().await?;
    Ok(Json(StepResponse {
        tick,
        card: driver.snapshot().await,
    }))
}

async fn play_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<AlgorithmId>,
) -> Result<Json<CardSnapshot>> {
    let driver = state.board.card(id)?;
    driver.toggle_play().await?;
    Ok(Json(driver.snapshot().await))
}

async fn reset_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<AlgorithmId>,
) -> Result<Json<CardSnapshot>> {
    Ok(Json(state.board.card(id)?.reset().await))
}

#[derive(Deserialize)]
struct TargetRequest {
    target: Option<String>,
    #[serde(default)]
    data: Option<Vec<i64>>,
}

async fn target_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<AlgorithmId>,
    Json(req): Json<TargetRequest>,
) -> Result<Json<CardSnapshot>> {
    Ok(Json(state.board.set_target(id, req.target, req.data).await?))
}

async fn shuffle_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<AlgorithmId>,
) -> Result<Json<CardSnapshot>> {
    let mut rng = StdRng::from_entropy();
    Ok(Json(state.board.shuffle(id, &mut rng).await?))
}

#[derive(Deserialize)]
struct FilterRequest {
    tag: String,
}

#[derive(Debug, Serialize)]
struct FilterResponse {
    filter: String,
    visible: Vec<AlgorithmId>,
}

async fn filter_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FilterRequest>,
) -> Json<FilterResponse> {
    Json(apply_filter(&state.board, &req.tag).await)
}

async fn apply_filter(board: &Board, tag: &str) -> FilterResponse {
    let filter = board.toggle_filter(tag).await;
    FilterResponse {
        filter,
        visible: board.visible().await,
    }
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsCommand {
    Step { id: AlgorithmId },
    Play { id: AlgorithmId },
    Reset { id: AlgorithmId },
    Filter { tag: String },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsEvent {
    Card(CardSnapshot),
    Filter(FilterResponse),
    Error { message: String },
}

async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket client connected");
    let mut updates = state.board.subscribe();

    if send_snapshots(&mut socket, &state.board).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = match serde_json::from_str::<WsCommand>(text.as_str()) {
                            Ok(cmd) => handle_ws_command(&state, cmd).await,
                            Err(e) => {
                                debug!("Ignoring malformed command: {}", e);
                                None
                            }
                        };
                        if let Some(event) = reply {
                            if send_event(&mut socket, &event).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("WebSocket client disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        warn!("WebSocket error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }
            update = updates.recv() => {
                let sent = match update {
                    Ok(snapshot) => send_event(&mut socket, &WsEvent::Card(snapshot)).await,
                    Err(RecvError::Lagged(missed)) => {
                        warn!("WebSocket client lagged by {} updates, resending cards", missed);
                        send_snapshots(&mut socket, &state.board).await
                    }
                    Err(RecvError::Closed) => break,
                };
                if sent.is_err() {
                    break;
                }
            }
        }
    }
}

/// Run a client command. Card changes reach the client through the update
/// channel, so only filter changes and failures produce a direct reply.
async fn handle_ws_command(state: &AppState, cmd: WsCommand) -> Option<WsEvent> {
    let board = &state.board;
    let result = match cmd {
        WsCommand::Step { id } => match board.card(id) {
            Ok(driver) => driver.advance().await.map(|_| ()),
            Err(e) => Err(e),
        },
        WsCommand::Play { id } => match board.card(id) {
            Ok(driver) => driver.toggle_play().await.map(|_| ()),
            Err(e) => Err(e),
        },
        WsCommand::Reset { id } => match board.card(id) {
            Ok(driver) => {
                driver.reset().await;
                Ok(())
            }
            Err(e) => Err(e),
        },
        WsCommand::Filter { tag } => return Some(WsEvent::Filter(apply_filter(board, &tag).await)),
    };
    result.err().map(|e| WsEvent::Error {
        message: e.to_string(),
    })
}

async fn send_snapshots(socket: &mut WebSocket, board: &Board) -> std::result::Result<(), axum::Error> {
    for snapshot in board.snapshots().await {
        send_event(socket, &WsEvent::Card(snapshot)).await?;
    }
    Ok(())
}

async fn send_event(socket: &mut WebSocket, event: &WsEvent) -> std::result::Result<(), axum::Error> {
    let json = serde_json::to_string(event).map_err(axum::Error::new)?;
    socket.send(Message::Text(json.into())).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::PlaybackState;

    fn state() -> Arc<AppState> {
        VisServer::new(VisConfig::default()).state
    }

    #[test]
    fn default_config() {
        let config = VisConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.playback, PlaybackConfig::default());
    }

    #[tokio::test]
    async fn router_builds() {
        let server = VisServer::new(VisConfig::default());
        let _router = server.router();
    }

    #[tokio::test]
    async fn catalog_lists_every_card() {
        let Json(catalog) = catalog_handler(State(state())).await;
        assert_eq!(catalog.algorithms.len(), 5);
        assert_eq!(catalog.tags[0], "all");
        assert_eq!(catalog.filter, "all");
        assert_eq!(catalog.visible.len(), 5);
    }

    #[tokio::test]
    async fn step_advances_card() {
        let state = state();
        let Json(resp) = step_handler(State(state.clone()), Path(AlgorithmId::Binary))
            .await
            .unwrap();
        assert!(matches!(resp.tick, Tick::Step { .. }));
        assert_eq!(resp.card.playback.unwrap().position, 1);

        let Json(card) = reset_handler(State(state), Path(AlgorithmId::Binary))
            .await
            .unwrap();
        assert_eq!(card.playback.unwrap().state, PlaybackState::Idle);
    }

    #[tokio::test]
    async fn invalid_target_is_bad_request() {
        let req = TargetRequest {
            target: Some("twelve".into()),
            data: None,
        };
        let err = target_handler(State(state()), Path(AlgorithmId::Jump), Json(req))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn play_toggles_auto_play() {
        let state = state();
        let Json(card) = play_handler(State(state.clone()), Path(AlgorithmId::Linear))
            .await
            .unwrap();
        assert!(card.playing);

        let Json(card) = play_handler(State(state), Path(AlgorithmId::Linear))
            .await
            .unwrap();
        assert!(!card.playing);
        assert_eq!(card.status.label, "Paused");
    }

    #[tokio::test]
    async fn ws_commands_drive_cards() {
        let state = state();
        let cmd: WsCommand = serde_json::from_str(r#"{"type": "step", "id": "dijkstra"}"#).unwrap();
        assert!(handle_ws_command(&state, cmd).await.is_none());
        let card = state.board.card(AlgorithmId::Dijkstra).unwrap().snapshot().await;
        assert_eq!(card.playback.unwrap().position, 1);

        let cmd: WsCommand = serde_json::from_str(r#"{"type": "filter", "tag": "graph"}"#).unwrap();
        let Some(WsEvent::Filter(resp)) = handle_ws_command(&state, cmd).await else {
            panic!("expected a filter reply");
        };
        assert_eq!(resp.filter, "graph");
        assert_eq!(resp.visible, vec![AlgorithmId::Dijkstra]);
    }

    #[test]
    fn ws_events_are_tagged() {
        let event = WsEvent::Error {
            message: "nope".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["message"], "nope");
    }
}
