//! Read-side HTTP API: block lookup by height and a WebSocket stream of
//! newly appended blocks. Also accepts ad-hoc transactions for sequencing.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures_util::{SinkExt, StreamExt};
use oracle_rollup_chain::Transaction;
use oracle_rollup_execution::{BlockIdentifier, ExecutionApi, ExecutionError, ExecutionService};
use oracle_rollup_sequencer::SequencerClient;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct QueryState {
    execution: Arc<ExecutionService>,
    sequencer: Option<Arc<SequencerClient>>,
    cancel: CancellationToken,
}

impl QueryState {
    pub fn new(execution: Arc<ExecutionService>, cancel: CancellationToken) -> Self {
        Self {
            execution,
            sequencer: None,
            cancel,
        }
    }

    pub fn with_sequencer(mut self, sequencer: Arc<SequencerClient>) -> Self {
        self.sequencer = Some(sequencer);
        self
    }
}

pub fn router(state: QueryState) -> Router {
    Router::new()
        .route("/block/:height", get(get_block))
        .route("/ws", get(handle_websocket))
        .route("/transaction", post(post_transaction))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Serves the query API until the state's cancellation token fires.
pub async fn serve(listener: TcpListener, state: QueryState) -> std::io::Result<()> {
    let cancel = state.cancel.clone();
    log::info!("query API listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await?;
    log::info!("query API stopped");
    Ok(())
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

async fn get_block(State(state): State<QueryState>, Path(height): Path<String>) -> Response {
    let height: u32 = match height.parse() {
        Ok(height) => height,
        Err(e) => {
            log::debug!("bad block height {:?}: {}", height, e);
            return error_response(StatusCode::BAD_REQUEST, format!("invalid height {height:?}"));
        }
    };

    match state
        .execution
        .get_block(BlockIdentifier::Number(height))
        .await
    {
        Ok(block) => Json(block).into_response(),
        Err(e @ ExecutionError::NotFound(_)) => error_response(StatusCode::NOT_FOUND, e.to_string()),
        Err(e) => {
            log::error!("error getting block {}: {}", height, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn post_transaction(
    State(state): State<QueryState>,
    Json(tx): Json<Transaction>,
) -> Response {
    let Some(sequencer) = state.sequencer.clone() else {
        return error_response(StatusCode::SERVICE_UNAVAILABLE, "sequencer submission disabled");
    };
    match sequencer.submit_transaction(&tx).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            log::error!("error submitting transaction: {}", e);
            error_response(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

async fn handle_websocket(ws: WebSocketUpgrade, State(state): State<QueryState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| stream_blocks(socket, state))
}

async fn stream_blocks(socket: WebSocket, state: QueryState) {
    let (mut sender, mut receiver) = socket.split();
    let mut blocks = state.execution.subscribe();

    loop {
        tokio::select! {
            _ = state.cancel.cancelled() => {
                let _ = sender.send(Message::Close(None)).await;
                break;
            }
            block = blocks.recv() => match block {
                Ok(block) => {
                    let text = match serde_json::to_string(&block) {
                        Ok(text) => text,
                        Err(e) => {
                            log::error!("failed to encode block {}: {}", block.height, e);
                            continue;
                        }
                    };
                    if sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("websocket subscriber lagged, skipped {} blocks", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            msg = receiver.next() => match msg {
                Some(Ok(Message::Ping(data))) => {
                    let _ = sender.send(Message::Pong(data)).await;
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    log::warn!("websocket error: {}", e);
                    break;
                }
                Some(Ok(_)) => {}
            },
        }
    }
}
