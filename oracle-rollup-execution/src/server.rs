//! JSON-RPC server for the execution protocol

use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::error::ExecutionError;
use crate::methods::{dispatch_request, ExecutionApi};
use crate::types::*;

pub struct ExecutionRpcServer<H: ExecutionApi + 'static> {
    handler: Arc<H>,
    enable_cors: bool,
}

impl<H: ExecutionApi + 'static> ExecutionRpcServer<H> {
    pub fn new(handler: Arc<H>) -> Self {
        Self {
            handler,
            enable_cors: true,
        }
    }

    pub fn with_cors(mut self, enable_cors: bool) -> Self {
        self.enable_cors = enable_cors;
        self
    }

    pub fn router(&self) -> Router {
        let state = AppState {
            handler: self.handler.clone(),
        };

        let app = Router::new()
            .route("/", post(handle_rpc_post::<H>))
            .route("/health", get(handle_health::<H>))
            .with_state(state);

        if self.enable_cors {
            app.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
        } else {
            app
        }
    }

    /// Serves until `shutdown` resolves, then drains in-flight calls.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        log::info!("execution RPC listening on {}", listener.local_addr()?);
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;
        log::info!("execution RPC stopped");
        Ok(())
    }
}

struct AppState<H: ExecutionApi + 'static> {
    handler: Arc<H>,
}

impl<H: ExecutionApi + 'static> Clone for AppState<H> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
        }
    }
}

/// Takes the raw body so malformed JSON becomes a JSON-RPC parse error
/// instead of an HTTP rejection.
async fn handle_rpc_post<H: ExecutionApi + 'static>(
    State(state): State<AppState<H>>,
    body: String,
) -> Json<RpcResponse> {
    let value: serde_json::Value = match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(e) => {
            return Json(RpcResponse::error(
                RpcId::Null,
                ExecutionError::ParseError(e.to_string()).into(),
            ))
        }
    };

    let id = value
        .get("id")
        .cloned()
        .and_then(|id| serde_json::from_value::<RpcId>(id).ok())
        .unwrap_or(RpcId::Null);

    let request: RpcRequest = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(e) => {
            return Json(RpcResponse::error(
                id,
                ExecutionError::InvalidRequest(e.to_string()).into(),
            ))
        }
    };
    if request.jsonrpc != "2.0" {
        return Json(RpcResponse::error(
            request.id,
            ExecutionError::InvalidRequest(format!("unsupported jsonrpc version {}", request.jsonrpc))
                .into(),
        ));
    }

    Json(process_request(state.handler.as_ref(), request).await)
}

async fn handle_health<H: ExecutionApi + 'static>(
    State(state): State<AppState<H>>,
) -> impl IntoResponse {
    match state.handler.health().await {
        Ok(health) => (StatusCode::OK, Json(serde_json::json!(health))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "status": "error", "error": e.to_string() })),
        ),
    }
}

async fn process_request<H: ExecutionApi + ?Sized>(handler: &H, request: RpcRequest) -> RpcResponse {
    match dispatch_request(handler, &request).await {
        Ok(result) => RpcResponse::success(request.id, result),
        Err(err) => {
            log::debug!("{} failed: {}", request.method, err);
            RpcResponse::error(request.id, err.into())
        }
    }
}
