//! HTTP service.
//!
//! | Route | Body | Success |
//! |---|---|---|
//! | `POST /upload` | multipart, file field `image` | `{"fileUrl": …}` |
//! | `POST /process` | JSON `{filePath, brightness?, contrast?, saturation?, rotation?}` | `{"processedFileUrl": …}` |
//! | `GET /uploads/<name>` | | stored preview bytes |
//! | `GET /health` | | 200 |
//!
//! Errors are `{"message": …}` with 400 for caller mistakes and 500 for
//! processing failures. Pipeline calls are CPU-bound and run on Tokio's
//! blocking pool so the async workers stay free.

use crate::config::AppConfig;
use crate::imaging::AdjustmentParameters;
use crate::output;
use crate::pipeline::{Pipeline, PipelineError};
use crate::storage::PUBLIC_MOUNT;
use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, State, multipart::MultipartRejection,
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

/// Name of the multipart field carrying the upload.
pub const UPLOAD_FIELD: &str = "image";

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub pipeline: Arc<Pipeline>,
}

impl AppContext {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Body of `POST /process`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessRequest {
    #[serde(rename = "filePath", default)]
    pub file_path: Option<String>,
    #[serde(flatten)]
    pub adjustments: AdjustmentParameters,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub file_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResponse {
    pub processed_file_url: String,
}

/// Handler error rendered as `{"message": …}`.
#[derive(Debug)]
pub enum ApiError {
    Pipeline(PipelineError),
    /// Request rejected by an extractor before reaching the pipeline.
    Rejected { status: StatusCode, message: String },
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        Self::Pipeline(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Pipeline(e) => {
                let status = StatusCode::from_u16(e.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                let message = match e {
                    PipelineError::MissingInput => "No file uploaded".to_string(),
                    PipelineError::SourceNotFound(_) => "Source image not found".to_string(),
                    PipelineError::InvalidParameter(e) => e.to_string(),
                    PipelineError::Processing(_) => "Error processing image".to_string(),
                };
                (status, message)
            }
            Self::Rejected { status, message } => (status, message),
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let store_root = ctx.pipeline.store().root().to_path_buf();

    Router::new()
        .route("/health", get(health_check))
        .route("/upload", post(upload))
        .route("/process", post(process))
        .nest_service(PUBLIC_MOUNT, ServeDir::new(store_root))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

async fn upload(
    State(ctx): State<AppContext>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = match multipart {
        Ok(m) => m,
        Err(e) => {
            tracing::debug!(rejection = %e, "upload without multipart body");
            return Err(PipelineError::MissingInput.into());
        }
    };

    let mut image = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| ApiError::Rejected {
        status: e.status(),
        message: e.body_text(),
    })? {
        if field.name() == Some(UPLOAD_FIELD) {
            let bytes = field.bytes().await.map_err(|e| ApiError::Rejected {
                status: e.status(),
                message: e.body_text(),
            })?;
            image = Some(bytes);
            break;
        }
    }

    let pipeline = Arc::clone(&ctx.pipeline);
    let stored = run_blocking(move || pipeline.ingest(image.as_deref())).await?;
    Ok(Json(UploadResponse {
        file_url: stored.url,
    }))
}

async fn process(
    State(ctx): State<AppContext>,
    request: Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<Json<ProcessResponse>, ApiError> {
    let Json(request) = request.map_err(|e| ApiError::Rejected {
        status: StatusCode::BAD_REQUEST,
        message: e.body_text(),
    })?;
    let ProcessRequest {
        file_path,
        adjustments: params,
    } = request;
    let Some(locator) = file_path else {
        return Err(PipelineError::SourceNotFound(String::new()).into());
    };

    let pipeline = Arc::clone(&ctx.pipeline);
    let stored = run_blocking(move || pipeline.adjust(&locator, &params)).await?;
    Ok(Json(ProcessResponse {
        processed_file_url: stored.url,
    }))
}

async fn run_blocking<T, F>(job: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, PipelineError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(job).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(e) => {
            tracing::error!(error = %e, "pipeline task failed");
            Err(PipelineError::Processing(e.to_string()).into())
        }
    }
}

/// Start the HTTP server and run until Ctrl+C or SIGTERM.
pub async fn serve(config: &AppConfig, pipeline: Pipeline) -> Result<(), ServerError> {
    let addr = config.server.bind_addr();
    let ctx = AppContext::new(pipeline);
    let store_root = ctx.pipeline.store().root().to_path_buf();
    let app = create_router(ctx, config.server.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

    tracing::info!("Starting server on {}", addr);
    output::print_serve_banner(&addr, &store_root, &config.server.public_base_url);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
