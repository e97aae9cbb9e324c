// SPDX-License-Identifier: MIT

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use futures::stream::Stream;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::exoworks::config::AppConfig;
use crate::exoworks::mock::MockSolana;
use crate::exoworks::workflow::context::ExecutionContext;
use crate::exoworks::workflow::graph::{ExecutionEngine, Workflow};
use crate::exoworks::workflow::loader::WorkflowLoader;
use crate::exoworks::workflow::log::LogEntry;
use crate::exoworks::workflow::transactions::pending_transactions;
use crate::sdk::error::ExoError;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    engine: ExecutionEngine,
    workflows_dir: PathBuf,
}

impl AppState {
    pub fn new(engine: ExecutionEngine, workflows_dir: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            workflows_dir: workflows_dir.into(),
        }
    }

    /// State backed by the mock chain simulator
    pub fn from_config(config: &AppConfig) -> Self {
        let simulator = Arc::new(MockSolana::new(config.simulator));
        Self::new(
            ExecutionEngine::with_simulator(simulator),
            config.workflows_dir.clone(),
        )
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/workflows", get(list_workflows))
        .route("/api/workflows/{id}", get(get_workflow))
        .route("/api/executions", post(create_execution))
        .route("/api/executions/stream", post(stream_execution))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(config: &AppConfig) -> Result<(), ExoError> {
    let addr = SocketAddr::from(([127, 0, 0, 1], config.server_port));
    let listener = TcpListener::bind(addr).await?;
    serve_on(listener, AppState::from_config(config)).await
}

/// Serve on an already bound listener
pub async fn serve_on(listener: TcpListener, state: AppState) -> Result<(), ExoError> {
    log::info!("Listening on http://{}", listener.local_addr()?);
    log::info!("Serving workflows from {}", state.workflows_dir.display());
    axum::serve(listener, router(state)).await?;
    Ok(())
}

type ApiError = (StatusCode, Json<Value>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": message.into() })))
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_workflows(State(state): State<AppState>) -> Json<Value> {
    let mut workflows = Vec::new();
    if let Ok(mut entries) = fs::read_dir(&state.workflows_dir).await {
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if !WorkflowLoader::is_workflow_file(&path) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                let name = read_workflow(&path)
                    .await
                    .map(|wf| wf.name)
                    .unwrap_or_else(|_| stem.to_string());
                workflows.push(json!({
                    "id": stem,
                    "name": name,
                    "file": path.to_string_lossy()
                }));
            }
        }
    }
    workflows.sort_by(|a, b| a["id"].as_str().cmp(&b["id"].as_str()));
    Json(json!(workflows))
}

async fn get_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Workflow>, ApiError> {
    load_by_id(&state, &id).await.map(Json)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExecutionRequest {
    /// Inline workflow document; takes precedence over `workflow_id`
    workflow: Option<Workflow>,
    workflow_id: Option<String>,
    #[serde(default)]
    variables: HashMap<String, Value>,
}

async fn read_workflow(path: &std::path::Path) -> Result<Workflow, ExoError> {
    let content = fs::read_to_string(path).await?;
    WorkflowLoader::parse_document(path, &content)
}

async fn load_by_id(state: &AppState, id: &str) -> Result<Workflow, ApiError> {
    let path = WorkflowLoader::find_workflow(&state.workflows_dir, id)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Workflow not found"))?;
    read_workflow(&path).await.map_err(|e| {
        api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("Invalid workflow document: {}", e),
        )
    })
}

async fn prepare(
    state: &AppState,
    request: ExecutionRequest,
) -> Result<(Workflow, ExecutionContext), ApiError> {
    let workflow = match (request.workflow, request.workflow_id) {
        (Some(workflow), _) => workflow,
        (None, Some(id)) => load_by_id(state, &id).await?,
        (None, None) => {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                "Request needs either 'workflow' or 'workflowId'",
            ))
        }
    };

    let mut context = ExecutionContext::new(&workflow.id);
    context.variables = request.variables;
    Ok((workflow, context))
}

async fn create_execution(
    State(state): State<AppState>,
    Json(payload): Json<ExecutionRequest>,
) -> Result<Json<Value>, ApiError> {
    let (workflow, context) = prepare(&state, payload).await?;
    let execution_id = Uuid::new_v4().to_string();
    log::info!("Execution {} started for workflow '{}'", execution_id, workflow.id);

    let result = state.engine.run(&workflow, context).await;
    let transactions = pending_transactions(&result.logs);

    log::info!(
        "Execution {} finished: success={} entries={}",
        execution_id,
        result.success,
        result.logs.len()
    );

    Ok(Json(json!({
        "executionId": execution_id,
        "result": result,
        "transactions": transactions,
    })))
}

async fn stream_execution(
    State(state): State<AppState>,
    Json(payload): Json<ExecutionRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let (workflow, context) = prepare(&state, payload).await?;
    let execution_id = Uuid::new_v4().to_string();
    let (tx, rx) = mpsc::channel::<Event>(100);

    tokio::spawn(async move {
        log::info!(
            "Starting streaming execution {} for workflow '{}'",
            execution_id,
            workflow.id
        );

        let (log_tx, mut log_rx) = mpsc::channel::<LogEntry>(100);
        let forward_tx = tx.clone();
        let forward = tokio::spawn(async move {
            while let Some(entry) = log_rx.recv().await {
                if forward_tx.send(json_event("log", &entry)).await.is_err() {
                    log::warn!("Stream client went away, dropping remaining entries");
                    break;
                }
            }
        });

        let result = state.engine.run_stream(&workflow, context, log_tx).await;
        let _ = forward.await;

        let transactions = pending_transactions(&result.logs);
        let summary = json!({
            "executionId": execution_id,
            "result": result,
            "transactions": transactions,
        });
        let _ = tx.send(json_event("result", &summary)).await;
        log::info!("Streaming execution {} finished", execution_id);
    });

    let stream = ReceiverStream::new(rx).map(Ok::<Event, Infallible>);

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(std::time::Duration::from_secs(1))))
}

fn json_event<T: serde::Serialize>(name: &str, payload: &T) -> Event {
    Event::default()
        .event(name)
        .json_data(payload)
        .unwrap_or_else(|e| Event::default().event("error").data(e.to_string()))
}
