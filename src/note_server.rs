//! Note server implementation using Axum.
//!
//! This module provides the HTTP surface of the service, mounted under the
//! configured base path (default `/notes`):
//! - POST   /        - Create a note
//! - GET    /        - List the caller's notes
//! - PUT    /:id     - Replace a note
//! - PATCH  /:id     - Partially update a note
//! - DELETE /:id     - Delete a note
//!
//! plus an unauthenticated `GET /status` health check.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;

use crate::admin_registry::{AdminRegistry, JsonFileAdminRegistry};
use crate::auth::{auth_gate, Identity};
use crate::config::{AuthMode, Config};
use crate::error::{NoteError, NoteResult};
use crate::models::{Note, NoteInput, NotePatch};
use crate::note_store::{JsonFileNoteStore, NoteStore};
use crate::validation::validate_note_id;

/// Server shutdown handle
static SHUTDOWN_TX: OnceLock<Mutex<Option<oneshot::Sender<()>>>> = OnceLock::new();

/// Shared server state
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<Box<dyn NoteStore>>>,
    admins: Arc<dyn AdminRegistry>,
    auth_mode: AuthMode,
}

impl AppState {
    pub fn new(
        store: impl NoteStore + 'static,
        admins: impl AdminRegistry + 'static,
        auth_mode: AuthMode,
    ) -> Self {
        let store: Box<dyn NoteStore> = Box::new(store);
        Self {
            store: Arc::new(Mutex::new(store)),
            admins: Arc::new(admins),
            auth_mode,
        }
    }

    /// Build the file-backed state described by `config`
    pub fn from_config(config: &Config) -> NoteResult<Self> {
        let store = JsonFileNoteStore::open(config.notes_path())?;
        let admins = JsonFileAdminRegistry::new(config.admin_path());

        if config.auth_mode() == AuthMode::AdminList && !admins.path().exists() {
            tracing::warn!(
                "Auth mode is admin_list but {} does not exist; every request will fail",
                admins.path().display()
            );
        }

        Ok(Self::new(store, admins, config.auth_mode()))
    }

    /// Lock the store for a check-then-mutate sequence
    fn store(&self) -> NoteResult<MutexGuard<'_, Box<dyn NoteStore>>> {
        Ok(self.store.lock()?)
    }

    pub fn admins(&self) -> &dyn AdminRegistry {
        self.admins.as_ref()
    }

    pub fn auth_mode(&self) -> AuthMode {
        self.auth_mode
    }
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    status: String,
    notes: usize,
    server_timestamp: i64,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for NoteError {
    fn into_response(self) -> Response {
        if !self.is_client_error() {
            tracing::error!("Request failed: {}", self);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: self.to_string(),
                }),
            )
                .into_response();
        }

        let status = match self {
            NoteError::Unauthorized => StatusCode::UNAUTHORIZED,
            _ => StatusCode::NOT_FOUND,
        };
        (status, self.to_string()).into_response()
    }
}

// Route handlers

async fn create_note(
    State(state): State<AppState>,
    Json(input): Json<NoteInput>,
) -> Result<StatusCode, NoteError> {
    let note = state
        .store()?
        .add(&input.title, &input.content, &input.user)?;

    tracing::debug!("POST created note {} for user {}", note.id, note.user);
    Ok(StatusCode::NO_CONTENT)
}

async fn list_notes(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<Note>>, NoteError> {
    let notes: Vec<Note> = state
        .store()?
        .get_all()?
        .into_iter()
        .filter(|n| n.is_owned_by(identity.as_str()))
        .collect();

    tracing::debug!("GET returning {} notes for {}...", notes.len(), identity.short());
    Ok(Json(notes))
}

async fn replace_note(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(input): Json<NoteInput>,
) -> Result<StatusCode, NoteError> {
    let id = validate_note_id(&raw_id)?;

    let mut store = state.store()?;
    if store.get_by_id(id)?.is_none() {
        tracing::debug!("PUT {}: not found", id);
        return Err(NoteError::not_found(id));
    }
    store.replace(id, &input.title, &input.content, &input.user)?;

    tracing::debug!("PUT replaced note {}", id);
    Ok(StatusCode::NO_CONTENT)
}

async fn patch_note(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(patch): Json<NotePatch>,
) -> Result<StatusCode, NoteError> {
    let id = validate_note_id(&raw_id)?;

    let mut store = state.store()?;
    let existing = store.get_by_id(id)?.ok_or_else(|| {
        tracing::debug!("PATCH {}: not found", id);
        NoteError::not_found(id)
    })?;
    let updated = patch.apply_to(&existing);
    store.replace(id, &updated.title, &updated.content, &updated.user)?;

    tracing::debug!("PATCH updated note {}", id);
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_note(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, NoteError> {
    let id = validate_note_id(&raw_id)?;

    let mut store = state.store()?;
    if store.get_by_id(id)?.is_none() {
        tracing::debug!("DELETE {}: not found", id);
        return Err(NoteError::not_found(id));
    }
    store.delete_by_id(id)?;

    tracing::debug!("DELETE removed note {}", id);
    Ok(StatusCode::NO_CONTENT)
}

async fn status(State(state): State<AppState>) -> Result<Json<StatusResponse>, NoteError> {
    let notes = state.store()?.get_all()?.len();

    Ok(Json(StatusResponse {
        status: "ok".to_string(),
        notes,
        server_timestamp: Utc::now().timestamp(),
    }))
}

/// Create the note server router
///
/// `base_path` is where the note routes are mounted; `/` mounts them at the root.
pub fn create_router(state: AppState, base_path: &str) -> Router {
    let notes = Router::new()
        .route("/", get(list_notes).post(create_note))
        .route(
            "/:id",
            axum::routing::put(replace_note)
                .patch(patch_note)
                .delete(delete_note),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_gate));

    let router = Router::new().route("/status", get(status));
    let router = match base_path.trim_matches('/') {
        "" => router.merge(notes),
        trimmed => router.nest(&format!("/{}", trimmed), notes),
    };

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Start the note server
///
/// Runs until [`stop_server`] is called.
pub async fn start_server(config: &Config) -> NoteResult<()> {
    let state = AppState::from_config(config)?;
    let router = create_router(state, &config.base_path());
    let addr: SocketAddr = config.socket_addr()?;

    // Create shutdown channel
    let (tx, rx) = oneshot::channel::<()>();
    *SHUTDOWN_TX.get_or_init(|| Mutex::new(None)).lock()? = Some(tx);

    tracing::info!(
        "Starting note server on {} (notes at {}, auth mode {})",
        addr,
        config.base_path(),
        config.auth_mode().as_str()
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| NoteError::Network(e.to_string()))?;

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            rx.await.ok();
        })
        .await
        .map_err(|e| NoteError::Network(e.to_string()))?;

    tracing::info!("Note server stopped");
    Ok(())
}

/// Stop the note server
pub fn stop_server() {
    if let Some(mutex) = SHUTDOWN_TX.get() {
        if let Ok(mut guard) = mutex.lock() {
            if let Some(tx) = guard.take() {
                let _ = tx.send(());
            }
        }
    }
}
