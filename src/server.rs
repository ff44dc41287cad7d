//!
//! keepnotes HTTP server
//! ---------------------
//! This module defines the Axum-based HTTP JSON API for keepnotes.
//!
//! Responsibilities:
//! - Registration and login endpoints backed by the `security` and `store` modules.
//! - A stateless bearer-token auth gate in front of every note route.
//! - Owner-scoped note create/list/delete delegating to the store.
//!
//! Every request re-verifies identity from scratch; nothing about a caller
//! persists between requests.

use std::net::SocketAddr;
use std::path::Path as FsPath;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::identity::{Claims, TokenError, TokenService};
use crate::security;
use crate::store::Db;

/// Shared server state injected into all handlers.
///
/// The token service holds the process-wide signing secret, read once at
/// startup and immutable afterwards; the store is the only mutable shared
/// resource.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Db>,
    pub tokens: TokenService,
}

/// Mount all routes. Register and login are the only entry points that
/// bypass the auth gate.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "keepnotes ok" }))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/welcome", get(welcome))
        .route("/api/notes/add", post(add_note))
        .route("/api/notes", get(list_notes))
        .route("/api/notes/{id}", delete(delete_note))
        .with_state(state)
}

/// Start the keepnotes HTTP server bound to the given port.
pub async fn run_with_config(http_port: u16, db_path: &FsPath, secret: &[u8]) -> anyhow::Result<()> {
    let db = Db::open(db_path)
        .with_context(|| format!("While opening note database at {}", db_path.display()))?;
    let state = AppState {
        db: Arc::new(db),
        tokens: TokenService::new(secret),
    };
    let app = router(state);

    let addr: SocketAddr = format!("0.0.0.0:{}", http_port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// The auth gate. Extracts the bearer credential and verifies it before any
/// store is touched; on failure the request short-circuits via `?` with a
/// single client-visible 403 regardless of the internal kind. The returned
/// claims are the only source of caller identity for downstream queries.
fn authenticate(state: &AppState, headers: &HeaderMap) -> AppResult<Claims> {
    let header = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::MissingToken)?;
    let token = header.strip_prefix("Bearer ").ok_or(AppError::MissingToken)?;
    state.tokens.verify(token).map_err(|e| match e {
        TokenError::Invalid => AppError::InvalidToken,
        TokenError::Expired => AppError::ExpiredToken,
    })
}

#[derive(Debug, Deserialize)]
struct CredentialsPayload {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct NotePayload {
    title: String,
    content: String,
}

async fn register(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsPayload>,
) -> AppResult<impl IntoResponse> {
    let hash = security::hash_password(&payload.password).map_err(AppError::store)?;
    let user_id = state.db.register_user(&payload.username, &hash)?;
    info!(username = %payload.username, user_id = %user_id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully" })),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsPayload>,
) -> AppResult<impl IntoResponse> {
    // Unknown username and wrong password take the same exit.
    let user = state
        .db
        .find_user_by_username(&payload.username)?
        .ok_or(AppError::InvalidCredentials)?;
    if !security::verify_password(&user.password_hash, &payload.password) {
        return Err(AppError::InvalidCredentials);
    }
    let token = state.tokens.issue(&user.id, &user.username);
    info!(username = %user.username, "login ok");
    Ok(Json(json!({ "token": token, "username": user.username })))
}

async fn welcome(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let claims = authenticate(&state, &headers)?;
    Ok(Json(json!({ "message": format!("Welcome, {}!", claims.username) })))
}

async fn add_note(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<NotePayload>,
) -> AppResult<impl IntoResponse> {
    let claims = authenticate(&state, &headers)?;
    let note = state.db.create_note(&claims.id, &payload.title, &payload.content)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Note added successfully", "note": note })),
    ))
}

async fn list_notes(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let claims = authenticate(&state, &headers)?;
    let notes = state.db.list_notes_by_owner(&claims.id)?;
    Ok(Json(json!({ "notes": notes })))
}

async fn delete_note(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let claims = authenticate(&state, &headers)?;
    if state.db.delete_note_by_owner_and_id(&claims.id, &id)? {
        Ok(Json(json!({ "message": "Note deleted successfully" })))
    } else {
        Err(AppError::NotFoundOrNotOwned)
    }
}
