//! HTTP surface for the todo service.
//!
//! # Overview
//! Translates HTTP requests into [`TodoStore`] calls and store results
//! back into JSON responses. Every request is resolved in one pass —
//! parse, validate, store call, encode — with no state carried between
//! requests beyond the shared store handle.
//!
//! # Design
//! - Handlers take the store as `Arc<dyn TodoStore>` state, so tests
//!   and `main` choose the backend.
//! - The id path segment is extracted as a raw string and parsed here,
//!   so a malformed id produces the service's own error body instead
//!   of the framework's.
//! - All failures become 400 with `{"error": <message>}`; see
//!   [`error::ApiError`].

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Request, State},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Json, Router,
};
use tokio::net::TcpListener;

pub mod error;
pub mod store;
pub mod types;

pub use error::ApiError;
pub use store::{MemoryStore, SqliteStore, StoreError, TodoStore};
pub use types::{CreateTodo, Todo, UpdateTodo};

/// Shared store handle injected into every handler.
pub type Store = Arc<dyn TodoStore>;

pub fn app(store: Store) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/{id}",
            get(get_todo)
                .put(update_todo)
                .patch(update_todo)
                .delete(delete_todo),
        )
        .layer(middleware::from_fn(log_request))
        .with_state(store)
}

pub async fn run(listener: TcpListener, store: Store) -> Result<(), std::io::Error> {
    axum::serve(listener, app(store)).await
}

async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let response = next.run(req).await;
    tracing::info!(%method, path, status = %response.status(), "request");
    response
}

fn parse_id(segment: &str) -> Result<i64, ApiError> {
    segment
        .parse()
        .map_err(|_| ApiError::InvalidId(segment.to_string()))
}

async fn welcome() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "welcome" }))
}

async fn list_todos(State(store): State<Store>) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = store.list().await?;
    Ok(Json(todos))
}

async fn create_todo(
    State(store): State<Store>,
    payload: Result<Json<CreateTodo>, JsonRejection>,
) -> Result<Json<Todo>, ApiError> {
    let Json(input) = payload.map_err(|e| ApiError::Decode(e.body_text()))?;
    let todo = store.create(input).await?;
    Ok(Json(todo))
}

async fn get_todo(
    State(store): State<Store>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, ApiError> {
    let id = parse_id(&id)?;
    let todo = store.get(id).await?;
    Ok(Json(todo))
}

async fn update_todo(
    State(store): State<Store>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTodo>, JsonRejection>,
) -> Result<Json<UpdateTodo>, ApiError> {
    let id = parse_id(&id)?;
    let Json(input) = payload.map_err(|e| ApiError::Decode(e.body_text()))?;
    store.update(id, input.clone()).await?;
    Ok(Json(input))
}

async fn delete_todo(
    State(store): State<Store>,
    Path(id): Path<String>,
) -> Result<Json<String>, ApiError> {
    let id = parse_id(&id)?;
    store.delete(id).await?;
    Ok(Json(format!("todo with id {id} deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_accepts_integers() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert_eq!(parse_id("0").unwrap(), 0);
    }

    #[test]
    fn parse_id_rejects_non_integers() {
        let err = parse_id("abc").unwrap_err();
        assert_eq!(err.to_string(), "Invalid id given: abc");

        assert!(parse_id("1.5").is_err());
        assert!(parse_id("").is_err());
    }
}
