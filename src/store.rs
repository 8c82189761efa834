//! Persistence for todo records.
//!
//! # Design
//! `TodoStore` is the seam between the HTTP layer and the database:
//! handlers hold an `Arc<dyn TodoStore>` so backends can be swapped
//! without touching routing. `SqliteStore` is the durable backend;
//! `MemoryStore` keeps everything in a `HashMap` for tests and local
//! experiments. Both assign ids themselves and never reuse one.
//!
//! Every operation maps to a single SQL statement. Update and delete
//! inspect the affected-row count and report `NotFound` when it is
//! zero, so a request against a missing id never succeeds silently.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

use crate::types::{CreateTodo, Todo, UpdateTodo};

/// Errors produced by a [`TodoStore`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No row exists for the given identifier.
    #[error("todo with id {id} not found")]
    NotFound { id: i64 },

    /// The underlying persistence layer failed.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

/// CRUD access to todo records.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Persist a new todo. The store assigns the id and the
    /// `created_at` timestamp.
    async fn create(&self, input: CreateTodo) -> Result<Todo, StoreError>;

    /// All todos, in no particular order.
    async fn list(&self) -> Result<Vec<Todo>, StoreError>;

    /// The todo with the given id, or `NotFound`.
    async fn get(&self, id: i64) -> Result<Todo, StoreError>;

    /// Apply the fields present in `input`, leaving the rest unchanged.
    /// Returns `NotFound` when no row has the given id.
    async fn update(&self, id: i64, input: UpdateTodo) -> Result<(), StoreError>;

    /// Remove the todo with the given id, or `NotFound`.
    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}

/// SQLite-backed store.
///
/// The connection sits behind a mutex so the store can be shared across
/// concurrently handled requests; statements are short enough that the
/// lock is never held across an await point.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS todos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    completed INTEGER NOT NULL,
    created_at TEXT NOT NULL
)";

impl SqliteStore {
    /// Open (or create) the database at `path` and ensure the schema
    /// exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::from_connection(Connection::open(path)?)
    }

    /// In-memory database, private to this store instance.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(SCHEMA, [])?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

fn row_to_todo(row: &Row<'_>) -> rusqlite::Result<Todo> {
    let created_at: String = row.get(4)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;
    Ok(Todo {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        completed: row.get(3)?,
        created_at,
    })
}

#[async_trait]
impl TodoStore for SqliteStore {
    async fn create(&self, input: CreateTodo) -> Result<Todo, StoreError> {
        let created_at = Utc::now();
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO todos (name, description, completed, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                input.name,
                input.description,
                input.completed,
                created_at.to_rfc3339()
            ],
        )?;
        Ok(Todo {
            id: conn.last_insert_rowid(),
            name: input.name,
            description: input.description,
            completed: input.completed,
            created_at,
        })
    }

    async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt =
            conn.prepare("SELECT id, name, description, completed, created_at FROM todos")?;
        let todos = stmt
            .query_map([], row_to_todo)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(todos)
    }

    async fn get(&self, id: i64) -> Result<Todo, StoreError> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT id, name, description, completed, created_at FROM todos WHERE id = ?1",
            params![id],
            row_to_todo,
        )
        .optional()?
        .ok_or(StoreError::NotFound { id })
    }

    async fn update(&self, id: i64, input: UpdateTodo) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        let mut affected = None;
        if let Some(name) = &input.name {
            affected = Some(conn.execute(
                "UPDATE todos SET name = ?1 WHERE id = ?2",
                params![name, id],
            )?);
        }
        if let Some(description) = &input.description {
            affected = Some(conn.execute(
                "UPDATE todos SET description = ?1 WHERE id = ?2",
                params![description, id],
            )?);
        }
        if let Some(completed) = input.completed {
            affected = Some(conn.execute(
                "UPDATE todos SET completed = ?1 WHERE id = ?2",
                params![completed, id],
            )?);
        }
        match affected {
            Some(0) => Err(StoreError::NotFound { id }),
            Some(_) => Ok(()),
            // Nothing to apply; still report a missing row.
            None => {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM todos WHERE id = ?1)",
                    params![id],
                    |row| row.get(0),
                )?;
                if exists {
                    Ok(())
                } else {
                    Err(StoreError::NotFound { id })
                }
            }
        }
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        let affected = conn.execute("DELETE FROM todos WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(StoreError::NotFound { id });
        }
        Ok(())
    }
}

/// In-memory store for tests and local experiments.
#[derive(Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryInner>>,
}

#[derive(Default)]
struct MemoryInner {
    todos: HashMap<i64, Todo>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn create(&self, input: CreateTodo) -> Result<Todo, StoreError> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let todo = Todo {
            id: inner.next_id,
            name: input.name,
            description: input.description,
            completed: input.completed,
            created_at: Utc::now(),
        };
        inner.todos.insert(todo.id, todo.clone());
        Ok(todo)
    }

    async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.todos.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> Result<Todo, StoreError> {
        let inner = self.inner.read().await;
        inner
            .todos
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound { id })
    }

    async fn update(&self, id: i64, input: UpdateTodo) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let todo = inner
            .todos
            .get_mut(&id)
            .ok_or(StoreError::NotFound { id })?;
        if let Some(name) = input.name {
            todo.name = name;
        }
        if let Some(description) = input.description {
            todo.description = description;
        }
        if let Some(completed) = input.completed {
            todo.completed = completed;
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner
            .todos
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound { id })
    }
}
