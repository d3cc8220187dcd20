//! Test backend for exercising remote calls over real HTTP.
//!
//! Routes:
//! - `ANY /echo` and `ANY /echo/{*rest}` answer 200 with a JSON description
//!   of the request as received (method, path, raw query, headers, body);
//! - `ANY /status/{code}` answers with `code` and a short text body;
//! - `/notes` is a small JSON store: `GET` lists, `POST` creates (201), and
//!   `GET`/`DELETE /notes/{id}` fetch or remove one note (404 if absent).

use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Note {
    pub id: Uuid,
    pub text: String,
}

#[derive(Deserialize)]
pub struct NewNote {
    pub text: String,
}

/// What `/echo` saw. Header names are lower-case, in arrival order.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

pub type Notes = Arc<RwLock<HashMap<Uuid, Note>>>;

pub fn app() -> Router {
    let notes: Notes = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/echo", any(echo))
        .route("/echo/{*rest}", any(echo))
        .route("/status/{code}", any(status))
        .route("/notes", get(list_notes).post(create_note))
        .route("/notes/{id}", get(get_note).delete(delete_note))
        .with_state(notes)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    Json(Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn status(Path(code): Path<u16>) -> (StatusCode, String) {
    match StatusCode::from_u16(code) {
        Ok(status) => (status, format!("status {code}")),
        Err(_) => (StatusCode::BAD_REQUEST, format!("invalid status {code}")),
    }
}

async fn list_notes(State(notes): State<Notes>) -> Json<Vec<Note>> {
    let notes = notes.read().await;
    Json(notes.values().cloned().collect())
}

async fn create_note(State(notes): State<Notes>, Json(input): Json<NewNote>) -> (StatusCode, Json<Note>) {
    let note = Note {
        id: Uuid::new_v4(),
        text: input.text,
    };
    notes.write().await.insert(note.id, note.clone());
    tracing::debug!(id = %note.id, "note created");
    (StatusCode::CREATED, Json(note))
}

async fn get_note(State(notes): State<Notes>, Path(id): Path<Uuid>) -> Result<Json<Note>, StatusCode> {
    let notes = notes.read().await;
    notes.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn delete_note(State(notes): State<Notes>, Path(id): Path<Uuid>) -> StatusCode {
    match notes.write().await.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT,
        None => StatusCode::NOT_FOUND,
    }
}
