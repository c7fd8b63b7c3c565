//! HTTP request dispatch.
//!
//! | Route | Response |
//! |-------|----------|
//! | `GET /` | index page |
//! | `GET /favicon.ico` | embedded icon, `image/x-icon` |
//! | `GET /page/{key}` | page HTML, or the "page not found" page |
//! | `GET /view/{key}` | raw file bytes with their guessed MIME type |
//! | anything else | 404 `Page not found` |
//!
//! Keys are taken from the rest of the path with every `/` and `.` removed,
//! so `/page/ab/cd` looks up `abcd`.
//!
//! Gallery work blocks (walk, SQLite, decoding) and runs on tokio's blocking
//! pool. Any error while handling a request, including a panic in that
//! work, is logged and answered with a plain 404; nothing about the failure
//! reaches the client.

use crate::gallery::{Gallery, GalleryError};
use crate::naming;
use axum::Router;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, Uri, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use std::sync::Arc;
use tokio::net::TcpListener;

const FAVICON: &[u8] = include_bytes!("../static/favicon.ico");

/// Build the router over a shared gallery.
pub fn router(gallery: Arc<Gallery>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/favicon.ico", get(favicon))
        .route("/page/", get(page_without_key))
        .route("/page/{*key}", get(page))
        .route("/view/{*key}", get(view))
        .fallback(fallback)
        .with_state(gallery)
}

/// Bind `listen_addr:port` and serve until the process exits.
pub async fn serve(gallery: Arc<Gallery>, listen_addr: &str, port: u16) -> std::io::Result<()> {
    let listener = TcpListener::bind((listen_addr, port)).await?;
    tracing::info!(addr = %listener.local_addr()?, "starting HTTP server");
    axum::serve(listener, router(gallery)).await
}

async fn index(State(gallery): State<Arc<Gallery>>) -> Response {
    match run_blocking(move || gallery.index_html()).await {
        Ok(html) => Html(html).into_response(),
        Err(response) => response,
    }
}

async fn favicon() -> Response {
    ([(header::CONTENT_TYPE, "image/x-icon")], FAVICON).into_response()
}

async fn page(State(gallery): State<Arc<Gallery>>, Path(raw): Path<String>) -> Response {
    render_page(gallery, naming::sanitize_key(&raw)).await
}

async fn page_without_key(State(gallery): State<Arc<Gallery>>) -> Response {
    render_page(gallery, String::new()).await
}

async fn render_page(gallery: Arc<Gallery>, key: String) -> Response {
    match run_blocking(move || gallery.page_html(&key)).await {
        Ok(html) => Html(html).into_response(),
        Err(response) => response,
    }
}

async fn view(State(gallery): State<Arc<Gallery>>, Path(raw): Path<String>) -> Response {
    let key = naming::sanitize_key(&raw);
    let lookup = key.clone();
    match run_blocking(move || gallery.view(&lookup)).await {
        Ok(Some(file)) => (
            [(header::CONTENT_TYPE, file.mime_type)],
            Body::from(file.data),
        )
            .into_response(),
        Ok(None) => {
            tracing::info!(key = %key, "no such item");
            not_found()
        }
        Err(response) => response,
    }
}

async fn fallback(uri: Uri) -> Response {
    tracing::info!(path = %uri, "not found");
    not_found()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Page not found").into_response()
}

/// Run gallery work on the blocking pool; any failure becomes a 404.
async fn run_blocking<T, F>(work: F) -> Result<T, Response>
where
    F: FnOnce() -> Result<T, GalleryError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => {
            tracing::error!(error = %err, "request failed");
            Err(not_found())
        }
        Err(err) => {
            tracing::error!(error = %err, "request handler panicked");
            Err(not_found())
        }
    }
}
