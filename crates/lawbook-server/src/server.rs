/// HTTP surface for the law document.
///
/// Routes:
/// - `GET /`: load the document, render the page (optionally filtered by `q`)
/// - `GET /api/search?q=`: filter the current document, return the view as JSON
/// - `GET /api/document`: the current document as JSON
/// - `GET /healthz`: liveness and load state
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

use lawbook_core::{search, Containers, Document, Renderer, SearchView};

use crate::config::Config;
use crate::error::AppError;
use crate::loader::{LoadedDocument, Loader};
use crate::page::{render_page, PageBody};

pub type SharedState = Arc<AppState>;

/// The document currently being served. Each page load replaces it wholesale;
/// search requests read whatever was loaded last.
#[derive(Debug, Clone)]
pub enum LoadState {
    Pending,
    Ready(Arc<LoadedDocument>),
    Failed(String),
}

impl LoadState {
    fn label(&self) -> &'static str {
        match self {
            LoadState::Pending => "pending",
            LoadState::Ready(_) => "ready",
            LoadState::Failed(_) => "failed",
        }
    }

    fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed(message) => Some(message),
            LoadState::Pending | LoadState::Ready(_) => None,
        }
    }
}

pub struct AppState {
    config: Config,
    loader: Loader,
    renderer: Renderer,
    document: RwLock<LoadState>,
}

impl AppState {
    pub fn new(config: Config, loader: Loader) -> Self {
        Self {
            config,
            loader,
            renderer: Renderer,
            document: RwLock::new(LoadState::Pending),
        }
    }

    /// Fetch and parse the source again and make the result current. A failed
    /// load clears the previous document.
    pub async fn reload(&self) -> Result<Arc<LoadedDocument>, AppError> {
        match self.loader.load().await {
            Ok(loaded) => {
                let loaded = Arc::new(loaded);
                *self.document.write().await = LoadState::Ready(Arc::clone(&loaded));
                Ok(loaded)
            }
            Err(e) => {
                error!(error = %e, source = %self.loader.source(), "document load failed");
                *self.document.write().await = LoadState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    pub async fn current(&self) -> Option<Arc<LoadedDocument>> {
        match &*self.document.read().await {
            LoadState::Ready(loaded) => Some(Arc::clone(loaded)),
            LoadState::Pending | LoadState::Failed(_) => None,
        }
    }

    fn render(&self, document: &Document, keyword: &str) -> Result<Containers, AppError> {
        let view = search(document, keyword)?;
        let mut containers = Containers::default();
        self.renderer.render(document, &view, &mut containers);
        Ok(containers)
    }
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn unavailable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: message.into(),
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let status = match err {
            AppError::Core(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

#[derive(Serialize)]
struct SearchResponse<'a> {
    version: &'a str,
    view: SearchView,
}

#[derive(Serialize)]
struct DocumentResponse<'a> {
    version: &'a str,
    source: &'a str,
    document: &'a Document,
}

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/search", get(api_search))
        .route("/api/document", get(api_document))
        .route("/healthz", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn index(State(state): State<SharedState>, Query(params): Query<SearchParams>) -> Response {
    let title = state.config.page_title.as_str();
    let Ok(loaded) = state.reload().await else {
        let page = render_page(title, "", PageBody::LoadFailed);
        return (StatusCode::SERVICE_UNAVAILABLE, Html(page)).into_response();
    };

    match state.render(&loaded.document, &params.q) {
        Ok(containers) => Html(render_page(
            title,
            params.q.trim(),
            PageBody::Rendered {
                containers: &containers,
                version: &loaded.version,
            },
        ))
        .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

async fn api_search(
    State(state): State<SharedState>,
    Query(params): Query<SearchParams>,
) -> Result<Response, ApiError> {
    let loaded = state
        .current()
        .await
        .ok_or_else(|| ApiError::unavailable("document not loaded"))?;
    let view = search(&loaded.document, &params.q).map_err(AppError::from)?;
    debug!(
        keyword = %view.keyword,
        sections = view.visible_sections(),
        subsections = view.visible_subsections(),
        "search"
    );
    Ok(Json(SearchResponse {
        version: &loaded.version,
        view,
    })
    .into_response())
}

async fn api_document(State(state): State<SharedState>) -> Result<Response, ApiError> {
    let loaded = state
        .current()
        .await
        .ok_or_else(|| ApiError::unavailable("document not loaded"))?;
    Ok(Json(DocumentResponse {
        version: &loaded.version,
        source: &loaded.source,
        document: &loaded.document,
    })
    .into_response())
}

async fn health(State(state): State<SharedState>) -> impl IntoResponse {
    let load_state = state.document.read().await;
    Json(json!({
        "status": "ok",
        "service": "lawbook-server",
        "document": load_state.label(),
        "error": load_state.error(),
    }))
}
