use crate::{errors::ResolveError, link::Provider, resolver::Resolver, resolver::SearchResult};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::signal;

#[derive(Clone)]
struct SharedState {
    resolver: Arc<Resolver>,
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            log::error!("failed to install Ctrl+C handler: {err}");
        }
    };

    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                log::error!("failed to install signal handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log::warn!("shutting down");
}

fn router(resolver: Arc<Resolver>) -> Router {
    let shared_state = Arc::new(SharedState { resolver });

    Router::new()
        .route("/api/search", post(search))
        .route("/api/search/:id", get(lookup))
        .route("/api/stats", get(stats))
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(
                    tower_http::trace::DefaultMakeSpan::new().level(tracing::Level::INFO),
                )
                .on_response(
                    tower_http::trace::DefaultOnResponse::new().level(tracing::Level::INFO),
                ),
        )
        .with_state(shared_state)
}

async fn start_app(resolver: Resolver, listen: &str) -> anyhow::Result<()> {
    let app = router(Arc::new(resolver));

    let listener = tokio::net::TcpListener::bind(listen).await?;
    log::info!("listening on {listen}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

pub fn start_daemon(resolver: Resolver, listen: &str) -> anyhow::Result<()> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(start_app(resolver, listen))
}

#[derive(Debug)]
struct HttpError(ResolveError);

impl HttpError {
    fn status(&self) -> StatusCode {
        match self.0 {
            ResolveError::InvalidLink(_) | ResolveError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ResolveError::UnsupportedSource(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ResolveError::MetadataFetch { .. } => StatusCode::BAD_GATEWAY,
            ResolveError::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();

        if status.is_server_error() {
            log::error!("{self:?}");
        } else {
            log::debug!("{self:?}");
        }

        (status, Json(json!({"error": self.0.to_string()}))).into_response()
    }
}

impl<E> From<E> for HttpError
where
    E: Into<ResolveError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    pub link: Option<String>,

    /// Id of an earlier result, used when no link is given
    pub id: Option<String>,

    /// Provider names to search, parsed like the CLI `--adapters` list.
    /// All of them when empty.
    #[serde(default)]
    pub adapters: Vec<String>,
}

impl SearchRequest {
    fn providers(&self) -> Result<Vec<Provider>, ResolveError> {
        self.adapters
            .iter()
            .map(|name| name.parse().map_err(ResolveError::InvalidRequest))
            .collect()
    }
}

async fn search(
    State(state): State<Arc<SharedState>>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResult>, HttpError> {
    let Json(payload) = payload.map_err(|err| ResolveError::InvalidRequest(err.body_text()))?;
    log::debug!("payload: {payload:?}");

    let providers = payload.providers()?;
    let resolver = state.resolver.clone();

    tokio::task::block_in_place(move || {
        let adapters = Some(providers.as_slice());

        let result = match (&payload.link, &payload.id) {
            (Some(link), _) => resolver.resolve(link, adapters)?,
            (None, Some(id)) => resolver.resolve_id(id, adapters)?,
            (None, None) => return Err(ResolveError::invalid_link("missing link or id").into()),
        };

        Ok(Json(result))
    })
}

async fn lookup(
    State(state): State<Arc<SharedState>>,
    Path(id): Path<String>,
) -> Result<Json<SearchResult>, HttpError> {
    let resolver = state.resolver.clone();

    tokio::task::block_in_place(move || Ok(Json(resolver.lookup(&id)?)))
}

#[derive(Serialize)]
struct StatsResponse {
    searches: u64,
}

async fn stats(State(state): State<Arc<SharedState>>) -> Json<StatsResponse> {
    Json(StatsResponse {
        searches: state.resolver.search_count(),
    })
}
