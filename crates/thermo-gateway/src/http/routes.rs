//! Router assembly and shared handler state.

use crate::domain::error::ApiError;
use crate::notify::ChangeNotifier;
use crate::storage::TemperatureStore;
use crate::ws::handler::WsConnection;
use crate::ws::registry::SubscriberRegistry;
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use axum::routing::{get, patch};
use axum::Router;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TemperatureStore>,
    pub notifier: ChangeNotifier,
    pub registry: Arc<SubscriberRegistry>,
    /// Production mode hides error detail from response bodies
    pub production: bool,
}

impl AppState {
    pub fn new(store: Arc<dyn TemperatureStore>, production: bool) -> Self {
        let registry = Arc::new(SubscriberRegistry::new());
        let notifier = ChangeNotifier::new(Arc::clone(&store), Arc::clone(&registry));
        Self {
            store,
            notifier,
            registry,
            production,
        }
    }

    /// Render an error with detail exposure per configured mode.
    pub fn render_error(&self, error: ApiError) -> Response {
        error.into_response_with(!self.production)
    }
}

/// Build the full application router: REST under `/api/temperatures`,
/// health check, and the WebSocket upgrade endpoint.
pub fn router(state: AppState) -> Router {
    use crate::http::handlers;

    Router::new()
        .route(
            "/api/temperatures",
            get(handlers::list).post(handlers::create),
        )
        // Literal routes take precedence over `/:id`
        .route("/api/temperatures/average", get(handlers::average))
        .route("/api/temperatures/randomize", patch(handlers::randomize))
        .route(
            "/api/temperatures/:id",
            get(handlers::get_by_id)
                .put(handlers::update)
                .delete(handlers::delete),
        )
        .route("/api/health", get(handlers::health))
        .route("/ws", get(ws_upgrade))
        .with_state(state)
}

/// Upgrade handler for the live channel.
async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let registry = Arc::clone(&state.registry);
    let store = Arc::clone(&state.store);
    ws.on_upgrade(move |socket| async move {
        WsConnection::new(registry, store).handle(socket).await;
    })
}
