//! mapmark history server
//!
//! One linear snapshot log shared by every client, served over four fixed
//! endpoints under `/api`:
//! - `GET /api/map/snapshots` full history
//! - `POST /api/map/markers` add a marker to the latest set
//! - `DELETE /api/map/markers/{id}` remove a marker from the latest set
//! - `POST /api/map/snapshots/batch` append snapshots verbatim
//!
//! Every response carries `Connection: close`.

pub mod error;
pub mod routes;
pub mod state;

use std::future::Future;

use axum::http::{header, HeaderValue};
use axum::Router;
use libmapmark_core::protocol::API_PREFIX;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

pub use error::ServerError;
pub use state::AppState;

/// Build the application router over `state`
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest(API_PREFIX, routes::api_routes())
        .fallback(routes::not_found)
        .layer(SetResponseHeaderLayer::overriding(
            header::CONNECTION,
            HeaderValue::from_static("close"),
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
