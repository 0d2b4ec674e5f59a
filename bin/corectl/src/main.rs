mod error;
mod repo;
mod routes;
mod settings;
mod state;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use logging::Verbosity;
use settings::Settings;
use state::AppState;

#[tokio::main]
async fn main() {
    logging::init(Verbosity::Normal).ok();

    let settings = Settings::from_env();
    let bind_addr = settings.bind_addr;
    let state = Arc::new(AppState::new(settings));

    let app = Router::new()
        .route("/gdaemon/setup/:token", post(routes::setup))
        .route("/gdaemon/create/:token", post(routes::create))
        .route(
            "/api/dedicated_servers/certificates.zip",
            get(routes::certificates_zip),
        )
        .route("/api/dedicated_servers/:id/logs.zip", get(routes::logs_zip))
        .with_state(state);

    tracing::info!(%bind_addr, "starting corectl");
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .expect("failed to bind CORECTL_BIND_ADDR");
    axum::serve(listener, app)
        .await
        .expect("corectl server terminated unexpectedly");
}
