//! Study Buddy Service: rule-based study assistant backend.
//!
//! Every interaction is stored as a document, in SQLite when
//! DATABASE_URL and DATABASE_NAME are set and in memory otherwise.
//! Default: http://0.0.0.0:8000/

mod config;
mod error;
mod routes;
mod store;
mod templates;

use config::Config;
use routes::AppState;
use std::sync::Arc;
use store::Persistence;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    let persistence = match Persistence::from_config(&config) {
        Ok(p) => p,
        Err(e) => {
            log::error!("Failed to open document store: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("Document store mode: {:?}", persistence.mode());

    let state = Arc::new(AppState {
        store: Arc::new(persistence),
        config: config.clone(),
    });

    let app = routes::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    log::info!("Study Buddy Service listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    axum::serve(listener, app).await.expect("Server error");
}
