// src/main.rs

use std::env;

use tokio::net::TcpListener;

use tanchoice_backend::{config::AppState, router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // `.expect()` is fine here: if configuration fails, the application
    // must not start.
    let app_state = AppState::new()
        .await
        .expect("Failed to initialize application state.");

    let app = router(app_state);

    let addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Failed to bind TCP listener");
    tracing::info!("🚀 Server listening on {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Axum server error");
}
