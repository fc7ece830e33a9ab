use std::sync::Arc;

use icon_forge::{api, config, GeminiClient};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    config::Config::dotenv_load();
    let config = config::Config::new().expect("Failed to load configuration");
    config::Config::print_env_vars();
    if config.gemini_api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY is not set; generation requests will fail");
    }

    let generator = GeminiClient::from_config(&config).expect("Invalid ICON_PROMPT_TEMPLATE");
    tracing::info!("Using model {}", generator.model());
    let state = Arc::new(api::AppState::new(generator));
    let app = api::router(state);

    let socket_address = config.socket_address();
    tracing::info!("listening on {}", socket_address);
    axum::Server::bind(&socket_address)
        .serve(app.into_make_service())
        .await
        .unwrap();
}
