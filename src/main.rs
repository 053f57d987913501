mod config;
mod core;
mod models;
mod routes;
mod services;

use crate::config::Settings;
use crate::core::{ProfileExtractor, ScoringEngine, TeamAssembly};
use crate::routes::AppState;
use crate::services::{GithubClient, LlmClient, StoreClient, StoreCollections};
use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use std::sync::Arc;
use tracing::{error, info};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .content_type("application/json")
            .body(serde_json::to_string(self).unwrap())
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(
    err: error::JsonPayloadError,
    req: &actix_web::HttpRequest,
) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting HackMate matching service...");

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!("Configuration loaded successfully");

    // Initialize the document store client
    let collections = StoreCollections {
        users: settings.collection.users,
        hackathons: settings.collection.hackathons,
        teams: settings.collection.teams,
        requests: settings.collection.requests,
        messages: settings.collection.messages,
    };

    let store = Arc::new(StoreClient::new(
        settings.store.endpoint,
        settings.store.api_key,
        settings.store.project_id,
        settings.store.database_id,
        collections,
    ));

    info!("Document store client initialized");

    // Initialize the reasoning gateway; model resolution happens lazily on
    // the first scoring or extraction call
    let llm = Arc::new(LlmClient::new(
        settings.llm.endpoint,
        settings.llm.api_key,
        settings.llm.timeout_secs,
    ));

    info!(
        "Reasoning gateway initialized (timeout: {}s)",
        settings.llm.timeout_secs
    );

    let github = Arc::new(GithubClient::new(settings.github.endpoint));

    // Build application state
    let app_state = AppState {
        assembly: Arc::new(TeamAssembly::new(Arc::clone(&store))),
        engine: ScoringEngine::new(Arc::clone(&llm)),
        extractor: ProfileExtractor::new(llm),
        store,
        github,
        score_concurrency: settings.matching.score_concurrency,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
