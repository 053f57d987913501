// Route exports
pub mod matches;
pub mod profiles;
pub mod teams;

use crate::core::{ProfileExtractor, ScoringEngine, TeamAssembly};
use crate::services::{GithubClient, LlmClient, StoreClient};
use actix_web::web;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<StoreClient>,
    pub assembly: Arc<TeamAssembly<StoreClient>>,
    pub engine: ScoringEngine<Arc<LlmClient>>,
    pub extractor: ProfileExtractor<Arc<LlmClient>>,
    pub github: Arc<GithubClient>,
    pub score_concurrency: usize,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(matches::configure)
            .configure(teams::configure)
            .configure(profiles::configure),
    );
}
