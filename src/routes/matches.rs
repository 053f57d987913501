use crate::models::{
    BatchScoreRequest, BatchScoreResponse, CandidateScore, ErrorResponse, HealthResponse,
    MatchResponse, ScoreMatchRequest, UserProfile,
};
use crate::routes::AppState;
use crate::services::StoreError;
use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

/// Configure scoring routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/matches/score", web::post().to(score_match))
        .route("/matches/batch", web::post().to(score_batch));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

fn store_error_response(context: &str, e: &StoreError) -> HttpResponse {
    match e {
        StoreError::NotFound(what) => HttpResponse::NotFound().json(ErrorResponse {
            error: "not_found".to_string(),
            message: what.clone(),
            status_code: 404,
        }),
        other => {
            tracing::error!("{}: {}", context, other);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "store_error".to_string(),
                message: format!("{}: {}", context, other),
                status_code: 500,
            })
        }
    }
}

fn validation_response(errors: &validator::ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "validation_failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

/// Fetch the roster profiles for a scoring call, tolerating an empty list
async fn fetch_roster(
    state: &AppState,
    team_member_ids: &[String],
) -> Result<Vec<UserProfile>, StoreError> {
    if team_member_ids.is_empty() {
        return Ok(vec![]);
    }
    state.store.get_users(team_member_ids).await
}

/// Score a pair or a candidate against a team roster
///
/// POST /api/v1/matches/score
///
/// Request body:
/// ```json
/// {
///   "user1Id": "string",
///   "user2Id": "string",
///   "teamMemberIds": ["string"],
///   "hackathonId": "string"
/// }
/// ```
async fn score_match(
    state: web::Data<AppState>,
    req: web::Json<ScoreMatchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_response(&errors);
    }

    let evaluator = match state.store.get_user(&req.user1_id).await {
        Ok(profile) => profile,
        Err(e) => return store_error_response("Failed to fetch evaluator", &e),
    };
    let candidate = match state.store.get_user(&req.user2_id).await {
        Ok(profile) => profile,
        Err(e) => return store_error_response("Failed to fetch candidate", &e),
    };
    let roster = match fetch_roster(&state, &req.team_member_ids).await {
        Ok(profiles) => profiles,
        Err(e) => return store_error_response("Failed to fetch roster", &e),
    };

    let outcome = state.engine.score(&evaluator, &candidate, &roster).await;
    if outcome.is_degraded() {
        tracing::warn!(
            "Degraded score for {} vs {}",
            req.user1_id,
            req.user2_id
        );
    }

    HttpResponse::Ok().json(MatchResponse::from(outcome.result()))
}

/// Score a list of candidates against one evaluator
///
/// POST /api/v1/matches/batch
///
/// The evaluations are independent and run concurrently, bounded by the
/// configured fan-out cap; the response waits for the whole batch.
async fn score_batch(
    state: web::Data<AppState>,
    req: web::Json<BatchScoreRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_response(&errors);
    }

    let evaluator = match state.store.get_user(&req.user_id).await {
        Ok(profile) => profile,
        Err(e) => return store_error_response("Failed to fetch evaluator", &e),
    };
    let candidates = match state.store.get_users(&req.candidate_ids).await {
        Ok(profiles) => profiles,
        Err(e) => return store_error_response("Failed to fetch candidates", &e),
    };
    let roster = match fetch_roster(&state, &req.team_member_ids).await {
        Ok(profiles) => profiles,
        Err(e) => return store_error_response("Failed to fetch roster", &e),
    };

    tracing::info!(
        "Scoring {} candidates for user {} (concurrency {})",
        candidates.len(),
        req.user_id,
        state.score_concurrency
    );

    let outcomes = state
        .engine
        .score_many(&evaluator, &candidates, &roster, state.score_concurrency)
        .await;

    let results = candidates
        .iter()
        .zip(outcomes.iter())
        .map(|(candidate, outcome)| CandidateScore {
            candidate_id: candidate.user_id.clone(),
            verdict: MatchResponse::from(outcome.result()),
        })
        .collect();

    HttpResponse::Ok().json(BatchScoreResponse { results })
}
