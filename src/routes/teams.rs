use crate::core::AssemblyError;
use crate::models::{
    AcceptRequestBody, ChatMessage, CreateRequestBody, ErrorResponse, JoinTeamRequest,
    MessageListResponse, PendingCountResponse, PostMessageRequest,
};
use crate::routes::AppState;
use crate::services::StoreError;
use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

/// Configure team formation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/teams/join", web::post().to(join_team))
        .route("/teams/{team_id}/messages", web::get().to(list_messages))
        .route("/teams/{team_id}/messages", web::post().to(post_message))
        .route("/requests", web::post().to(create_request))
        .route("/requests/{request_id}/accept", web::post().to(accept_request))
        .route(
            "/requests/pending-count/{user_id}",
            web::get().to(pending_count),
        );
}

fn assembly_error_response(e: AssemblyError) -> HttpResponse {
    let (status_code, error) = match &e {
        AssemblyError::TeamFull => (400, "team_full"),
        AssemblyError::RequestLimitExceeded { .. } => (400, "request_limit_exceeded"),
        AssemblyError::DuplicateRequest => (400, "duplicate_request"),
        AssemblyError::SelfRequest | AssemblyError::NotRecipient => (400, "invalid_request"),
        AssemblyError::NotFound(_) => (404, "not_found"),
        AssemblyError::Store(inner) => {
            tracing::error!("Assembly store failure: {}", inner);
            (500, "store_error")
        }
    };

    let body = ErrorResponse {
        error: error.to_string(),
        message: e.to_string(),
        status_code,
    };
    match status_code {
        400 => HttpResponse::BadRequest().json(body),
        404 => HttpResponse::NotFound().json(body),
        _ => HttpResponse::InternalServerError().json(body),
    }
}

fn validation_response(errors: &validator::ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "validation_failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
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

/// Join (or create) the open team for a hackathon
///
/// POST /api/v1/teams/join
async fn join_team(state: web::Data<AppState>, req: web::Json<JoinTeamRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_response(&errors);
    }

    // Unknown ids surface as 404 before any membership mutation
    if let Err(e) = state.store.get_user(&req.user_id).await {
        return store_error_response("Failed to fetch joining user", &e);
    }
    if let Err(e) = state.store.get_hackathon(&req.hackathon_id).await {
        return store_error_response("Failed to fetch hackathon", &e);
    }

    match state.assembly.join_team(&req.hackathon_id, &req.user_id).await {
        Ok(team) => HttpResponse::Ok().json(team),
        Err(e) => assembly_error_response(e),
    }
}

/// Create a team request
///
/// POST /api/v1/requests
async fn create_request(
    state: web::Data<AppState>,
    req: web::Json<CreateRequestBody>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_response(&errors);
    }

    if let Err(e) = state.store.get_user(&req.from_user_id).await {
        return store_error_response("Failed to fetch sender", &e);
    }
    if let Err(e) = state.store.get_user(&req.to_user_id).await {
        return store_error_response("Failed to fetch recipient", &e);
    }

    match state
        .assembly
        .create_request(
            &req.from_user_id,
            &req.to_user_id,
            &req.hackathon_id,
            req.message.clone(),
        )
        .await
    {
        Ok(request) => HttpResponse::Ok().json(request),
        Err(e) => assembly_error_response(e),
    }
}

/// Accept a team request
///
/// POST /api/v1/requests/{request_id}/accept
async fn accept_request(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<AcceptRequestBody>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_response(&errors);
    }

    let request_id = path.into_inner();
    match state
        .assembly
        .accept_request(&request_id, &req.current_user_id)
        .await
    {
        Ok(team) => HttpResponse::Ok().json(team),
        Err(e) => assembly_error_response(e),
    }
}

/// Pending-request count for a sender
///
/// GET /api/v1/requests/pending-count/{user_id}
async fn pending_count(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let user_id = path.into_inner();
    match state.assembly.pending_count(&user_id).await {
        Ok(count) => HttpResponse::Ok().json(PendingCountResponse::new(user_id, count)),
        Err(e) => assembly_error_response(e),
    }
}

/// List a team's chat messages (clients poll this)
///
/// GET /api/v1/teams/{team_id}/messages
async fn list_messages(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let team_id = path.into_inner();
    match state.store.list_messages(&team_id).await {
        Ok(messages) => {
            let count = messages.len();
            HttpResponse::Ok().json(MessageListResponse { messages, count })
        }
        Err(e) => store_error_response("Failed to list messages", &e),
    }
}

/// Post a chat message to a team
///
/// POST /api/v1/teams/{team_id}/messages
async fn post_message(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<PostMessageRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_response(&errors);
    }

    let message = ChatMessage {
        id: uuid::Uuid::new_v4().to_string(),
        team_id: path.into_inner(),
        sender_id: req.sender_id.clone(),
        content: req.content.clone(),
        created_at: chrono::Utc::now(),
    };

    match state.store.insert_message(&message).await {
        Ok(()) => HttpResponse::Ok().json(message),
        Err(e) => store_error_response("Failed to post message", &e),
    }
}
