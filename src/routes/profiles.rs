use crate::core::{ExtractionError, SourceKind};
use crate::models::{ErrorResponse, ExtractProfileRequest};
use crate::routes::AppState;
use crate::services::{GithubClient, GithubError};
use actix_web::{web, HttpResponse, Responder};

/// Configure profile extraction routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/profiles/extract", web::post().to(extract_profile));
}

fn bad_request(message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "invalid_request".to_string(),
        message,
        status_code: 400,
    })
}

fn github_error_response(e: &GithubError) -> HttpResponse {
    match e {
        GithubError::NotFound(what) => HttpResponse::NotFound().json(ErrorResponse {
            error: "not_found".to_string(),
            message: what.clone(),
            status_code: 404,
        }),
        GithubError::InvalidUrl(url) => bad_request(format!("Invalid GitHub URL: {}", url)),
        other => {
            tracing::error!("GitHub fetch failed: {}", other);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "github_error".to_string(),
                message: other.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Extract a profile draft from a GitHub account or resume text
///
/// POST /api/v1/profiles/extract
///
/// Exactly one of `githubUrl` or `resumeText` must be provided. Extraction
/// failures surface as explicit errors, never as an empty profile: this is
/// an onboarding step where silent wrong data is worse than a retry prompt.
async fn extract_profile(
    state: web::Data<AppState>,
    req: web::Json<ExtractProfileRequest>,
) -> impl Responder {
    let (source_text, kind) = match (&req.github_url, &req.resume_text) {
        (Some(url), _) if !url.trim().is_empty() => {
            let handle = match GithubClient::parse_handle(url) {
                Ok(handle) => handle,
                Err(e) => return github_error_response(&e),
            };
            match state.github.gather_profile_text(handle).await {
                Ok(text) => (text, SourceKind::Github),
                Err(e) => return github_error_response(&e),
            }
        }
        (_, Some(text)) if !text.trim().is_empty() => (text.clone(), SourceKind::Resume),
        _ => {
            return bad_request(
                "Provide either githubUrl or resumeText".to_string(),
            );
        }
    };

    match state.extractor.extract(&source_text, kind).await {
        Ok(profile) => HttpResponse::Ok().json(profile),
        Err(e) => {
            tracing::error!("Profile extraction failed: {}", e);
            let error = match &e {
                ExtractionError::Gateway(_) => "reasoning_unavailable",
                ExtractionError::Malformed(_) => "extraction_failed",
            };
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: error.to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}
