pub mod auth;
pub mod health;
pub mod memories;
pub mod user;

use actix_web::{web, HttpRequest, HttpResponse};

use crate::models::User;
use crate::AppState;

/// Resolve the bearer token on a request to its owning user.
///
/// The owner id always comes from the verified token, never from client input.
/// Missing, malformed, expired, or orphaned tokens all map to 401.
pub fn authenticate(
    state: &web::Data<AppState>,
    req: &HttpRequest,
) -> Result<User, HttpResponse> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.trim_start_matches("Bearer ").to_string());

    let token = match token {
        Some(t) => t,
        None => {
            return Err(HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "No authorization token provided"
            })));
        }
    };

    let user_id = match crate::auth::token::verify(&token, &state.config.jwt_secret) {
        Ok(id) => id,
        Err(e) => {
            log::debug!("Rejected bearer token: {}", e);
            return Err(HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Invalid or expired token"
            })));
        }
    };

    match state.db.get_user_by_id(&user_id) {
        Ok(Some(user)) => Ok(user),
        // Token outlived its account (e.g. account deleted)
        Ok(None) => Err(HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "Invalid or expired token"
        }))),
        Err(e) => {
            log::error!("User lookup failed during auth: {}", e);
            Err(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            })))
        }
    }
}
