//! User profile and account deletion

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::Serialize;

use crate::controllers::authenticate;
use crate::models::PublicUser;
use crate::AppState;

#[derive(Debug, Serialize)]
struct ProfileResponse {
    user: PublicUser,
    #[serde(rename = "memoryCount")]
    memory_count: i64,
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/user")
            .route("/profile", web::get().to(get_profile))
            .route("/account", web::delete().to(delete_account)),
    );
}

async fn get_profile(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let user = match authenticate(&state, &req) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    match state.db.count_memories(&user.id) {
        Ok(memory_count) => HttpResponse::Ok().json(ProfileResponse {
            user: user.to_public(),
            memory_count,
        }),
        Err(e) => {
            log::error!("Failed to count memories: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Server error fetching user profile"
            }))
        }
    }
}

async fn delete_account(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let user = match authenticate(&state, &req) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    match state.db.delete_user_with_memories(&user.id) {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "message": "Account and all memories deleted successfully"
        })),
        Err(e) => {
            log::error!("Failed to delete account: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Server error deleting account"
            }))
        }
    }
}
