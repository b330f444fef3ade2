//! Registration and login

use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::auth::{password, token};
use crate::db::tables::users::is_unique_violation;
use crate::models::PublicUser;
use crate::AppState;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    username: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    message: String,
    token: String,
    user: PublicUser,
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login)),
    );
}

async fn register(
    state: web::Data<AppState>,
    body: web::Json<CredentialsRequest>,
) -> impl Responder {
    let username = body.username.as_deref().unwrap_or("").trim().to_string();
    let password = body.password.as_deref().unwrap_or("");

    if username.is_empty() || password.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Username and password are required"
        }));
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": format!("Password must be at least {} characters long", MIN_PASSWORD_LEN)
        }));
    }

    let password_hash = match password::hash_password(password) {
        Ok(h) => h,
        Err(e) => {
            log::error!("Password hashing failed: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Server error during registration"
            }));
        }
    };

    let user = match state.db.create_user(&username, &password_hash) {
        Ok(user) => user,
        // Duplicate username surfaces as a uniqueness violation; the client's
        // fault, not a server error
        Err(e) if is_unique_violation(&e) => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Username already exists"
            }));
        }
        Err(e) => {
            log::error!("Failed to create user: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Server error during registration"
            }));
        }
    };

    let token = token::issue(&user.id, &state.config.jwt_secret, state.config.jwt_expire_days);

    HttpResponse::Created().json(AuthResponse {
        message: "User registered successfully".to_string(),
        token,
        user: user.to_public(),
    })
}

async fn login(state: web::Data<AppState>, body: web::Json<CredentialsRequest>) -> impl Responder {
    let username = body.username.as_deref().unwrap_or("").trim();
    let password = body.password.as_deref().unwrap_or("");

    if username.is_empty() || password.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Username and password are required"
        }));
    }

    let user = match state.db.get_user_by_username(username) {
        Ok(user) => user,
        Err(e) => {
            log::error!("User lookup failed during login: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Server error during login"
            }));
        }
    };

    // Unknown username and wrong password produce the identical response so
    // usernames cannot be enumerated
    let user = match user {
        Some(u) if password::verify_password(password, &u.password_hash) => u,
        _ => {
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Invalid credentials"
            }));
        }
    };

    let token = token::issue(&user.id, &state.config.jwt_secret, state.config.jwt_expire_days);

    HttpResponse::Ok().json(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user: user.to_public(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::Database;
    use actix_web::{test, App};
    use std::sync::Arc;

    fn test_state(dir: &tempfile::TempDir) -> web::Data<AppState> {
        let path = dir.path().join("test.db");
        let db = Database::new(path.to_str().unwrap()).unwrap();
        web::Data::new(AppState {
            db: Arc::new(db),
            config: Config {
                port: 0,
                database_url: String::new(),
                jwt_secret: "test-secret".to_string(),
                jwt_expire_days: 7,
                cors_origin: None,
            },
        })
    }

    #[actix_web::test]
    async fn test_register_login_and_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = test::init_service(App::new().app_data(state.clone()).configure(config)).await;

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(serde_json::json!({"username": "alice", "password": "hunter22"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["token"].as_str().unwrap().contains('.'));
        assert_eq!(body["user"]["username"], "alice");
        assert!(body["user"].get("password_hash").is_none());

        // Duplicate username is the client's fault, not a 500
        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(serde_json::json!({"username": "alice", "password": "other-pw"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(serde_json::json!({"username": "alice", "password": "hunter22"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = test::read_body_json(resp).await;
        let token = body["token"].as_str().unwrap();
        assert_eq!(
            token::verify(token, &state.config.jwt_secret).unwrap(),
            body["user"]["id"].as_str().unwrap()
        );
    }

    #[actix_web::test]
    async fn test_login_failures_are_indistinguishable() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = test::init_service(App::new().app_data(state).configure(config)).await;

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(serde_json::json!({"username": "alice", "password": "hunter22"}))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(serde_json::json!({"username": "alice", "password": "wrong-pw"}))
            .to_request();
        let wrong_password = test::call_service(&app, req).await;
        let wrong_password_status = wrong_password.status();
        let wrong_password_body: serde_json::Value = test::read_body_json(wrong_password).await;

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(serde_json::json!({"username": "nobody", "password": "hunter22"}))
            .to_request();
        let unknown_user = test::call_service(&app, req).await;
        let unknown_user_status = unknown_user.status();
        let unknown_user_body: serde_json::Value = test::read_body_json(unknown_user).await;

        assert_eq!(wrong_password_status, 401);
        assert_eq!(wrong_password_status, unknown_user_status);
        assert_eq!(wrong_password_body, unknown_user_body);
    }

    #[actix_web::test]
    async fn test_short_password_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = test::init_service(App::new().app_data(state).configure(config)).await;

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(serde_json::json!({"username": "alice", "password": "short"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(serde_json::json!({"username": "", "password": "hunter22"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }
}
