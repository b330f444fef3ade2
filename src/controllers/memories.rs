//! Memory CRUD, search, and CSV export

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;

use crate::controllers::authenticate;
use crate::export::memories_to_csv;
use crate::models::{FieldFilter, MemoryFields};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListMemoriesQuery {
    query: Option<String>,
    filter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MemoryPayload {
    title: Option<String>,
    context: Option<String>,
    tag: Option<String>,
    detail: Option<String>,
}

impl MemoryPayload {
    fn validate(&self) -> Result<MemoryFields, String> {
        MemoryFields::validate(
            self.title.as_deref(),
            self.context.as_deref(),
            self.tag.as_deref(),
            self.detail.as_deref(),
        )
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/memories")
            .route("", web::get().to(list_memories))
            .route("", web::post().to(create_memory))
            // Kept as an alias of the list endpoint
            .route("/search", web::get().to(list_memories))
            .route("/export", web::get().to(export_memories))
            .route("/{id}", web::get().to(get_memory))
            .route("/{id}", web::put().to(update_memory))
            .route("/{id}", web::delete().to(delete_memory)),
    );
}

async fn list_memories(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<ListMemoriesQuery>,
) -> impl Responder {
    let user = match authenticate(&state, &req) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    // Filtering only applies when a non-empty query and a recognized field
    // selector are both present
    let search = match (query.query.as_deref(), query.filter.as_deref()) {
        (Some(q), Some(f)) if !q.is_empty() => FieldFilter::parse(f).map(|filter| (q, filter)),
        _ => None,
    };

    match state.db.list_memories(&user.id, search) {
        Ok(memories) => HttpResponse::Ok().json(memories),
        Err(e) => {
            log::error!("Failed to list memories: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Server error fetching memories"
            }))
        }
    }
}

async fn get_memory(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> impl Responder {
    let user = match authenticate(&state, &req) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    match state.db.get_memory(&user.id, &path) {
        Ok(Some(memory)) => HttpResponse::Ok().json(memory),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Memory not found"
        })),
        Err(e) => {
            log::error!("Failed to fetch memory: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Server error fetching memory"
            }))
        }
    }
}

async fn create_memory(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<MemoryPayload>,
) -> impl Responder {
    let user = match authenticate(&state, &req) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    let fields = match body.validate() {
        Ok(fields) => fields,
        Err(message) => {
            return HttpResponse::BadRequest().json(serde_json::json!({ "error": message }));
        }
    };

    match state.db.create_memory(&user.id, &fields) {
        Ok(memory) => HttpResponse::Created().json(memory),
        Err(e) => {
            log::error!("Failed to create memory: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Server error creating memory"
            }))
        }
    }
}

async fn update_memory(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<MemoryPayload>,
) -> impl Responder {
    let user = match authenticate(&state, &req) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    let fields = match body.validate() {
        Ok(fields) => fields,
        Err(message) => {
            return HttpResponse::BadRequest().json(serde_json::json!({ "error": message }));
        }
    };

    match state.db.update_memory(&user.id, &path, &fields) {
        Ok(Some(memory)) => HttpResponse::Ok().json(memory),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Memory not found"
        })),
        Err(e) => {
            log::error!("Failed to update memory: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Server error updating memory"
            }))
        }
    }
}

async fn delete_memory(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> impl Responder {
    let user = match authenticate(&state, &req) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    match state.db.delete_memory(&user.id, &path) {
        Ok(true) => HttpResponse::Ok().json(serde_json::json!({
            "message": "Memory deleted successfully"
        })),
        Ok(false) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Memory not found"
        })),
        Err(e) => {
            log::error!("Failed to delete memory: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Server error deleting memory"
            }))
        }
    }
}

async fn export_memories(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let user = match authenticate(&state, &req) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    let memories = match state.db.list_memories(&user.id, None) {
        Ok(memories) => memories,
        Err(e) => {
            log::error!("Failed to export memories: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Server error exporting memories"
            }));
        }
    };

    // "Nothing to export" is distinguishable from an empty file
    if memories.is_empty() {
        return HttpResponse::NotFound().json(serde_json::json!({
            "error": "No memories to export"
        }));
    }

    HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header((
            "Content-Disposition",
            "attachment; filename=\"memories.csv\"",
        ))
        .body(memories_to_csv(&memories))
}
