use actix_web::{get, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

/// Health check endpoint
///
/// Returns the service status, its version and the current timestamp.
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now()
    }))
}
