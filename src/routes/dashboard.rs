use actix_web::{get, HttpResponse, Responder};
use serde_json::json;

use crate::auth::AuthenticatedUser;

/// Dashboard landing data for the signed-in user.
///
/// Reachable only through `AccessGate`, which redirects anonymous visitors to
/// the login page before this handler runs.
#[get("")]
pub async fn overview(user: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().json(json!({ "user": user.0 }))
}
