pub mod auth;
pub mod dashboard;
pub mod health;

use actix_web::web;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/auth")
            .service(auth::login)
            .service(auth::logout)
            .service(auth::session),
    )
    .service(web::scope("/dashboard").service(dashboard::overview));
}
