use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use chrono::Duration;
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::sync::Arc;

use dashgate::auth::{AccessGate, CredentialsAuthenticator, SessionIssuer};
use dashgate::config::Config;
use dashgate::routes::{self, health};
use dashgate::store::PgUserStore;

fn cors(allowed_origin: Option<&str>) -> Cors {
    match allowed_origin {
        Some(origin) => Cors::default()
            .allowed_origin(origin)
            .allowed_methods(vec!["GET", "POST"])
            .allow_any_header()
            .supports_credentials()
            .max_age(3600),
        None => Cors::default(),
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&config.database_url)
        .await
        .map_err(|e| {
            log::error!("Failed to connect to database: {}", e);
            io::Error::new(io::ErrorKind::Other, e)
        })?;

    let authenticator = web::Data::new(CredentialsAuthenticator::new(
        Arc::new(PgUserStore::new(pool.clone())),
        config.gate.clone(),
    ));
    let issuer = web::Data::new(SessionIssuer::new(
        &config.session_secret,
        Duration::hours(config.session_ttl_hours),
        config.cookie_secure,
    ));
    let gate = config.gate.clone();
    let cors_origin = config.cors_allowed_origin.clone();

    log::info!("Starting dashgate server at {}", config.server_url());
    let server = HttpServer::new(move || {
        App::new()
            .app_data(authenticator.clone())
            .app_data(issuer.clone())
            .wrap(AccessGate::new(gate.clone(), issuer.clone().into_inner()))
            .wrap(cors(cors_origin.as_deref()))
            .wrap(Logger::default())
            .service(health::health)
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run();

    let result = server.await;

    pool.close().await;
    log::info!("Database pool closed");
    result
}
