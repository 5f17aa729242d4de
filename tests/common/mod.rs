#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::test;
use async_trait::async_trait;
use chrono::Duration;
use dashgate::access::GateConfig;
use dashgate::auth::{CredentialsAuthenticator, SessionIssuer, SESSION_COOKIE};
use dashgate::error::DataAccessError;
use dashgate::models::User;
use dashgate::store::UserStore;
use secrecy::SecretString;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

pub const EMAIL: &str = "user@nextmail.com";
pub const PASSWORD: &str = "123456";

/// In-memory user store that counts lookups and can be switched offline.
#[derive(Default)]
pub struct MemoryStore {
    users: HashMap<String, User>,
    pub lookups: AtomicUsize,
    pub offline: AtomicBool,
}

impl MemoryStore {
    pub fn with_user(email: &str, password: &str) -> (Self, User) {
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: bcrypt::hash(password, 4).expect("hash test password"),
        };
        let mut users = HashMap::new();
        users.insert(user.email.clone(), user.clone());
        (
            Self {
                users,
                ..Default::default()
            },
            user,
        )
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DataAccessError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(DataAccessError::new("connection refused"));
        }
        Ok(self.users.get(email).cloned())
    }
}

#[derive(Clone)]
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub user: User,
    pub authenticator: actix_web::web::Data<CredentialsAuthenticator>,
    pub issuer: actix_web::web::Data<SessionIssuer>,
}

pub fn context() -> TestContext {
    let (store, user) = MemoryStore::with_user(EMAIL, PASSWORD);
    let store = Arc::new(store);
    let authenticator = actix_web::web::Data::new(CredentialsAuthenticator::new(
        store.clone(),
        GateConfig::default(),
    ));
    let issuer = actix_web::web::Data::new(SessionIssuer::new(
        &SecretString::from("integration-test-secret".to_string()),
        Duration::hours(1),
        false,
    ));
    TestContext {
        store,
        user,
        authenticator,
        issuer,
    }
}

/// Signs in through the login route and returns the session cookie.
pub async fn sign_in(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
    password: &str,
) -> Result<Cookie<'static>, String> {
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(serde_json::json!({ "email": email, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    if !resp.status().is_success() {
        return Err(format!("Failed to sign in. Status: {}", resp.status()));
    }
    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.into_owned());
    cookie.ok_or_else(|| "Login response carried no session cookie".to_string())
}

/// Builds the full application around a `TestContext`, the way `main.rs` does.
macro_rules! test_app {
    ($ctx:expr) => {
        actix_web::App::new()
            .app_data($ctx.authenticator.clone())
            .app_data($ctx.issuer.clone())
            .wrap(dashgate::auth::AccessGate::new(
                dashgate::access::GateConfig::default(),
                $ctx.issuer.clone().into_inner(),
            ))
            .wrap(actix_web::middleware::Logger::default())
            .service(dashgate::routes::health::health)
            .configure(dashgate::routes::config)
    };
}
