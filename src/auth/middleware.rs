use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage, HttpRequest, HttpResponse,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::sync::Arc;

use crate::access::{AccessDecision, GateConfig};
use crate::auth::token::{Claims, SessionIssuer, SESSION_COOKIE};

/// Middleware that resolves the session of every request and applies the access
/// rules of [`GateConfig`].
///
/// A valid session token (cookie or bearer header) is stored in the request
/// extensions as [`Claims`]. Exempt paths skip the decision but still get their
/// session resolved.
#[derive(Clone)]
pub struct AccessGate {
    gate: Arc<GateConfig>,
    issuer: Arc<SessionIssuer>,
}

impl AccessGate {
    pub fn new(gate: GateConfig, issuer: Arc<SessionIssuer>) -> Self {
        Self {
            gate: Arc::new(gate),
            issuer,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AccessGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AccessGateService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AccessGateService {
            service,
            gate: Arc::clone(&self.gate),
            issuer: Arc::clone(&self.issuer),
        }))
    }
}

pub struct AccessGateService<S> {
    service: S,
    gate: Arc<GateConfig>,
    issuer: Arc<SessionIssuer>,
}

impl<S, B> Service<ServiceRequest> for AccessGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let claims = session_token(req.request()).and_then(|token| {
            match self.issuer.verify_token(&token) {
                Ok(claims) => Some(claims),
                Err(err) => {
                    log::debug!("Ignoring session token: {}", err);
                    None
                }
            }
        });

        let path = req.path();
        let decision = if self.gate.is_exempt(path) {
            AccessDecision::Allow
        } else {
            self.gate.decide(claims.is_some(), path)
        };

        match decision {
            AccessDecision::Allow => {
                if let Some(claims) = claims {
                    req.extensions_mut().insert::<Claims>(claims);
                }
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            AccessDecision::DenyRedirectToLogin => {
                let original = req
                    .uri()
                    .path_and_query()
                    .map(|pq| pq.as_str())
                    .unwrap_or_else(|| req.path());
                let location = self.gate.login_redirect(original);
                redirect(req, location)
            }
            AccessDecision::RedirectToDashboard => {
                let location = self.gate.dashboard_path.clone();
                redirect(req, location)
            }
        }
    }
}

/// Session token from the session cookie, or else from a bearer header.
fn session_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn redirect<B>(
    req: ServiceRequest,
    location: String,
) -> LocalBoxFuture<'static, Result<ServiceResponse<EitherBody<B>>, Error>>
where
    B: 'static,
{
    let response = HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
        .map_into_right_body();
    let (request, _payload) = req.into_parts();
    Box::pin(ready(Ok(ServiceResponse::new(request, response))))
}
