use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::token::Claims;
use crate::error::AppError;
use crate::models::SessionUser;

/// The signed-in user of the current request.
///
/// `AccessGate` verifies the session token and stores its `Claims` in the request
/// extensions; this extractor reads them back. Without a session it fails with
/// `AppError::Unauthorized`. Use `Option<AuthenticatedUser>` where a session is
/// optional.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub SessionUser);

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Claims>() {
            Some(claims) => ready(Ok(AuthenticatedUser(claims.user()))),
            None => {
                let err = AppError::Unauthorized("Not signed in".to_string());
                ready(Err(err.into()))
            }
        }
    }
}
