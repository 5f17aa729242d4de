use crate::{
    auth::{
        AuthResponse, AuthenticatedUser, CredentialsAuthenticator, CredentialsProvider,
        LoginRequest, SessionIssuer,
    },
    error::AuthError,
};
use actix_web::{get, http::header, post, web, HttpResponse};
use serde_json::json;

/// Sign in with email and password.
///
/// Accepts a JSON or form body. JSON clients get the session token and user in
/// the response body; form posts are redirected to `callbackUrl` (or the
/// dashboard) on success and back to the login page on failure. Both receive the
/// session cookie on success.
#[post("/login")]
pub async fn login(
    provider: web::Data<CredentialsAuthenticator>,
    issuer: web::Data<SessionIssuer>,
    submission: web::Either<web::Json<LoginRequest>, web::Form<LoginRequest>>,
) -> Result<HttpResponse, AuthError> {
    let (input, from_form) = match submission {
        web::Either::Left(json) => (json.into_inner(), false),
        web::Either::Right(form) => (form.into_inner(), true),
    };
    let callback = input.callback_url.clone();

    let result = match provider.authorize(input).await {
        Ok(user) => issuer
            .issue_token(&user)
            .map(|token| (user, token))
            .map_err(|e| AuthError::Internal(e.to_string())),
        Err(err) => Err(err),
    };

    match result {
        Ok((user, token)) => {
            log::info!("User {} signed in", user.id);
            let cookie = issuer.session_cookie(token.clone());
            if from_form {
                let target = provider.gate().post_login_target(callback.as_deref());
                Ok(HttpResponse::SeeOther()
                    .cookie(cookie)
                    .insert_header((header::LOCATION, target))
                    .finish())
            } else {
                Ok(HttpResponse::Ok().cookie(cookie).json(AuthResponse { token, user }))
            }
        }
        Err(err) => {
            // Data-access failures are already logged by the provider.
            if !matches!(err, AuthError::DataAccess(_)) {
                log::warn!("Login rejected ({}): {}", err.kind(), err);
            }
            if from_form {
                Ok(HttpResponse::SeeOther()
                    .insert_header((header::LOCATION, provider.gate().login_error_redirect()))
                    .finish())
            } else {
                Err(err)
            }
        }
    }
}

/// Sign out: clear the session cookie and return to the login page.
#[post("/logout")]
pub async fn logout(
    provider: web::Data<CredentialsAuthenticator>,
    issuer: web::Data<SessionIssuer>,
) -> HttpResponse {
    HttpResponse::SeeOther()
        .cookie(issuer.removal_cookie())
        .insert_header((header::LOCATION, provider.gate().login_path.clone()))
        .finish()
}

/// The current session, or `null` when signed out.
#[get("/session")]
pub async fn session(user: Option<AuthenticatedUser>) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "user": user.map(|u| u.0) }))
}
