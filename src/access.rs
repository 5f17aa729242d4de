//! Access decisions for incoming requests.
//!
//! [`decide`] is the pure rule that maps (session present, request path) to an
//! [`AccessDecision`]. [`GateConfig`] carries the configured paths and builds the
//! redirect targets the middleware sends back.

use url::form_urlencoded;

/// Query parameter carrying the page a visitor was bounced from.
pub const CALLBACK_PARAM: &str = "callbackUrl";

/// Error code appended to the login page after a rejected form login.
pub const SIGNIN_ERROR: &str = "CredentialsSignin";

/// Outcome of the gate for a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// Let the request through.
    Allow,
    /// Unauthenticated visitor on a protected path; send them to the login page.
    DenyRedirectToLogin,
    /// Signed-in visitor on a public page; send them to the dashboard.
    RedirectToDashboard,
}

/// Decides what happens to a request.
///
/// Rules, in order:
/// 1. protected path without a session: deny and redirect to login;
/// 2. protected path with a session: allow;
/// 3. any other path with a session: redirect to the dashboard;
/// 4. otherwise allow.
pub fn decide(is_authenticated: bool, path: &str, protected_prefix: &str) -> AccessDecision {
    if path.starts_with(protected_prefix) {
        if is_authenticated {
            AccessDecision::Allow
        } else {
            AccessDecision::DenyRedirectToLogin
        }
    } else if is_authenticated {
        AccessDecision::RedirectToDashboard
    } else {
        AccessDecision::Allow
    }
}

/// Paths used by the gate.
#[derive(Debug, Clone, PartialEq)]
pub struct GateConfig {
    /// Route namespace that requires a session.
    pub protected_prefix: String,
    /// Where unauthenticated visitors are sent.
    pub login_path: String,
    /// Where signed-in visitors are sent.
    pub dashboard_path: String,
    /// Prefixes the gate never redirects (API and health endpoints).
    pub exempt_prefixes: Vec<String>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            protected_prefix: "/dashboard".to_string(),
            login_path: "/login".to_string(),
            dashboard_path: "/dashboard".to_string(),
            exempt_prefixes: vec!["/api".to_string(), "/health".to_string()],
        }
    }
}

impl GateConfig {
    pub fn decide(&self, is_authenticated: bool, path: &str) -> AccessDecision {
        decide(is_authenticated, path, &self.protected_prefix)
    }

    /// True when `path` equals an exempt prefix or lies below it.
    pub fn is_exempt(&self, path: &str) -> bool {
        self.exempt_prefixes.iter().any(|prefix| {
            path == prefix
                || path
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    /// Login URL remembering the page the visitor asked for.
    pub fn login_redirect(&self, original: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair(CALLBACK_PARAM, original)
            .finish();
        format!("{}?{}", self.login_path, query)
    }

    /// Login URL shown after a rejected form submission.
    pub fn login_error_redirect(&self) -> String {
        format!("{}?error={}", self.login_path, SIGNIN_ERROR)
    }

    /// Where to send a visitor after a successful form login.
    ///
    /// Only same-origin relative paths are honoured; anything else falls back to
    /// the dashboard.
    pub fn post_login_target(&self, callback: Option<&str>) -> String {
        match callback {
            Some(target) if is_local_path(target) => target.to_string(),
            _ => self.dashboard_path.clone(),
        }
    }
}

fn is_local_path(target: &str) -> bool {
    target.starts_with('/') && !target.starts_with("//") && !target.starts_with("/\\")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truth_table() {
        let cases = [
            (false, "/dashboard/x", AccessDecision::DenyRedirectToLogin),
            (true, "/dashboard/x", AccessDecision::Allow),
            (true, "/login", AccessDecision::RedirectToDashboard),
            (false, "/login", AccessDecision::Allow),
        ];
        for (authenticated, path, expected) in cases {
            assert_eq!(
                decide(authenticated, path, "/dashboard"),
                expected,
                "auth={} path={}",
                authenticated,
                path
            );
        }
    }

    #[test]
    fn test_prefix_itself_is_protected() {
        assert_eq!(
            decide(false, "/dashboard", "/dashboard"),
            AccessDecision::DenyRedirectToLogin
        );
        assert_eq!(decide(true, "/", "/dashboard"), AccessDecision::RedirectToDashboard);
    }

    #[test]
    fn test_exempt_prefixes() {
        let gate = GateConfig::default();
        assert!(gate.is_exempt("/api"));
        assert!(gate.is_exempt("/api/auth/login"));
        assert!(gate.is_exempt("/health"));
        assert!(!gate.is_exempt("/apiary"));
        assert!(!gate.is_exempt("/login"));
    }

    #[test]
    fn test_login_redirect_encodes_original_target() {
        let gate = GateConfig::default();
        assert_eq!(
            gate.login_redirect("/dashboard/invoices?page=2"),
            "/login?callbackUrl=%2Fdashboard%2Finvoices%3Fpage%3D2"
        );
        assert_eq!(gate.login_error_redirect(), "/login?error=CredentialsSignin");
    }

    #[test]
    fn test_post_login_target_rejects_foreign_urls() {
        let gate = GateConfig::default();
        assert_eq!(gate.post_login_target(Some("/dashboard/invoices")), "/dashboard/invoices");
        assert_eq!(gate.post_login_target(None), "/dashboard");
        assert_eq!(gate.post_login_target(Some("https://evil.example")), "/dashboard");
        assert_eq!(gate.post_login_target(Some("//evil.example")), "/dashboard");
        assert_eq!(gate.post_login_target(Some("/\\evil.example")), "/dashboard");
    }
}
