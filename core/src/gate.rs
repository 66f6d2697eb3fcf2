//! Edge authorization gate.
//!
//! # Design
//! The gate is a pure function of the request path, the presence of the
//! session cookie and the raw role cookie. It never calls upstream, so it can
//! admit a request whose session the upstream later rejects (an expired but
//! still present cookie). Page-level data fetchers own that check.
//!
//! Rules, first match wins:
//! 1. non-public path without a session cookie → login, carrying the
//!    original path in `redirect`;
//! 2. `/login` or `/register` with a session cookie → role home;
//! 3. bare `/dashboard` → role home;
//! 4. a role's dashboard with a different role cookie → role home;
//! 5. everything else passes.

use tracing::debug;
use url::form_urlencoded;

use crate::context::RequestContext;
use crate::routes::{
    is_excluded_asset, role_home, DashboardRoute, RouteClass, RouteTable, LOGIN_PATH,
    REGISTER_PATH,
};

/// Outcome of the gate for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// Send the client elsewhere; the value is a site-relative location.
    RedirectTo(String),
}

impl Decision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            Decision::Allow => None,
            Decision::RedirectTo(location) => Some(location),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuthGate {
    routes: RouteTable,
}

impl AuthGate {
    pub fn new(routes: RouteTable) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn decide(&self, ctx: &RequestContext) -> Decision {
        if is_excluded_asset(ctx.path()) {
            return Decision::Allow;
        }
        let decision = self.decide_for(ctx.path(), ctx.has_session(), ctx.role());
        debug!(
            path = ctx.path(),
            session = ctx.has_session(),
            role = ctx.role().unwrap_or("-"),
            ?decision,
            "gate decision"
        );
        decision
    }

    /// Decide from the raw inputs. Exposed so callers that already hold the
    /// cookie state need not build a full `RequestContext`.
    pub fn decide_for(&self, path: &str, has_session: bool, role: Option<&str>) -> Decision {
        let class = self.routes.classify(path);

        if class != RouteClass::Public && !has_session {
            return Decision::RedirectTo(login_redirect(path));
        }

        if (path == LOGIN_PATH || path == REGISTER_PATH) && has_session {
            return Decision::RedirectTo(role_home(role).to_string());
        }

        match class {
            RouteClass::RoleScoped(DashboardRoute::Root) => {
                Decision::RedirectTo(role_home(role).to_string())
            }
            RouteClass::RoleScoped(DashboardRoute::Scoped(required))
                if role != Some(required.as_str()) =>
            {
                Decision::RedirectTo(role_home(role).to_string())
            }
            _ => Decision::Allow,
        }
    }
}

/// `/login?redirect=<path>`, with the path form-encoded.
pub fn login_redirect(path: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("redirect", path)
        .finish();
    format!("{LOGIN_PATH}?{query}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;

    fn gate() -> AuthGate {
        AuthGate::default()
    }

    fn request(path: &str, cookies: &str) -> RequestContext {
        let builder = RequestContext::builder(HttpMethod::Get, path);
        if cookies.is_empty() {
            builder.build()
        } else {
            builder.header("Cookie", cookies).build()
        }
    }

    #[test]
    fn login_redirect_encodes_path() {
        assert_eq!(login_redirect("/dashboard/student"), "/login?redirect=%2Fdashboard%2Fstudent");
        assert_eq!(login_redirect("/"), "/login?redirect=%2F");
    }

    #[test]
    fn missing_session_redirects_to_login() {
        let decision = gate().decide(&request("/dashboard/teacher", "user_role=teacher"));
        assert_eq!(decision, Decision::RedirectTo(login_redirect("/dashboard/teacher")));
    }

    #[test]
    fn public_path_passes_without_cookies() {
        assert_eq!(gate().decide(&request("/register", "")), Decision::Allow);
        assert_eq!(gate().decide(&request("/api/v1/auth/login", "")), Decision::Allow);
    }

    #[test]
    fn wrong_role_is_sent_home() {
        let decision = gate().decide(&request(
            "/dashboard/student",
            "eduequity_session=s; user_role=teacher",
        ));
        assert_eq!(decision, Decision::RedirectTo("/dashboard/teacher".to_string()));
    }

    #[test]
    fn matching_role_is_allowed() {
        let decision = gate().decide(&request(
            "/dashboard/student/quizzes",
            "eduequity_session=s; user_role=student",
        ));
        assert!(decision.is_allow());
    }

    #[test]
    fn bare_dashboard_always_redirects() {
        let decision = gate().decide(&request(
            "/dashboard",
            "eduequity_session=s; user_role=principal",
        ));
        assert_eq!(decision.location(), Some("/dashboard/principal"));
    }

    #[test]
    fn bare_dashboard_without_role_redirects_to_itself() {
        let decision = gate().decide(&request("/dashboard", "eduequity_session=s"));
        assert_eq!(decision.location(), Some("/dashboard"));
    }

    #[test]
    fn logged_in_user_leaves_login_page() {
        let with_role = gate().decide(&request("/login", "eduequity_session=s; user_role=student"));
        assert_eq!(with_role.location(), Some("/dashboard/student"));

        let without_role = gate().decide(&request("/register", "eduequity_session=s"));
        assert_eq!(without_role.location(), Some("/dashboard"));
    }

    #[test]
    fn login_subpath_with_session_is_allowed() {
        let decision = gate().decide(&request("/login/forgot", "eduequity_session=s"));
        assert!(decision.is_allow());
    }

    #[test]
    fn unrecognized_role_on_scoped_dashboard_goes_to_root() {
        let decision = gate().decide(&request(
            "/dashboard/teacher",
            "eduequity_session=s; user_role=janitor",
        ));
        assert_eq!(decision.location(), Some("/dashboard"));
    }

    #[test]
    fn unscoped_dashboard_path_needs_only_a_session() {
        let decision = gate().decide(&request("/dashboard/settings", "eduequity_session=s"));
        assert!(decision.is_allow());
    }

    #[test]
    fn other_protected_paths_ignore_role() {
        let decision = gate().decide(&request("/api/v1/users", "eduequity_session=s"));
        assert!(decision.is_allow());
    }

    #[test]
    fn excluded_assets_skip_the_gate() {
        assert!(gate().decide(&request("/_next/static/app.js", "")).is_allow());
        assert!(gate().decide(&request("/dashboard/student/banner.jpg", "")).is_allow());
    }
}
