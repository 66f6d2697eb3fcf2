//! Property tests for the gate and the forwarder.
//!
//! These cover the "for every path" guarantees that example-based tests can
//! only sample.

use edge_core::{
    gate::login_redirect, routes::is_excluded_asset, ApiProxy, AuthGate, Decision, HttpMethod,
    HttpResponse, RequestContext, Role, RouteTable,
};
use proptest::prelude::*;

// Strategy: any role cookie value, recognized or not
fn arb_role_cookie() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop_oneof![
        Just("student".to_string()),
        Just("teacher".to_string()),
        Just("principal".to_string()),
        prop::string::string_regex("[a-z]{1,10}").unwrap(),
    ])
}

// Strategy: site paths that are neither public nor bundled assets
fn arb_protected_path() -> impl Strategy<Value = String> {
    prop::string::string_regex("/[a-z0-9/_-]{0,30}")
        .unwrap()
        .prop_filter("not public", |p| !RouteTable::default().is_public(p))
        .prop_filter("not an asset", |p| !is_excluded_asset(p))
}

fn context(path: &str, session: bool, role: Option<&str>) -> RequestContext {
    let mut cookies = Vec::new();
    if session {
        cookies.push("eduequity_session=opaque".to_string());
    }
    if let Some(role) = role {
        cookies.push(format!("user_role={role}"));
    }
    let builder = RequestContext::builder(HttpMethod::Get, path);
    if cookies.is_empty() {
        builder.build()
    } else {
        builder.header("Cookie", cookies.join("; ")).build()
    }
}

proptest! {
    /// Property: public paths pass no matter what cookies are present,
    /// except the exact login/register pages for a signed-in caller.
    #[test]
    fn public_paths_allow_any_cookie_state(
        base in prop_oneof![Just("/api/v1/auth/login"), Just("/api/v1/auth/register"), Just("/login"), Just("/register")],
        suffix in prop::string::string_regex("(/[a-z]{1,8}){1,3}").unwrap(),
        session in any::<bool>(),
        role in arb_role_cookie(),
    ) {
        let path = format!("{base}{suffix}");
        let decision = AuthGate::default().decide(&context(&path, session, role.as_deref()));
        prop_assert_eq!(decision, Decision::Allow);
    }

    /// Property: without a session cookie every protected path goes to
    /// login, whatever the role cookie says.
    #[test]
    fn missing_session_always_redirects_to_login(
        path in arb_protected_path(),
        role in arb_role_cookie(),
    ) {
        let decision = AuthGate::default().decide(&context(&path, false, role.as_deref()));
        prop_assert_eq!(decision, Decision::RedirectTo(login_redirect(&path)));
    }

    /// Property: a signed-in caller is only ever redirected to a dashboard,
    /// never back to login.
    #[test]
    fn signed_in_redirects_target_dashboards(
        path in arb_protected_path(),
        role in arb_role_cookie(),
    ) {
        let decision = AuthGate::default().decide(&context(&path, true, role.as_deref()));
        if let Decision::RedirectTo(location) = decision {
            prop_assert!(location.starts_with("/dashboard"), "{}", location);
        }
    }

    /// Property: a caller always reaches their own role's dashboard subtree.
    #[test]
    fn own_dashboard_is_always_allowed(
        role in prop_oneof![Just(Role::Student), Just(Role::Teacher), Just(Role::Principal)],
        rest in prop::string::string_regex("(/[a-z0-9]{1,8}){0,3}").unwrap(),
    ) {
        let path = format!("{}{rest}", role.home());
        let decision = AuthGate::default().decide(&context(&path, true, Some(role.as_str())));
        prop_assert_eq!(decision, Decision::Allow);
    }

    /// Property: the relayed body is byte-identical to the upstream body.
    #[test]
    fn relay_never_rewrites_the_body(
        status in 100u16..600,
        body in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        let mut upstream = HttpResponse::new(status);
        upstream.body = body.clone();
        let out = ApiProxy::default().relay(upstream);
        prop_assert_eq!(out.status, status);
        prop_assert_eq!(out.body, body);
    }
}
