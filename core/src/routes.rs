//! Static route tables: public paths, dashboard scoping, role homes and the
//! bundled-asset exclusion set.
//!
//! The role → dashboard table lives here and nowhere else. The gate and the
//! auth client's post-login redirect both read it through [`role_home`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
pub const ROOT_DASHBOARD: &str = "/dashboard";

/// Prefixes reachable without a session cookie.
pub const DEFAULT_PUBLIC_PATHS: [&str; 4] = [
    LOGIN_PATH,
    REGISTER_PATH,
    "/api/v1/auth/login",
    "/api/v1/auth/register",
];

/// Path prefixes (after the leading `/`) of bundled assets.
const EXCLUDED_PREFIXES: [&str; 4] = ["_next/static", "_next/image", "favicon.ico", "public"];
const EXCLUDED_EXTENSIONS: [&str; 3] = [".png", ".jpg", ".svg"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Principal,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Student, Role::Teacher, Role::Principal];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Principal => "principal",
        }
    }

    /// Canonical dashboard for this role.
    pub fn home(&self) -> &'static str {
        match self {
            Role::Student => "/dashboard/student",
            Role::Teacher => "/dashboard/teacher",
            Role::Principal => "/dashboard/principal",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL.into_iter().find(|r| r.as_str() == s).ok_or(())
    }
}

/// Dashboard for a raw role cookie value. Absent or unrecognized roles land
/// on the root dashboard.
pub fn role_home(role: Option<&str>) -> &'static str {
    role.and_then(|r| r.parse::<Role>().ok())
        .map(|r| r.home())
        .unwrap_or(ROOT_DASHBOARD)
}

/// Which part of the dashboard tree a path addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardRoute {
    /// Exactly `/dashboard`.
    Root,
    /// Under a role's home; the role cookie must match.
    Scoped(Role),
    /// Any other `/dashboard…` path; no role requirement.
    Unscoped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Public,
    AuthRequired,
    RoleScoped(DashboardRoute),
}

/// Classification table. Only the public-path list is configurable; the
/// dashboard rules are fixed by the role table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    public_paths: Vec<String>,
}

impl RouteTable {
    pub fn new<I, S>(public_paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            public_paths: public_paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn public_paths(&self) -> &[String] {
        &self.public_paths
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths.iter().any(|p| path.starts_with(p.as_str()))
    }

    pub fn classify(&self, path: &str) -> RouteClass {
        if self.is_public(path) {
            RouteClass::Public
        } else if path.starts_with(ROOT_DASHBOARD) {
            RouteClass::RoleScoped(dashboard_route(path))
        } else {
            RouteClass::AuthRequired
        }
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new(DEFAULT_PUBLIC_PATHS)
    }
}

fn dashboard_route(path: &str) -> DashboardRoute {
    if path == ROOT_DASHBOARD {
        return DashboardRoute::Root;
    }
    Role::ALL
        .into_iter()
        .find(|role| path.starts_with(role.home()))
        .map(DashboardRoute::Scoped)
        .unwrap_or(DashboardRoute::Unscoped)
}

/// Bundled assets bypass the gate entirely: build output, the image
/// optimizer, the favicon, the public folder and common image files.
pub fn is_excluded_asset(path: &str) -> bool {
    let rest = path.strip_prefix('/').unwrap_or(path);
    EXCLUDED_PREFIXES.iter().any(|p| rest.starts_with(p))
        || EXCLUDED_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}
