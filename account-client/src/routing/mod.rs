//! Navigation authorization.
//!
//! Every view declares what it requires; one pure function decides
//! allow-or-redirect from a session snapshot. The guard never performs
//! network I/O and never mutates the session — per-view checks do not
//! exist.

use crate::models::{SessionRecord, UserRole};

/// Declarative capability requirements for a route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteRequirements {
    pub requires_auth: bool,
    pub requires_guest: bool,
    pub requires_admin: bool,
}

impl RouteRequirements {
    pub const fn public() -> Self {
        Self {
            requires_auth: false,
            requires_guest: false,
            requires_admin: false,
        }
    }

    pub const fn authenticated() -> Self {
        Self {
            requires_auth: true,
            requires_guest: false,
            requires_admin: false,
        }
    }

    pub const fn guest_only() -> Self {
        Self {
            requires_auth: false,
            requires_guest: true,
            requires_admin: false,
        }
    }

    pub const fn admin_only() -> Self {
        Self {
            requires_auth: true,
            requires_guest: false,
            requires_admin: true,
        }
    }
}

/// The application's views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppRoute {
    Auth,
    Home,
    Tags,
    TagDetail,
    Calendar,
    Trash,
    AdminDashboard,
}

impl AppRoute {
    /// Every registered route, for menu rendering and tests.
    pub const ALL: [AppRoute; 7] = [
        AppRoute::Auth,
        AppRoute::Home,
        AppRoute::Tags,
        AppRoute::TagDetail,
        AppRoute::Calendar,
        AppRoute::Trash,
        AppRoute::AdminDashboard,
    ];

    pub const fn path(&self) -> &'static str {
        match self {
            AppRoute::Auth => "/auth",
            AppRoute::Home => "/home",
            AppRoute::Tags => "/tags",
            AppRoute::TagDetail => "/tags/:id",
            AppRoute::Calendar => "/calendar",
            AppRoute::Trash => "/trash",
            AppRoute::AdminDashboard => "/admin",
        }
    }

    pub const fn requirements(&self) -> RouteRequirements {
        match self {
            AppRoute::Auth => RouteRequirements::guest_only(),
            AppRoute::AdminDashboard => RouteRequirements::admin_only(),
            AppRoute::Home
            | AppRoute::Tags
            | AppRoute::TagDetail
            | AppRoute::Calendar
            | AppRoute::Trash => RouteRequirements::authenticated(),
        }
    }
}

/// Outcome of a guard evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectTo(AppRoute),
}

/// Decide whether `session` may enter a route with `requirements`.
///
/// Pure and synchronous; first matching rule wins:
/// 1. auth required, not authenticated → redirect to Auth
/// 2. auth + admin required, role is not admin → redirect to Home
/// 3. auth required, satisfied → allow
/// 4. guest required, authenticated → role-appropriate landing
/// 5. guest required, unauthenticated → allow
/// 6. no requirement → allow
pub fn authorize(requirements: RouteRequirements, session: &SessionRecord) -> GuardDecision {
    if requirements.requires_auth {
        if !session.authenticated {
            return GuardDecision::RedirectTo(AppRoute::Auth);
        }
        if requirements.requires_admin && session.role != UserRole::Admin {
            return GuardDecision::RedirectTo(AppRoute::Home);
        }
        return GuardDecision::Allow;
    }
    if requirements.requires_guest {
        if session.authenticated {
            let landing = if session.role == UserRole::Admin {
                AppRoute::AdminDashboard
            } else {
                AppRoute::Home
            };
            return GuardDecision::RedirectTo(landing);
        }
        return GuardDecision::Allow;
    }
    GuardDecision::Allow
}

/// Guard a registered route.
pub fn authorize_route(route: AppRoute, session: &SessionRecord) -> GuardDecision {
    authorize(route.requirements(), session)
}
