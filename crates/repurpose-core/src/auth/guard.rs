use tracing::warn;

use crate::storage::{SharedStorage, ACCESS_TOKEN_KEY};

/// Application routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Root,
    Login,
    Register,
    Dashboard,
    NewProject,
    ContentLibrary,
    Settings,
}

impl Route {
    pub const ALL: [Route; 7] = [
        Route::Root,
        Route::Login,
        Route::Register,
        Route::Dashboard,
        Route::NewProject,
        Route::ContentLibrary,
        Route::Settings,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Root => "/",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
            Route::NewProject => "/new-project",
            Route::ContentLibrary => "/content-library",
            Route::Settings => "/settings",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.path() == path)
    }

    pub fn is_protected(&self) -> bool {
        matches!(
            self,
            Route::Dashboard | Route::NewProject | Route::ContentLibrary | Route::Settings
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Render,
    Redirect(Route),
}

/// Decides whether a route may render, based only on whether an access
/// token is stored. The token is not validated and no request is made.
#[derive(Clone)]
pub struct RouteGuard {
    storage: SharedStorage,
}

impl RouteGuard {
    pub fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }

    pub fn has_token(&self) -> bool {
        match self.storage.contains(ACCESS_TOKEN_KEY) {
            Ok(present) => present,
            Err(e) => {
                warn!(error = %e, "Failed to read session storage, treating as signed out");
                false
            }
        }
    }

    pub fn decide(&self, route: Route) -> RouteDecision {
        let has_token = self.has_token();
        match route {
            Route::Root if has_token => RouteDecision::Redirect(Route::Dashboard),
            Route::Root => RouteDecision::Redirect(Route::Login),
            Route::Login | Route::Register if has_token => {
                RouteDecision::Redirect(Route::Dashboard)
            }
            r if r.is_protected() && !has_token => RouteDecision::Redirect(Route::Login),
            _ => RouteDecision::Render,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::storage::{MemoryStorage, Storage};

    fn guard() -> (RouteGuard, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        (RouteGuard::new(storage.clone()), storage)
    }

    #[test]
    fn test_protected_routes_need_token() {
        let (guard, storage) = guard();
        for route in [Route::Dashboard, Route::NewProject, Route::ContentLibrary, Route::Settings] {
            assert_eq!(guard.decide(route), RouteDecision::Redirect(Route::Login));
        }

        storage.set(ACCESS_TOKEN_KEY, "anything").unwrap();
        for route in [Route::Dashboard, Route::NewProject, Route::ContentLibrary, Route::Settings] {
            assert_eq!(guard.decide(route), RouteDecision::Render);
        }
    }

    #[test]
    fn test_root_redirects() {
        let (guard, storage) = guard();
        assert_eq!(guard.decide(Route::Root), RouteDecision::Redirect(Route::Login));
        storage.set(ACCESS_TOKEN_KEY, "A").unwrap();
        assert_eq!(guard.decide(Route::Root), RouteDecision::Redirect(Route::Dashboard));
    }

    #[test]
    fn test_login_skipped_when_signed_in() {
        let (guard, storage) = guard();
        assert_eq!(guard.decide(Route::Login), RouteDecision::Render);
        assert_eq!(guard.decide(Route::Register), RouteDecision::Render);
        storage.set(ACCESS_TOKEN_KEY, "A").unwrap();
        assert_eq!(guard.decide(Route::Login), RouteDecision::Redirect(Route::Dashboard));
        assert_eq!(guard.decide(Route::Register), RouteDecision::Redirect(Route::Dashboard));
    }

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::from_path("/content-library"), Some(Route::ContentLibrary));
        assert_eq!(Route::from_path("/nope"), None);
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
    }
}
