use crate::session::IdentityState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Home,
    Swipe,
    Matches,
    Analytics,
    Upload,
}

impl Route {
    pub const ALL: [Route; 6] = [
        Route::Login,
        Route::Home,
        Route::Swipe,
        Route::Matches,
        Route::Analytics,
        Route::Upload,
    ];

    /// Exact path match; a trailing slash is tolerated.
    pub fn parse(path: &str) -> Option<Route> {
        let trimmed = path.trim();
        let path = match trimmed.trim_end_matches('/') {
            "" => "/",
            other => other,
        };
        Route::ALL.into_iter().find(|route| route.path() == path)
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Home => "/",
            Route::Swipe => "/swipe",
            Route::Matches => "/matches",
            Route::Analytics => "/analytics",
            Route::Upload => "/upload",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Login => "Name Picker",
            Route::Home => "Name Picker",
            Route::Swipe => "Swipe Names",
            Route::Matches => "Your Matches",
            Route::Analytics => "Analytics",
            Route::Upload => "Upload Names",
        }
    }

    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login)
    }
}

/// What the view layer should do for a requested path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Identity still resolving: show a loading placeholder.
    Placeholder,
    Redirect(Route),
    Render(Route),
}

pub fn resolve(path: &str, identity: &IdentityState) -> Resolution {
    let Some(route) = Route::parse(path) else {
        return Resolution::Redirect(Route::Home);
    };

    if !route.is_protected() {
        return Resolution::Render(route);
    }

    match identity {
        IdentityState::Resolving => Resolution::Placeholder,
        IdentityState::SignedOut => Resolution::Redirect(Route::Login),
        IdentityState::SignedIn(_) => Resolution::Render(route),
    }
}
