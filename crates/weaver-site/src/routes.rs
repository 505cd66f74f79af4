//! Named routes of the Note Weaver site.

use std::fmt;

use url::Url;

use crate::error::DriverError;

/// A page of the site that steps navigate to or land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Site root.
    Landing,
    /// "About Us" page.
    About,
    /// Account registration form.
    Register,
    /// Login form, where registration redirects.
    Login,
}

impl Route {
    /// Path relative to the site base.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Landing => "/",
            Self::About => "/about",
            Self::Register => "/register",
            Self::Login => "/login",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Landing => "landing",
            Self::About => "about",
            Self::Register => "register",
            Self::Login => "login",
        };
        f.write_str(name)
    }
}

/// Resolves routes against the base URL of the site under test.
///
/// The base may carry a path prefix, e.g. `https://staging.example/weaver/`;
/// routes resolve beneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteRoutes {
    base: Url,
}

impl SiteRoutes {
    /// Parse the base URL.
    ///
    /// # Errors
    /// Returns [`DriverError::InvalidUrl`] when `base` is not an absolute
    /// http(s) URL.
    pub fn new(base: &str) -> Result<Self, DriverError> {
        let invalid = |source| DriverError::InvalidUrl {
            url: base.to_string(),
            source,
        };
        let mut url = Url::parse(base).map_err(invalid)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        url.set_query(None);
        url.set_fragment(None);
        Ok(Self { base: url })
    }

    /// Base URL with a trailing slash.
    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Absolute URL of `route`.
    ///
    /// # Errors
    /// Returns [`DriverError::InvalidUrl`] if the join fails.
    pub fn url_for(&self, route: Route) -> Result<Url, DriverError> {
        self.join(route.path())
    }

    /// Resolve a site-relative path such as `/about` beneath the base.
    ///
    /// # Errors
    /// Returns [`DriverError::InvalidUrl`] if the join fails.
    pub fn join(&self, path: &str) -> Result<Url, DriverError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|source| DriverError::InvalidUrl {
                url: path.to_string(),
                source,
            })
    }

    /// Whether `url` points at `route`, ignoring query, fragment and a
    /// trailing slash.
    #[must_use]
    pub fn is_route(&self, url: &Url, route: Route) -> bool {
        self.url_for(route).is_ok_and(|expected| {
            expected.origin() == url.origin()
                && expected.path().trim_end_matches('/') == url.path().trim_end_matches('/')
        })
    }

    /// Whether `url` shares the site's origin.
    #[must_use]
    pub fn is_internal(&self, url: &Url) -> bool {
        self.base.origin() == url.origin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn routes(base: &str) -> SiteRoutes {
        SiteRoutes::new(base).unwrap_or_else(|err| panic!("routes: {err}"))
    }

    fn url(text: &str) -> Url {
        Url::parse(text).unwrap_or_else(|err| panic!("url: {err}"))
    }

    #[rstest]
    #[case("http://127.0.0.1:5000", Route::Landing, "http://127.0.0.1:5000/")]
    #[case("http://127.0.0.1:5000", Route::About, "http://127.0.0.1:5000/about")]
    #[case("https://staging.example/weaver", Route::Login, "https://staging.example/weaver/login")]
    #[case("https://staging.example/weaver/?x=1", Route::Landing, "https://staging.example/weaver/")]
    fn resolves_routes(#[case] base: &str, #[case] route: Route, #[case] expected: &str) {
        let resolved = routes(base)
            .url_for(route)
            .unwrap_or_else(|err| panic!("url_for: {err}"));
        assert_eq!(resolved.as_str(), expected);
    }

    #[rstest]
    #[case("http://127.0.0.1:5000/about", Route::About, true)]
    #[case("http://127.0.0.1:5000/about/?tab=team#us", Route::About, true)]
    #[case("http://127.0.0.1:5000/", Route::Landing, true)]
    #[case("http://127.0.0.1:5000/about", Route::Landing, false)]
    #[case("http://localhost:5000/about", Route::About, false)]
    fn recognises_routes(#[case] candidate: &str, #[case] route: Route, #[case] expected: bool) {
        assert_eq!(
            routes("http://127.0.0.1:5000").is_route(&url(candidate), route),
            expected
        );
    }

    #[rstest]
    #[case("not a url")]
    #[case("ftp://127.0.0.1/")]
    fn rejects_unusable_bases(#[case] base: &str) {
        assert!(matches!(
            SiteRoutes::new(base),
            Err(DriverError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn distinguishes_internal_links() {
        let site = routes("http://127.0.0.1:5000");
        assert!(site.is_internal(&url("http://127.0.0.1:5000/register")));
        assert!(!site.is_internal(&url("https://www.kent.edu/cs")));
    }
}
