//! Per-scenario state shared by the site steps.

use tracing::debug;

use crate::driver::{Page, PageDriver};
use crate::error::DriverError;
use crate::routes::{Route, SiteRoutes};

/// Company name shown in the site header.
pub const COMPANY_NAME: &str = "Note Weaver";

/// Credentials used when a scenario registers an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Email address.
    pub email: String,
    /// Display name.
    pub username: String,
    /// Password, also sent as the confirmation.
    pub password: String,
}

impl Default for Account {
    fn default() -> Self {
        Self {
            email: "exampleuser@exampleuser.com".to_string(),
            username: "exampleusername".to_string(),
            password: "ExamplePa33word!".to_string(),
        }
    }
}

/// World handed to every site step: one driver, the route table and the
/// account a scenario registers with.
#[derive(Debug)]
pub struct SiteWorld<D> {
    driver: D,
    routes: SiteRoutes,
    account: Account,
}

impl<D: PageDriver> SiteWorld<D> {
    /// Wrap a fresh driver.
    #[must_use]
    pub fn new(driver: D, routes: SiteRoutes) -> Self {
        Self {
            driver,
            routes,
            account: Account::default(),
        }
    }

    /// Replace the registration credentials.
    #[must_use]
    pub fn with_account(mut self, account: Account) -> Self {
        self.account = account;
        self
    }

    /// Underlying driver.
    #[must_use]
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Underlying driver, mutably.
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Route table of the site under test.
    #[must_use]
    pub fn routes(&self) -> &SiteRoutes {
        &self.routes
    }

    /// Registration credentials.
    #[must_use]
    pub fn account(&self) -> &Account {
        &self.account
    }

    /// The current page.
    ///
    /// # Errors
    /// Returns [`DriverError::NoPage`] before the first navigation.
    pub fn page(&self) -> Result<&Page, DriverError> {
        self.driver.page()
    }

    /// Navigate to a named route.
    ///
    /// # Errors
    /// Propagates URL and transport failures.
    pub async fn open(&mut self, route: Route) -> Result<&Page, DriverError> {
        let url = self.routes.url_for(route)?;
        debug!(%route, %url, "opening route");
        self.driver.visit(url).await
    }

    /// Whether the current page is `route`.
    #[must_use]
    pub fn is_on(&self, route: Route) -> bool {
        self.driver
            .page()
            .is_ok_and(|page| self.routes.is_route(page.url(), route))
    }
}
