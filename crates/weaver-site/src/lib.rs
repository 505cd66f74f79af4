//! Page driver and step definitions for the Note Weaver landing site.
//!
//! [`register_site_steps`] binds the natural-language steps used by the
//! acceptance features to handlers working on a [`SiteWorld`]. The world
//! wraps any [`PageDriver`]; [`HttpDriver`] talks to a running instance of the
//! site over HTTP.

pub mod driver;
mod error;
mod routes;
mod steps;
mod world;

use weaver_bdd::{RegistryError, StepRegistry};

pub use driver::{DriverConfig, Form, FormMethod, HttpDriver, Image, Page, PageDriver, Resource};
pub use error::DriverError;
pub use routes::{Route, SiteRoutes};
pub use steps::{
    LOGO_ID, NAVBAR_SELECTOR, REGISTER_FORM_SELECTOR, REGISTER_SUBMIT, register_site_steps,
};
pub use world::{Account, COMPANY_NAME, SiteWorld};

/// Build a registry holding every site step.
///
/// # Errors
/// Returns [`RegistryError`] if a pattern fails to compile.
pub fn site_registry<D>() -> Result<StepRegistry<SiteWorld<D>>, RegistryError>
where
    D: PageDriver + 'static,
{
    let mut registry = StepRegistry::new();
    register_site_steps(&mut registry)?;
    Ok(registry)
}

/// Factory producing a world with a fresh [`HttpDriver`] for each scenario.
pub fn http_world_factory(
    routes: SiteRoutes,
    config: DriverConfig,
) -> impl Fn() -> Result<SiteWorld<HttpDriver>, DriverError> + Send + Sync + 'static {
    move || HttpDriver::new(&config).map(|driver| SiteWorld::new(driver, routes.clone()))
}
