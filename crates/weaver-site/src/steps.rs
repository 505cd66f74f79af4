//! Step definitions for the Note Weaver site.
//!
//! Every handler works on a [`SiteWorld`] and reports unmet expectations as
//! [`StepError::Assertion`] so the report reads as a sentence about the site.

use tracing::{debug, warn};
use url::Url;
use weaver_bdd::{RegistryError, StepArgs, StepError, StepFuture, StepOutcome, StepRegistry};

use crate::driver::PageDriver;
use crate::routes::Route;
use crate::world::{COMPANY_NAME, SiteWorld};

/// CSS selector of the site's navigation bar.
pub const NAVBAR_SELECTOR: &str = ".navbar";
/// `id` of the company logo image.
pub const LOGO_ID: &str = "company logo";
/// Selector of the registration form.
pub const REGISTER_FORM_SELECTOR: &str = "form";
/// Name of the registration form's submit control.
pub const REGISTER_SUBMIT: &str = "submit";

/// Register every site step with `registry`.
///
/// # Errors
/// Returns [`RegistryError`] if a pattern fails to compile.
pub fn register_site_steps<D>(
    registry: &mut StepRegistry<SiteWorld<D>>,
) -> Result<(), RegistryError>
where
    D: PageDriver + 'static,
{
    registry.given("I am on the landing page", on_landing_page::<D>)?;
    registry.given("I am on the about page", on_about_page::<D>)?;
    registry.given("I am registered", registered::<D>)?;
    registry.given("I am logged in", logged_in::<D>)?;
    registry.given("I am not logged in", not_logged_in::<D>)?;
    registry.then("I see the company name", sees_company_name::<D>)?;
    registry.then(r#"I see the text "{text}""#, sees_text::<D>)?;
    registry.then(r#"I can see the text "{text}""#, sees_text::<D>)?;
    registry.then(r#"I see a link to "{link}""#, sees_link::<D>)?;
    registry.then("I see the navigation bar", sees_navbar::<D>)?;
    registry.then("I can navigate to other pages", navigates_from_navbar::<D>)?;
    registry.then("I see the image company logo", sees_logo::<D>)?;
    Ok(())
}

async fn arrive<D: PageDriver>(world: &mut SiteWorld<D>, route: Route) -> Result<(), StepError> {
    let page = world.open(route).await?;
    if !page.is_success() {
        return Err(StepError::assertion(format!(
            "{route} page returned status {} at {}",
            page.status(),
            page.url()
        )));
    }
    if !world.is_on(route) {
        let landed = world.page()?.url().to_string();
        return Err(StepError::assertion(format!(
            "expected the {route} page but landed on {landed}"
        )));
    }
    Ok(())
}

fn on_landing_page<'a, D: PageDriver>(
    world: &'a mut SiteWorld<D>,
    _args: &'a StepArgs,
) -> StepFuture<'a> {
    Box::pin(async move {
        arrive(world, Route::Landing).await?;
        Ok(StepOutcome::Done)
    })
}

fn on_about_page<'a, D: PageDriver>(
    world: &'a mut SiteWorld<D>,
    _args: &'a StepArgs,
) -> StepFuture<'a> {
    Box::pin(async move {
        arrive(world, Route::About).await?;
        Ok(StepOutcome::Done)
    })
}

fn require_text<D: PageDriver>(world: &SiteWorld<D>, text: &str) -> Result<(), StepError> {
    let page = world.page()?;
    if page.contains_text(text) {
        Ok(())
    } else {
        Err(StepError::assertion(format!(
            "text '{text}' not found on {}",
            page.url()
        )))
    }
}

fn sees_company_name<'a, D: PageDriver>(
    world: &'a mut SiteWorld<D>,
    _args: &'a StepArgs,
) -> StepFuture<'a> {
    Box::pin(async move {
        require_text(world, COMPANY_NAME)?;
        Ok(StepOutcome::Done)
    })
}

fn sees_text<'a, D: PageDriver>(world: &'a mut SiteWorld<D>, args: &'a StepArgs) -> StepFuture<'a> {
    Box::pin(async move {
        require_text(world, args.require("text")?)?;
        Ok(StepOutcome::Done)
    })
}

fn sees_link<'a, D: PageDriver>(world: &'a mut SiteWorld<D>, args: &'a StepArgs) -> StepFuture<'a> {
    Box::pin(async move {
        let link = args.require("link")?;
        let page = world.page()?;
        if !page.has_link_to(link) {
            return Err(StepError::assertion(format!(
                "no link to '{link}' on {}",
                page.url()
            )));
        }
        Ok(StepOutcome::Done)
    })
}

fn sees_navbar<'a, D: PageDriver>(
    world: &'a mut SiteWorld<D>,
    _args: &'a StepArgs,
) -> StepFuture<'a> {
    Box::pin(async move {
        let page = world.page()?;
        if !page.has_element(NAVBAR_SELECTOR)? {
            return Err(StepError::assertion(format!(
                "navigation bar '{NAVBAR_SELECTOR}' not found on {}",
                page.url()
            )));
        }
        Ok(StepOutcome::Done)
    })
}

fn navigates_from_navbar<'a, D: PageDriver>(
    world: &'a mut SiteWorld<D>,
    _args: &'a StepArgs,
) -> StepFuture<'a> {
    Box::pin(async move {
        let links = world.page()?.links_within(NAVBAR_SELECTOR)?;
        if links.is_empty() {
            return Err(StepError::assertion("navigation bar has no links"));
        }
        for link in &links {
            if !world.routes().is_internal(link) {
                debug!(%link, "not following external navigation link");
                continue;
            }
            let resource = world.driver().fetch(link.clone()).await?;
            if !resource.is_success() {
                warn!(%link, status = resource.status, "navigation link is broken");
                return Err(StepError::assertion(format!(
                    "navigation link {link} returned status {}",
                    resource.status
                )));
            }
        }
        let about = find_route(world, &links, Route::About)
            .ok_or_else(|| StepError::assertion("navigation bar has no link to the about page"))?;
        world.driver_mut().visit(about).await?;
        if !world.is_on(Route::About) {
            let landed = world.page()?.url().to_string();
            return Err(StepError::assertion(format!(
                "about link landed on {landed}"
            )));
        }
        Ok(StepOutcome::Done)
    })
}

fn find_route<D: PageDriver>(world: &SiteWorld<D>, links: &[Url], route: Route) -> Option<Url> {
    links
        .iter()
        .find(|link| world.routes().is_route(link, route))
        .cloned()
}

fn sees_logo<'a, D: PageDriver>(
    world: &'a mut SiteWorld<D>,
    _args: &'a StepArgs,
) -> StepFuture<'a> {
    Box::pin(async move {
        let page = world.page()?;
        let image = page.image_by_id(LOGO_ID).ok_or_else(|| {
            StepError::assertion(format!("image '{LOGO_ID}' not found on {}", page.url()))
        })?;
        let src = image
            .src
            .ok_or_else(|| StepError::assertion(format!("image '{LOGO_ID}' has no usable src")))?;
        let resource = world.driver().fetch(src.clone()).await?;
        if !resource.is_success() {
            return Err(StepError::assertion(format!(
                "image '{LOGO_ID}' at {src} returned status {}",
                resource.status
            )));
        }
        if let Some(kind) = resource
            .content_type
            .as_deref()
            .filter(|kind| !is_image_type(kind))
        {
            return Err(StepError::assertion(format!(
                "image '{LOGO_ID}' at {src} was served as '{kind}'"
            )));
        }
        if resource.len == 0 {
            return Err(StepError::assertion(format!(
                "image '{LOGO_ID}' at {src} is empty"
            )));
        }
        Ok(StepOutcome::Done)
    })
}

fn is_image_type(content_type: &str) -> bool {
    content_type
        .trim_start()
        .to_ascii_lowercase()
        .starts_with("image/")
}

fn registered<'a, D: PageDriver>(
    world: &'a mut SiteWorld<D>,
    _args: &'a StepArgs,
) -> StepFuture<'a> {
    Box::pin(async move {
        arrive(world, Route::Register).await?;
        let account = world.account().clone();
        let form = world
            .page()?
            .form(REGISTER_FORM_SELECTOR)?
            .fill("email", &account.email)
            .fill("username", &account.username)
            .fill("password", &account.password)
            .fill("password_confirm", &account.password)
            .press(REGISTER_SUBMIT);
        let page = world.driver_mut().submit(form).await?;
        let (status, landed) = (page.status(), page.url().to_string());
        if !world.is_on(Route::Login) {
            return Err(StepError::assertion(format!(
                "registration as '{}' landed on {landed} with status {status}",
                account.username
            )));
        }
        Ok(StepOutcome::Done)
    })
}

fn logged_in<'a, D: PageDriver>(
    _world: &'a mut SiteWorld<D>,
    _args: &'a StepArgs,
) -> StepFuture<'a> {
    Box::pin(async { Ok(StepOutcome::pending("login flow is not automated yet")) })
}

fn not_logged_in<'a, D: PageDriver>(
    _world: &'a mut SiteWorld<D>,
    _args: &'a StepArgs,
) -> StepFuture<'a> {
    Box::pin(async { Ok(StepOutcome::pending("logout flow is not automated yet")) })
}
