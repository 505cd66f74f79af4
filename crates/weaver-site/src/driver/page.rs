//! A loaded page and the HTML queries steps make against it.
//!
//! The body is kept as text and parsed on each query. `scraper::Html` is not
//! `Send`, so it never lives across an await point inside a step.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::DriverError;

const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "br", "dd", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "html", "li", "main", "nav", "ol", "option", "p", "pre", "section", "table",
    "td", "th", "tr", "ul",
];

/// Response of the last navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    url: Url,
    status: u16,
    content_type: Option<String>,
    body: String,
}

impl Page {
    /// Build a page from a response that has already been read.
    #[must_use]
    pub fn new(url: Url, status: u16, content_type: Option<String>, body: String) -> Self {
        Self {
            url,
            status,
            content_type,
            body,
        }
    }

    /// Final URL after redirects.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// HTTP status code.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `Content-Type` header, when sent.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Raw response body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    fn document(&self) -> Html {
        Html::parse_document(&self.body)
    }

    /// Visible text of the page with runs of whitespace collapsed.
    ///
    /// Inline elements join their neighbours directly; block elements and
    /// `<br>` separate text with a space.
    #[must_use]
    pub fn visible_text(&self) -> String {
        let document = self.document();
        let mut text = String::new();
        push_visible_text(document.root_element(), &mut text);
        collapse_whitespace(&text)
    }

    /// Whether `needle` occurs in the visible text. Whitespace in both sides
    /// is normalised first, so text split across inline elements still
    /// matches.
    #[must_use]
    pub fn contains_text(&self, needle: &str) -> bool {
        self.visible_text().contains(&collapse_whitespace(needle))
    }

    /// Whether an anchor on the page points at `href`.
    ///
    /// Matches the attribute verbatim or after resolving both sides against
    /// the page URL.
    #[must_use]
    pub fn has_link_to(&self, href: &str) -> bool {
        let wanted = self.url.join(href).ok();
        let document = self.document();
        let Ok(anchors) = Selector::parse("a[href]") else {
            return false;
        };
        document
            .select(&anchors)
            .filter_map(|anchor| anchor.value().attr("href"))
            .map(str::trim)
            .any(|candidate| {
                candidate == href
                    || wanted.as_ref().is_some_and(|wanted| {
                        self.url.join(candidate).is_ok_and(|resolved| &resolved == wanted)
                    })
            })
    }

    /// Whether any element matches the CSS selector.
    ///
    /// # Errors
    /// Returns [`DriverError::InvalidSelector`] for malformed selectors.
    pub fn has_element(&self, css: &str) -> Result<bool, DriverError> {
        let selector = parse_selector(css)?;
        Ok(self.document().select(&selector).next().is_some())
    }

    /// Navigable links inside elements matching `css`, resolved against the
    /// page URL, in document order and without repeats.
    ///
    /// Fragment-only, `javascript:`, `mailto:` and `tel:` links are skipped.
    ///
    /// # Errors
    /// Returns [`DriverError::InvalidSelector`] for malformed selectors.
    pub fn links_within(&self, css: &str) -> Result<Vec<Url>, DriverError> {
        let container = parse_selector(css)?;
        let anchors = parse_selector("a[href]")?;
        let document = self.document();
        let mut links: Vec<Url> = Vec::new();
        for scope in document.select(&container) {
            for anchor in scope.select(&anchors) {
                let Some(url) = anchor
                    .value()
                    .attr("href")
                    .and_then(|href| self.resolve_navigable(href))
                else {
                    continue;
                };
                if !links.contains(&url) {
                    links.push(url);
                }
            }
        }
        Ok(links)
    }

    fn resolve_navigable(&self, href: &str) -> Option<Url> {
        let href = href.trim();
        if href.is_empty() || href.starts_with('#') {
            return None;
        }
        let url = self.url.join(href).ok()?;
        matches!(url.scheme(), "http" | "https").then_some(url)
    }

    /// The `<img>` whose `id` attribute equals `id`.
    ///
    /// Ids are compared verbatim rather than through a selector because the
    /// site uses ids containing spaces.
    #[must_use]
    pub fn image_by_id(&self, id: &str) -> Option<Image> {
        let document = self.document();
        let images = Selector::parse("img").ok()?;
        document
            .select(&images)
            .find(|img| img.value().id() == Some(id))
            .map(|img| Image {
                src: img
                    .value()
                    .attr("src")
                    .and_then(|src| self.url.join(src.trim()).ok()),
                alt: img.value().attr("alt").map(str::to_owned),
            })
    }

    /// The first form matching `css`, with its current field values.
    ///
    /// # Errors
    /// Returns [`DriverError::InvalidSelector`] for malformed selectors and
    /// [`DriverError::FormNotFound`] when nothing matches.
    pub fn form(&self, css: &str) -> Result<Form, DriverError> {
        let selector = parse_selector(css)?;
        let document = self.document();
        let element = document
            .select(&selector)
            .find(|el| el.value().name() == "form")
            .ok_or_else(|| DriverError::FormNotFound(css.to_string()))?;
        let action = element
            .value()
            .attr("action")
            .map(str::trim)
            .filter(|action| !action.is_empty())
            .map_or_else(
                || Ok(self.url.clone()),
                |action| {
                    self.url.join(action).map_err(|source| DriverError::InvalidUrl {
                        url: action.to_string(),
                        source,
                    })
                },
            )?;
        let method = element
            .value()
            .attr("method")
            .map_or(FormMethod::Get, FormMethod::from_attr);
        Ok(Form {
            action,
            method,
            fields: collect_fields(element)?,
            submitted_with: None,
        })
    }
}

/// An `<img>` element found on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Resolved `src`, if present and valid.
    pub src: Option<Url>,
    /// `alt` text.
    pub alt: Option<String>,
}

/// Form submission method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMethod {
    /// Encode fields in the query string.
    Get,
    /// Send fields as `application/x-www-form-urlencoded`.
    Post,
}

impl FormMethod {
    fn from_attr(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("post") {
            Self::Post
        } else {
            Self::Get
        }
    }
}

/// A form ready to be filled in and submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    action: Url,
    method: FormMethod,
    fields: Vec<Field>,
    submitted_with: Option<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Field {
    name: String,
    value: String,
    submit: bool,
}

impl Form {
    /// Resolved `action` URL.
    #[must_use]
    pub fn action(&self) -> &Url {
        &self.action
    }

    /// Submission method.
    #[must_use]
    pub fn method(&self) -> FormMethod {
        self.method
    }

    /// Current value of a field.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| !field.submit && field.name == name)
            .map(|field| field.value.as_str())
    }

    /// Set a field, adding it when the form does not declare it.
    #[must_use]
    pub fn fill(mut self, name: &str, value: &str) -> Self {
        let existing = self
            .fields
            .iter_mut()
            .find(|field| !field.submit && field.name == name);
        let Some(field) = existing else {
            self.fields.push(Field {
                name: name.to_string(),
                value: value.to_string(),
                submit: false,
            });
            return self;
        };
        field.value = value.to_string();
        self
    }

    /// Choose the submit control named `name`; its value is sent along with
    /// the fields. Unknown names are sent with an empty value.
    #[must_use]
    pub fn press(mut self, name: &str) -> Self {
        let value = self
            .fields
            .iter()
            .find(|field| field.submit && field.name == name)
            .map(|field| field.value.clone())
            .unwrap_or_default();
        self.submitted_with = Some((name.to_string(), value));
        self
    }

    /// Name/value pairs sent on submission, in document order.
    #[must_use]
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .filter(|field| !field.submit)
            .map(|field| (field.name.clone(), field.value.clone()))
            .chain(self.submitted_with.clone())
            .collect()
    }
}

fn collect_fields(form: ElementRef<'_>) -> Result<Vec<Field>, DriverError> {
    let controls = parse_selector("input[name], textarea[name], select[name]")?;
    let mut fields = Vec::new();
    for control in form.select(&controls) {
        let element = control.value();
        let Some(name) = element.attr("name") else {
            continue;
        };
        let kind = element
            .attr("type")
            .unwrap_or("text")
            .to_ascii_lowercase();
        let field = match (element.name(), kind.as_str()) {
            ("input", "submit" | "button" | "image") => Field {
                name: name.to_string(),
                value: element.attr("value").unwrap_or_default().to_string(),
                submit: true,
            },
            ("input", "reset" | "file") => continue,
            ("input", "checkbox" | "radio") if element.attr("checked").is_none() => continue,
            ("input", "checkbox" | "radio") => Field {
                name: name.to_string(),
                value: element.attr("value").unwrap_or("on").to_string(),
                submit: false,
            },
            ("input", _) => Field {
                name: name.to_string(),
                value: element.attr("value").unwrap_or_default().to_string(),
                submit: false,
            },
            ("select", _) => Field {
                name: name.to_string(),
                value: selected_option(control),
                submit: false,
            },
            _ => Field {
                name: name.to_string(),
                value: control.text().collect(),
                submit: false,
            },
        };
        fields.push(field);
    }
    Ok(fields)
}

fn selected_option(select: ElementRef<'_>) -> String {
    let Ok(options) = Selector::parse("option") else {
        return String::new();
    };
    let mut all = select.select(&options);
    let first = all.next();
    let chosen = first
        .into_iter()
        .chain(all)
        .find(|option| option.value().attr("selected").is_some())
        .or(first);
    chosen.map_or_else(String::new, |option| {
        option
            .value()
            .attr("value")
            .map_or_else(|| option.text().collect(), str::to_owned)
    })
}

fn parse_selector(css: &str) -> Result<Selector, DriverError> {
    Selector::parse(css).map_err(|err| DriverError::InvalidSelector {
        selector: css.to_string(),
        reason: err.to_string(),
    })
}

fn push_visible_text(element: ElementRef<'_>, out: &mut String) {
    let name = element.value().name();
    if HIDDEN_ELEMENTS.contains(&name) {
        return;
    }
    let block = BLOCK_ELEMENTS.contains(&name);
    if block {
        out.push(' ');
    }
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(child) {
            push_visible_text(child, out);
        }
    }
    if block {
        out.push(' ');
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
