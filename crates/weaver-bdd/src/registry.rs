//! Step registration and lookup.
//!
//! A [`StepRegistry`] owns the step definitions for one world type. Lookup is
//! keyword-strict: a `Then` step only matches definitions registered for
//! `Then`. When several patterns match, the most specific one wins and a tie
//! is reported as ambiguous rather than resolved by registration order.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use weaver_patterns::{PatternError, StepKeyword, StepPattern};

use crate::feature::{Feature, Scenario, Step};
use crate::step::{StepArgs, StepFuture, StepHandler};

/// Errors raised while registering step definitions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// The pattern text is malformed.
    #[error("invalid step pattern '{pattern}' at {location}: {source}")]
    InvalidPattern {
        /// Pattern as written.
        pattern: String,
        /// Registration site.
        location: String,
        /// Underlying pattern error.
        #[source]
        source: PatternError,
    },
    /// `And`/`But` only continue another keyword and cannot own a definition.
    #[error("cannot register a step for conjunction keyword '{0}'")]
    ConjunctionKeyword(StepKeyword),
}

/// Why a step could not be bound to a single definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No definition matches the step.
    #[error("no step definition matches {keyword} '{text}'")]
    Undefined {
        /// Resolved keyword of the step.
        keyword: StepKeyword,
        /// Step text.
        text: String,
    },
    /// Several equally specific definitions match the step.
    #[error("step {keyword} '{text}' is ambiguous between {}", .patterns.join(", "))]
    Ambiguous {
        /// Resolved keyword of the step.
        keyword: StepKeyword,
        /// Step text.
        text: String,
        /// Competing patterns with their registration sites.
        patterns: Vec<String>,
    },
}

/// A registered step definition.
pub struct StepDefinition<W> {
    keyword: StepKeyword,
    pattern: StepPattern,
    handler: StepHandler<W>,
    location: &'static Location<'static>,
}

impl<W> StepDefinition<W> {
    /// Keyword the definition answers to.
    #[must_use]
    pub fn keyword(&self) -> StepKeyword {
        self.keyword
    }

    /// Compiled pattern.
    #[must_use]
    pub fn pattern(&self) -> &StepPattern {
        &self.pattern
    }

    /// Source file of the registration call.
    #[must_use]
    pub fn file(&self) -> &'static str {
        self.location.file()
    }

    /// Line of the registration call.
    #[must_use]
    pub fn line(&self) -> u32 {
        self.location.line()
    }

    /// Invoke the handler.
    pub fn call<'a>(&self, world: &'a mut W, args: &'a StepArgs) -> StepFuture<'a> {
        (self.handler)(world, args)
    }
}

impl<W> fmt::Debug for StepDefinition<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDefinition")
            .field("keyword", &self.keyword)
            .field("pattern", &self.pattern.as_str())
            .field("location", &format_args!("{}", self.location))
            .finish_non_exhaustive()
    }
}

impl<W> fmt::Display for StepDefinition<W> {
    /// Renders as `Keyword 'pattern' (file:line)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} '{}' ({}:{})",
            self.keyword,
            self.pattern.as_str(),
            self.file(),
            self.line()
        )
    }
}

/// A step bound to its definition.
#[derive(Debug)]
pub struct Resolved<'r, W> {
    /// Matching definition.
    pub definition: &'r StepDefinition<W>,
    /// Captured values plus the step's attachments.
    pub args: StepArgs,
}

/// A feature step without a single matching definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnboundStep {
    /// Feature file.
    pub path: std::path::PathBuf,
    /// Line of the step.
    pub line: usize,
    /// Why binding failed.
    pub error: ResolveError,
}

impl fmt::Display for UnboundStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.path.display(), self.line, self.error)
    }
}

/// Step definitions for world type `W`.
pub struct StepRegistry<W> {
    definitions: Vec<StepDefinition<W>>,
}

impl<W> Default for StepRegistry<W> {
    fn default() -> Self {
        Self {
            definitions: Vec::new(),
        }
    }
}

impl<W> fmt::Debug for StepRegistry<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.definitions).finish()
    }
}

impl<W> StepRegistry<W> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `keyword` steps matching `pattern`.
    ///
    /// The caller's source location is recorded for listings and
    /// diagnostics.
    ///
    /// # Errors
    /// Returns [`RegistryError`] when the pattern is malformed or `keyword`
    /// is a conjunction.
    #[track_caller]
    pub fn register<F>(
        &mut self,
        keyword: StepKeyword,
        pattern: &str,
        handler: F,
    ) -> Result<(), RegistryError>
    where
        F: for<'a> Fn(&'a mut W, &'a StepArgs) -> StepFuture<'a> + Send + Sync + 'static,
    {
        let location = Location::caller();
        if keyword.is_conjunction() {
            return Err(RegistryError::ConjunctionKeyword(keyword));
        }
        let pattern =
            StepPattern::new(pattern).map_err(|source| RegistryError::InvalidPattern {
                pattern: pattern.to_string(),
                location: location.to_string(),
                source,
            })?;
        self.definitions.push(StepDefinition {
            keyword,
            pattern,
            handler: Arc::new(handler),
            location,
        });
        Ok(())
    }

    /// Register a `Given` step.
    ///
    /// # Errors
    /// See [`StepRegistry::register`].
    #[track_caller]
    pub fn given<F>(&mut self, pattern: &str, handler: F) -> Result<(), RegistryError>
    where
        F: for<'a> Fn(&'a mut W, &'a StepArgs) -> StepFuture<'a> + Send + Sync + 'static,
    {
        self.register(StepKeyword::Given, pattern, handler)
    }

    /// Register a `When` step.
    ///
    /// # Errors
    /// See [`StepRegistry::register`].
    #[track_caller]
    pub fn when<F>(&mut self, pattern: &str, handler: F) -> Result<(), RegistryError>
    where
        F: for<'a> Fn(&'a mut W, &'a StepArgs) -> StepFuture<'a> + Send + Sync + 'static,
    {
        self.register(StepKeyword::When, pattern, handler)
    }

    /// Register a `Then` step.
    ///
    /// # Errors
    /// See [`StepRegistry::register`].
    #[track_caller]
    pub fn then<F>(&mut self, pattern: &str, handler: F) -> Result<(), RegistryError>
    where
        F: for<'a> Fn(&'a mut W, &'a StepArgs) -> StepFuture<'a> + Send + Sync + 'static,
    {
        self.register(StepKeyword::Then, pattern, handler)
    }

    /// Definitions in registration order.
    #[must_use]
    pub fn definitions(&self) -> &[StepDefinition<W>] {
        &self.definitions
    }

    /// Bind step text to the most specific matching definition.
    ///
    /// Conjunction keywords are treated as `Given`; callers normally pass the
    /// resolved keyword of a feature step.
    ///
    /// # Errors
    /// Returns [`ResolveError::Undefined`] when nothing matches and
    /// [`ResolveError::Ambiguous`] when the best matches tie on specificity.
    pub fn resolve(
        &self,
        keyword: StepKeyword,
        text: &str,
    ) -> Result<Resolved<'_, W>, ResolveError> {
        let keyword = keyword.resolve(&mut None);
        let mut candidates: Vec<(&StepDefinition<W>, Vec<String>)> = self
            .definitions
            .iter()
            .filter(|def| def.keyword == keyword)
            .filter_map(|def| def.pattern.captures(text).map(|values| (def, values)))
            .collect();
        candidates.sort_by(|(a, _), (b, _)| b.pattern.specificity().cmp(&a.pattern.specificity()));

        let mut ranked = candidates.into_iter();
        let Some((best, values)) = ranked.next() else {
            return Err(ResolveError::Undefined {
                keyword,
                text: text.to_string(),
            });
        };
        let tied: Vec<&StepDefinition<W>> = ranked
            .map(|(def, _)| def)
            .take_while(|def| def.pattern.specificity() == best.pattern.specificity())
            .collect();
        if !tied.is_empty() {
            return Err(ResolveError::Ambiguous {
                keyword,
                text: text.to_string(),
                patterns: std::iter::once(best)
                    .chain(tied)
                    .map(|def| format!("'{}' ({}:{})", def.pattern, def.file(), def.line()))
                    .collect(),
            });
        }
        Ok(Resolved {
            definition: best,
            args: StepArgs::new(best.pattern.placeholders().to_vec(), values),
        })
    }

    /// Bind a feature step, carrying its doc string and table into the
    /// arguments.
    ///
    /// # Errors
    /// See [`StepRegistry::resolve`].
    pub fn resolve_step(&self, step: &Step) -> Result<Resolved<'_, W>, ResolveError> {
        let mut resolved = self.resolve(step.resolved, &step.text)?;
        resolved.args = resolved
            .args
            .with_attachments(step.docstring.clone(), step.table.clone());
        Ok(resolved)
    }

    /// Groups of definitions sharing a keyword and whitespace-normalised
    /// pattern, in registration order.
    #[must_use]
    pub fn duplicates(&self) -> Vec<Vec<&StepDefinition<W>>> {
        let mut order = Vec::new();
        let mut groups: HashMap<(StepKeyword, String), Vec<&StepDefinition<W>>> = HashMap::new();
        for def in &self.definitions {
            let key = (def.keyword, def.pattern.normalised());
            let group = groups.entry(key.clone()).or_default();
            if group.is_empty() {
                order.push(key);
            }
            group.push(def);
        }
        order
            .into_iter()
            .filter_map(|key| groups.remove(&key))
            .filter(|group| group.len() > 1)
            .collect()
    }

    /// Definitions that no step in `features` resolves to.
    #[must_use]
    pub fn unused(&self, features: &[Feature]) -> Vec<&StepDefinition<W>> {
        let used: BTreeSet<usize> = all_steps(features)
            .filter_map(|(_, step)| self.resolve(step.resolved, &step.text).ok())
            .filter_map(|resolved| {
                self.definitions
                    .iter()
                    .position(|def| std::ptr::eq(def, resolved.definition))
            })
            .collect();
        self.definitions
            .iter()
            .enumerate()
            .filter(|(index, _)| !used.contains(index))
            .map(|(_, def)| def)
            .collect()
    }

    /// Steps in `features` that are undefined or ambiguous.
    ///
    /// Background steps are reported once per feature, not once per
    /// scenario.
    #[must_use]
    pub fn unbound_steps(&self, features: &[Feature]) -> Vec<UnboundStep> {
        let mut seen = BTreeSet::new();
        all_steps(features)
            .filter(|(feature, step)| seen.insert((feature.path.clone(), step.line, step.text.clone())))
            .filter_map(|(feature, step)| {
                self.resolve(step.resolved, &step.text)
                    .err()
                    .map(|error| UnboundStep {
                        path: feature.path.clone(),
                        line: step.line,
                        error,
                    })
            })
            .collect()
    }

    /// Serialise the definitions as a JSON array of keyword, pattern and
    /// source location.
    ///
    /// # Errors
    /// Returns an error if serialisation fails.
    pub fn dump_json(&self) -> serde_json::Result<String> {
        #[derive(Serialize)]
        struct Entry<'a> {
            keyword: &'static str,
            pattern: &'a str,
            file: &'static str,
            line: u32,
        }
        let entries: Vec<Entry<'_>> = self
            .definitions
            .iter()
            .map(|def| Entry {
                keyword: def.keyword.as_str(),
                pattern: def.pattern.as_str(),
                file: def.file(),
                line: def.line(),
            })
            .collect();
        serde_json::to_string_pretty(&entries)
    }
}

fn all_steps(features: &[Feature]) -> impl Iterator<Item = (&Feature, &Step)> {
    features.iter().flat_map(|feature| {
        feature
            .scenarios
            .iter()
            .flat_map(|scenario: &Scenario| scenario.steps.iter())
            .map(move |step| (feature, step))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::parse_feature;
    use crate::step::StepOutcome;
    use rstest::{fixture, rstest};
    use std::path::Path;

    #[derive(Default)]
    struct Visits(Vec<String>);

    fn record<'a>(world: &'a mut Visits, args: &'a StepArgs) -> StepFuture<'a> {
        Box::pin(async move {
            world.0.push(args.get(0).unwrap_or("-").to_string());
            Ok(StepOutcome::Done)
        })
    }

    fn registered(registry: &mut StepRegistry<Visits>, keyword: StepKeyword, pattern: &str) {
        registry
            .register(keyword, pattern, record)
            .unwrap_or_else(|err| panic!("register {pattern}: {err}"));
    }

    #[fixture]
    fn registry() -> StepRegistry<Visits> {
        let mut registry = StepRegistry::new();
        registered(&mut registry, StepKeyword::Given, "I am on the landing page");
        registered(&mut registry, StepKeyword::Then, r#"I see the text "{text}""#);
        registered(&mut registry, StepKeyword::Then, r#"I see the text "About Us""#);
        registered(&mut registry, StepKeyword::Then, "I see the navigation bar");
        registry
    }

    #[rstest]
    fn prefers_the_more_specific_pattern(registry: StepRegistry<Visits>) {
        let resolved = registry
            .resolve(StepKeyword::Then, r#"I see the text "About Us""#)
            .unwrap_or_else(|err| panic!("resolve: {err}"));
        assert_eq!(resolved.definition.pattern().as_str(), r#"I see the text "About Us""#);
        assert_eq!(resolved.args.get(0), None);
    }

    #[rstest]
    fn captures_placeholder_values(registry: StepRegistry<Visits>) {
        let resolved = registry
            .resolve(StepKeyword::Then, r#"I see the text "Welcome to Note Weaver!""#)
            .unwrap_or_else(|err| panic!("resolve: {err}"));
        assert_eq!(resolved.args.named("text"), Some("Welcome to Note Weaver!"));
    }

    #[rstest]
    fn keyword_must_match(registry: StepRegistry<Visits>) {
        let Err(err) = registry.resolve(StepKeyword::When, "I am on the landing page") else {
            panic!("When must not match a Given definition");
        };
        assert_eq!(
            err,
            ResolveError::Undefined {
                keyword: StepKeyword::When,
                text: "I am on the landing page".into(),
            }
        );
    }

    #[rstest]
    fn conjunctions_default_to_given(registry: StepRegistry<Visits>) {
        assert!(registry.resolve(StepKeyword::And, "I am on the landing page").is_ok());
    }

    #[rstest]
    fn equal_specificity_is_ambiguous(mut registry: StepRegistry<Visits>) {
        registered(&mut registry, StepKeyword::Then, r#"I see the text "{words}""#);
        let Err(err) = registry.resolve(StepKeyword::Then, r#"I see the text "Hi""#) else {
            panic!("tied patterns must be ambiguous");
        };
        assert!(matches!(err, ResolveError::Ambiguous { ref patterns, .. } if patterns.len() == 2));
    }

    #[rstest]
    fn rejects_conjunction_registration(mut registry: StepRegistry<Visits>) {
        let Err(err) = registry.register(StepKeyword::And, "anything", record) else {
            panic!("conjunction registration must fail");
        };
        assert!(matches!(err, RegistryError::ConjunctionKeyword(StepKeyword::And)));
    }

    #[rstest]
    fn rejects_malformed_patterns(mut registry: StepRegistry<Visits>) {
        let Err(err) = registry.given("I see {", record) else {
            panic!("malformed pattern must fail");
        };
        let message = err.to_string();
        assert!(message.contains("I see {"), "{message}");
        assert!(message.contains("registry.rs"), "{message}");
    }

    #[rstest]
    fn groups_duplicates(mut registry: StepRegistry<Visits>) {
        registered(&mut registry, StepKeyword::Given, "I am  on the landing page");
        registered(&mut registry, StepKeyword::Then, "I am on the landing page");
        let groups = registry.duplicates();
        let [group] = groups.as_slice() else {
            panic!("expected one duplicate group, got {}", groups.len());
        };
        assert_eq!(group.len(), 2);
        assert!(group.iter().all(|def| def.keyword() == StepKeyword::Given));
    }

    #[rstest]
    fn reports_unused_and_unbound(registry: StepRegistry<Visits>) {
        let feature = parse_feature(
            Path::new("front.feature"),
            "Feature: Front\n  Scenario: Welcome\n    Given I am on the landing page\n    \
             Then I see the text \"Welcome\"\n    And I see the company name\n"
                .to_string(),
        )
        .unwrap_or_else(|err| panic!("parse: {err}"));
        let features = [feature];

        let unused: Vec<_> = registry
            .unused(&features)
            .iter()
            .map(|def| def.pattern().as_str().to_string())
            .collect();
        assert_eq!(
            unused,
            vec![r#"I see the text "About Us""#, "I see the navigation bar"]
        );

        let unbound = registry.unbound_steps(&features);
        let [step] = unbound.as_slice() else {
            panic!("expected one unbound step");
        };
        assert_eq!(step.line, 5);
        assert!(step.to_string().starts_with("front.feature:5: no step definition matches Then"));
    }

    #[rstest]
    fn dumps_definitions_as_json(registry: StepRegistry<Visits>) {
        let json = registry
            .dump_json()
            .unwrap_or_else(|err| panic!("dump: {err}"));
        let value: serde_json::Value =
            serde_json::from_str(&json).unwrap_or_else(|err| panic!("parse: {err}"));
        assert_eq!(value.as_array().map(Vec::len), Some(4));
        let field = |index: usize, name: &str| {
            value
                .get(index)
                .and_then(|entry| entry.get(name))
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        };
        assert_eq!(field(0, "keyword").as_deref(), Some("Given"));
        assert_eq!(
            field(1, "pattern").as_deref(),
            Some(r#"I see the text "{text}""#)
        );
    }

    #[tokio::test]
    async fn invokes_the_bound_handler() {
        let registry = registry();
        let mut world = Visits::default();
        let resolved = registry
            .resolve(StepKeyword::Then, r#"I see the text "Hello""#)
            .unwrap_or_else(|err| panic!("resolve: {err}"));
        let outcome = resolved.definition.call(&mut world, &resolved.args).await;
        assert!(matches!(outcome, Ok(StepOutcome::Done)));
        assert_eq!(world.0, vec!["Hello".to_string()]);
    }
}
