//! Public API behaviour of the pattern crate.

use rstest::rstest;
use weaver_patterns::{
    PatternError, SpecificityScore, StepKeyword, StepPattern, build_regex_from_pattern,
    compile_regex_from_pattern,
};

fn compile(source: &str) -> StepPattern {
    StepPattern::new(source).unwrap_or_else(|err| panic!("{source:?} should compile: {err}"))
}

#[rstest]
#[case("I am on the landing page", "I am on the landing page", true)]
#[case("I am on the landing page", "I am on the landing page!", false)]
#[case(r#"I see the text "{text}""#, r#"I see the text "Welcome to Note Weaver!""#, true)]
#[case(r#"I see the text "{text}""#, "I see the text Welcome", false)]
#[case("there are {count:d} notes", "there are -3 notes", true)]
#[case("there are {count:d} notes", "there are many notes", false)]
fn matches_feature_steps(#[case] pattern: &str, #[case] text: &str, #[case] expected: bool) {
    assert_eq!(compile(pattern).is_match(text), expected);
}

#[test]
fn compiled_regex_matches_built_source() {
    let source = build_regex_from_pattern("I see the image {id:S}")
        .unwrap_or_else(|err| panic!("pattern should build: {err}"));
    let regex = compile_regex_from_pattern("I see the image {id:S}")
        .unwrap_or_else(|err| panic!("pattern should compile: {err}"));
    assert_eq!(regex.as_str(), source);
}

#[test]
fn malformed_patterns_surface_offsets() {
    let Err(err) = StepPattern::new("I see {") else {
        panic!("unclosed placeholder must fail");
    };
    assert!(matches!(err, PatternError::UnclosedPlaceholder { offset: 6 }));
    assert!(err.to_string().contains("byte 6"));
}

#[test]
fn specific_definitions_outrank_generic_ones() {
    let literal = compile(r#"I can see the text "About Us""#);
    let generic = compile(r#"I can see the text "{text}""#);
    let text = r#"I can see the text "About Us""#;
    assert!(literal.is_match(text) && generic.is_match(text));
    assert!(literal.specificity() > generic.specificity());
    assert_eq!(
        literal.specificity(),
        SpecificityScore::calculate(literal.as_str())
            .unwrap_or_else(|err| panic!("pattern should score: {err}"))
    );
}

#[test]
fn keywords_render_canonically() {
    assert_eq!(StepKeyword::Given.to_string(), "Given");
    assert_eq!("and".parse::<StepKeyword>().map(|kw| kw.as_str()), Ok("And"));
}
