//! Placeholder value extraction.

use regex::Regex;

/// Capture placeholder values when `text` matches `re`.
///
/// Returns `None` on a mismatch. Group 0 is skipped; groups that did not
/// participate yield empty strings so positions stay aligned with the
/// pattern's placeholders.
///
/// # Examples
/// ```
/// use regex::Regex;
/// use weaver_patterns::extract_captured_values;
///
/// let re = Regex::new(r#"^I see a link to "(.+?)"$"#).unwrap();
/// let values = extract_captured_values(&re, r#"I see a link to "https://www.kent.edu/cs""#);
/// assert_eq!(values, Some(vec!["https://www.kent.edu/cs".to_string()]));
/// assert!(extract_captured_values(&re, "I see nothing").is_none());
/// ```
#[must_use]
pub fn extract_captured_values(re: &Regex, text: &str) -> Option<Vec<String>> {
    let caps = re.captures(text)?;
    Some(
        caps.iter()
            .skip(1)
            .map(|group| group.map_or_else(String::new, |m| m.as_str().to_string()))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regex(source: &str) -> Regex {
        Regex::new(source).unwrap_or_else(|err| panic!("test regex must compile: {err}"))
    }

    #[test]
    fn mismatch_yields_none() {
        assert!(extract_captured_values(&regex(r"^(\d+)$"), "twelve").is_none());
    }

    #[test]
    fn captures_in_declaration_order() {
        let values = extract_captured_values(&regex(r"^(\w+) links to (\S+)$"), "nav links to /about");
        assert_eq!(values, Some(vec!["nav".to_string(), "/about".to_string()]));
    }

    #[test]
    fn absent_optional_group_is_empty() {
        let values = extract_captured_values(&regex(r"^(a)?(b)?$"), "b");
        assert_eq!(values, Some(vec![String::new(), "b".to_string()]));
    }
}
