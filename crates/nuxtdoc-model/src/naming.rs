//! Identifier and path naming utilities.
//!
//! Converts identifiers to file-system-safe slugs and component identifiers
//! to their hyphenated markup-tag form. Both conversions share one word
//! splitter so that `MyClass`, `my_class` and `my-class` land on the same
//! segment.

/// Slug used when an identifier contains no alphanumeric characters.
const EMPTY_SLUG: &str = "_";

/// Error returned by naming conversions.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum NamingError {
    /// Component identifiers must contain at least one alphanumeric character.
    #[error("component identifier cannot be empty")]
    EmptyIdentifier,
}

/// Split an identifier into lowercase words.
///
/// Word boundaries are any non-alphanumeric character, a lowercase or digit
/// to uppercase transition (`myClass`), and the last capital of an uppercase
/// run followed by a lowercase letter (`HTTPServer` → `http`, `server`).
fn split_words(identifier: &str) -> Vec<String> {
    let chars: Vec<char> = identifier.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary {
                words.push(std::mem::take(&mut current));
            }
        }

        // Some lowercase mappings add combining marks (`İ` → `i\u{307}`)
        current.extend(c.to_lowercase().filter(|l| l.is_alphanumeric()));
    }

    if !current.is_empty() {
        words.push(current);
    }

    words
}

/// Convert an identifier to a lowercase, hyphen-separated path segment.
///
/// The conversion is deterministic and idempotent. Identifiers without any
/// alphanumeric character (e.g. `__`) map to `_`.
///
/// # Examples
///
/// ```
/// use nuxtdoc_model::to_slug;
///
/// assert_eq!(to_slug("MyClass"), "my-class");
/// assert_eq!(to_slug("my_function"), "my-function");
/// assert_eq!(to_slug("HTTPServer"), "http-server");
/// assert_eq!(to_slug("my-class"), "my-class");
/// ```
#[must_use]
pub fn to_slug(identifier: &str) -> String {
    let words = split_words(identifier);
    if words.is_empty() {
        return EMPTY_SLUG.to_owned();
    }
    words.join("-")
}

/// Convert a component identifier to its hyphenated markup-tag form.
///
/// Uppercase runs (acronyms) stay together and case boundaries collapse to a
/// single hyphen: `UArguments` → `u-arguments`, `UPageHero` → `u-page-hero`.
///
/// # Errors
///
/// Returns [`NamingError::EmptyIdentifier`] if the identifier has no
/// alphanumeric characters.
pub fn to_component_tag(identifier: &str) -> Result<String, NamingError> {
    let words = split_words(identifier);
    if words.is_empty() {
        return Err(NamingError::EmptyIdentifier);
    }
    Ok(words.join("-"))
}

/// Split a dotted qualified name into slugged path segments.
///
/// Empty segments (from leading, trailing or doubled dots) are skipped.
#[must_use]
pub fn qualified_to_path(qualified_name: &str) -> Vec<String> {
    qualified_name
        .split('.')
        .filter(|part| !part.is_empty())
        .map(to_slug)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_slug_pascal_case() {
        assert_eq!(to_slug("MyClass"), "my-class");
        assert_eq!(to_slug("DataProcessor"), "data-processor");
    }

    #[test]
    fn test_slug_snake_case() {
        assert_eq!(to_slug("my_function"), "my-function");
        assert_eq!(to_slug("_private_func"), "private-func");
        assert_eq!(to_slug("__init__"), "init");
    }

    #[test]
    fn test_slug_acronym_run() {
        assert_eq!(to_slug("HTTPServer"), "http-server");
        assert_eq!(to_slug("parseURL"), "parse-url");
        assert_eq!(to_slug("IOError"), "io-error");
    }

    #[test]
    fn test_slug_digits() {
        assert_eq!(to_slug("v2Api"), "v2-api");
        assert_eq!(to_slug("base64"), "base64");
    }

    #[test]
    fn test_slug_whitespace_and_symbols() {
        assert_eq!(to_slug("  Hello World "), "hello-world");
        assert_eq!(to_slug("a--b__c"), "a-b-c");
    }

    #[test]
    fn test_slug_drops_combining_marks_from_lowercasing() {
        assert_eq!(to_slug("İstanbul"), "istanbul");
    }

    #[test]
    fn test_slug_without_alphanumerics() {
        assert_eq!(to_slug(""), "_");
        assert_eq!(to_slug("__"), "_");
    }

    #[test]
    fn test_slug_idempotent() {
        for input in [
            "MyClass",
            "my_function",
            "HTTPServer",
            "__init__",
            "v2Api",
            "Already-Slugged",
            "",
            "ÜberKlasse",
            "İstanbul",
        ] {
            let once = to_slug(input);
            assert_eq!(to_slug(&once), once, "not idempotent for {input:?}");
            assert!(!once.chars().any(char::is_uppercase));
            assert!(!once.chars().any(char::is_whitespace));
        }
    }

    #[test]
    fn test_component_tag_nuxt_ui_names() {
        assert_eq!(to_component_tag("UArguments").unwrap(), "u-arguments");
        assert_eq!(to_component_tag("UCodeGroup").unwrap(), "u-code-group");
        assert_eq!(to_component_tag("UPageHero").unwrap(), "u-page-hero");
        assert_eq!(to_component_tag("ULandingCard").unwrap(), "u-landing-card");
    }

    #[test]
    fn test_component_tag_acronyms_not_split() {
        assert_eq!(to_component_tag("APIReference").unwrap(), "api-reference");
        assert_eq!(to_component_tag("MyHTMLView").unwrap(), "my-html-view");
    }

    #[test]
    fn test_component_tag_single_separator() {
        assert_eq!(to_component_tag("My_Component").unwrap(), "my-component");
        assert_eq!(to_component_tag("My-Component").unwrap(), "my-component");
    }

    #[test]
    fn test_component_tag_idempotent() {
        for input in ["UArguments", "CustomVariables", "APIReference", "alert"] {
            let once = to_component_tag(input).unwrap();
            assert_eq!(to_component_tag(&once).unwrap(), once);
        }
    }

    #[test]
    fn test_component_tag_empty_is_error() {
        assert_eq!(to_component_tag(""), Err(NamingError::EmptyIdentifier));
        assert_eq!(to_component_tag("--"), Err(NamingError::EmptyIdentifier));
    }

    #[test]
    fn test_qualified_to_path() {
        assert_eq!(
            qualified_to_path("package.mod1.MyClass"),
            vec!["package", "mod1", "my-class"]
        );
        assert_eq!(qualified_to_path("app"), vec!["app"]);
        assert!(qualified_to_path("").is_empty());
    }
}
