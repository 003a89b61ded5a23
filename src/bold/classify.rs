//! Response classification for the scraped wire format.
//!
//! The service signals both the results-page location and the no-match case
//! with fixed text fragments inside otherwise unstructured HTML. That string
//! sniffing is inherently fragile, so it sits behind a trait: swapping the
//! detection strategy never touches the client or retry logic.

use regex::Regex;

/// Literal phrase the report page carries when nothing matched.
pub const NO_MATCH_MARKER: &str = "Unable to match any records in the selected database.";

/// Fragment that immediately precedes the results-page token in the
/// submission response; the token runs until the closing `">`.
pub const RESULT_TOKEN_MARKER: &str = r#"<span style="text-decoration: none" result=""#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostClassification {
    /// Relative URL of the report page to fetch next.
    ResultToken(String),
    /// The service answered no-match directly.
    NoMatch,
    /// Unexpected page (malformed input, service-side error); retryable.
    Unrecognized,
}

pub trait ResponseClassifier: Send + Sync {
    /// Classify the immediate response to a submission POST.
    fn classify_post(&self, body: &str) -> PostClassification;

    /// Does this report page state that no records matched?
    fn is_no_match(&self, page: &str) -> bool;
}

/// Default strategy: plain substring search, matching what the service has
/// served for years.
#[derive(Debug, Default)]
pub struct MarkerClassifier;

impl ResponseClassifier for MarkerClassifier {
    fn classify_post(&self, body: &str) -> PostClassification {
        if body.contains(NO_MATCH_MARKER) {
            return PostClassification::NoMatch;
        }
        match body.split(RESULT_TOKEN_MARKER).nth(1) {
            Some(rest) => match rest.split("\">").next() {
                Some(token) if !token.is_empty() => {
                    PostClassification::ResultToken(token.to_string())
                }
                _ => PostClassification::Unrecognized,
            },
            None => PostClassification::Unrecognized,
        }
    }

    fn is_no_match(&self, page: &str) -> bool {
        page.contains(NO_MATCH_MARKER)
    }
}

/// Regex-based alternative, tolerant of attribute reordering around the
/// token span.
#[derive(Debug)]
pub struct RegexClassifier {
    token_re: Regex,
    no_match_re: Regex,
}

impl Default for RegexClassifier {
    fn default() -> Self {
        Self {
            token_re: Regex::new(r#"<span[^>]*\bresult="([^"]+)""#)
                .unwrap(),
            no_match_re: Regex::new(r"Unable to match any records in the selected database\.")
                .unwrap(),
        }
    }
}

impl ResponseClassifier for RegexClassifier {
    fn classify_post(&self, body: &str) -> PostClassification {
        if self.is_no_match(body) {
            return PostClassification::NoMatch;
        }
        match self.token_re.captures(body) {
            Some(caps) => PostClassification::ResultToken(caps[1].to_string()),
            None => PostClassification::Unrecognized,
        }
    }

    fn is_no_match(&self, page: &str) -> bool {
        self.no_match_re.is_match(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POST_BODY: &str = concat!(
        r#"<html><body><span style="text-decoration: none" result="#,
        r#""/index.php/IDS_IdentificationRequest?paramA=1">View</span></body></html>"#,
    );

    #[test]
    fn test_marker_extracts_token() {
        let got = MarkerClassifier.classify_post(POST_BODY);
        assert_eq!(
            got,
            PostClassification::ResultToken(
                "/index.php/IDS_IdentificationRequest?paramA=1".to_string()
            )
        );
    }

    #[test]
    fn test_marker_unrecognized_body() {
        let got = MarkerClassifier.classify_post("<html>maintenance page</html>");
        assert_eq!(got, PostClassification::Unrecognized);
    }

    #[test]
    fn test_marker_no_match_page() {
        let page = format!("<html><div>{}</div></html>", NO_MATCH_MARKER);
        assert!(MarkerClassifier.is_no_match(&page));
        assert_eq!(
            MarkerClassifier.classify_post(&page),
            PostClassification::NoMatch
        );
    }

    #[test]
    fn test_regex_classifier_agrees_with_marker() {
        let re = RegexClassifier::default();
        assert_eq!(re.classify_post(POST_BODY), MarkerClassifier.classify_post(POST_BODY));
        assert!(re.is_no_match(NO_MATCH_MARKER));
        assert_eq!(
            re.classify_post("<html></html>"),
            PostClassification::Unrecognized
        );
    }

    #[test]
    fn test_regex_tolerates_reordered_attributes() {
        let body = r#"<span result="/abc" style="x">go</span>"#;
        assert_eq!(
            RegexClassifier::default().classify_post(body),
            PostClassification::ResultToken("/abc".to_string())
        );
    }
}
