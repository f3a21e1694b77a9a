//! Search results page

use action_locator::{ResolutionResult, Target};
use regex::Regex;
use storefront_core_types::AnchorDescriptor;
use tracing::{debug, warn};
use url::Url;

use crate::errors::SuiteError;
use crate::scenario::ScenarioContext;

const NO_RESULTS: &str = "No results found";
const RESULTS_FOR: &str = "Search results for";

/// What the results page showed for a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Results {
        heading: String,
        products: Vec<String>,
    },
    NoResults {
        message: String,
    },
}

impl SearchOutcome {
    pub fn is_empty(&self) -> bool {
        matches!(self, SearchOutcome::NoResults { .. })
    }

    /// Whether the page names `keyword` the way the storefront quotes it.
    pub fn echoes(&self, keyword: &str) -> bool {
        let text = match self {
            SearchOutcome::Results { heading, .. } => heading,
            SearchOutcome::NoResults { message } => message,
        };
        text.contains(&format!("\"{}\"", keyword.trim()))
    }

    pub fn products(&self) -> &[String] {
        match self {
            SearchOutcome::Results { products, .. } => products,
            SearchOutcome::NoResults { .. } => &[],
        }
    }
}

/// Percent-encode like `encodeURIComponent`.
fn encode_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            other => out.push_str(&format!("%{:02X}", other)),
        }
    }
    out
}

/// Url pattern of the results page for `keyword`, accepting both the form
/// encoding (`+` for spaces) and the component encoding.
pub fn query_pattern(keyword: &str) -> Result<Regex, SuiteError> {
    let form: String = url::form_urlencoded::byte_serialize(keyword.as_bytes()).collect();
    let component = encode_component(keyword);
    let pattern = format!(
        r"search\?query=({}|{})(&|#|$)",
        regex::escape(&form),
        regex::escape(&component)
    );
    Regex::new(&pattern).map_err(|err| SuiteError::Config(format!("search pattern: {}", err)))
}

pub struct SearchResultsPage<'a> {
    ctx: &'a ScenarioContext,
}

impl<'a> SearchResultsPage<'a> {
    pub fn new(ctx: &'a ScenarioContext) -> Self {
        Self { ctx }
    }

    /// Results page url for `keyword`.
    pub fn url_for(ctx: &ScenarioContext, keyword: &str) -> Result<String, SuiteError> {
        let base = &ctx.config().site.search_url;
        Url::parse_with_params(base, &[("query", keyword)])
            .map(String::from)
            .map_err(|err| SuiteError::Config(format!("site.search_url '{}': {}", base, err)))
    }

    /// Either state of the page; the first candidate that matches decides.
    pub fn outcome_target() -> Target {
        Target::new("search outcome")
            .slug("search-results-debug")
            .candidate(format!(r#"h1:has-text("{}")"#, NO_RESULTS))
            .candidate(AnchorDescriptor::text(RESULTS_FOR))
            .candidate(AnchorDescriptor::css_with_text("h1, h2, p, span", RESULTS_FOR))
    }

    pub fn empty_message_target() -> Target {
        Target::new("no results message")
            .candidate("p.text-gray-500")
            .candidate(AnchorDescriptor::css_with_text("p", "couldn't find any matches"))
    }

    pub fn product_names_target() -> Target {
        Target::new("search result names").css_candidates([
            r#"[data-testid="ProductList"] [data-testid="ProductElement"] h3"#,
            r#"[data-testid="ProductElement"] h3"#,
        ])
    }

    pub async fn open(&self, keyword: &str) -> Result<(), SuiteError> {
        let url = Self::url_for(self.ctx, keyword)?;
        self.ctx.goto(&url).await
    }

    pub async fn outcome(&self) -> Result<SearchOutcome, SuiteError> {
        let resolved = match self.ctx.resolve(&Self::outcome_target()).await? {
            ResolutionResult::Found(resolved) => resolved,
            ResolutionResult::NotFound { tried, diagnostics } => {
                warn!(tried = tried.len(), "search page shows neither results nor the empty state");
                return Err(SuiteError::TargetNotFound {
                    target: "search outcome".to_string(),
                    tried: tried.iter().map(ToString::to_string).collect(),
                    diagnostics: diagnostics.first().map(|a| a.path.clone()),
                });
            }
        };

        if resolved.candidate_index == 0 {
            let message = match self.ctx.find(&Self::empty_message_target()).await? {
                Some(found) => found.element.text().await?.trim().to_string(),
                None => String::new(),
            };
            debug!(%message, "search returned nothing");
            return Ok(SearchOutcome::NoResults { message });
        }

        let heading = resolved.element.text().await?.trim().to_string();
        let products = self
            .ctx
            .texts(&Self::product_names_target())
            .await?
            .into_iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect::<Vec<_>>();
        debug!(%heading, count = products.len(), "search results");
        Ok(SearchOutcome::Results { heading, products })
    }

    /// Whether `payload` made it into the document unescaped.
    pub async fn reflects_raw(&self, payload: &str) -> Result<bool, SuiteError> {
        Ok(self.ctx.page().html().await?.contains(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_pattern_accepts_both_encodings() {
        let re = query_pattern("Next Level").unwrap();
        assert!(re.is_match("https://shop.test/us/search?query=Next+Level"));
        assert!(re.is_match("https://shop.test/us/search?query=Next%20Level"));
        assert!(!re.is_match("https://shop.test/us/search?query=Next"));

        let re = query_pattern("'#$%&'").unwrap();
        assert!(re.is_match("https://shop.test/us/search?query='%23%24%25%26'"));
        assert!(re.is_match("https://shop.test/us/search?query=%27%23%24%25%26%27"));
    }

    #[test]
    fn outcome_echo_needs_the_quoted_keyword() {
        let found = SearchOutcome::Results {
            heading: "Search results for \"Gildan\"".into(),
            products: vec!["Gildan 5000".into()],
        };
        assert!(found.echoes("Gildan"));
        assert!(!found.echoes("Gil"));
        assert_eq!(found.products().len(), 1);

        let empty = SearchOutcome::NoResults {
            message: "We couldn't find any matches for \"T-shrit\"".into(),
        };
        assert!(empty.is_empty());
        assert!(empty.echoes("T-shrit"));
        assert!(empty.products().is_empty());
    }
}
