//! Homepage: logo, header search, login entry point and feature highlights

use action_locator::Target;
use action_primitives::{PostCondition, Step, Verdict, WaitCondition};
use storefront_core_types::AnchorDescriptor;
use tracing::info;

use crate::errors::SuiteError;
use crate::scenario::ScenarioContext;
use crate::storefront::search::{query_pattern, SearchOutcome, SearchResultsPage};

/// Selling points listed on the homepage.
pub const FEATURES: &[&str] = &[
    "Best Quality",
    "Secure Payment",
    "Professional",
    "Competitive Pricing",
];

pub struct HomePage<'a> {
    ctx: &'a ScenarioContext,
}

impl<'a> HomePage<'a> {
    pub fn new(ctx: &'a ScenarioContext) -> Self {
        Self { ctx }
    }

    pub fn logo_target() -> Target {
        Target::new("logo")
            .slug("logo-debug")
            .candidate(r#"img[alt="SwiftPod Logo"]"#)
            .candidate(r#"header a img[alt*="Logo"]"#)
            .candidate(AnchorDescriptor::aria("img", "Logo"))
    }

    pub fn search_box_target() -> Target {
        Target::new("search box")
            .slug("search-box-debug")
            .css_candidates([
                r#"input[placeholder="Search for products..."]"#,
                r#"input[type="search"]"#,
                r#"input[name="query"]"#,
            ])
    }

    pub fn search_button_target() -> Target {
        Target::new("search button")
            .slug("search-button-debug")
            .candidate(r#"form button[type="submit"]"#)
            .candidate(r#"button[type="submit"]"#)
            .candidate(AnchorDescriptor::aria("button", "Search"))
    }

    pub fn login_button_target() -> Target {
        Target::new("login button")
            .slug("login-button-error")
            .css_candidates([
                "div.flex.items-center.justify-center.rounded-md.p-2",
                "button:has-text('Log in')",
                "a:has-text('Log in')",
                "[aria-label='Log in']",
            ])
    }

    pub fn welcome_heading_target() -> Target {
        Target::new("welcome heading").css_candidates([
            r#"h1:has-text("Welcome to ZoomPrints")"#,
            r#"h1:has-text("Welcome")"#,
            "h1",
        ])
    }

    pub fn feature_target(feature: &str) -> Target {
        Target::new(format!("feature {}", feature))
            .candidate(AnchorDescriptor::text(feature))
            .candidate(AnchorDescriptor::css_with_text("h3, h4, p, span", feature))
    }

    pub async fn open(&self) -> Result<(), SuiteError> {
        let url = self.ctx.config().site.base_url.clone();
        self.ctx.goto(&url).await
    }

    /// Click the logo and report where it led.
    pub async fn click_logo(&self) -> Result<String, SuiteError> {
        self.ctx.click(Self::logo_target()).await?;
        let url = self.ctx.current_url().await?;
        info!(url = %url, "followed logo");
        Ok(url)
    }

    /// Submit `keyword` through the header search and read the results.
    pub async fn search(&self, keyword: &str) -> Result<SearchOutcome, SuiteError> {
        self.ctx.fill(Self::search_box_target(), keyword).await?;
        self.ctx.click(Self::search_button_target()).await?;
        let landed = query_pattern(keyword)?;
        self.ctx
            .wait(
                &WaitCondition::UrlMatches(landed),
                self.ctx.config().timeouts.navigation(),
            )
            .await?;
        SearchResultsPage::new(self.ctx).outcome().await
    }

    /// Click "Log in" and expect the identity provider.
    pub async fn open_login(&self) -> Result<Verdict, SuiteError> {
        let pattern = &self.ctx.config().site.auth_redirect_pattern;
        let post = PostCondition::url_matches(pattern).map_err(|err| {
            SuiteError::Config(format!("site.auth_redirect_pattern '{}': {}", pattern, err))
        })?;
        self.ctx
            .perform(
                Step::click(Self::login_button_target())
                    .with_post(post)
                    .with_policy(self.ctx.retry_policy()),
            )
            .await
    }

    pub async fn welcome_heading(&self) -> Result<Option<String>, SuiteError> {
        match self.ctx.find(&Self::welcome_heading_target()).await? {
            Some(found) => Ok(Some(found.element.text().await?.trim().to_string())),
            None => Ok(None),
        }
    }

    /// Features from [`FEATURES`] the page does not show.
    pub async fn missing_features(&self) -> Result<Vec<&'static str>, SuiteError> {
        let mut missing = Vec::new();
        for feature in FEATURES {
            if self.ctx.find(&Self::feature_target(feature)).await?.is_none() {
                missing.push(*feature);
            }
        }
        Ok(missing)
    }
}
