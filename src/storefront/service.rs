//! Services page: navigation bar, service cards and their highlights

use action_locator::{ResolutionResult, Target};
use action_primitives::{PostCondition, Step, Verdict};
use storefront_core_types::AnchorDescriptor;
use tracing::{debug, info};

use crate::errors::SuiteError;
use crate::scenario::ScenarioContext;

/// One card on the services page, as it should be rendered.
#[derive(Debug, Clone, Copy)]
pub struct ServiceOffering {
    pub name: &'static str,
    /// Phrases each expected in one of the card's bullet points
    pub highlights: &'static [&'static str],
}

/// Services in display order.
pub const SERVICES: &[ServiceOffering] = &[
    ServiceOffering {
        name: "Silk Screening",
        highlights: &[
            "Facility for any sized order",
            "High-end M&R 8 and 12 head machines",
            "Specialized in 500+ piece orders",
        ],
    },
    ServiceOffering {
        name: "Direct-To-Garment",
        highlights: &[
            "Top of the line Brother DL DTG machines",
            "No pretreatment stains",
            "Leading digital printing innovation",
        ],
    },
    ServiceOffering {
        name: "Embroidery",
        highlights: &[
            "Single headed machines for custom orders",
            "Dedicated quality embroidery staff",
            "Tajima machines with 15 thread colors",
        ],
    },
    ServiceOffering {
        name: "Hard Goods",
        highlights: &[
            "Premium drinkware options",
            "Mimaki and Grando machines",
            "Professional finishing",
        ],
    },
    ServiceOffering {
        name: "Custom Boxes",
        highlights: &[
            "Eye-catching designs",
            "Perfect for executive kits",
            "Premium packaging solutions",
        ],
    },
    ServiceOffering {
        name: "Canvas Print",
        highlights: &["Latex HP printers", "Vibrant colors", "Durable materials"],
    },
];

/// What a rendered service card shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceCard {
    pub name: String,
    /// `src` of the card image, `None` when no image carries the service name
    pub image_src: Option<String>,
    pub highlights: Vec<String>,
}

impl ServiceCard {
    /// Expected highlights that no bullet point mentions.
    pub fn missing_highlights<'h>(&self, expected: &[&'h str]) -> Vec<&'h str> {
        expected
            .iter()
            .copied()
            .filter(|phrase| {
                let phrase = phrase.to_lowercase();
                !self
                    .highlights
                    .iter()
                    .any(|line| line.to_lowercase().contains(&phrase))
            })
            .collect()
    }
}

fn slugify(label: &str) -> String {
    label
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

pub struct ServicePage<'a> {
    ctx: &'a ScenarioContext,
}

impl<'a> ServicePage<'a> {
    pub fn new(ctx: &'a ScenarioContext) -> Self {
        Self { ctx }
    }

    pub fn heading_target() -> Target {
        Target::new("services heading")
            .candidate(AnchorDescriptor::aria("heading", "Services"))
            .candidate(AnchorDescriptor::css_with_text("h1, h2", "Services"))
    }

    /// Link in the top navigation bar labelled `label`.
    pub fn nav_link_target(label: &str) -> Target {
        Target::new(format!("nav link {}", label))
            .slug(format!("nav-{}-debug", slugify(label)))
            .candidate(AnchorDescriptor::css_with_text("nav a", label))
            .candidate(format!(r#"header a:has-text("{}")"#, label))
            .candidate(AnchorDescriptor::aria("link", label))
    }

    pub fn explore_button_target() -> Target {
        Target::new("explore services")
            .candidate(AnchorDescriptor::aria("button", "Explore Services"))
            .candidate(r#"button:has-text("Explore Services")"#)
            .candidate(r#"a:has-text("Explore Services")"#)
    }

    pub fn service_titles_target() -> Target {
        Target::new("service titles").css_candidates([".grid h2", "section h2", "main h2"])
    }

    pub fn service_image_target(name: &str) -> Target {
        Target::new(format!("{} image", name))
            .candidate(format!(r#"img[alt="{}"]"#, name))
            .candidate(AnchorDescriptor::aria("img", name))
    }

    pub fn service_highlights_target(name: &str) -> Target {
        Target::new(format!("{} highlights", name))
            .slug(format!("service-{}-debug", slugify(name)))
            .candidate(format!(r#".grid > div:has-text("{}") ul li span"#, name))
            .candidate(format!(r#"div:has-text("{}") > ul li span"#, name))
            .candidate(format!(r#"div:has-text("{}") > ul li"#, name))
    }

    pub fn learn_more_target() -> Target {
        Target::new("learn more links")
            .candidate(AnchorDescriptor::aria("link", "Learn More"))
            .candidate(r#"a:has-text("Learn More")"#)
    }

    pub async fn open(&self) -> Result<(), SuiteError> {
        let url = self.ctx.config().site.service_url.clone();
        self.ctx.goto(&url).await
    }

    pub async fn has_heading(&self) -> Result<bool, SuiteError> {
        Ok(self.ctx.find(&Self::heading_target()).await?.is_some())
    }

    pub async fn nav_link_visible(&self, label: &str) -> Result<bool, SuiteError> {
        Ok(self.ctx.find(&Self::nav_link_target(label)).await?.is_some())
    }

    pub async fn hover_nav(&self, label: &str) -> Result<Verdict, SuiteError> {
        self.ctx.hover(Self::nav_link_target(label)).await
    }

    /// Click a navigation link and wait for a URL matching `pattern`.
    pub async fn follow_nav(&self, label: &str, pattern: &str) -> Result<String, SuiteError> {
        let post = PostCondition::url_matches(pattern)
            .map_err(|err| SuiteError::Config(format!("url pattern '{}': {}", pattern, err)))?;
        self.ctx
            .perform(
                Step::click(Self::nav_link_target(label))
                    .with_post(post)
                    .with_policy(self.ctx.retry_policy()),
            )
            .await?;
        let url = self.ctx.current_url().await?;
        info!(link = label, url = %url, "followed navigation link");
        Ok(url)
    }

    pub async fn has_explore_button(&self) -> Result<bool, SuiteError> {
        Ok(self.ctx.find(&Self::explore_button_target()).await?.is_some())
    }

    /// Card titles in document order.
    pub async fn service_titles(&self) -> Result<Vec<String>, SuiteError> {
        Ok(self
            .ctx
            .texts(&Self::service_titles_target())
            .await?
            .into_iter()
            .map(|title| title.trim().to_string())
            .filter(|title| !title.is_empty())
            .collect())
    }

    pub async fn card(&self, name: &str) -> Result<ServiceCard, SuiteError> {
        let image_src = match self.ctx.find(&Self::service_image_target(name)).await? {
            Some(image) => image.element.attribute("src").await?,
            None => None,
        };
        let highlights: Vec<String> = self
            .ctx
            .texts(&Self::service_highlights_target(name))
            .await?
            .into_iter()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();
        if highlights.is_empty() {
            self.ctx
                .capture(&format!("service-{}-debug", slugify(name)))
                .await;
        }
        debug!(service = name, ?image_src, ?highlights, "service card");
        Ok(ServiceCard {
            name: name.to_string(),
            image_src,
            highlights,
        })
    }

    /// `href` of every "Learn More" link; links without one read as empty.
    pub async fn learn_more_hrefs(&self) -> Result<Vec<String>, SuiteError> {
        let anchor = match self.ctx.resolve(&Self::learn_more_target()).await? {
            ResolutionResult::Found(resolved) => resolved.anchor,
            ResolutionResult::NotFound { .. } => return Ok(Vec::new()),
        };
        let mut hrefs = Vec::new();
        for link in self.ctx.page().query_all(&anchor).await? {
            hrefs.push(link.attribute("href").await?.unwrap_or_default());
        }
        Ok(hrefs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn services_are_listed_once_each() {
        let mut names: Vec<_> = SERVICES.iter().map(|s| s.name).collect();
        assert_eq!(names.len(), 6);
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 6);
        assert!(SERVICES.iter().all(|s| s.highlights.len() == 3));
    }

    #[test]
    fn missing_highlights_are_matched_case_insensitively() {
        let card = ServiceCard {
            name: "Canvas Print".into(),
            image_src: None,
            highlights: vec!["LATEX HP PRINTERS".into(), "Vibrant colors on cotton".into()],
        };
        assert_eq!(
            card.missing_highlights(&["Latex HP printers", "Vibrant colors", "Durable materials"]),
            vec!["Durable materials"]
        );
    }

    #[test]
    fn slugs_are_kebab_case() {
        assert_eq!(slugify("Direct-To-Garment"), "direct-to-garment");
        assert_eq!(slugify("Learn More"), "learn-more");
        assert_eq!(
            ServicePage::nav_link_target("Service").slug,
            "nav-service-debug"
        );
    }
}
