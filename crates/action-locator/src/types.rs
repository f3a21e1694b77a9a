//! Core types for the locator

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use storefront_core_types::{AnchorDescriptor, DriverError, ElementRef};
use storefront_snapshot_store::{slugify, DiagnosticArtifact};

use crate::errors::LocatorError;
use crate::filter::CandidateFilter;

/// Semantic UI target plus its ordered selector candidates.
///
/// Candidates are listed most-specific first; earlier entries win whenever
/// more than one yields a usable element.
#[derive(Debug, Clone)]
pub struct Target {
    /// Human description used in logs and failure messages
    pub name: String,

    /// Slug for diagnostic artifact names
    pub slug: String,

    /// Ordered selector candidates
    pub candidates: Vec<AnchorDescriptor>,

    /// Sub-filter applied to every match
    pub filter: CandidateFilter,
}

impl Target {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            slug: slugify(&name),
            name,
            candidates: Vec::new(),
            filter: CandidateFilter::default(),
        }
    }

    pub fn candidate(mut self, anchor: impl Into<AnchorDescriptor>) -> Self {
        self.candidates.push(anchor.into());
        self
    }

    /// Append several CSS candidates in order.
    pub fn css_candidates<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.candidates
            .extend(selectors.into_iter().map(|s| AnchorDescriptor::Css(s.into())));
        self
    }

    pub fn slug(mut self, slug: impl AsRef<str>) -> Self {
        self.slug = slugify(slug.as_ref());
        self
    }

    pub fn filter(mut self, filter: CandidateFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn validate(&self) -> Result<(), LocatorError> {
        if self.candidates.is_empty() {
            return Err(LocatorError::EmptyCandidateList(self.name.clone()));
        }
        if let Some((index, anchor)) = self
            .candidates
            .iter()
            .enumerate()
            .find(|(_, anchor)| anchor.is_blank())
        {
            return Err(LocatorError::InvalidTarget {
                target: self.name.clone(),
                reason: format!("candidate #{} ({}) is blank", index, anchor),
            });
        }
        Ok(())
    }
}

/// How candidates are tried within one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveMode {
    /// One candidate after another, stopping at the first usable match
    #[default]
    Sequential,

    /// All candidates at once; the earliest usable candidate still wins
    Concurrent,
}

/// Resolution bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveOptions {
    /// Total time budget for the resolution
    pub budget: Duration,

    /// Pause between probing rounds
    pub poll_interval: Duration,

    /// Matches inspected per candidate
    pub max_checked_per_candidate: usize,

    pub mode: ResolveMode,

    /// Capture diagnostics when nothing resolves
    pub capture_on_miss: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            budget: Duration::from_secs(5),
            poll_interval: Duration::from_millis(100),
            max_checked_per_candidate: 5,
            mode: ResolveMode::Sequential,
            capture_on_miss: true,
        }
    }
}

impl ResolveOptions {
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_max_checked(mut self, max: usize) -> Self {
        self.max_checked_per_candidate = max.max(1);
        self
    }

    pub fn with_mode(mut self, mode: ResolveMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn without_capture(mut self) -> Self {
        self.capture_on_miss = false;
        self
    }
}

/// What probing one candidate produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CandidateOutcome {
    /// Match at `index` passed the filter and visibility check
    Matched { index: usize },

    /// Query returned nothing
    NoMatches,

    /// Every inspected match was rejected by the filter
    Filtered { count: usize },

    /// Inspected matches were hidden (or vanished while checked)
    Hidden { checked: usize },

    /// The query itself failed (invalid selector, detached frame)
    QueryFailed { error: DriverError },
}

impl CandidateOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, CandidateOutcome::Matched { .. })
    }
}

/// Outcome of one candidate in the last completed round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateReport {
    pub index: usize,
    pub anchor: AnchorDescriptor,
    pub outcome: CandidateOutcome,
}

impl fmt::Display for CandidateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} -> ", self.index, self.anchor)?;
        match &self.outcome {
            CandidateOutcome::Matched { index } => write!(f, "matched element {}", index),
            CandidateOutcome::NoMatches => write!(f, "no matches"),
            CandidateOutcome::Filtered { count } => write!(f, "{} filtered out", count),
            CandidateOutcome::Hidden { checked } => write!(f, "{} checked, none visible", checked),
            CandidateOutcome::QueryFailed { error } => write!(f, "query failed: {}", error),
        }
    }
}

/// A visible element and where it came from.
#[derive(Clone)]
pub struct ResolvedElement {
    pub element: ElementRef,

    /// Index of the winning candidate
    pub candidate_index: usize,

    /// Index of the element among that candidate's matches
    pub match_index: usize,

    pub anchor: AnchorDescriptor,
}

impl fmt::Debug for ResolvedElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedElement")
            .field("element", &self.element.describe())
            .field("candidate_index", &self.candidate_index)
            .field("match_index", &self.match_index)
            .field("anchor", &self.anchor)
            .finish()
    }
}

/// Resolution result
#[derive(Debug, Clone)]
pub enum ResolutionResult {
    Found(ResolvedElement),
    NotFound {
        /// Every candidate with its outcome in the last completed round
        tried: Vec<CandidateReport>,
        diagnostics: Vec<DiagnosticArtifact>,
    },
}

impl ResolutionResult {
    pub fn is_found(&self) -> bool {
        matches!(self, ResolutionResult::Found(_))
    }

    pub fn found(self) -> Option<ResolvedElement> {
        match self {
            ResolutionResult::Found(resolved) => Some(resolved),
            ResolutionResult::NotFound { .. } => None,
        }
    }

    pub fn candidate_index(&self) -> Option<usize> {
        match self {
            ResolutionResult::Found(resolved) => Some(resolved.candidate_index),
            ResolutionResult::NotFound { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_rejects_empty_and_blank_candidates() {
        assert!(matches!(
            Target::new("Color options").validate(),
            Err(LocatorError::EmptyCandidateList(name)) if name == "Color options"
        ));
        let blank = Target::new("title").candidate("h1").candidate("  ");
        assert!(matches!(
            blank.validate(),
            Err(LocatorError::InvalidTarget { .. })
        ));
    }

    #[test]
    fn slug_defaults_to_the_name() {
        let target = Target::new("Color Options Debug").css_candidates(["button.color"]);
        assert_eq!(target.slug, "color-options-debug");
        assert_eq!(target.slug("Product title!").slug, "product-title");
    }
}
