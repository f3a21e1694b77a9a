//! Checking of a single selector candidate.

use storefront_core_types::{AnchorDescriptor, DriverError, ElementRef, PageDriver};
use tracing::debug;

use crate::filter::CandidateFilter;
use crate::types::CandidateOutcome;

/// Outcome of checking one candidate, with the winning element when matched.
pub struct CandidateCheck {
    pub outcome: CandidateOutcome,
    pub element: Option<ElementRef>,
}

impl CandidateCheck {
    fn miss(outcome: CandidateOutcome) -> Self {
        Self {
            outcome,
            element: None,
        }
    }
}

/// Query `anchor` and return the first of at most `max_checked` matches
/// that passes `filter` and is visible.
pub async fn check_candidate(
    page: &dyn PageDriver,
    anchor: &AnchorDescriptor,
    filter: &CandidateFilter,
    max_checked: usize,
) -> CandidateCheck {
    let elements = match page.query_all(anchor).await {
        Ok(elements) => elements,
        Err(error) => {
            debug!(anchor = %anchor, error = %error, "candidate query failed");
            return CandidateCheck::miss(CandidateOutcome::QueryFailed { error });
        }
    };
    if elements.is_empty() {
        return CandidateCheck::miss(CandidateOutcome::NoMatches);
    }

    let mut filtered = 0;
    let mut hidden = 0;
    for (index, element) in elements.iter().take(max_checked.max(1)).enumerate() {
        match filter.accepts(element.as_ref()).await {
            Ok(true) => {}
            Ok(false) => {
                filtered += 1;
                continue;
            }
            Err(err) => {
                note_vanished(anchor, index, &err);
                hidden += 1;
                continue;
            }
        }
        match element.is_visible().await {
            Ok(true) => {
                return CandidateCheck {
                    outcome: CandidateOutcome::Matched { index },
                    element: Some(element.clone()),
                }
            }
            Ok(false) => hidden += 1,
            Err(err) => {
                note_vanished(anchor, index, &err);
                hidden += 1;
            }
        }
    }

    if hidden == 0 {
        CandidateCheck::miss(CandidateOutcome::Filtered { count: filtered })
    } else {
        CandidateCheck::miss(CandidateOutcome::Hidden {
            checked: filtered + hidden,
        })
    }
}

fn note_vanished(anchor: &AnchorDescriptor, index: usize, err: &DriverError) {
    debug!(anchor = %anchor, index, error = %err, "match vanished while probing");
}
