//! Post-conditions and read-back classification

use regex::Regex;
use serde::{Deserialize, Serialize};
use storefront_core_types::ElementHandle;

/// Application-state check performed after an action.
#[derive(Debug, Clone, Default)]
pub enum PostCondition {
    #[default]
    None,
    /// Acted-on control now holds this value
    ValueEquals(String),
    /// Page URL matches (e.g. redirect to the auth provider)
    UrlMatches(Regex),
    /// Acted-on element text contains this (case-insensitive)
    TextContains(String),
}

impl PostCondition {
    pub fn url_matches(pattern: &str) -> Result<Self, regex::Error> {
        Ok(PostCondition::UrlMatches(Regex::new(pattern)?))
    }

    pub fn describe(&self) -> String {
        match self {
            PostCondition::None => "none".to_string(),
            PostCondition::ValueEquals(v) => format!("value == '{}'", v),
            PostCondition::UrlMatches(re) => format!("url =~ /{}/", re.as_str()),
            PostCondition::TextContains(t) => format!("text contains '{}'", t),
        }
    }
}

/// How a successful step ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// Action completed, no post-condition configured
    Completed,
    /// Read-back equals the requested value
    Applied,
    /// URL or text post-condition held
    ConditionMet,
    /// The application refused the input; expected on negative paths
    RejectedByUi { observed: String, reason: String },
}

impl Verdict {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Verdict::RejectedByUi { .. })
    }
}

/// Classification of a value read back after a fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadBack {
    Applied,
    Rejected { reason: String },
    /// Value did not take and nothing indicates a rejection; retry
    Unapplied,
}

/// Constraints a form control declares through its attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldConstraints {
    pub max_length: Option<usize>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl FieldConstraints {
    /// Read `maxlength`, `min` and `max`; unreadable or malformed
    /// attributes count as absent.
    pub async fn read(element: &dyn ElementHandle) -> Self {
        async fn attr(element: &dyn ElementHandle, name: &str) -> Option<String> {
            element.attribute(name).await.ok().flatten()
        }
        Self {
            max_length: attr(element, "maxlength")
                .await
                .and_then(|v| v.trim().parse().ok()),
            min: attr(element, "min").await.and_then(|v| v.trim().parse().ok()),
            max: attr(element, "max").await.and_then(|v| v.trim().parse().ok()),
        }
    }

    /// Why the control cannot hold `requested`, if it cannot.
    fn out_of_range(&self, requested: &str) -> Option<String> {
        let number: f64 = requested.trim().parse().ok()?;
        if let Some(min) = self.min.filter(|min| number < *min) {
            return Some(format!("{} is below the minimum {}", requested, min));
        }
        if let Some(max) = self.max.filter(|max| number > *max) {
            return Some(format!("{} is above the maximum {}", requested, max));
        }
        None
    }
}

/// Tell "value refused by the UI" apart from "fill never took effect".
///
/// A rejection needs evidence from the control itself:
/// - a validation message
/// - the request cut at the control's `maxlength`
/// - a numeric request outside the control's `min`/`max`
///
/// An unchanged or reverted value without such evidence is unapplied and
/// gets retried.
pub fn classify_read_back(
    requested: &str,
    observed: &str,
    validation: Option<&str>,
    constraints: &FieldConstraints,
) -> ReadBack {
    if observed == requested {
        return ReadBack::Applied;
    }
    if let Some(message) = validation.filter(|m| !m.trim().is_empty()) {
        return ReadBack::Rejected {
            reason: message.to_string(),
        };
    }
    if let Some(limit) = constraints.max_length {
        let requested_len = requested.chars().count();
        if requested_len > limit
            && observed.chars().count() == limit
            && requested.starts_with(observed)
        {
            return ReadBack::Rejected {
                reason: format!(
                    "input truncated to {} of {} characters",
                    limit, requested_len
                ),
            };
        }
    }
    if let Some(reason) = constraints.out_of_range(requested) {
        return ReadBack::Rejected { reason };
    }
    ReadBack::Unapplied
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quantity() -> FieldConstraints {
        FieldConstraints {
            min: Some(1.0),
            max: Some(99.0),
            ..Default::default()
        }
    }

    #[test]
    fn validation_message_is_a_rejection() {
        assert_eq!(
            classify_read_back(
                "-1",
                "1",
                Some("Value must be greater than or equal to 1."),
                &FieldConstraints::default()
            ),
            ReadBack::Rejected {
                reason: "Value must be greater than or equal to 1.".into()
            }
        );
    }

    #[test]
    fn out_of_range_request_is_a_rejection() {
        assert_eq!(
            classify_read_back("-1", "1", None, &quantity()),
            ReadBack::Rejected {
                reason: "-1 is below the minimum 1".into()
            }
        );
        assert!(matches!(
            classify_read_back("100", "1", None, &quantity()),
            ReadBack::Rejected { .. }
        ));
    }

    #[test]
    fn truncation_needs_a_declared_limit() {
        let requested = "a".repeat(256);
        let observed = "a".repeat(255);
        let limited = FieldConstraints {
            max_length: Some(255),
            ..Default::default()
        };
        let ReadBack::Rejected { reason } = classify_read_back(&requested, &observed, None, &limited)
        else {
            panic!("truncation at maxlength must be classified as rejection");
        };
        assert_eq!(reason, "input truncated to 255 of 256 characters");

        assert_eq!(
            classify_read_back(&requested, &observed, None, &FieldConstraints::default()),
            ReadBack::Unapplied
        );
        assert_eq!(
            classify_read_back(&requested, "aaa", None, &limited),
            ReadBack::Unapplied
        );
    }

    #[test]
    fn unchanged_value_without_evidence_is_retried() {
        assert_eq!(classify_read_back("2", "1", None, &quantity()), ReadBack::Unapplied);
        assert_eq!(classify_read_back("2", "", None, &FieldConstraints::default()), ReadBack::Unapplied);
        assert_eq!(classify_read_back("2", "7", None, &quantity()), ReadBack::Unapplied);
        assert_eq!(classify_read_back("2", "2", None, &quantity()), ReadBack::Applied);
    }
}
