//! Step and outcome types

use std::path::PathBuf;
use std::sync::Arc;

use action_locator::Target;
use serde::{Deserialize, Serialize};

use crate::actions::{Click, ElementAction, Fill, Hover, SelectOption};
use crate::errors::AttemptError;
use crate::policy::RetryPolicy;
use crate::post::{PostCondition, Verdict};

/// One retried interaction: what to find, what to do, how to verify it.
#[derive(Clone)]
pub struct Step {
    pub target: Target,
    pub action: Arc<dyn ElementAction>,
    pub post: PostCondition,
    pub policy: RetryPolicy,
    /// Slug for diagnostics on terminal failure
    pub slug: String,
}

impl Step {
    pub fn new(target: Target, action: Arc<dyn ElementAction>) -> Self {
        Self {
            slug: target.slug.clone(),
            target,
            action,
            post: PostCondition::None,
            policy: RetryPolicy::default(),
        }
    }

    pub fn click(target: Target) -> Self {
        Self::new(target, Arc::new(Click))
    }

    /// Fill `value`, verifying the read-back by default.
    pub fn fill(target: Target, value: impl Into<String>) -> Self {
        let value = value.into();
        Self::new(target, Arc::new(Fill(value.clone()))).with_post(PostCondition::ValueEquals(value))
    }

    pub fn hover(target: Target) -> Self {
        Self::new(target, Arc::new(Hover))
    }

    pub fn select(target: Target, value: impl Into<String>) -> Self {
        let value = value.into();
        Self::new(target, Arc::new(SelectOption(value.clone())))
            .with_post(PostCondition::ValueEquals(value))
    }

    pub fn with_post(mut self, post: PostCondition) -> Self {
        self.post = post;
        self
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step")
            .field("target", &self.target.name)
            .field("action", &self.action.name())
            .field("post", &self.post.describe())
            .field("policy", &self.policy)
            .finish()
    }
}

/// Result of running a step to completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionOutcome {
    Success {
        attempts_used: u32,
        verdict: Verdict,
        latency_ms: u64,
    },
    Failure {
        attempts_used: u32,
        last_error: AttemptError,
        diagnostics_path: Option<PathBuf>,
        latency_ms: u64,
    },
}

impl ActionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionOutcome::Success { .. })
    }

    pub fn attempts_used(&self) -> u32 {
        match self {
            ActionOutcome::Success { attempts_used, .. }
            | ActionOutcome::Failure { attempts_used, .. } => *attempts_used,
        }
    }

    pub fn verdict(&self) -> Option<&Verdict> {
        match self {
            ActionOutcome::Success { verdict, .. } => Some(verdict),
            ActionOutcome::Failure { .. } => None,
        }
    }
}
