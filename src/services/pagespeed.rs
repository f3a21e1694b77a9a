//! PageSpeed Insights audit client

use std::fmt;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::PageSpeedConfig;
use crate::errors::SuiteError;

const SERVICE: &str = "pagespeed";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Desktop,
    Mobile,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Desktop => "desktop",
            Strategy::Mobile => "mobile",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub id: String,
    /// Lighthouse reports `null` when a category could not be scored
    pub score: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub url: String,
    pub strategy: Strategy,
    pub threshold: f64,
    pub scores: Vec<CategoryScore>,
    /// Categories scoring under the threshold, or missing a score
    pub below_threshold: Vec<String>,
}

impl AuditReport {
    pub fn passed(&self) -> bool {
        self.below_threshold.is_empty()
    }

    pub fn score(&self, id: &str) -> Option<f64> {
        self.scores.iter().find(|s| s.id == id).and_then(|s| s.score)
    }
}

#[derive(Clone)]
pub struct PageSpeedClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    categories: Vec<String>,
    threshold: f64,
}

impl PageSpeedClient {
    pub fn new(config: &PageSpeedConfig) -> Result<Self, SuiteError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| SuiteError::external(SERVICE, err.to_string()))?;
        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            categories: config.categories.clone(),
            threshold: config.threshold,
        })
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub async fn audit(&self, url: &str, strategy: Strategy) -> Result<AuditReport, SuiteError> {
        let mut query: Vec<(&str, String)> = vec![
            ("url", url.to_string()),
            ("strategy", strategy.as_str().to_string()),
        ];
        for category in &self.categories {
            query.push(("category", api_category(category)));
        }
        if let Some(key) = &self.api_key {
            query.push(("key", key.clone()));
        }
        if self.api_key.is_none() {
            warn!("PAGESPEED_API_KEY not set; request may be rate limited");
        }

        info!(url, %strategy, "requesting PageSpeed audit");
        let response = self
            .http
            .get(&self.endpoint)
            .query(&query)
            .send()
            .await
            .map_err(|err| SuiteError::external(SERVICE, err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SuiteError::external(
                SERVICE,
                format!("HTTP {}: {}", status, body.trim()),
            ));
        }
        let body: Value = response
            .json()
            .await
            .map_err(|err| SuiteError::external(SERVICE, format!("invalid response: {}", err)))?;

        let report = self.evaluate(url, strategy, &body)?;
        for score in &report.scores {
            info!(url, %strategy, category = %score.id, score = ?score.score, "category score");
        }
        Ok(report)
    }

    fn evaluate(&self, url: &str, strategy: Strategy, body: &Value) -> Result<AuditReport, SuiteError> {
        let categories = body
            .pointer("/lighthouseResult/categories")
            .and_then(Value::as_object)
            .ok_or_else(|| {
                SuiteError::external(SERVICE, "response has no lighthouseResult.categories")
            })?;

        let scores: Vec<CategoryScore> = self
            .categories
            .iter()
            .map(|id| CategoryScore {
                id: id.clone(),
                score: categories
                    .get(id)
                    .and_then(|c| c.get("score"))
                    .and_then(Value::as_f64),
            })
            .collect();
        let below_threshold = scores
            .iter()
            .filter(|s| s.score.map_or(true, |score| score < self.threshold))
            .map(|s| s.id.clone())
            .collect();

        Ok(AuditReport {
            url: url.to_string(),
            strategy,
            threshold: self.threshold,
            scores,
            below_threshold,
        })
    }
}

/// `best-practices` -> `BEST_PRACTICES`
fn api_category(id: &str) -> String {
    id.replace('-', "_").to_uppercase()
}
