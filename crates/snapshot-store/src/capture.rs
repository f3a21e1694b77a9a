use chrono::Utc;
use storefront_core_types::PageDriver;
use tracing::{debug, warn};

use crate::errors::{SnapErrKind, SnapError};
use crate::fs::{layout, writer};
use crate::model::{ArtifactKind, DiagnosticArtifact};
use crate::policy::CapturePolicy;

/// Persists screenshots and HTML snapshots of the current page state.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCapture {
    policy: CapturePolicy,
}

impl DiagnosticCapture {
    pub fn new(policy: CapturePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &CapturePolicy {
        &self.policy
    }

    /// Capture every artifact kind enabled by the policy.
    ///
    /// Never fails: each artifact that cannot be produced is logged and left
    /// out of the result.
    pub async fn capture(&self, page: &dyn PageDriver, slug: &str) -> Vec<DiagnosticArtifact> {
        let mut artifacts = Vec::new();
        let kinds = [
            (ArtifactKind::Screenshot, self.policy.screenshot),
            (ArtifactKind::HtmlSnapshot, self.policy.html),
        ];
        for (kind, enabled) in kinds {
            if !enabled {
                continue;
            }
            match self.capture_one(page, slug, kind).await {
                Ok(artifact) => {
                    debug!(path = %artifact.path.display(), ?kind, "diagnostic artifact written");
                    artifacts.push(artifact);
                }
                Err(err) => {
                    warn!(slug, ?kind, error = %err, "diagnostic capture failed");
                }
            }
        }
        artifacts
    }

    async fn capture_one(
        &self,
        page: &dyn PageDriver,
        slug: &str,
        kind: ArtifactKind,
    ) -> Result<DiagnosticArtifact, SnapError> {
        let data = match kind {
            ArtifactKind::Screenshot => page.screenshot().await,
            ArtifactKind::HtmlSnapshot => page.html().await.map(String::into_bytes),
        }
        .map_err(|err| SnapError::new(SnapErrKind::PageUnavailable(err.to_string())))?;

        let created_at = Utc::now();
        let path = layout::artifact_path(&self.policy.root, slug, kind, created_at);
        let path = tokio::task::spawn_blocking(move || writer::write_new(path, &data))
            .await
            .map_err(|err| SnapError::new(SnapErrKind::Internal(err.to_string())))??;

        Ok(DiagnosticArtifact {
            kind,
            path,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom_fixture::{FakePage, Node};

    fn page() -> FakePage {
        FakePage::at(
            "https://shop.test/us/products/tee",
            Node::new("html").child(Node::new("body").child(Node::new("h1").text("Tee"))),
        )
    }

    #[tokio::test]
    async fn writes_screenshot_and_html_named_after_the_slug() {
        let dir = tempfile::tempdir().unwrap();
        let capture = DiagnosticCapture::new(CapturePolicy::at(dir.path()));

        let artifacts = capture.capture(&page(), "Product title debug").await;

        assert_eq!(artifacts.len(), 2);
        assert_eq!(artifacts[0].kind, ArtifactKind::Screenshot);
        assert!(artifacts[0].file_name().starts_with("product-title-debug-"));
        let html = std::fs::read_to_string(&artifacts[1].path).unwrap();
        assert!(html.contains("<h1>Tee</h1>"));
    }

    #[tokio::test]
    async fn failures_are_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let capture = DiagnosticCapture::new(CapturePolicy::at(dir.path()));
        let page = page();

        page.fail_screenshots(true);
        let artifacts = capture.capture(&page, "cart").await;
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].kind, ArtifactKind::HtmlSnapshot);

        page.close().await.unwrap();
        assert!(capture.capture(&page, "cart").await.is_empty());
    }

    #[tokio::test]
    async fn respects_disabled_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let capture = DiagnosticCapture::new(CapturePolicy {
            root: dir.path().to_path_buf(),
            screenshot: true,
            html: false,
        });
        let artifacts = capture.capture(&page(), "images").await;
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].path.extension().unwrap(), "png");
    }
}
