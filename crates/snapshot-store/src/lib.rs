//! Diagnostic capture for failed resolutions and actions.
//!
//! Artifacts are write-once files under a results directory. Capture never
//! fails from the caller's point of view: problems are logged and the
//! affected artifact is simply left out of the returned list.

pub mod capture;
pub mod errors;
pub mod fs;
pub mod model;
pub mod policy;

pub use capture::DiagnosticCapture;
pub use errors::{SnapErrKind, SnapError};
pub use fs::layout::slugify;
pub use fs::sweep::{list_artifacts, sweep_dir};
pub use model::{ArtifactKind, DiagnosticArtifact};
pub use policy::CapturePolicy;
