use std::fs;
use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};

use crate::model::{ArtifactKind, DiagnosticArtifact};

/// Remove artifacts whose modification time is older than `ttl`.
pub fn sweep_dir(root: &Path, ttl: Duration) -> io::Result<usize> {
    if !root.exists() {
        return Ok(0);
    }
    let mut removed = 0;
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if !metadata.is_file() || artifact_kind(&entry.path()).is_none() {
            continue;
        }
        let modified = metadata.modified().unwrap_or(SystemTime::now());
        if SystemTime::now()
            .duration_since(modified)
            .unwrap_or_default()
            > ttl
        {
            fs::remove_file(entry.path())?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Artifacts under `root`, oldest first.
pub fn list_artifacts(root: &Path) -> io::Result<Vec<DiagnosticArtifact>> {
    if !root.exists() {
        return Ok(Vec::new());
    }
    let mut out = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        let Some(kind) = artifact_kind(&path) else {
            continue;
        };
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let created_at: DateTime<Utc> = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());
        out.push(DiagnosticArtifact {
            kind,
            path,
            created_at,
        });
    }
    out.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.path.cmp(&b.path)));
    Ok(out)
}

fn artifact_kind(path: &Path) -> Option<ArtifactKind> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(ArtifactKind::from_extension)
}
