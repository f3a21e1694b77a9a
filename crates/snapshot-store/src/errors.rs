use thiserror::Error;

#[derive(Clone, Debug, Error)]
pub enum SnapErrKind {
    #[error("page unavailable: {0}")]
    PageUnavailable(String),
    #[error("artifact already exists: {0}")]
    AlreadyExists(String),
    #[error("io failure: {0}")]
    IoFailed(String),
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Clone, Debug, Error)]
#[error(transparent)]
pub struct SnapError(pub SnapErrKind);

impl SnapError {
    pub fn new(kind: SnapErrKind) -> Self {
        Self(kind)
    }

    pub fn kind(&self) -> &SnapErrKind {
        &self.0
    }
}

impl From<SnapErrKind> for SnapError {
    fn from(kind: SnapErrKind) -> Self {
        SnapError(kind)
    }
}

impl From<std::io::Error> for SnapError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::AlreadyExists {
            SnapError(SnapErrKind::AlreadyExists(err.to_string()))
        } else {
            SnapError(SnapErrKind::IoFailed(err.to_string()))
        }
    }
}
