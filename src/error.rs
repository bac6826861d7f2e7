// error.rs — Error types for the library surface
//
// A digest mismatch is NOT an error anywhere in this crate; it is a verdict.
// Errors here are environment failures (hash primitive, storage, config) or
// refused requests (authorization, fraud gate, bad input).

use std::path::PathBuf;

use thiserror::Error;

/// The hash primitive could not run.
#[derive(Debug, Error)]
pub enum IntegrityError {
    #[error("hash primitive {algorithm} unavailable: {reason}")]
    PrimitiveUnavailable {
        algorithm: &'static str,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record {0} already exists")]
    Duplicate(String),

    #[error("invalid storage key {0:?}")]
    InvalidKey(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt record at {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Whether retrying the same call might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Io { .. } | StoreError::Unavailable(_))
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{actor} is not permitted to {action}")]
    Forbidden { actor: String, action: &'static str },

    #[error("account pending approval, please wait for admin verification")]
    PendingApproval,

    #[error("account deactivated, contact administrator")]
    Deactivated,

    #[error("no account found for {0}")]
    UnknownUser(String),

    #[error("email {0} is already registered")]
    EmailInUse(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum IssueError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("student name is required")]
    MissingStudentName,

    #[error("issuance blocked: fraud score {score} ({})", .reasons.join("; "))]
    FraudBlocked { score: f64, reasons: Vec<String> },

    #[error("could not allocate a free certificate id after {0} attempts")]
    IdSpaceExhausted(usize),

    #[error(transparent)]
    Integrity(#[from] IntegrityError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("certificate id is empty")]
    EmptyId,

    #[error(transparent)]
    Integrity(#[from] IntegrityError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl VerifyError {
    /// Environment failures are worth retrying; bad input is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            VerifyError::EmptyId => false,
            VerifyError::Integrity(_) => true,
            VerifyError::Store(e) => e.is_retryable(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("fraud analysis service unavailable: {0}")]
    Unavailable(String),

    #[error("malformed fraud analysis: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}
