//! The error type returned by a complete update run.
//!
//! Every component reports its own error type. When a failure crosses into the [`Updater`](crate::updater::Updater),
//! it is wrapped into an [`Error`] that records *what kind* of failure happened and *during which stage*.
//! The stage decides the process exit code, so scripts can branch on it.

use std::fmt::Display;

use thiserror::Error;

/// Broad classification of a failure
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Wrong number of arguments or unparsable flags
    Usage,
    /// The API token does not have the expected shape
    Credential,
    /// The domain or record name is malformed or does not resolve
    Validation,
    /// The IP address to publish could not be determined
    Resolution,
    /// The target record is missing from the registrar
    Lookup,
    /// The registrar API failed or misbehaved
    Transport,
}

/// The step of an update run in which a failure occurred.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Stage {
    Arguments,
    Token,
    Domain,
    Record,
    Address,
    Reconcile,
    Update,
}

impl Stage {
    /// Process exit code reported for failures in this stage.
    /// These values are relied upon by scripts and must not change.
    pub fn exit_code(self) -> u8 {
        match self {
            Stage::Token => 1,
            Stage::Domain => 2,
            Stage::Record => 3,
            Stage::Address => 4,
            Stage::Reconcile => 5,
            Stage::Update => 6,
            // os.Exit(-1) as seen by a POSIX shell
            Stage::Arguments => 255,
        }
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Arguments => "arguments",
            Stage::Token => "token",
            Stage::Domain => "domain",
            Stage::Record => "record",
            Stage::Address => "address",
            Stage::Reconcile => "reconcile",
            Stage::Update => "update",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Error)]
#[error("{detail}")]
pub struct Error {
    kind: ErrorKind,
    stage: Stage,
    detail: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl Error {
    pub fn new(kind: ErrorKind, stage: Stage, detail: impl Into<String>) -> Self {
        Error {
            kind,
            stage,
            detail: detail.into(),
            source: None,
        }
    }

    /// Attach the lower-level error that caused this one
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn exit_code(&self) -> u8 {
        self.stage.exit_code()
    }
}
