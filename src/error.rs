//! Cluster error classification.
//!
//! Failures reported by the cluster are classified by their SQLSTATE code,
//! never by matching the (localized) message text.

use std::fmt;

/// Error categories the reconciler branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Cannot reach or authenticate to the cluster.
    Connection,
    /// The object being created is already there (safe to absorb in ensure).
    AlreadyExists,
    /// The object being dropped is not there (safe to absorb in destroy).
    NotFound,
    PermissionDenied,
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            ErrorKind::Connection => "connection failure",
            ErrorKind::AlreadyExists => "already exists",
            ErrorKind::NotFound => "not found",
            ErrorKind::PermissionDenied => "permission denied",
            ErrorKind::Other => "error",
        };
        write!(f, "{}", s)
    }
}

/// duplicate_object, duplicate_database, unique_violation
const ALREADY_EXISTS_CODES: &[&str] = &["42710", "42P04", "23505"];

/// undefined_object, invalid_catalog_name
const NOT_FOUND_CODES: &[&str] = &["42704", "3D000"];

/// insufficient_privilege
const PERMISSION_CODES: &[&str] = &["42501"];

/// invalid_authorization_specification, invalid_password, cannot_connect_now
const CONNECTION_CODES: &[&str] = &["28000", "28P01", "57P03"];

/// Classify a SQLSTATE code.
///
/// An error without a code never reached the SQL layer (I/O, closed socket,
/// TLS) and counts as a connection failure.
pub fn classify(code: Option<&str>) -> ErrorKind {
    match code {
        None => ErrorKind::Connection,
        Some(c) if ALREADY_EXISTS_CODES.contains(&c) => ErrorKind::AlreadyExists,
        Some(c) if NOT_FOUND_CODES.contains(&c) => ErrorKind::NotFound,
        Some(c) if PERMISSION_CODES.contains(&c) => ErrorKind::PermissionDenied,
        // Class 08: connection exception
        Some(c) if CONNECTION_CODES.contains(&c) || c.starts_with("08") => ErrorKind::Connection,
        Some(_) => ErrorKind::Other,
    }
}

/// A failure reported by the cluster or the transport.
#[derive(Debug)]
pub struct ClusterError {
    pub kind: ErrorKind,
    pub code: Option<String>,
    pub message: String,
}

impl fmt::Display for ClusterError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} (SQLSTATE {})", self.message, code),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ClusterError {}

impl ClusterError {
    pub fn new(code: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            kind: classify(code),
            code: code.map(str::to_string),
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Connection,
            code: None,
            message: message.into(),
        }
    }

    pub fn is_already_exists(&self) -> bool {
        self.kind == ErrorKind::AlreadyExists
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    pub fn is_connection(&self) -> bool {
        self.kind == ErrorKind::Connection
    }
}

impl From<postgres::Error> for ClusterError {
    fn from(err: postgres::Error) -> Self {
        match err.as_db_error() {
            Some(db) => ClusterError::new(Some(db.code().code()), db.message()),
            None => ClusterError::new(err.code().map(|c| c.code()), err.to_string()),
        }
    }
}
