//! Idempotent provisioning of per-tenant Postgres credentials.
//!
//! A tenant is a login role plus a database of the same name owned by it.
//! [`reconcile`] converges the cluster toward that state (or tears it down),
//! and [`password`] generates secrets for the role.

pub mod cli;
pub mod config;
pub mod connection;
pub mod error;
pub mod password;
pub mod reconcile;
pub mod report;
pub mod resource;
pub mod sql;

pub use connection::{Connector, DryRunConnector, Execute, PgConnector};
pub use error::{ClusterError, ErrorKind};
pub use password::{PasswordError, PasswordPolicy};
pub use reconcile::{Outcome, ProvisionError, TeardownError};
pub use resource::{ResourceName, Secret};
