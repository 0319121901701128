//! Idempotent ensure/destroy verbs for a tenant's role and database.
//!
//! Each verb opens its own administrative connection, runs one or two
//! statements and drops the connection before returning. "Already exists" on
//! create and "does not exist" on drop are absorbed into a successful
//! [`Outcome`]; every other failure is returned with the failing step named.
use crate::connection::{Connector, Execute};
use crate::error::ClusterError;
use crate::resource::{ResourceName, Secret};
use crate::sql;
use ansi_term::Colour::Green;
use anyhow::{Context, Result};
use log::{info, warn};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    /// Already existed, state updated to the requested value.
    Converged,
    /// Already existed, left as-is.
    NoOp,
    Removed,
    AlreadyAbsent,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Outcome::Created => "created",
            Outcome::Converged => "password updated (already exists)",
            Outcome::NoOp => "no action (already exists)",
            Outcome::Removed => "removed",
            Outcome::AlreadyAbsent => "no action (already absent)",
        };
        write!(f, "{}", s)
    }
}

fn connect<C: Connector>(connector: &C) -> Result<C::Connection> {
    connector
        .connect()
        .context("failed to connect to cluster")
}

/// Create the login role, or converge its password if it already exists.
pub fn ensure_role<C: Connector>(
    connector: &C,
    name: &ResourceName,
    secret: &Secret,
) -> Result<Outcome> {
    let mut conn = connect(connector)?;

    let outcome = match conn.execute(&sql::create_role(name, secret)) {
        Ok(_) => Outcome::Created,
        Err(e) if e.is_already_exists() => {
            conn.execute(&sql::alter_role_password(name, secret))
                .with_context(|| format!("failed to update password of role \"{}\"", name))?;
            Outcome::Converged
        }
        Err(e) => {
            return Err(e).with_context(|| format!("failed to create role \"{}\"", name));
        }
    };

    info!("{}: role \"{}\" {}", Green.paint("Success"), name, outcome);
    Ok(outcome)
}

/// Create the database owned by the role of the same name.
///
/// The role must already exist. An existing database is never altered, even
/// when its owner, encoding or collation differ.
pub fn ensure_database<C: Connector>(connector: &C, name: &ResourceName) -> Result<Outcome> {
    let mut conn = connect(connector)?;

    let outcome = match conn.execute(&sql::create_database(name)) {
        Ok(_) => Outcome::Created,
        Err(e) if e.is_already_exists() => Outcome::NoOp,
        Err(e) => {
            return Err(e).with_context(|| format!("failed to create database \"{}\"", name));
        }
    };

    info!("{}: database \"{}\" {}", Green.paint("Success"), name, outcome);
    Ok(outcome)
}

/// Drop the database, terminating any sessions still connected to it.
pub fn destroy_database<C: Connector>(connector: &C, name: &ResourceName) -> Result<Outcome> {
    let mut conn = connect(connector)?;
    let outcome = absorb_not_found(conn.execute(&sql::drop_database(name)))
        .with_context(|| format!("failed to drop database \"{}\"", name))?;

    info!("{}: database \"{}\" {}", Green.paint("Success"), name, outcome);
    Ok(outcome)
}

/// Drop the login role. Its database must be dropped first.
pub fn destroy_role<C: Connector>(connector: &C, name: &ResourceName) -> Result<Outcome> {
    let mut conn = connect(connector)?;
    let outcome = absorb_not_found(conn.execute(&sql::drop_role(name)))
        .with_context(|| format!("failed to drop role \"{}\"", name))?;

    info!("{}: role \"{}\" {}", Green.paint("Success"), name, outcome);
    Ok(outcome)
}

fn absorb_not_found(result: Result<u64, ClusterError>) -> Result<Outcome, ClusterError> {
    match result {
        Ok(_) => Ok(Outcome::Removed),
        Err(e) if e.is_not_found() => Ok(Outcome::AlreadyAbsent),
        Err(e) => Err(e),
    }
}

/// Outcomes of a successful [`ensure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provisioned {
    pub role: Outcome,
    pub database: Outcome,
}

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("could not ensure role: {0:#}")]
    Role(anyhow::Error),

    #[error("could not ensure database (role {role}): {error:#}")]
    Database { role: Outcome, error: anyhow::Error },
}

impl ProvisionError {
    pub fn exit_code(&self) -> i32 {
        match self {
            ProvisionError::Role(_) => 2,
            ProvisionError::Database { .. } => 3,
        }
    }
}

/// Ensure the role, then the database it owns.
pub fn ensure<C: Connector>(
    connector: &C,
    name: &ResourceName,
    secret: &Secret,
) -> Result<Provisioned, ProvisionError> {
    let role = ensure_role(connector, name, secret).map_err(ProvisionError::Role)?;
    let database = ensure_database(connector, name)
        .map_err(|error| ProvisionError::Database { role, error })?;

    Ok(Provisioned { role, database })
}

/// Outcomes of a successful [`teardown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TornDown {
    pub database: Outcome,
    pub role: Outcome,
}

#[derive(Debug, Error)]
pub enum TeardownError {
    /// Nothing was dropped; the role step was skipped.
    #[error("could not drop database, role left in place: {0:#}")]
    Database(anyhow::Error),

    #[error("could not drop role after database was {database}: {error:#}")]
    Role { database: Outcome, error: anyhow::Error },
}

impl TeardownError {
    pub fn exit_code(&self) -> i32 {
        match self {
            TeardownError::Database(_) => 4,
            TeardownError::Role { .. } => 5,
        }
    }
}

/// Drop the database, then the role.
///
/// The role step only runs once the database is gone, since a role that still
/// owns a database cannot be dropped.
pub fn teardown<C: Connector>(connector: &C, name: &ResourceName) -> Result<TornDown, TeardownError> {
    let database = match destroy_database(connector, name) {
        Ok(outcome) => outcome,
        Err(error) => {
            warn!("skipping drop of role \"{}\": database step failed", name);
            return Err(TeardownError::Database(error));
        }
    };
    let role =
        destroy_role(connector, name).map_err(|error| TeardownError::Role { database, error })?;

    Ok(TornDown { database, role })
}
