//! In-memory stand-in for a Postgres cluster.
//!
//! Statements are parsed back with the server's quoting rules and answered
//! with the SQLSTATE codes Postgres uses for the same situations.
#![allow(dead_code)]

use pgstate::connection::{Connector, Execute};
use pgstate::sql::Statement;
use pgstate::ClusterError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub struct State {
    /// role name -> password
    pub roles: HashMap<String, String>,
    /// database name -> owner
    pub databases: HashMap<String, String>,
    pub executed: Vec<String>,
    pub offline: bool,
    pub opened: usize,
    pub closed: usize,
}

#[derive(Debug, Default, Clone)]
pub struct MemoryCluster {
    pub state: Arc<Mutex<State>>,
}

pub struct MemoryConnection {
    state: Arc<Mutex<State>>,
}

impl MemoryCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn password_of(&self, role: &str) -> Option<String> {
        self.state.lock().unwrap().roles.get(role).cloned()
    }

    pub fn owner_of(&self, database: &str) -> Option<String> {
        self.state.lock().unwrap().databases.get(database).cloned()
    }

    pub fn executed(&self) -> Vec<String> {
        self.state.lock().unwrap().executed.clone()
    }

    pub fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    pub fn open_connections(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.opened - state.closed
    }
}

impl Connector for MemoryCluster {
    type Connection = MemoryConnection;

    fn connect(&self) -> Result<MemoryConnection, ClusterError> {
        let mut state = self.state.lock().unwrap();
        if state.offline {
            return Err(ClusterError::connection("connection refused"));
        }
        state.opened += 1;

        Ok(MemoryConnection {
            state: self.state.clone(),
        })
    }
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        self.state.lock().unwrap().closed += 1;
    }
}

fn err(code: &str, message: String) -> ClusterError {
    ClusterError::new(Some(code), message)
}

fn syntax_error(sql: &str) -> ClusterError {
    err("42601", format!("syntax error in: {}", sql))
}

/// Read one quoted token from the start of `input`, returning the unescaped
/// value and the rest of the input.
pub fn take_quoted(input: &str, quote: char) -> Option<(String, &str)> {
    let mut chars = input.char_indices();
    match chars.next() {
        Some((_, c)) if c == quote => {}
        _ => return None,
    }

    let mut value = String::new();
    while let Some((i, c)) = chars.next() {
        if c != quote {
            value.push(c);
            continue;
        }
        let rest = &input[i + 1..];
        if rest.starts_with(quote) {
            value.push(quote);
            chars.next();
        } else {
            return Some((value, rest));
        }
    }

    None
}

const DATABASE_OPTIONS: &str =
    " ENCODING 'UTF-8' LC_COLLATE = 'en_US.utf8' LC_CTYPE = 'en_US.utf8'";

impl State {
    fn apply(&mut self, sql: &str) -> Result<(), ClusterError> {
        if let Some(rest) = sql.strip_prefix("CREATE ROLE ") {
            let (role, rest) = take_quoted(rest, '"').ok_or_else(|| syntax_error(sql))?;
            let rest = rest
                .strip_prefix(" WITH LOGIN PASSWORD ")
                .ok_or_else(|| syntax_error(sql))?;
            let password = literal_to_end(rest).ok_or_else(|| syntax_error(sql))?;

            if self.roles.contains_key(&role) {
                return Err(err("42710", format!("role \"{}\" already exists", role)));
            }
            self.roles.insert(role, password);
            return Ok(());
        }

        if let Some(rest) = sql.strip_prefix("ALTER ROLE ") {
            let (role, rest) = take_quoted(rest, '"').ok_or_else(|| syntax_error(sql))?;
            let rest = rest
                .strip_prefix(" PASSWORD ")
                .ok_or_else(|| syntax_error(sql))?;
            let password = literal_to_end(rest).ok_or_else(|| syntax_error(sql))?;

            match self.roles.get_mut(&role) {
                Some(current) => *current = password,
                None => return Err(err("42704", format!("role \"{}\" does not exist", role))),
            }
            return Ok(());
        }

        if let Some(rest) = sql.strip_prefix("CREATE DATABASE ") {
            let (database, rest) = take_quoted(rest, '"').ok_or_else(|| syntax_error(sql))?;
            let rest = rest
                .strip_prefix(" WITH OWNER ")
                .ok_or_else(|| syntax_error(sql))?;
            let (owner, rest) = take_quoted(rest, '"').ok_or_else(|| syntax_error(sql))?;
            if rest != DATABASE_OPTIONS {
                return Err(syntax_error(sql));
            }

            if self.databases.contains_key(&database) {
                return Err(err(
                    "42P04",
                    format!("database \"{}\" already exists", database),
                ));
            }
            if !self.roles.contains_key(&owner) {
                return Err(err("42704", format!("role \"{}\" does not exist", owner)));
            }
            self.databases.insert(database, owner);
            return Ok(());
        }

        if let Some(rest) = sql.strip_prefix("DROP DATABASE ") {
            let (database, rest) = take_quoted(rest, '"').ok_or_else(|| syntax_error(sql))?;
            if rest != " WITH (FORCE)" {
                return Err(syntax_error(sql));
            }

            if self.databases.remove(&database).is_none() {
                return Err(err(
                    "3D000",
                    format!("database \"{}\" does not exist", database),
                ));
            }
            return Ok(());
        }

        if let Some(rest) = sql.strip_prefix("DROP ROLE ") {
            let (role, rest) = take_quoted(rest, '"').ok_or_else(|| syntax_error(sql))?;
            if !rest.is_empty() {
                return Err(syntax_error(sql));
            }

            if !self.roles.contains_key(&role) {
                return Err(err("42704", format!("role \"{}\" does not exist", role)));
            }
            if self.databases.values().any(|owner| *owner == role) {
                return Err(err(
                    "2BP01",
                    format!("role \"{}\" cannot be dropped because some objects depend on it", role),
                ));
            }
            self.roles.remove(&role);
            return Ok(());
        }

        Err(syntax_error(sql))
    }
}

/// A string literal that must be the last token of the statement.
fn literal_to_end(input: &str) -> Option<String> {
    match take_quoted(input, '\'') {
        Some((value, "")) => Some(value),
        _ => None,
    }
}

impl Execute for MemoryConnection {
    fn execute(&mut self, statement: &Statement) -> Result<u64, ClusterError> {
        let mut state = self.state.lock().unwrap();
        state.executed.push(statement.sql().to_string());
        state.apply(statement.sql()).map(|_| 1)
    }
}
