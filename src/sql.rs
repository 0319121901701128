use crate::resource::{ResourceName, Secret};
use std::fmt;

const REDACTED_LITERAL: &str = "'********'";

/// Escape and quote a PostgreSQL identifier.
///
/// Embedded double quotes are doubled before wrapping.
pub fn quote_identifier(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Escape and quote a PostgreSQL string literal.
///
/// Embedded single quotes are doubled before wrapping. Backslashes are left
/// as-is, which is correct under `standard_conforming_strings = on` (the
/// server default since 9.1).
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// A statement ready to be sent to the cluster.
///
/// `Display` renders the redacted form, with any secret literal masked, so a
/// statement can be logged safely. Only [`Statement::sql`] carries the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Statement {
    sql: String,
    redacted: String,
}

impl Statement {
    fn public(sql: String) -> Self {
        Self {
            redacted: sql.clone(),
            sql,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.redacted)
    }
}

impl fmt::Debug for Statement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Statement").field(&self.redacted).finish()
    }
}

/// ```sql
/// CREATE ROLE "<role>" WITH LOGIN PASSWORD '<secret>'
/// ```
pub fn create_role(role: &ResourceName, secret: &Secret) -> Statement {
    let prefix = format!("CREATE ROLE {} WITH LOGIN PASSWORD ", quote_identifier(role.as_str()));
    Statement {
        sql: format!("{}{}", prefix, quote_literal(secret.expose())),
        redacted: format!("{}{}", prefix, REDACTED_LITERAL),
    }
}

/// ```sql
/// ALTER ROLE "<role>" PASSWORD '<secret>'
/// ```
pub fn alter_role_password(role: &ResourceName, secret: &Secret) -> Statement {
    let prefix = format!("ALTER ROLE {} PASSWORD ", quote_identifier(role.as_str()));
    Statement {
        sql: format!("{}{}", prefix, quote_literal(secret.expose())),
        redacted: format!("{}{}", prefix, REDACTED_LITERAL),
    }
}

/// The database is owned by the role of the same name.
///
/// ```sql
/// CREATE DATABASE "<db>" WITH OWNER "<db>" ENCODING 'UTF-8' LC_COLLATE = 'en_US.utf8' LC_CTYPE = 'en_US.utf8'
/// ```
pub fn create_database(database: &ResourceName) -> Statement {
    let name = quote_identifier(database.as_str());
    Statement::public(format!(
        "CREATE DATABASE {} WITH OWNER {} ENCODING 'UTF-8' LC_COLLATE = 'en_US.utf8' LC_CTYPE = 'en_US.utf8'",
        name, name
    ))
}

/// ```sql
/// DROP DATABASE "<db>" WITH (FORCE)
/// ```
pub fn drop_database(database: &ResourceName) -> Statement {
    Statement::public(format!(
        "DROP DATABASE {} WITH (FORCE)",
        quote_identifier(database.as_str())
    ))
}

/// ```sql
/// DROP ROLE "<role>"
/// ```
pub fn drop_role(role: &ResourceName) -> Statement {
    Statement::public(format!("DROP ROLE {}", quote_identifier(role.as_str())))
}
