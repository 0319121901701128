use anyhow::{anyhow, Result};
use std::fmt;

/// Longest identifier Postgres keeps without truncation (NAMEDATALEN - 1).
pub const MAX_IDENTIFIER_BYTES: usize = 63;

/// Name shared by a tenant's login role and the database it owns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceName(String);

impl ResourceName {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();

        if name.is_empty() {
            return Err(anyhow!("resource name is empty"));
        }
        if name.len() > MAX_IDENTIFIER_BYTES {
            return Err(anyhow!(
                "resource name `{}` is {} bytes, the limit is {}",
                name,
                name.len(),
                MAX_IDENTIFIER_BYTES
            ));
        }
        if name.contains('\0') {
            return Err(anyhow!("resource name contains a NUL character"));
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ResourceName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// A role password. Never printed by `Debug` or `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(secret: impl Into<String>) -> Result<Self> {
        let secret = secret.into();

        if secret.is_empty() {
            return Err(anyhow!("secret is empty"));
        }
        if secret.contains('\0') {
            return Err(anyhow!("secret contains a NUL character"));
        }

        Ok(Self(secret))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Secret(********)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "********")
    }
}
