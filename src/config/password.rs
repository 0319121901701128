use crate::password::{PasswordPolicy, DEFAULT_LENGTH};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Password generation defaults.
///
/// ```yaml
/// password:
///   length: 64
///   allow_special: true
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct PasswordConfig {
    #[serde(default = "default_length")]
    pub length: usize,
    #[serde(default = "default_allow_special")]
    pub allow_special: bool,
}

fn default_length() -> usize {
    DEFAULT_LENGTH
}

fn default_allow_special() -> bool {
    true
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            length: default_length(),
            allow_special: default_allow_special(),
        }
    }
}

impl PasswordConfig {
    pub fn to_policy(&self) -> PasswordPolicy {
        PasswordPolicy {
            include_special: self.allow_special,
            length: self.length,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let policy = self.to_policy();

        if policy.length == 0 {
            return Err(anyhow!("password length must be at least 1"));
        }
        if policy.length > policy.capacity() {
            return Err(anyhow!(
                "password length {} exceeds the {} symbols the enabled character classes can supply",
                policy.length,
                policy.capacity()
            ));
        }

        Ok(())
    }
}
