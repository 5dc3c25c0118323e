//! Filter identity and store key derivation
//!
//! The rendered key is the one fixed external contract: any two deployments
//! using the same naming scheme share the same logical filters.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FilterError;

const SEPARATOR_WORD: &str = "statType";

/// Identifies one logical bit vector inside the shared store
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterIdentity {
    /// Scope, e.g. the activity or campaign the filter tracks
    act_key: String,
    /// Category within the scope
    stat_type: String,
}

impl FilterIdentity {
    /// Create an identity; both parts must be non-empty
    pub fn new(act_key: impl Into<String>, stat_type: impl Into<String>) -> Result<Self, FilterError> {
        let identity = Self {
            act_key: act_key.into(),
            stat_type: stat_type.into(),
        };
        identity.validate()?;
        Ok(identity)
    }

    /// Both parts must be non-empty and must not contain the key separator
    /// word, otherwise two different identities could render to one key.
    pub fn validate(&self) -> Result<(), FilterError> {
        for (name, part) in [("act_key", &self.act_key), ("stat_type", &self.stat_type)] {
            if part.is_empty() {
                return Err(FilterError::InvalidConfiguration(format!(
                    "{} cannot be empty",
                    name
                )));
            }
            if part.contains(SEPARATOR_WORD) {
                return Err(FilterError::InvalidConfiguration(format!(
                    "{} cannot contain '{}'",
                    name, SEPARATOR_WORD
                )));
            }
        }
        Ok(())
    }

    pub fn act_key(&self) -> &str {
        &self.act_key
    }

    pub fn stat_type(&self) -> &str {
        &self.stat_type
    }

    /// Store key of the bit vector: `bloomFilter_act_<actKey>_statType_<statType>`
    pub fn store_key(&self) -> String {
        format!(
            "bloomFilter_act_{}_statType_{}",
            self.act_key, self.stat_type
        )
    }
}

impl fmt::Display for FilterIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.act_key, self.stat_type)
    }
}
