//! Computation options

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Options for one name/description computation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccNameConfig {
    /// Ignore `::before`/`::after` text that looks like annotation output
    /// (`accName: `, `aria-` mentions)
    pub prevent_self_referential_generated_text: bool,
}

impl AccNameConfig {
    /// Parse options from a JSON object, missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
