//! Result records

use crate::error::AccNameError;
use serde::{Serialize, Serializer};
use std::fmt;

/// Partial result of one recursive naming step
///
/// `title` holds a tooltip-derived candidate. It becomes the name only when
/// nothing else names the node, otherwise it is a description candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamingResult {
    pub name: String,
    pub title: String,
}

impl NamingResult {
    pub fn named(name: String) -> Self {
        Self {
            name,
            title: String::new(),
        }
    }
}

/// Output of a top-level computation
#[derive(Debug, Default, Serialize)]
pub struct AccessibleName {
    pub name: String,
    pub description: String,
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<AccNameError>,
}

impl AccessibleName {
    /// Empty result, used for ineligible nodes
    pub fn empty() -> Self {
        Self::default()
    }

    /// Empty result carrying a fault
    pub fn failed(error: AccNameError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    /// True when the computation finished without a fault
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

impl fmt::Display for AccessibleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "accName: \"{}\"\n\naccDesc: \"{}\"",
            self.name, self.description
        )
    }
}

fn serialize_error<S>(error: &Option<AccNameError>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match error {
        Some(err) => serializer.serialize_some(&err.to_string()),
        None => serializer.serialize_none(),
    }
}
