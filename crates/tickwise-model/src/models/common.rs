//! Small enums shared by the store and the CLI.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Which occurrences of a recurring task an edit or delete applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditMode {
    /// Only the occurrence on the given date.
    Single,
    /// The given occurrence and every later one.
    Future,
    /// The whole series.
    All,
}

impl EditMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditMode::Single => "single",
            EditMode::Future => "future",
            EditMode::All => "all",
        }
    }
}

impl fmt::Display for EditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EditMode {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single" | "this" => Ok(EditMode::Single),
            "future" | "following" => Ok(EditMode::Future),
            "all" | "series" => Ok(EditMode::All),
            _ => Err(ModelError::invalid_edit_mode(s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_mode_from_str() {
        assert_eq!("single".parse::<EditMode>().unwrap(), EditMode::Single);
        assert_eq!("FUTURE".parse::<EditMode>().unwrap(), EditMode::Future);
        assert_eq!("series".parse::<EditMode>().unwrap(), EditMode::All);
        assert_eq!("this".parse::<EditMode>().unwrap(), EditMode::Single);
        assert!("some".parse::<EditMode>().is_err());
    }

    #[test]
    fn test_edit_mode_display() {
        assert_eq!(EditMode::Future.to_string(), "future");
        assert_eq!(serde_json::to_string(&EditMode::All).unwrap(), "\"all\"");
    }
}
