//! Validation outcome shared by components and placement validators

use serde::{Deserialize, Serialize};

/// Outcome of a validation pass.
///
/// A failed validation is an ordinary value, not an error: callers inspect
/// `is_valid` and surface `errors` to the user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// A passing result with no messages
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// A failing result with a single error
    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            errors: vec![error.into()],
            warnings: Vec::new(),
        }
    }

    /// Build from collected errors; valid when there are none
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings: Vec::new(),
        }
    }

    /// Attach a warning
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    /// Attach several warnings
    pub fn with_warnings(mut self, warnings: impl IntoIterator<Item = String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    #[inline]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_errors() {
        assert!(ValidationResult::from_errors(Vec::new()).is_valid);
        let result = ValidationResult::from_errors(vec!["bad".into()]).with_warning("hmm");
        assert!(!result.is_valid);
        assert_eq!(result.errors, vec!["bad".to_string()]);
        assert!(result.has_warnings());
    }
}
