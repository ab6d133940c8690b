//! Editor profile snapshot.
//!
//! # Responsibility
//! - Carry the verified identity attributes embedded into list documents.
//!
//! # Invariants
//! - `id`, `email` and `name` are required and non-blank.
//! - Profiles are supplied per request by the identity collaborator and are
//!   never persisted outside a list document.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation error for editor profile input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileValidationError {
    /// A required profile field is empty or whitespace-only.
    BlankField(&'static str),
}

impl Display for ProfileValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "editor profile field `{field}` is blank"),
        }
    }
}

impl Error for ProfileValidationError {}

/// User profile snapshot embedded into a list's membership record.
///
/// The identity collaborator verifies these attributes before they reach the
/// core; this model only enforces presence, not authenticity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Editor {
    /// Stable user identifier from the identity provider.
    pub id: String,
    /// Contact email at the time of joining.
    pub email: String,
    /// Display name at the time of joining.
    pub name: String,
}

impl Editor {
    /// Creates a profile snapshot from verified identity attributes.
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            name: name.into(),
        }
    }

    /// Checks that all required profile fields are present.
    pub fn validate(&self) -> Result<(), ProfileValidationError> {
        if self.id.trim().is_empty() {
            return Err(ProfileValidationError::BlankField("id"));
        }
        if self.email.trim().is_empty() {
            return Err(ProfileValidationError::BlankField("email"));
        }
        if self.name.trim().is_empty() {
            return Err(ProfileValidationError::BlankField("name"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Editor, ProfileValidationError};

    #[test]
    fn complete_profile_passes_validation() {
        let editor = Editor::new("u1", "a@example.com", "Ana");
        assert!(editor.validate().is_ok());
    }

    #[test]
    fn blank_fields_are_rejected_with_field_name() {
        let missing_email = Editor::new("u1", "   ", "Ana");
        assert_eq!(
            missing_email.validate().unwrap_err(),
            ProfileValidationError::BlankField("email")
        );

        let missing_id = Editor::new("", "a@example.com", "Ana");
        assert_eq!(
            missing_id.validate().unwrap_err(),
            ProfileValidationError::BlankField("id")
        );
    }
}
