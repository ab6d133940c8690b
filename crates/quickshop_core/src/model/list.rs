//! Shared list document model and membership planning rules.
//!
//! # Responsibility
//! - Define the list document shape persisted by the store.
//! - Express join/leave decisions as pure functions over a snapshot of the
//!   document, so transaction mechanics stay out of the business rule.
//!
//! # Invariants
//! - `editor_ids.len() == editors.len()` and `editors[i].id == editor_ids[i]`.
//! - `editor_ids` never contains duplicate identifiers.
//! - Planning functions return a fresh document; the input snapshot is never
//!   mutated.

use crate::model::editor::Editor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Structural validation error for a list document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListValidationError {
    /// `editor_ids` and `editors` have different lengths.
    EditorCountMismatch { ids: usize, profiles: usize },
    /// The profile at `index` does not carry the id at the same index.
    MisalignedEditor { index: usize },
    /// The same user identifier appears more than once.
    DuplicateEditor(String),
    /// The list identifier is blank.
    BlankListId,
}

impl Display for ListValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EditorCountMismatch { ids, profiles } => write!(
                f,
                "editor_ids has {ids} entries but editors has {profiles}"
            ),
            Self::MisalignedEditor { index } => {
                write!(f, "editor profile at index {index} does not match editor_ids")
            }
            Self::DuplicateEditor(id) => write!(f, "duplicate editor id `{id}`"),
            Self::BlankListId => write!(f, "list id is blank"),
        }
    }
}

impl Error for ListValidationError {}

/// Membership decision produced by [`ListDoc::plan_join`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinPlan {
    /// Candidate is already an editor; the document must not be written.
    AlreadyMember,
    /// Candidate is new; commit the returned document state.
    Append(ListDoc),
}

/// Membership decision produced by [`ListDoc::plan_leave`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeavePlan {
    /// User is not an editor; the document must not be written.
    NotMember,
    /// User was an editor; commit the returned document state.
    Remove(ListDoc),
}

/// Document-shaped record for one shared shopping list.
///
/// Membership is stored as two parallel collections: bare identifiers for
/// cheap lookups and full profile snapshots for display. Both are mutated
/// together, only through store transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListDoc {
    /// Opaque stable list identifier.
    pub list_id: String,
    /// Display name shown to collaborators.
    pub name: String,
    /// Editor user identifiers, no duplicates.
    pub editor_ids: Vec<String>,
    /// Editor profile snapshots, index-aligned with `editor_ids`.
    pub editors: Vec<Editor>,
    /// Storage-side optimistic concurrency counter. Not business data; bumped
    /// by the store on every committed write.
    pub version: i64,
}

impl ListDoc {
    /// Creates a list owned by a single founding editor.
    pub fn new(list_id: impl Into<String>, name: impl Into<String>, owner: Editor) -> Self {
        Self {
            list_id: list_id.into(),
            name: name.into(),
            editor_ids: vec![owner.id.clone()],
            editors: vec![owner],
            version: 0,
        }
    }

    /// Checks structural invariants of the document.
    pub fn validate(&self) -> Result<(), ListValidationError> {
        if self.list_id.trim().is_empty() {
            return Err(ListValidationError::BlankListId);
        }
        if self.editor_ids.len() != self.editors.len() {
            return Err(ListValidationError::EditorCountMismatch {
                ids: self.editor_ids.len(),
                profiles: self.editors.len(),
            });
        }
        for (index, (id, editor)) in self.editor_ids.iter().zip(&self.editors).enumerate() {
            if &editor.id != id {
                return Err(ListValidationError::MisalignedEditor { index });
            }
        }
        let mut seen = BTreeSet::new();
        for id in &self.editor_ids {
            if !seen.insert(id.as_str()) {
                return Err(ListValidationError::DuplicateEditor(id.clone()));
            }
        }
        Ok(())
    }

    /// Returns whether `user_id` is currently an editor.
    pub fn has_editor(&self, user_id: &str) -> bool {
        self.editor_ids.iter().any(|id| id == user_id)
    }

    /// Plans adding `candidate` as an editor.
    ///
    /// Pure decision over the given snapshot: the membership check and the
    /// append are inseparable, which is what makes the join idempotent once
    /// the store runs the plan against transaction-scoped state.
    pub fn plan_join(&self, candidate: &Editor) -> JoinPlan {
        if self.has_editor(&candidate.id) {
            return JoinPlan::AlreadyMember;
        }
        let mut next = self.clone();
        next.editor_ids.push(candidate.id.clone());
        next.editors.push(candidate.clone());
        JoinPlan::Append(next)
    }

    /// Plans removing `user_id` from the editors.
    ///
    /// Removes the identifier and the profile at the same index, preserving
    /// alignment for the remaining editors.
    pub fn plan_leave(&self, user_id: &str) -> LeavePlan {
        let Some(index) = self.editor_ids.iter().position(|id| id == user_id) else {
            return LeavePlan::NotMember;
        };
        let mut next = self.clone();
        next.editor_ids.remove(index);
        next.editors.remove(index);
        LeavePlan::Remove(next)
    }
}
