//! Invite record model.
//!
//! # Responsibility
//! - Represent a pending reference from an invite identifier to a target
//!   list.
//!
//! # Invariants
//! - Invites are consumed (not deleted) on acceptance.
//! - `list_name` is a denormalized display snapshot; the store refreshes it
//!   when the list is renamed.

use crate::model::list::ListDoc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Pending invitation pointing at one shared list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invite {
    /// Opaque stable invite identifier.
    pub invite_id: String,
    /// Target list identifier.
    pub list_id: String,
    /// List display name at issue time, kept in sync on rename.
    pub list_name: String,
    /// Editor who issued the invite. Used to clean up invites when the
    /// inviter leaves the list.
    pub inviter_id: String,
}

impl Invite {
    /// Issues a new invite for `list` with a generated identifier.
    pub fn issue(list: &ListDoc, inviter_id: impl Into<String>) -> Self {
        Self {
            invite_id: Uuid::new_v4().to_string(),
            list_id: list.list_id.clone(),
            list_name: list.name.clone(),
            inviter_id: inviter_id.into(),
        }
    }
}
