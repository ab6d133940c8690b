//! List administration use-case service.
//!
//! # Responsibility
//! - Provide create/rename/delete entry points for list documents.
//! - Keep invite display snapshots consistent with list state.
//!
//! # Invariants
//! - Rename rewrites every invite's `list_name` in the same transaction as
//!   the list write.
//! - Delete removes the list document together with all of its invites.

use crate::model::editor::{Editor, ProfileValidationError};
use crate::model::list::ListDoc;
use crate::store::membership_store::{MembershipStore, StoreError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for list administration use-cases.
#[derive(Debug)]
pub enum ListAdminError {
    /// Referenced list does not exist.
    ListNotFound(String),
    /// List name input is empty or whitespace-only.
    BlankName,
    /// Owner profile is incomplete.
    InvalidProfile(ProfileValidationError),
    /// Store could not resolve a write conflict; safe to retry.
    Conflict { attempts: u32 },
    /// Other persistence-layer failure.
    Store(StoreError),
}

impl Display for ListAdminError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ListNotFound(list_id) => write!(f, "list not found: {list_id}"),
            Self::BlankName => write!(f, "list name is blank"),
            Self::InvalidProfile(err) => write!(f, "{err}"),
            Self::Conflict { attempts } => {
                write!(f, "list write conflict not resolved after {attempts} attempts")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ListAdminError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidProfile(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProfileValidationError> for ListAdminError {
    fn from(value: ProfileValidationError) -> Self {
        Self::InvalidProfile(value)
    }
}

impl From<StoreError> for ListAdminError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::ListNotFound(list_id) => Self::ListNotFound(list_id),
            StoreError::Conflict { attempts } => Self::Conflict { attempts },
            other => Self::Store(other),
        }
    }
}

/// List administration facade over store implementations.
pub struct ListAdminService<S: MembershipStore> {
    store: S,
}

impl<S: MembershipStore> ListAdminService<S> {
    /// Creates a service using the provided store implementation.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates a new shared list owned by a single founding editor.
    pub fn create_list(
        &mut self,
        list_id: &str,
        name: &str,
        owner: Editor,
    ) -> Result<ListDoc, ListAdminError> {
        if name.trim().is_empty() {
            return Err(ListAdminError::BlankName);
        }
        owner.validate()?;

        let list = ListDoc::new(list_id, name, owner);
        self.store.create_list(&list)?;
        info!("event=list_created module=service status=ok list_id={list_id}");
        Ok(list)
    }

    /// Renames a list and refreshes the name snapshot on its invites.
    pub fn rename_list(&mut self, list_id: &str, new_name: &str) -> Result<(), ListAdminError> {
        if new_name.trim().is_empty() {
            return Err(ListAdminError::BlankName);
        }
        self.store.rename_list(list_id, new_name)?;
        info!("event=list_renamed module=service status=ok list_id={list_id}");
        Ok(())
    }

    /// Deletes a list together with all of its invites.
    pub fn delete_list(&mut self, list_id: &str) -> Result<(), ListAdminError> {
        self.store.delete_list(list_id)?;
        info!("event=list_deleted module=service status=ok list_id={list_id}");
        Ok(())
    }
}
