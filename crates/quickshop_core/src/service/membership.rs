//! List membership use-case service.
//!
//! # Responsibility
//! - Coordinate invite-based joining and leaving of shared lists.
//! - Map store decisions onto caller-visible outcomes and errors.
//!
//! # Invariants
//! - A user appears in a list's editors at most once, regardless of how many
//!   concurrent join attempts race for the same list.
//! - `AlreadyMember`/`NotMember` are defined outcomes, not failures.
//! - The service performs no local retry; conflict handling lives entirely in
//!   the store.

use crate::model::editor::{Editor, ProfileValidationError};
use crate::model::invite::Invite;
use crate::model::list::{JoinPlan, LeavePlan};
use crate::store::membership_store::{ListWrite, MembershipStore, StoreError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Caller-visible result of a join attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The user was added as an editor by this call.
    Joined,
    /// The user was already an editor; nothing was written.
    AlreadyMember,
}

/// Caller-visible result of a leave attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// The user was removed from the editors by this call.
    Left,
    /// The user was not an editor; nothing was written.
    NotMember,
}

/// Service error for membership use-cases.
#[derive(Debug)]
pub enum MembershipError {
    /// Referenced list does not exist.
    ListNotFound(String),
    /// Referenced invite does not exist.
    InviteNotFound(String),
    /// Acting user is not an editor of the target list.
    NotAMember { list_id: String, user_id: String },
    /// Candidate profile is incomplete.
    InvalidProfile(ProfileValidationError),
    /// Store could not resolve a write conflict; safe to retry.
    Conflict { attempts: u32 },
    /// Other persistence-layer failure.
    Store(StoreError),
}

impl Display for MembershipError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ListNotFound(list_id) => write!(f, "list not found: {list_id}"),
            Self::InviteNotFound(invite_id) => write!(f, "invite not found: {invite_id}"),
            Self::NotAMember { list_id, user_id } => {
                write!(f, "user {user_id} is not an editor of list {list_id}")
            }
            Self::InvalidProfile(err) => write!(f, "{err}"),
            Self::Conflict { attempts } => {
                write!(f, "join/leave conflict not resolved after {attempts} attempts")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MembershipError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidProfile(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProfileValidationError> for MembershipError {
    fn from(value: ProfileValidationError) -> Self {
        Self::InvalidProfile(value)
    }
}

impl From<StoreError> for MembershipError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::ListNotFound(list_id) => Self::ListNotFound(list_id),
            StoreError::Conflict { attempts } => Self::Conflict { attempts },
            other => Self::Store(other),
        }
    }
}

/// Membership service facade over store implementations.
pub struct MembershipService<S: MembershipStore> {
    store: S,
}

impl<S: MembershipStore> MembershipService<S> {
    /// Creates a service using the provided store implementation.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Adds `candidate` as an editor of the list exactly once.
    ///
    /// # Contract
    /// - Missing list fails with `ListNotFound` before any transaction.
    /// - The membership check and the append run against the same
    ///   transaction-scoped snapshot, so concurrent duplicate joins resolve
    ///   to exactly one `Joined` and the rest `AlreadyMember`.
    pub fn join_list(
        &mut self,
        list_id: &str,
        candidate: &Editor,
    ) -> Result<JoinOutcome, MembershipError> {
        candidate.validate()?;

        // Cheap existence probe so absent lists fail without opening a
        // write transaction. The store re-reads inside the transaction.
        if self.store.get_list(list_id)?.is_none() {
            return Err(MembershipError::ListNotFound(list_id.to_string()));
        }

        let write = self.store.update_list(list_id, &|current| {
            Ok(match current.plan_join(candidate) {
                JoinPlan::AlreadyMember => ListWrite::Keep,
                JoinPlan::Append(next) => ListWrite::Commit(next),
            })
        })?;

        let outcome = match write {
            ListWrite::Commit(_) => JoinOutcome::Joined,
            ListWrite::Keep => JoinOutcome::AlreadyMember,
        };
        info!(
            "event=list_join module=service status=ok list_id={list_id} user_id={} outcome={outcome:?}",
            candidate.id
        );
        Ok(outcome)
    }

    /// Accepts a pending invite on behalf of `candidate`.
    ///
    /// The invite is consumed, not deleted. List existence is re-validated by
    /// the join itself, since time may pass between invite lookup and join.
    pub fn accept_invite(
        &mut self,
        invite_id: &str,
        candidate: &Editor,
    ) -> Result<JoinOutcome, MembershipError> {
        let Some(invite) = self.store.get_invite(invite_id)? else {
            return Err(MembershipError::InviteNotFound(invite_id.to_string()));
        };
        self.join_list(&invite.list_id, candidate)
    }

    /// Issues a new invite for the list on behalf of a current editor.
    pub fn create_invite(
        &mut self,
        list_id: &str,
        inviter_id: &str,
    ) -> Result<Invite, MembershipError> {
        let Some(list) = self.store.get_list(list_id)? else {
            return Err(MembershipError::ListNotFound(list_id.to_string()));
        };
        if !list.has_editor(inviter_id) {
            return Err(MembershipError::NotAMember {
                list_id: list_id.to_string(),
                user_id: inviter_id.to_string(),
            });
        }

        let invite = Invite::issue(&list, inviter_id);
        self.store.create_invite(&invite)?;
        info!(
            "event=invite_created module=service status=ok list_id={list_id} inviter_id={inviter_id} invite_id={}",
            invite.invite_id
        );
        Ok(invite)
    }

    /// Removes the user from the list's editors and deletes the invites the
    /// user issued for it, atomically.
    pub fn leave_list(
        &mut self,
        list_id: &str,
        user_id: &str,
    ) -> Result<LeaveOutcome, MembershipError> {
        let outcome = match self.store.remove_editor(list_id, user_id)? {
            LeavePlan::Remove(_) => LeaveOutcome::Left,
            LeavePlan::NotMember => LeaveOutcome::NotMember,
        };
        info!(
            "event=list_leave module=service status=ok list_id={list_id} user_id={user_id} outcome={outcome:?}"
        );
        Ok(outcome)
    }
}
