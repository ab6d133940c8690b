//! Core domain logic for QuickShop shared-list collaboration.
//! This crate is the single source of truth for membership invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::editor::{Editor, ProfileValidationError};
pub use model::invite::Invite;
pub use model::list::{JoinPlan, LeavePlan, ListDoc, ListValidationError};
pub use service::list_admin::{ListAdminError, ListAdminService};
pub use service::membership::{JoinOutcome, LeaveOutcome, MembershipError, MembershipService};
pub use store::membership_store::{
    ListWrite, MembershipStore, SqliteMembershipStore, StoreError, StoreResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
