//! Domain models for shared-list collaboration.
//!
//! # Responsibility
//! - Define the canonical list/invite/editor records shared by store and
//!   service layers.
//! - Keep membership planning rules pure and storage-agnostic.
//!
//! # Invariants
//! - `ListDoc::editor_ids` and `ListDoc::editors` are always index-aligned.
//! - Planning functions never mutate their inputs.

pub mod editor;
pub mod invite;
pub mod list;
