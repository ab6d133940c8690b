//! Membership store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide point reads and transactional conditional writes for list and
//!   invite documents.
//! - Own the bounded conflict-retry loop so callers see a single blocking
//!   call per operation.
//!
//! # Invariants
//! - Every list write re-reads the document inside the transaction; plans
//!   never run against state read outside the transaction boundary.
//! - Committed writes bump the document `version` and are conditional on the
//!   version observed by the transaction-scoped read.
//! - Retry exhaustion surfaces as `StoreError::Conflict`, never as a silent
//!   partial write.

use crate::db::DbError;
use crate::model::editor::Editor;
use crate::model::invite::Invite;
use crate::model::list::{LeavePlan, ListDoc, ListValidationError};
use log::{debug, warn};
use rusqlite::{params, Connection, ErrorCode, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Upper bound on transaction attempts before a write conflict is surfaced
/// to the caller as transient failure.
const MAX_TXN_ATTEMPTS: u32 = 5;

const LIST_SELECT_SQL: &str = "SELECT
    list_id,
    name,
    editor_ids,
    editors,
    version
FROM lists";

const INVITE_SELECT_SQL: &str = "SELECT
    invite_id,
    list_id,
    list_name,
    inviter_id
FROM invites";

pub type StoreResult<T> = Result<T, StoreError>;

/// Generic store error for membership persistence operations.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Document failed structural validation on read or before write.
    Validation(ListValidationError),
    /// Referenced list document does not exist.
    ListNotFound(String),
    /// Write conflict could not be resolved within the retry bound.
    Conflict { attempts: u32 },
    /// Required table is missing from the connection schema.
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::ListNotFound(list_id) => write!(f, "list not found: {list_id}"),
            Self::Conflict { attempts } => {
                write!(f, "write conflict not resolved after {attempts} attempts")
            }
            Self::MissingRequiredTable(table) => {
                write!(f, "membership store requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted list data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ListValidationError> for StoreError {
    fn from(value: ListValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Decision returned by a list update plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListWrite {
    /// Commit the provided document state as a single write.
    Commit(ListDoc),
    /// Leave the document untouched and end the transaction without a write.
    Keep,
}

/// Document-store contract for list membership operations.
///
/// Implementations must run each mutating operation as one atomic
/// read-modify-write with automatic bounded retry on write conflicts.
pub trait MembershipStore {
    /// Inserts a brand new list document.
    fn create_list(&self, list: &ListDoc) -> StoreResult<()>;
    /// Point read of one list document by id.
    fn get_list(&self, list_id: &str) -> StoreResult<Option<ListDoc>>;
    /// Runs `plan` against transaction-scoped list state and applies its
    /// decision. Returns the decision that was actually applied, with
    /// `ListWrite::Commit` carrying the persisted document state.
    fn update_list(
        &mut self,
        list_id: &str,
        plan: &dyn Fn(&ListDoc) -> StoreResult<ListWrite>,
    ) -> StoreResult<ListWrite>;
    /// Removes `user_id` from the list's editors and deletes all invites the
    /// user issued for the list, in one transaction.
    fn remove_editor(&mut self, list_id: &str, user_id: &str) -> StoreResult<LeavePlan>;
    /// Renames the list and rewrites the denormalized name snapshot on its
    /// invites, in one transaction. Renaming to the current name is a no-op.
    fn rename_list(&mut self, list_id: &str, new_name: &str) -> StoreResult<()>;
    /// Deletes the list document and all of its invites, in one transaction.
    fn delete_list(&mut self, list_id: &str) -> StoreResult<()>;
    /// Inserts one invite record.
    fn create_invite(&self, invite: &Invite) -> StoreResult<()>;
    /// Point read of one invite by id.
    fn get_invite(&self, invite_id: &str) -> StoreResult<Option<Invite>>;
    /// Lists all invites pointing at the given list, in stable order.
    fn invites_for_list(&self, list_id: &str) -> StoreResult<Vec<Invite>>;
}

/// Outcome of one transaction attempt inside the retry loop.
enum TxStep<T> {
    /// Commit the transaction and return the value.
    Commit(T),
    /// Roll back without writing and return the value.
    Rollback(T),
    /// The conditional write lost a version race; retry the whole attempt.
    Contended,
}

/// SQLite-backed membership store.
pub struct SqliteMembershipStore<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteMembershipStore<'conn> {
    /// Constructs a store from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> StoreResult<Self> {
        for table in ["lists", "invites"] {
            if !table_exists(conn, table)? {
                return Err(StoreError::MissingRequiredTable(table));
            }
        }
        Ok(Self { conn })
    }

    /// Runs `body` inside an immediate transaction, retrying bounded times
    /// on busy/locked errors and on conditional-write contention.
    fn with_retry<T>(
        &mut self,
        label: &str,
        body: impl Fn(&Transaction<'_>) -> StoreResult<TxStep<T>>,
    ) -> StoreResult<T> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let step = self
                .conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(StoreError::from)
                .and_then(|tx| match body(&tx)? {
                    TxStep::Commit(value) => {
                        tx.commit()?;
                        Ok(Some(value))
                    }
                    // Dropping the transaction rolls it back.
                    TxStep::Rollback(value) => Ok(Some(value)),
                    TxStep::Contended => Ok(None),
                });

            match step {
                Ok(Some(value)) => return Ok(value),
                Ok(None) => {}
                Err(StoreError::Db(DbError::Sqlite(ref err))) if is_busy(err) => {}
                Err(other) => return Err(other),
            }

            if attempt >= MAX_TXN_ATTEMPTS {
                warn!(
                    "event=list_txn module=store status=error op={label} attempts={attempt} error_code=conflict_exhausted"
                );
                return Err(StoreError::Conflict { attempts: attempt });
            }
            debug!("event=list_txn_retry module=store status=retry op={label} attempt={attempt}");
        }
    }
}

impl MembershipStore for SqliteMembershipStore<'_> {
    fn create_list(&self, list: &ListDoc) -> StoreResult<()> {
        list.validate()?;
        self.conn.execute(
            "INSERT INTO lists (list_id, name, editor_ids, editors, version)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                list.list_id,
                list.name,
                to_json(&list.editor_ids)?,
                to_json(&list.editors)?,
                list.version,
            ],
        )?;
        Ok(())
    }

    fn get_list(&self, list_id: &str) -> StoreResult<Option<ListDoc>> {
        read_list(self.conn, list_id)
    }

    fn update_list(
        &mut self,
        list_id: &str,
        plan: &dyn Fn(&ListDoc) -> StoreResult<ListWrite>,
    ) -> StoreResult<ListWrite> {
        self.with_retry("update_list", |tx| {
            let Some(current) = read_list(tx, list_id)? else {
                return Err(StoreError::ListNotFound(list_id.to_string()));
            };
            match plan(&current)? {
                ListWrite::Keep => Ok(TxStep::Rollback(ListWrite::Keep)),
                ListWrite::Commit(mut next) => {
                    if next.list_id != current.list_id {
                        return Err(StoreError::InvalidData(format!(
                            "plan changed list id from `{}` to `{}`",
                            current.list_id, next.list_id
                        )));
                    }
                    next.validate()?;
                    next.version = current.version + 1;
                    if !write_list(tx, &next, current.version)? {
                        return Ok(TxStep::Contended);
                    }
                    Ok(TxStep::Commit(ListWrite::Commit(next)))
                }
            }
        })
    }

    fn remove_editor(&mut self, list_id: &str, user_id: &str) -> StoreResult<LeavePlan> {
        self.with_retry("remove_editor", |tx| {
            let Some(current) = read_list(tx, list_id)? else {
                return Err(StoreError::ListNotFound(list_id.to_string()));
            };
            match current.plan_leave(user_id) {
                LeavePlan::NotMember => Ok(TxStep::Rollback(LeavePlan::NotMember)),
                LeavePlan::Remove(mut next) => {
                    next.version = current.version + 1;
                    if !write_list(tx, &next, current.version)? {
                        return Ok(TxStep::Contended);
                    }
                    tx.execute(
                        "DELETE FROM invites WHERE list_id = ?1 AND inviter_id = ?2;",
                        params![list_id, user_id],
                    )?;
                    Ok(TxStep::Commit(LeavePlan::Remove(next)))
                }
            }
        })
    }

    fn rename_list(&mut self, list_id: &str, new_name: &str) -> StoreResult<()> {
        self.with_retry("rename_list", |tx| {
            let Some(current) = read_list(tx, list_id)? else {
                return Err(StoreError::ListNotFound(list_id.to_string()));
            };
            if current.name == new_name {
                return Ok(TxStep::Rollback(()));
            }
            let mut next = current.clone();
            next.name = new_name.to_string();
            next.version = current.version + 1;
            if !write_list(tx, &next, current.version)? {
                return Ok(TxStep::Contended);
            }
            tx.execute(
                "UPDATE invites SET list_name = ?2 WHERE list_id = ?1;",
                params![list_id, new_name],
            )?;
            Ok(TxStep::Commit(()))
        })
    }

    fn delete_list(&mut self, list_id: &str) -> StoreResult<()> {
        self.with_retry("delete_list", |tx| {
            let deleted = tx.execute("DELETE FROM lists WHERE list_id = ?1;", [list_id])?;
            if deleted == 0 {
                return Err(StoreError::ListNotFound(list_id.to_string()));
            }
            tx.execute("DELETE FROM invites WHERE list_id = ?1;", [list_id])?;
            Ok(TxStep::Commit(()))
        })
    }

    fn create_invite(&self, invite: &Invite) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO invites (invite_id, list_id, list_name, inviter_id)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                invite.invite_id,
                invite.list_id,
                invite.list_name,
                invite.inviter_id,
            ],
        )?;
        Ok(())
    }

    fn get_invite(&self, invite_id: &str) -> StoreResult<Option<Invite>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{INVITE_SELECT_SQL} WHERE invite_id = ?1;"))?;
        let mut rows = stmt.query([invite_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_invite_row(row)?));
        }
        Ok(None)
    }

    fn invites_for_list(&self, list_id: &str) -> StoreResult<Vec<Invite>> {
        let mut stmt = self.conn.prepare(&format!(
            "{INVITE_SELECT_SQL}
             WHERE list_id = ?1
             ORDER BY created_at ASC, invite_id ASC;"
        ))?;
        let mut rows = stmt.query([list_id])?;
        let mut invites = Vec::new();
        while let Some(row) = rows.next()? {
            invites.push(parse_invite_row(row)?);
        }
        Ok(invites)
    }
}

fn read_list(conn: &Connection, list_id: &str) -> StoreResult<Option<ListDoc>> {
    let mut stmt = conn.prepare(&format!("{LIST_SELECT_SQL} WHERE list_id = ?1;"))?;
    let mut rows = stmt.query([list_id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_list_row(row)?));
    }
    Ok(None)
}

/// Writes `next`, conditional on the version observed by the transaction
/// read. Returns `false` when the condition did not match any row.
fn write_list(tx: &Transaction<'_>, next: &ListDoc, expected_version: i64) -> StoreResult<bool> {
    let changed = tx.execute(
        "UPDATE lists
         SET
            name = ?2,
            editor_ids = ?3,
            editors = ?4,
            version = ?5,
            updated_at = (strftime('%s', 'now') * 1000)
         WHERE list_id = ?1
           AND version = ?6;",
        params![
            next.list_id,
            next.name,
            to_json(&next.editor_ids)?,
            to_json(&next.editors)?,
            next.version,
            expected_version,
        ],
    )?;
    Ok(changed == 1)
}

fn parse_list_row(row: &Row<'_>) -> StoreResult<ListDoc> {
    let editor_ids: Vec<String> = from_json(&row.get::<_, String>("editor_ids")?, "editor_ids")?;
    let editors: Vec<Editor> = from_json(&row.get::<_, String>("editors")?, "editors")?;
    let list = ListDoc {
        list_id: row.get("list_id")?,
        name: row.get("name")?,
        editor_ids,
        editors,
        version: row.get("version")?,
    };
    list.validate()?;
    Ok(list)
}

fn parse_invite_row(row: &Row<'_>) -> StoreResult<Invite> {
    Ok(Invite {
        invite_id: row.get("invite_id")?,
        list_id: row.get("list_id")?,
        list_name: row.get("list_name")?,
        inviter_id: row.get("inviter_id")?,
    })
}

fn to_json<T: serde::Serialize>(value: &T) -> StoreResult<String> {
    serde_json::to_string(value)
        .map_err(|err| StoreError::InvalidData(format!("cannot encode document column: {err}")))
}

fn from_json<T: serde::de::DeserializeOwned>(raw: &str, column: &str) -> StoreResult<T> {
    serde_json::from_str(raw).map_err(|err| {
        StoreError::InvalidData(format!("invalid json in lists.{column}: {err}"))
    })
}

fn is_busy(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(code, _)
            if matches!(code.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
    )
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
