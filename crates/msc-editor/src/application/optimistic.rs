//! Optimistic mutation commit classification.
//!
//! An optimistic edit applies locally first and then attempts the remote
//! commit.  When the commit fails the recovery depends on *why*:
//!
//! - the entity is gone server-side: the local copy is fiction now, so the
//!   caller discards the entity instead of rolling back the edit;
//! - any other failure: the caller rolls back to the value captured at
//!   call time, never to the "current" value, so a rollback that resolves
//!   late cannot clobber an interleaved newer edit.
//!
//! [`CommitOutcome`] folds the two "gone" representations (a 404 error and
//! an explicit `None` result) into one variant so call sites branch on
//! recovery strategy, not on transport detail.

use crate::infrastructure::api::ApiError;

/// Classified result of an optimistic remote commit.
#[derive(Debug)]
pub enum CommitOutcome<T> {
    /// The backend accepted the mutation.
    Committed(T),
    /// The target entity no longer exists server-side; discard it locally.
    EntityGone,
    /// Transient failure; roll back to the captured pre-mutation value.
    Failed(ApiError),
}

/// Classifies the raw result of an update-style call.
pub fn classify_commit<T>(result: Result<Option<T>, ApiError>) -> CommitOutcome<T> {
    match result {
        Ok(Some(value)) => CommitOutcome::Committed(value),
        Ok(None) => CommitOutcome::EntityGone,
        Err(e) if e.is_not_found() => CommitOutcome::EntityGone,
        Err(e) => CommitOutcome::Failed(e),
    }
}
