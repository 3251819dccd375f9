//! Out-of-stock remediation against a session store.

use thiserror::Error;

use kiemke_core::SessionDate;
use kiemke_inventory::{RemediationBatch, build_remediation_batch, compare_chronological};

use crate::store::{SessionStore, StoreError};

#[derive(Debug, Error)]
pub enum RemediationError {
    #[error("no stock-count session stored for {0}")]
    SessionNotFound(SessionDate),

    #[error("remediation target {target} is before the newer session {newer}")]
    TargetBeforeNewer {
        target: SessionDate,
        newer: SessionDate,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Zero out every item that disappeared between two stored sessions.
///
/// The two dates may be given in either order. The zero-quantity lines are
/// saved into the session dated `today` and returned. Nothing is written when
/// no item went out of stock. `today` must not precede the newer session, so
/// real counts in the older one are never overwritten.
pub fn remediate_out_of_stock<S>(
    store: &S,
    older: SessionDate,
    newer: SessionDate,
    today: SessionDate,
) -> Result<RemediationBatch, RemediationError>
where
    S: SessionStore + ?Sized,
{
    let first = store
        .load(older)?
        .ok_or(RemediationError::SessionNotFound(older))?;
    let second = store
        .load(newer)?
        .ok_or(RemediationError::SessionNotFound(newer))?;

    let comparison = compare_chronological(&first, &second);
    if today < comparison.newer_date {
        return Err(RemediationError::TargetBeforeNewer {
            target: today,
            newer: comparison.newer_date,
        });
    }

    let older_session = if comparison.older_date == first.date { &first } else { &second };
    let batch = build_remediation_batch(&comparison.results, older_session, today);

    if batch.is_empty() {
        tracing::info!(
            older = %comparison.older_date,
            newer = %comparison.newer_date,
            "no out-of-stock items; nothing to remediate"
        );
        return Ok(batch);
    }

    store.save(batch.date, batch.items.clone())?;
    tracing::info!(
        older = %comparison.older_date,
        newer = %comparison.newer_date,
        target = %batch.date,
        zeroed = batch.len(),
        "out-of-stock items zeroed"
    );

    Ok(batch)
}
