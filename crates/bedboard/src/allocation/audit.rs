use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{BedId, BedTransfer, ResidentId, StaffId};

/// Transfer payload handed to the log; the log assigns the monotonic id and
/// the recorded-at timestamp when it appends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransfer {
    pub resident: ResidentId,
    pub from_bed: Option<BedId>,
    pub to_bed: BedId,
    pub staff: StaffId,
    pub transferred_at: DateTime<Utc>,
    pub reason: String,
}

/// Append-only history of committed transfers.
///
/// `append` never fails silently: a failed append after a successful claim
/// aborts the whole transfer workflow, because an un-audited bed change is
/// not an acceptable end state in this domain. Records are immutable once
/// written.
pub trait TransferAuditLog: Send + Sync {
    fn append(&self, transfer: NewTransfer) -> Result<BedTransfer, AuditError>;

    /// Full history for one resident, newest first.
    fn history_for_resident(&self, resident: &ResidentId) -> Result<Vec<BedTransfer>, AuditError>;

    /// Most recent transfers performed by one staff member, newest first,
    /// bounded by `limit`.
    fn recent_by_staff(
        &self,
        staff: &StaffId,
        limit: usize,
    ) -> Result<Vec<BedTransfer>, AuditError>;
}

/// Error enumeration for audit log failures.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit log unavailable: {0}")]
    Unavailable(String),
}
