use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{error, info, warn};

use super::audit::{AuditError, NewTransfer, TransferAuditLog};
use super::directory::ResidentDirectory;
use super::domain::{Bed, BedId, BedTransfer, Resident, ResidentId, StaffId};
use super::matcher::{check_suitability, find_suitable, UnsuitableReason};
use super::registry::{BedRegistry, ClaimOutcome, RegistryError};

/// Time source injected at construction so timestamps are testable.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Phase of one transfer workflow run. Each invocation runs the machine
/// Validating -> Releasing -> Claiming -> UpdatingResident -> Logging ->
/// Committed; any failure past validation aborts with compensation. The
/// phase is carried on mid-workflow errors so callers can tell a cheap
/// validation rejection from an aborted mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferPhase {
    Validating,
    Releasing,
    Claiming,
    UpdatingResident,
    Logging,
}

/// Underlying store failure that aborted a transfer.
#[derive(Debug, thiserror::Error)]
pub enum StoreFailure {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Audit(#[from] AuditError),
}

/// Error taxonomy for the transfer workflow.
///
/// `ResidentNotFound`/`BedNotFound` and the precondition variants are
/// expected, caller-recoverable outcomes reported before any mutation.
/// `Conflict` means the claim race was lost and is retryable after a fresh
/// validation pass. `Integrity` means compensation itself failed and the
/// resident may be left bedless; it must never be retried automatically.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("resident {0} not found")]
    ResidentNotFound(ResidentId),
    #[error("resident {0} is discharged")]
    ResidentDischarged(ResidentId),
    #[error("bed {0} not found")]
    BedNotFound(BedId),
    #[error("bed {0} is already occupied")]
    BedOccupied(BedId),
    #[error("bed {bed} is unsuitable for resident {resident}: {reason}")]
    BedUnsuitable {
        bed: BedId,
        resident: ResidentId,
        #[source]
        reason: UnsuitableReason,
    },
    #[error("resident {resident} already occupies bed {bed}")]
    NoOpTransfer { resident: ResidentId, bed: BedId },
    #[error("no vacant bed satisfies the constraints for resident {0}")]
    NoSuitableBed(ResidentId),
    #[error("lost the claim race for bed {0}")]
    Conflict(BedId),
    #[error("resident {resident} may be left without a bed: could not restore bed {bed} after an aborted transfer")]
    Integrity { resident: ResidentId, bed: BedId },
    #[error("transfer aborted during {phase:?}: {source}")]
    TransferFailed {
        phase: TransferPhase,
        #[source]
        source: StoreFailure,
    },
}

/// Stateful workflow performing admissions and transfers as one unit of
/// work against the backing store, with an audit record per committed run.
///
/// Explicitly constructed with its collaborators and clock; holds no
/// process-wide state, so two services over the same store behave like two
/// concurrent callers.
pub struct TransferService<R, D, L, C = SystemClock> {
    registry: Arc<R>,
    directory: Arc<D>,
    audit: Arc<L>,
    clock: C,
}

impl<R, D, L> TransferService<R, D, L>
where
    R: BedRegistry + 'static,
    D: ResidentDirectory + 'static,
    L: TransferAuditLog + 'static,
{
    pub fn new(registry: Arc<R>, directory: Arc<D>, audit: Arc<L>) -> Self {
        Self::with_clock(registry, directory, audit, SystemClock)
    }
}

impl<R, D, L, C> TransferService<R, D, L, C>
where
    R: BedRegistry + 'static,
    D: ResidentDirectory + 'static,
    L: TransferAuditLog + 'static,
    C: Clock,
{
    pub fn with_clock(registry: Arc<R>, directory: Arc<D>, audit: Arc<L>, clock: C) -> Self {
        Self {
            registry,
            directory,
            audit,
            clock,
        }
    }

    /// Move a resident into `bed_id`, releasing any bed they currently
    /// hold. A resident with no current bed is admitted (audit `from_bed`
    /// is `None`). The caller supplies the reason verbatim; substituting a
    /// placeholder for an empty reason is the caller's job, not ours.
    pub fn admit_or_transfer(
        &self,
        resident_id: &ResidentId,
        bed_id: &BedId,
        staff_id: &StaffId,
        reason: &str,
    ) -> Result<BedTransfer, TransferError> {
        // Validating: no mutation until every precondition holds.
        let resident = self.load_resident(resident_id)?;
        let bed = self.load_bed(bed_id)?;

        if resident.current_bed.as_ref() == Some(bed_id) {
            return Err(TransferError::NoOpTransfer {
                resident: resident_id.clone(),
                bed: bed_id.clone(),
            });
        }
        if bed.occupied {
            return Err(TransferError::BedOccupied(bed_id.clone()));
        }
        check_suitability(&bed, &resident.constraints()).map_err(|reason| {
            TransferError::BedUnsuitable {
                bed: bed_id.clone(),
                resident: resident_id.clone(),
                reason,
            }
        })?;

        // Releasing: free the prior bed, remembering it for the audit
        // record and for compensation if a later step fails.
        let from_bed = resident.current_bed.clone();
        if let Some(prior) = &from_bed {
            self.registry.release(prior).map_err(|source| {
                TransferError::TransferFailed {
                    phase: TransferPhase::Releasing,
                    source: source.into(),
                }
            })?;
        }

        // Claiming: the atomic check-and-set is the only defense against
        // concurrent callers, so its outcome is authoritative even though
        // validation just saw the bed vacant.
        match self.registry.claim(bed_id, resident_id) {
            Ok(ClaimOutcome::Claimed) => {}
            Ok(ClaimOutcome::Conflict) => {
                self.reclaim_prior(resident_id, &from_bed)?;
                warn!(resident = %resident_id, bed = %bed_id, "lost claim race, prior bed restored");
                return Err(TransferError::Conflict(bed_id.clone()));
            }
            Err(source) => {
                self.reclaim_prior(resident_id, &from_bed)?;
                return Err(TransferError::TransferFailed {
                    phase: TransferPhase::Claiming,
                    source: source.into(),
                });
            }
        }

        // UpdatingResident: point the resident record at the new bed.
        if let Err(source) = self
            .directory
            .set_current_bed(resident_id, Some(bed_id.clone()))
        {
            self.undo_claim(resident_id, bed_id, &from_bed)?;
            return Err(TransferError::TransferFailed {
                phase: TransferPhase::UpdatingResident,
                source: source.into(),
            });
        }

        // Logging: one record per committed run. An un-audited bed change
        // is not an acceptable end state, so a failed append rolls the
        // whole invocation back.
        let transfer = NewTransfer {
            resident: resident_id.clone(),
            from_bed: from_bed.clone(),
            to_bed: bed_id.clone(),
            staff: staff_id.clone(),
            transferred_at: self.clock.now(),
            reason: reason.to_string(),
        };
        match self.audit.append(transfer) {
            Ok(record) => {
                info!(
                    resident = %resident_id,
                    from = from_bed.as_ref().map(|bed| bed.0.as_str()).unwrap_or("-"),
                    to = %bed_id,
                    staff = %staff_id,
                    "transfer committed"
                );
                Ok(record)
            }
            Err(source) => {
                if let Err(err) = self.directory.set_current_bed(resident_id, from_bed.clone()) {
                    // The resident record still names the target bed here, so
                    // the claim must stay: releasing it would leave the record
                    // pointing at a vacant bed.
                    error!(resident = %resident_id, %err, "failed to restore resident bed reference");
                    return Err(TransferError::Integrity {
                        resident: resident_id.clone(),
                        bed: bed_id.clone(),
                    });
                }
                self.undo_claim(resident_id, bed_id, &from_bed)?;
                Err(TransferError::TransferFailed {
                    phase: TransferPhase::Logging,
                    source: source.into(),
                })
            }
        }
    }

    /// Admission policy for flows without a human picking a bed: take the
    /// first eligible candidate in registry order.
    pub fn admit_first_suitable(
        &self,
        resident_id: &ResidentId,
        staff_id: &StaffId,
        reason: &str,
    ) -> Result<BedTransfer, TransferError> {
        let resident = self.load_resident(resident_id)?;
        let candidates = find_suitable(self.registry.as_ref(), &resident.constraints()).map_err(
            |source| TransferError::TransferFailed {
                phase: TransferPhase::Validating,
                source: source.into(),
            },
        )?;
        let bed_id = candidates
            .first()
            .map(|bed| bed.id.clone())
            .ok_or_else(|| TransferError::NoSuitableBed(resident_id.clone()))?;
        self.admit_or_transfer(resident_id, &bed_id, staff_id, reason)
    }

    /// All vacant beds, in registry order.
    pub fn available_beds(&self) -> Result<Vec<Bed>, TransferError> {
        self.registry
            .find_available()
            .map_err(|source| TransferError::TransferFailed {
                phase: TransferPhase::Validating,
                source: source.into(),
            })
    }

    /// Vacant beds this resident may occupy, in registry order.
    pub fn suitable_for(&self, resident_id: &ResidentId) -> Result<Vec<Bed>, TransferError> {
        let resident = self.load_resident(resident_id)?;
        find_suitable(self.registry.as_ref(), &resident.constraints()).map_err(|source| {
            TransferError::TransferFailed {
                phase: TransferPhase::Validating,
                source: source.into(),
            }
        })
    }

    /// Discharge a resident: clear the bed reference and release the bed
    /// together, then record the discharge date. The record persists for
    /// reporting; a discharged resident never holds a bed reference.
    pub fn discharge(
        &self,
        resident_id: &ResidentId,
        on: NaiveDate,
    ) -> Result<(), TransferError> {
        let resident = self.load_resident(resident_id)?;

        if let Some(bed) = &resident.current_bed {
            self.directory
                .set_current_bed(resident_id, None)
                .map_err(|source| TransferError::TransferFailed {
                    phase: TransferPhase::UpdatingResident,
                    source: source.into(),
                })?;
            if let Err(source) = self.registry.release(bed) {
                self.directory
                    .set_current_bed(resident_id, Some(bed.clone()))
                    .map_err(|_| TransferError::Integrity {
                        resident: resident_id.clone(),
                        bed: bed.clone(),
                    })?;
                return Err(TransferError::TransferFailed {
                    phase: TransferPhase::Releasing,
                    source: source.into(),
                });
            }
        }

        self.directory
            .set_discharged(resident_id, on)
            .map_err(|source| TransferError::TransferFailed {
                phase: TransferPhase::UpdatingResident,
                source: source.into(),
            })?;
        info!(resident = %resident_id, %on, "resident discharged");
        Ok(())
    }

    /// Transfer history for one resident, newest first.
    pub fn history_for_resident(
        &self,
        resident_id: &ResidentId,
    ) -> Result<Vec<BedTransfer>, TransferError> {
        self.audit
            .history_for_resident(resident_id)
            .map_err(|source| TransferError::TransferFailed {
                phase: TransferPhase::Logging,
                source: source.into(),
            })
    }

    /// Most recent transfers performed by one staff member.
    pub fn recent_by_staff(
        &self,
        staff_id: &StaffId,
        limit: usize,
    ) -> Result<Vec<BedTransfer>, TransferError> {
        self.audit
            .recent_by_staff(staff_id, limit)
            .map_err(|source| TransferError::TransferFailed {
                phase: TransferPhase::Logging,
                source: source.into(),
            })
    }

    fn load_resident(&self, resident_id: &ResidentId) -> Result<Resident, TransferError> {
        let resident = self
            .directory
            .get(resident_id)
            .map_err(|source| TransferError::TransferFailed {
                phase: TransferPhase::Validating,
                source: source.into(),
            })?
            .ok_or_else(|| TransferError::ResidentNotFound(resident_id.clone()))?;
        if resident.is_discharged() {
            return Err(TransferError::ResidentDischarged(resident_id.clone()));
        }
        Ok(resident)
    }

    fn load_bed(&self, bed_id: &BedId) -> Result<Bed, TransferError> {
        self.registry
            .find_bed(bed_id)
            .map_err(|source| TransferError::TransferFailed {
                phase: TransferPhase::Validating,
                source: source.into(),
            })?
            .ok_or_else(|| TransferError::BedNotFound(bed_id.clone()))
    }

    /// Compensation: re-occupy the prior bed after an aborted claim so the
    /// resident keeps their original placement. A failed re-claim leaves
    /// the resident bedless and is surfaced as a fatal integrity error.
    fn reclaim_prior(
        &self,
        resident_id: &ResidentId,
        prior: &Option<BedId>,
    ) -> Result<(), TransferError> {
        let Some(bed) = prior else {
            return Ok(());
        };
        match self.registry.claim(bed, resident_id) {
            Ok(ClaimOutcome::Claimed) => Ok(()),
            Ok(ClaimOutcome::Conflict) | Err(_) => {
                error!(resident = %resident_id, bed = %bed, "compensation failed: prior bed could not be re-claimed");
                Err(TransferError::Integrity {
                    resident: resident_id.clone(),
                    bed: bed.clone(),
                })
            }
        }
    }

    /// Compensation: release a claim applied this invocation, then restore
    /// the prior bed.
    fn undo_claim(
        &self,
        resident_id: &ResidentId,
        bed_id: &BedId,
        prior: &Option<BedId>,
    ) -> Result<(), TransferError> {
        if self.registry.release(bed_id).is_err() {
            error!(resident = %resident_id, bed = %bed_id, "compensation failed: aborted claim could not be released");
            return Err(TransferError::Integrity {
                resident: resident_id.clone(),
                bed: bed_id.clone(),
            });
        }
        self.reclaim_prior(resident_id, prior)
    }
}
