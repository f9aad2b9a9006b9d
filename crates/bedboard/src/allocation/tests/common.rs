use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::allocation::audit::{AuditError, NewTransfer, TransferAuditLog};
use crate::allocation::directory::ResidentDirectory;
use crate::allocation::domain::{
    Bed, BedId, BedTransfer, BedType, Gender, GenderRestriction, Resident, ResidentId, Room,
    RoomId, RoomType, StaffId,
};
use crate::allocation::registry::{BedRegistry, ClaimOutcome, RegistryError};
use crate::allocation::service::{Clock, TransferService};
use crate::allocation::store::MemoryWardStore;

pub(super) fn room(id: &str, ward: &str, number: u16, room_type: RoomType) -> Room {
    Room {
        id: RoomId(id.to_string()),
        ward: ward.to_string(),
        number,
        room_type,
        capacity: 2,
        gender_preference: GenderRestriction::Open,
        active: true,
    }
}

pub(super) fn bed(
    id: &str,
    room: &str,
    label: &str,
    restriction: GenderRestriction,
    isolation_capable: bool,
) -> Bed {
    Bed {
        id: BedId(id.to_string()),
        room: RoomId(room.to_string()),
        label: label.to_string(),
        bed_type: BedType::Standard,
        occupied: false,
        occupant: None,
        gender_restriction: restriction,
        isolation_capable,
        last_cleaned: None,
    }
}

pub(super) fn resident(id: &str, gender: Gender, isolation_required: bool) -> Resident {
    Resident {
        id: ResidentId(id.to_string()),
        name: format!("Resident {id}"),
        gender,
        isolation_required,
        current_bed: None,
        discharged_on: None,
    }
}

/// Standard fixture: two East rooms and one West isolation room.
///
/// B1 (East 101, open), B2 (East 101, male only), B3 (West 201, open,
/// isolation-capable); residents res-1 (female) and res-2 (male, requires
/// isolation), neither placed yet.
pub(super) fn ward_store() -> Arc<MemoryWardStore> {
    let store = Arc::new(MemoryWardStore::new());
    store.add_room(room("R-E101", "East", 101, RoomType::Shared));
    store.add_room(room("R-E102", "East", 102, RoomType::Shared));
    store.add_room(room("R-W201", "West", 201, RoomType::Isolation));
    store.add_bed(bed("B1", "R-E101", "A", GenderRestriction::Open, false));
    store.add_bed(bed("B2", "R-E101", "B", GenderRestriction::MaleOnly, false));
    store.add_bed(bed("B3", "R-W201", "A", GenderRestriction::Open, true));
    store.admit_resident(resident("res-1", Gender::Female, false));
    store.admit_resident(resident("res-2", Gender::Male, true));
    store
}

pub(super) fn service(
    store: &Arc<MemoryWardStore>,
) -> TransferService<MemoryWardStore, MemoryWardStore, MemoryWardStore, FixedClock> {
    TransferService::with_clock(store.clone(), store.clone(), store.clone(), FixedClock)
}

pub(super) fn bed_id(id: &str) -> BedId {
    BedId(id.to_string())
}

pub(super) fn resident_id(id: &str) -> ResidentId {
    ResidentId(id.to_string())
}

pub(super) fn staff_id(id: &str) -> StaffId {
    StaffId(id.to_string())
}

pub(super) fn stored_bed(store: &MemoryWardStore, id: &str) -> Bed {
    store
        .find_bed(&bed_id(id))
        .expect("store reachable")
        .expect("bed present")
}

pub(super) fn stored_resident(store: &MemoryWardStore, id: &str) -> Resident {
    store
        .get(&resident_id(id))
        .expect("store reachable")
        .expect("resident present")
}

/// Deterministic clock so tests can assert audit timestamps.
#[derive(Debug, Clone, Copy)]
pub(super) struct FixedClock;

pub(super) fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap()
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        fixed_now()
    }
}

/// Audit double whose append always fails, for rollback tests.
#[derive(Default)]
pub(super) struct FailingAuditLog;

impl TransferAuditLog for FailingAuditLog {
    fn append(&self, _transfer: NewTransfer) -> Result<BedTransfer, AuditError> {
        Err(AuditError::Unavailable("audit log offline".to_string()))
    }

    fn history_for_resident(
        &self,
        _resident: &ResidentId,
    ) -> Result<Vec<BedTransfer>, AuditError> {
        Ok(Vec::new())
    }

    fn recent_by_staff(
        &self,
        _staff: &StaffId,
        _limit: usize,
    ) -> Result<Vec<BedTransfer>, AuditError> {
        Ok(Vec::new())
    }
}

/// Directory double whose first `set_current_bed` succeeds and every later
/// one fails, so the restore write inside a rollback can be made to break.
pub(super) struct FlakyDirectory {
    pub(super) inner: Arc<MemoryWardStore>,
    writes: AtomicUsize,
}

impl FlakyDirectory {
    pub(super) fn new(inner: Arc<MemoryWardStore>) -> Self {
        Self {
            inner,
            writes: AtomicUsize::new(0),
        }
    }
}

impl ResidentDirectory for FlakyDirectory {
    fn get(&self, id: &ResidentId) -> Result<Option<Resident>, RegistryError> {
        self.inner.get(id)
    }

    fn set_current_bed(&self, id: &ResidentId, bed: Option<BedId>) -> Result<(), RegistryError> {
        if self.writes.fetch_add(1, Ordering::SeqCst) > 0 {
            return Err(RegistryError::Unavailable(
                "directory offline".to_string(),
            ));
        }
        self.inner.set_current_bed(id, bed)
    }

    fn is_discharged(&self, id: &ResidentId) -> Result<bool, RegistryError> {
        self.inner.is_discharged(id)
    }

    fn set_discharged(&self, id: &ResidentId, on: NaiveDate) -> Result<(), RegistryError> {
        self.inner.set_discharged(id, on)
    }
}

/// Registry double that loses the claim race for the configured beds while
/// delegating everything else, so the claim-conflict paths are testable
/// without real concurrency.
pub(super) struct ConflictOnClaimRegistry {
    pub(super) inner: Arc<MemoryWardStore>,
    pub(super) conflict_beds: Vec<BedId>,
}

impl BedRegistry for ConflictOnClaimRegistry {
    fn find_available(&self) -> Result<Vec<Bed>, RegistryError> {
        self.inner.find_available()
    }

    fn find_bed(&self, id: &BedId) -> Result<Option<Bed>, RegistryError> {
        self.inner.find_bed(id)
    }

    fn claim(&self, bed: &BedId, resident: &ResidentId) -> Result<ClaimOutcome, RegistryError> {
        if self.conflict_beds.contains(bed) {
            return Ok(ClaimOutcome::Conflict);
        }
        self.inner.claim(bed, resident)
    }

    fn release(&self, bed: &BedId) -> Result<(), RegistryError> {
        self.inner.release(bed)
    }
}
