use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{NaiveDate, Utc};

use super::audit::{AuditError, NewTransfer, TransferAuditLog};
use super::directory::ResidentDirectory;
use super::domain::{
    Bed, BedId, BedTransfer, Resident, ResidentId, Room, RoomId, StaffId, TransferId,
};
use super::registry::{BedRegistry, ClaimOutcome, RegistryError};

#[derive(Default)]
struct WardState {
    rooms: HashMap<RoomId, Room>,
    beds: HashMap<BedId, Bed>,
    residents: HashMap<ResidentId, Resident>,
    transfers: Vec<BedTransfer>,
    next_transfer: u64,
}

/// In-memory store backing all three allocation ports.
///
/// One mutex guards the whole ward state, so `claim` performs its
/// check-and-set inside a single critical section: the occupancy read and
/// the conditional write cannot be interleaved by another caller, closing
/// the check-then-update race a naive read-then-write implementation has.
#[derive(Default)]
pub struct MemoryWardStore {
    state: Mutex<WardState>,
}

impl MemoryWardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provisioning happens administratively, outside the transfer
    /// workflow; these helpers stand in for that flow.
    pub fn add_room(&self, room: Room) {
        let mut state = self.state.lock().expect("ward state mutex poisoned");
        state.rooms.insert(room.id.clone(), room);
    }

    pub fn add_bed(&self, bed: Bed) {
        let mut state = self.state.lock().expect("ward state mutex poisoned");
        state.beds.insert(bed.id.clone(), bed);
    }

    pub fn admit_resident(&self, resident: Resident) {
        let mut state = self.state.lock().expect("ward state mutex poisoned");
        state.residents.insert(resident.id.clone(), resident);
    }

    pub fn bed_count(&self) -> usize {
        let state = self.state.lock().expect("ward state mutex poisoned");
        state.beds.len()
    }
}

impl BedRegistry for MemoryWardStore {
    fn find_available(&self) -> Result<Vec<Bed>, RegistryError> {
        let state = self.state.lock().expect("ward state mutex poisoned");
        let mut beds: Vec<Bed> = state
            .beds
            .values()
            .filter(|bed| bed.is_vacant())
            .cloned()
            .collect();
        // Ward, then room number, then bed label; beds in unknown rooms
        // sort last so the ordering stays total.
        beds.sort_by_cached_key(|bed| match state.rooms.get(&bed.room) {
            Some(room) => (false, room.ward.clone(), room.number, bed.label.clone()),
            None => (true, String::new(), u16::MAX, bed.label.clone()),
        });
        Ok(beds)
    }

    fn find_bed(&self, id: &BedId) -> Result<Option<Bed>, RegistryError> {
        let state = self.state.lock().expect("ward state mutex poisoned");
        Ok(state.beds.get(id).cloned())
    }

    fn claim(&self, bed: &BedId, resident: &ResidentId) -> Result<ClaimOutcome, RegistryError> {
        let mut state = self.state.lock().expect("ward state mutex poisoned");
        let bed = state.beds.get_mut(bed).ok_or(RegistryError::NotFound)?;
        if bed.occupied {
            return Ok(ClaimOutcome::Conflict);
        }
        bed.occupied = true;
        bed.occupant = Some(resident.clone());
        Ok(ClaimOutcome::Claimed)
    }

    fn release(&self, bed: &BedId) -> Result<(), RegistryError> {
        let mut state = self.state.lock().expect("ward state mutex poisoned");
        let bed = state.beds.get_mut(bed).ok_or(RegistryError::NotFound)?;
        bed.occupied = false;
        bed.occupant = None;
        Ok(())
    }
}

impl ResidentDirectory for MemoryWardStore {
    fn get(&self, id: &ResidentId) -> Result<Option<Resident>, RegistryError> {
        let state = self.state.lock().expect("ward state mutex poisoned");
        Ok(state.residents.get(id).cloned())
    }

    fn set_current_bed(&self, id: &ResidentId, bed: Option<BedId>) -> Result<(), RegistryError> {
        let mut state = self.state.lock().expect("ward state mutex poisoned");
        let resident = state.residents.get_mut(id).ok_or(RegistryError::NotFound)?;
        resident.current_bed = bed;
        Ok(())
    }

    fn is_discharged(&self, id: &ResidentId) -> Result<bool, RegistryError> {
        let state = self.state.lock().expect("ward state mutex poisoned");
        state
            .residents
            .get(id)
            .map(Resident::is_discharged)
            .ok_or(RegistryError::NotFound)
    }

    fn set_discharged(&self, id: &ResidentId, on: NaiveDate) -> Result<(), RegistryError> {
        let mut state = self.state.lock().expect("ward state mutex poisoned");
        let resident = state.residents.get_mut(id).ok_or(RegistryError::NotFound)?;
        resident.discharged_on = Some(on);
        Ok(())
    }
}

impl TransferAuditLog for MemoryWardStore {
    fn append(&self, transfer: NewTransfer) -> Result<BedTransfer, AuditError> {
        let mut state = self.state.lock().expect("ward state mutex poisoned");
        state.next_transfer += 1;
        let record = BedTransfer {
            id: TransferId(state.next_transfer),
            resident: transfer.resident,
            from_bed: transfer.from_bed,
            to_bed: transfer.to_bed,
            staff: transfer.staff,
            transferred_at: transfer.transferred_at,
            reason: transfer.reason,
            recorded_at: Utc::now(),
        };
        state.transfers.push(record.clone());
        Ok(record)
    }

    fn history_for_resident(&self, resident: &ResidentId) -> Result<Vec<BedTransfer>, AuditError> {
        let state = self.state.lock().expect("ward state mutex poisoned");
        Ok(state
            .transfers
            .iter()
            .rev()
            .filter(|record| &record.resident == resident)
            .cloned()
            .collect())
    }

    fn recent_by_staff(
        &self,
        staff: &StaffId,
        limit: usize,
    ) -> Result<Vec<BedTransfer>, AuditError> {
        let state = self.state.lock().expect("ward state mutex poisoned");
        Ok(state
            .transfers
            .iter()
            .rev()
            .filter(|record| &record.staff == staff)
            .take(limit)
            .cloned()
            .collect())
    }
}
