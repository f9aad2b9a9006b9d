//! Bed allocation and transfer engine.
//!
//! Owns the canonical bed registry, the clinical eligibility rules, the
//! atomic admit/transfer workflow with its permanent audit trail, and an
//! in-memory ward store implementing the storage ports.

pub mod audit;
pub mod directory;
pub mod domain;
pub mod matcher;
pub mod registry;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use audit::{AuditError, NewTransfer, TransferAuditLog};
pub use directory::ResidentDirectory;
pub use domain::{
    Bed, BedId, BedTransfer, BedType, Gender, GenderRestriction, PlacementConstraints, Resident,
    ResidentId, Room, RoomId, RoomType, StaffId, TransferId,
};
pub use matcher::{check_suitability, find_suitable, is_suitable, UnsuitableReason};
pub use registry::{BedRegistry, ClaimOutcome, RegistryError};
pub use router::allocation_router;
pub use service::{
    Clock, StoreFailure, SystemClock, TransferError, TransferPhase, TransferService,
};
pub use store::MemoryWardStore;
