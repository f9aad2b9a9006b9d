use super::domain::{Bed, BedId, ResidentId};

/// Outcome of a claim attempt. `Conflict` is an ordinary result, not an
/// error: it means another claim flipped the occupancy flag first and the
/// caller must re-validate against fresh state before retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    Claimed,
    Conflict,
}

/// Storage port owning canonical bed state.
///
/// `claim` is the single contention point of the whole engine and must be a
/// single atomic check-and-set on the occupancy flag. Callers never
/// pre-check occupancy and trust it across the claim; the returned
/// `ClaimOutcome` is authoritative.
pub trait BedRegistry: Send + Sync {
    /// All vacant beds, ordered by ward, then room number, then bed label.
    /// The ordering is stable across calls without intervening mutation so
    /// the matcher and the orchestrator agree on "first eligible".
    fn find_available(&self) -> Result<Vec<Bed>, RegistryError>;

    fn find_bed(&self, id: &BedId) -> Result<Option<Bed>, RegistryError>;

    /// Mark a vacant bed occupied by `resident` in one conditional update.
    fn claim(&self, bed: &BedId, resident: &ResidentId) -> Result<ClaimOutcome, RegistryError>;

    /// Clear occupancy and occupant. Idempotent: releasing an
    /// already-vacant bed is a no-op, not an error.
    fn release(&self, bed: &BedId) -> Result<(), RegistryError>;
}

/// Error enumeration for registry and directory failures.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
