use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for beds. Stable for the life of the bed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BedId(pub String);

/// Identifier wrapper for rooms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(pub String);

/// Identifier wrapper for residents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResidentId(pub String);

/// Identifier wrapper for the staff member performing a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StaffId(pub String);

/// Monotonic identifier assigned by the audit log when a transfer commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransferId(pub u64);

impl fmt::Display for BedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ResidentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for StaffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

/// Clinical restriction on who may occupy a bed. `Open` admits any resident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenderRestriction {
    Open,
    MaleOnly,
    FemaleOnly,
}

impl GenderRestriction {
    pub const fn admits(self, gender: Gender) -> bool {
        match self {
            GenderRestriction::Open => true,
            GenderRestriction::MaleOnly => matches!(gender, Gender::Male),
            GenderRestriction::FemaleOnly => matches!(gender, Gender::Female),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BedType {
    Standard,
    Electric,
    Special,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomType {
    Single,
    Shared,
    Isolation,
}

/// Canonical bed record owned by the registry.
///
/// Invariant: `occupied == occupant.is_some()`, and the occupancy flag
/// flips only through the transfer workflow (or discharge).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bed {
    pub id: BedId,
    pub room: RoomId,
    pub label: String,
    pub bed_type: BedType,
    pub occupied: bool,
    pub occupant: Option<ResidentId>,
    pub gender_restriction: GenderRestriction,
    pub isolation_capable: bool,
    /// Housekeeping timestamp; informational only, never drives placement.
    pub last_cleaned: Option<DateTime<Utc>>,
}

impl Bed {
    pub fn is_vacant(&self) -> bool {
        !self.occupied
    }
}

/// Room context for a bed. Read-only from the allocation engine's point of
/// view; capacity is administrative and not enforced here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub ward: String,
    pub number: u16,
    pub room_type: RoomType,
    pub capacity: u8,
    pub gender_preference: GenderRestriction,
    pub active: bool,
}

/// Resident attributes relevant to placement.
///
/// A non-discharged resident's `current_bed`, when present, must point at a
/// bed whose occupant is that resident. A discharged resident never holds a
/// bed reference; the record itself persists for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resident {
    pub id: ResidentId,
    pub name: String,
    pub gender: Gender,
    pub isolation_required: bool,
    pub current_bed: Option<BedId>,
    pub discharged_on: Option<NaiveDate>,
}

impl Resident {
    pub fn is_discharged(&self) -> bool {
        self.discharged_on.is_some()
    }

    /// The slice of the resident record the eligibility matcher consumes.
    pub fn constraints(&self) -> PlacementConstraints {
        PlacementConstraints {
            gender: self.gender,
            isolation_required: self.isolation_required,
        }
    }
}

/// Clinical constraints a candidate bed must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementConstraints {
    pub gender: Gender,
    pub isolation_required: bool,
}

/// Immutable audit record of one committed admission or transfer.
///
/// `from_bed` of `None` marks a fresh admission. Exactly one record exists
/// per committed transfer workflow run, never per attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BedTransfer {
    pub id: TransferId,
    pub resident: ResidentId,
    pub from_bed: Option<BedId>,
    pub to_bed: BedId,
    pub staff: StaffId,
    pub transferred_at: DateTime<Utc>,
    pub reason: String,
    pub recorded_at: DateTime<Utc>,
}
