//! Pure eligibility rules deciding which beds a resident may occupy.
//!
//! Occupancy is deliberately not re-checked here: callers source candidates
//! from [`BedRegistry::find_available`] and re-validate occupancy atomically
//! at claim time, so the predicate stays a function of clinical attributes
//! only.

use serde::Serialize;

use super::domain::{Bed, Gender, GenderRestriction, PlacementConstraints};
use super::registry::{BedRegistry, RegistryError};

/// The clinical rule a candidate bed failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error, Serialize)]
pub enum UnsuitableReason {
    #[error("bed restricted to {restriction:?}, resident is {gender:?}")]
    GenderRestriction {
        restriction: GenderRestriction,
        gender: Gender,
    },
    #[error("resident requires isolation and the bed is not isolation-capable")]
    IsolationRequired,
}

/// Check a bed against a resident's placement constraints.
///
/// Gender rule: an `Open` restriction admits anyone; otherwise the
/// restriction must match the resident's gender. Isolation rule:
/// isolation-required residents need isolation-capable beds, while
/// isolation-capable beds remain open to everyone else.
pub fn check_suitability(
    bed: &Bed,
    constraints: &PlacementConstraints,
) -> Result<(), UnsuitableReason> {
    if !bed.gender_restriction.admits(constraints.gender) {
        return Err(UnsuitableReason::GenderRestriction {
            restriction: bed.gender_restriction,
            gender: constraints.gender,
        });
    }

    if constraints.isolation_required && !bed.isolation_capable {
        return Err(UnsuitableReason::IsolationRequired);
    }

    Ok(())
}

pub fn is_suitable(bed: &Bed, constraints: &PlacementConstraints) -> bool {
    check_suitability(bed, constraints).is_ok()
}

/// All vacant beds satisfying `constraints`, in the registry's
/// deterministic ward/room/label order.
pub fn find_suitable<R>(
    registry: &R,
    constraints: &PlacementConstraints,
) -> Result<Vec<Bed>, RegistryError>
where
    R: BedRegistry + ?Sized,
{
    let mut beds = registry.find_available()?;
    beds.retain(|bed| is_suitable(bed, constraints));
    Ok(beds)
}
