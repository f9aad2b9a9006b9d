use chrono::NaiveDate;

use super::domain::{BedId, Resident, ResidentId};
use super::registry::RegistryError;

/// Thin collaborator owning resident records. The transfer workflow only
/// reads placement-relevant attributes and writes the current-bed reference
/// and discharge date; everything else about a resident lives elsewhere.
pub trait ResidentDirectory: Send + Sync {
    fn get(&self, id: &ResidentId) -> Result<Option<Resident>, RegistryError>;

    fn set_current_bed(&self, id: &ResidentId, bed: Option<BedId>) -> Result<(), RegistryError>;

    fn is_discharged(&self, id: &ResidentId) -> Result<bool, RegistryError>;

    fn set_discharged(&self, id: &ResidentId, on: NaiveDate) -> Result<(), RegistryError>;
}
