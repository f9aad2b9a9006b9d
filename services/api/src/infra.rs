use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use bedboard::allocation::{
    Bed, BedId, BedType, Gender, GenderRestriction, MemoryWardStore, Resident, ResidentId, Room,
    RoomId, RoomType,
};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn room(id: &str, ward: &str, number: u16, room_type: RoomType) -> Room {
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

fn bed(
    id: &str,
    room: &str,
    label: &str,
    bed_type: BedType,
    restriction: GenderRestriction,
    isolation_capable: bool,
) -> Bed {
    Bed {
        id: BedId(id.to_string()),
        room: RoomId(room.to_string()),
        label: label.to_string(),
        bed_type,
        occupied: false,
        occupant: None,
        gender_restriction: restriction,
        isolation_capable,
        last_cleaned: None,
    }
}

fn resident(id: &str, name: &str, gender: Gender, isolation_required: bool) -> Resident {
    Resident {
        id: ResidentId(id.to_string()),
        name: name.to_string(),
        gender,
        isolation_required,
        current_bed: None,
        discharged_on: None,
    }
}

/// Seed a small two-ward facility. Bed and room provisioning is an
/// administrative flow outside the allocation engine, so the service starts
/// from a fixed ward plan until a real store is wired in.
pub(crate) fn seed_ward(store: &MemoryWardStore) {
    store.add_room(room("R-E101", "East", 101, RoomType::Shared));
    store.add_room(room("R-E102", "East", 102, RoomType::Shared));
    store.add_room(room("R-W201", "West", 201, RoomType::Isolation));

    store.add_bed(bed(
        "E101-A",
        "R-E101",
        "A",
        BedType::Standard,
        GenderRestriction::Open,
        false,
    ));
    store.add_bed(bed(
        "E101-B",
        "R-E101",
        "B",
        BedType::Electric,
        GenderRestriction::MaleOnly,
        false,
    ));
    store.add_bed(bed(
        "E102-A",
        "R-E102",
        "A",
        BedType::Standard,
        GenderRestriction::FemaleOnly,
        false,
    ));
    store.add_bed(bed(
        "W201-A",
        "R-W201",
        "A",
        BedType::Special,
        GenderRestriction::Open,
        true,
    ));

    store.admit_resident(resident("res-ada", "Ada Byron", Gender::Female, false));
    store.admit_resident(resident("res-graham", "Graham Bell", Gender::Male, true));
}
