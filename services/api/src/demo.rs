use crate::infra::seed_ward;
use bedboard::allocation::{
    BedId, MemoryWardStore, ResidentId, StaffId, TransferError, TransferService,
};
use bedboard::error::AppError;
use chrono::Local;
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Staff identifier stamped on the demo transfers
    #[arg(long, default_value = "staff-demo")]
    pub(crate) staff: String,
}

/// Walk the full workflow against the seeded ward: suitable-bed lookup,
/// admission, a ward move, the no-op rejection, and discharge, printing the
/// audit trail at the end.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = Arc::new(MemoryWardStore::new());
    seed_ward(&store);
    let service = TransferService::new(store.clone(), store.clone(), store.clone());

    let resident = ResidentId("res-ada".to_string());
    let staff = StaffId(args.staff);

    println!("== Suitable beds for {resident} ==");
    for bed in service.suitable_for(&resident)? {
        println!(
            "  {} (room {}, label {}, isolation: {})",
            bed.id, bed.room, bed.label, bed.isolation_capable
        );
    }

    let admission = service.admit_first_suitable(&resident, &staff, "initial admission")?;
    println!(
        "== Admitted {} to {} (transfer #{}) ==",
        resident, admission.to_bed, admission.id.0
    );

    let target = BedId("W201-A".to_string());
    let ward_move = service.admit_or_transfer(&resident, &target, &staff, "moved to West ward")?;
    println!(
        "== Moved {} from {} to {} (transfer #{}) ==",
        resident,
        ward_move
            .from_bed
            .as_ref()
            .map(|bed| bed.0.as_str())
            .unwrap_or("-"),
        ward_move.to_bed,
        ward_move.id.0
    );

    match service.admit_or_transfer(&resident, &target, &staff, "same bed again") {
        Err(TransferError::NoOpTransfer { .. }) => {
            println!("== Repeat transfer to {target} rejected as a no-op ==");
        }
        Ok(_) => println!("unexpected: repeat transfer was accepted"),
        Err(other) => return Err(other.into()),
    }

    service.discharge(&resident, Local::now().date_naive())?;
    println!("== Discharged {resident} ==");

    println!("== Audit trail for {resident} (newest first) ==");
    for record in service.history_for_resident(&resident)? {
        println!(
            "  #{} {} -> {} by {} at {} ({})",
            record.id.0,
            record
                .from_bed
                .as_ref()
                .map(|bed| bed.0.as_str())
                .unwrap_or("-"),
            record.to_bed,
            record.staff,
            record.transferred_at.format("%Y-%m-%d %H:%M:%S"),
            record.reason
        );
    }

    Ok(())
}
