use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::audit::TransferAuditLog;
use super::directory::ResidentDirectory;
use super::domain::{Bed, BedId, BedTransfer, ResidentId, StaffId};
use super::registry::BedRegistry;
use super::service::{Clock, TransferError, TransferService};

/// Substituted when a caller submits an empty transfer reason. The
/// orchestrator stores reasons verbatim; defaulting is an edge concern.
const DEFAULT_TRANSFER_REASON: &str = "routine transfer";

const DEFAULT_STAFF_HISTORY_LIMIT: usize = 20;

/// Router builder exposing HTTP endpoints for bed queries, transfers, and
/// the audit trail.
pub fn allocation_router<R, D, L, C>(service: Arc<TransferService<R, D, L, C>>) -> Router
where
    R: BedRegistry + 'static,
    D: ResidentDirectory + 'static,
    L: TransferAuditLog + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route("/api/v1/beds/available", get(available_handler::<R, D, L, C>))
        .route(
            "/api/v1/residents/:resident_id/suitable-beds",
            get(suitable_handler::<R, D, L, C>),
        )
        .route("/api/v1/transfers", post(transfer_handler::<R, D, L, C>))
        .route(
            "/api/v1/residents/:resident_id/transfers",
            get(resident_history_handler::<R, D, L, C>),
        )
        .route(
            "/api/v1/staff/:staff_id/transfers",
            get(staff_history_handler::<R, D, L, C>),
        )
        .with_state(service)
}

/// Transfer submission payload. Omitting `bed_id` asks the engine to pick
/// the first suitable vacant bed.
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub resident_id: String,
    #[serde(default)]
    pub bed_id: Option<String>,
    pub staff_id: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StaffHistoryParams {
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Sanitized bed representation for API responses.
#[derive(Debug, Serialize)]
pub struct BedView {
    pub bed_id: BedId,
    pub room_id: String,
    pub label: String,
    pub bed_type: &'static str,
    pub gender_restriction: &'static str,
    pub isolation_capable: bool,
}

impl From<&Bed> for BedView {
    fn from(bed: &Bed) -> Self {
        Self {
            bed_id: bed.id.clone(),
            room_id: bed.room.0.clone(),
            label: bed.label.clone(),
            bed_type: match bed.bed_type {
                super::domain::BedType::Standard => "standard",
                super::domain::BedType::Electric => "electric",
                super::domain::BedType::Special => "special",
            },
            gender_restriction: match bed.gender_restriction {
                super::domain::GenderRestriction::Open => "open",
                super::domain::GenderRestriction::MaleOnly => "male_only",
                super::domain::GenderRestriction::FemaleOnly => "female_only",
            },
            isolation_capable: bed.isolation_capable,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransferView {
    pub transfer_id: u64,
    pub resident_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_bed: Option<String>,
    pub to_bed: String,
    pub staff_id: String,
    pub transferred_at: String,
    pub reason: String,
}

impl From<&BedTransfer> for TransferView {
    fn from(record: &BedTransfer) -> Self {
        Self {
            transfer_id: record.id.0,
            resident_id: record.resident.0.clone(),
            from_bed: record.from_bed.as_ref().map(|bed| bed.0.clone()),
            to_bed: record.to_bed.0.clone(),
            staff_id: record.staff.0.clone(),
            transferred_at: record.transferred_at.to_rfc3339(),
            reason: record.reason.clone(),
        }
    }
}

pub(crate) async fn available_handler<R, D, L, C>(
    State(service): State<Arc<TransferService<R, D, L, C>>>,
) -> Response
where
    R: BedRegistry + 'static,
    D: ResidentDirectory + 'static,
    L: TransferAuditLog + 'static,
    C: Clock + 'static,
{
    match service.available_beds() {
        Ok(beds) => bed_list_response(&beds),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn suitable_handler<R, D, L, C>(
    State(service): State<Arc<TransferService<R, D, L, C>>>,
    Path(resident_id): Path<String>,
) -> Response
where
    R: BedRegistry + 'static,
    D: ResidentDirectory + 'static,
    L: TransferAuditLog + 'static,
    C: Clock + 'static,
{
    match service.suitable_for(&ResidentId(resident_id)) {
        Ok(beds) => bed_list_response(&beds),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn transfer_handler<R, D, L, C>(
    State(service): State<Arc<TransferService<R, D, L, C>>>,
    axum::Json(request): axum::Json<TransferRequest>,
) -> Response
where
    R: BedRegistry + 'static,
    D: ResidentDirectory + 'static,
    L: TransferAuditLog + 'static,
    C: Clock + 'static,
{
    let resident = ResidentId(request.resident_id);
    let staff = StaffId(request.staff_id);
    let reason = match request.reason.as_deref() {
        Some(reason) if !reason.trim().is_empty() => reason.to_string(),
        _ => DEFAULT_TRANSFER_REASON.to_string(),
    };

    let result = match request.bed_id {
        Some(bed_id) => service.admit_or_transfer(&resident, &BedId(bed_id), &staff, &reason),
        None => service.admit_first_suitable(&resident, &staff, &reason),
    };

    match result {
        Ok(record) => {
            (StatusCode::CREATED, axum::Json(TransferView::from(&record))).into_response()
        }
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn resident_history_handler<R, D, L, C>(
    State(service): State<Arc<TransferService<R, D, L, C>>>,
    Path(resident_id): Path<String>,
) -> Response
where
    R: BedRegistry + 'static,
    D: ResidentDirectory + 'static,
    L: TransferAuditLog + 'static,
    C: Clock + 'static,
{
    match service.history_for_resident(&ResidentId(resident_id)) {
        Ok(records) => transfer_list_response(&records),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn staff_history_handler<R, D, L, C>(
    State(service): State<Arc<TransferService<R, D, L, C>>>,
    Path(staff_id): Path<String>,
    Query(params): Query<StaffHistoryParams>,
) -> Response
where
    R: BedRegistry + 'static,
    D: ResidentDirectory + 'static,
    L: TransferAuditLog + 'static,
    C: Clock + 'static,
{
    let limit = params.limit.unwrap_or(DEFAULT_STAFF_HISTORY_LIMIT);
    match service.recent_by_staff(&StaffId(staff_id), limit) {
        Ok(records) => transfer_list_response(&records),
        Err(error) => error_response(&error),
    }
}

fn bed_list_response(beds: &[Bed]) -> Response {
    let views: Vec<BedView> = beds.iter().map(BedView::from).collect();
    (StatusCode::OK, axum::Json(views)).into_response()
}

fn transfer_list_response(records: &[BedTransfer]) -> Response {
    let views: Vec<TransferView> = records.iter().map(TransferView::from).collect();
    (StatusCode::OK, axum::Json(views)).into_response()
}

fn error_response(error: &TransferError) -> Response {
    let status = match error {
        TransferError::ResidentNotFound(_) | TransferError::BedNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        TransferError::ResidentDischarged(_)
        | TransferError::BedOccupied(_)
        | TransferError::BedUnsuitable { .. }
        | TransferError::NoOpTransfer { .. }
        | TransferError::NoSuitableBed(_) => StatusCode::UNPROCESSABLE_ENTITY,
        TransferError::Conflict(_) => StatusCode::CONFLICT,
        TransferError::Integrity { .. } | TransferError::TransferFailed { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
