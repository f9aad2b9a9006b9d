use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::allocation::audit::TransferAuditLog;
use crate::allocation::router::allocation_router;
use crate::allocation::service::TransferService;
use crate::allocation::store::MemoryWardStore;

fn router(
    store: &Arc<MemoryWardStore>,
) -> axum::Router {
    allocation_router(Arc::new(service(store)))
}

async fn read_json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

fn post_transfer(payload: Value) -> Request<Body> {
    Request::post("/api/v1/transfers")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn available_route_lists_vacant_beds_in_order() {
    let store = ward_store();
    let response = router(&store)
        .oneshot(
            Request::get("/api/v1/beds/available")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    let ids: Vec<&str> = body
        .as_array()
        .expect("array payload")
        .iter()
        .map(|bed| bed["bed_id"].as_str().expect("bed id"))
        .collect();
    assert_eq!(ids, vec!["B1", "B2", "B3"]);
}

#[tokio::test]
async fn suitable_route_filters_for_the_resident() {
    let store = ward_store();
    let response = router(&store)
        .oneshot(
            Request::get("/api/v1/residents/res-1/suitable-beds")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    let ids: Vec<&str> = body
        .as_array()
        .expect("array payload")
        .iter()
        .map(|bed| bed["bed_id"].as_str().expect("bed id"))
        .collect();
    assert_eq!(ids, vec!["B1", "B3"]);
}

#[tokio::test]
async fn transfer_route_creates_audit_record() {
    let store = ward_store();
    let response = router(&store)
        .oneshot(post_transfer(json!({
            "resident_id": "res-1",
            "bed_id": "B1",
            "staff_id": "staff-5",
            "reason": "admission"
        })))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert_eq!(body["to_bed"], "B1");
    assert_eq!(body["resident_id"], "res-1");
    assert!(body.get("from_bed").is_none());
}

#[tokio::test]
async fn transfer_route_defaults_empty_reason() {
    let store = ward_store();
    let response = router(&store)
        .oneshot(post_transfer(json!({
            "resident_id": "res-1",
            "bed_id": "B1",
            "staff_id": "staff-5",
            "reason": "   "
        })))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::CREATED);
    let history = store
        .history_for_resident(&resident_id("res-1"))
        .expect("log reachable");
    assert_eq!(history[0].reason, "routine transfer");
}

#[tokio::test]
async fn transfer_route_without_bed_picks_first_suitable() {
    let store = ward_store();
    let response = router(&store)
        .oneshot(post_transfer(json!({
            "resident_id": "res-1",
            "staff_id": "staff-5",
            "reason": "admission"
        })))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert_eq!(body["to_bed"], "B1");
}

#[tokio::test]
async fn unknown_resident_maps_to_not_found() {
    let store = ward_store();
    let response = router(&store)
        .oneshot(post_transfer(json!({
            "resident_id": "res-missing",
            "bed_id": "B1",
            "staff_id": "staff-5",
            "reason": "admission"
        })))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn no_op_transfer_maps_to_unprocessable() {
    let store = ward_store();
    let router = router(&store);
    let payload = json!({
        "resident_id": "res-1",
        "bed_id": "B1",
        "staff_id": "staff-5",
        "reason": "admission"
    });

    let first = router
        .clone()
        .oneshot(post_transfer(payload.clone()))
        .await
        .expect("router responds");
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = router
        .oneshot(post_transfer(payload))
        .await
        .expect("router responds");
    assert_eq!(second.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn lost_claim_race_maps_to_conflict() {
    let store = ward_store();
    let registry = Arc::new(ConflictOnClaimRegistry {
        inner: store.clone(),
        conflict_beds: vec![bed_id("B1")],
    });
    let service =
        TransferService::with_clock(registry, store.clone(), store.clone(), FixedClock);
    let router = allocation_router(Arc::new(service));

    let response = router
        .oneshot(post_transfer(json!({
            "resident_id": "res-1",
            "bed_id": "B1",
            "staff_id": "staff-5",
            "reason": "admission"
        })))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn staff_history_route_honors_limit() {
    let store = ward_store();
    let router = router(&store);
    for (bed, reason) in [("B1", "admission"), ("B3", "ward move")] {
        let response = router
            .clone()
            .oneshot(post_transfer(json!({
                "resident_id": "res-1",
                "bed_id": bed,
                "staff_id": "staff-5",
                "reason": reason
            })))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = router
        .oneshot(
            Request::get("/api/v1/staff/staff-5/transfers?limit=1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    let records = body.as_array().expect("array payload");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["to_bed"], "B3");
}
