mod common;

use axum::http::{Method, StatusCode};
use common::{id_of, number, partial_payload, response_text, TestApp};
use serde_json::json;

#[tokio::test]
async fn new_shipments_start_open_with_zero_totals() {
    let app = TestApp::new().await;
    let shipment = app.create_shipment("Saudia").await;

    assert_eq!(shipment["isOpen"], json!(true));
    assert_eq!(number(&shipment["totalWeight"]), 0.0);
    assert_eq!(number(&shipment["totalVolume"]), 0.0);
    assert!(shipment["dateClosed"].is_null());
}

#[tokio::test]
async fn list_filters_by_status_and_destination() {
    let app = TestApp::new().await;
    let open = id_of(&app.create_shipment("Syria").await);
    let closed = id_of(&app.create_shipment("Saudia").await);
    app.close_shipment(closed).await;

    let (_, all) = app.json(Method::GET, "/api/shipments", None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, open_only) = app
        .json(Method::GET, "/api/shipments?status=open", None)
        .await;
    let ids: Vec<i64> = open_only.as_array().unwrap().iter().map(id_of).collect();
    assert_eq!(ids, vec![open]);

    let (_, by_destination) = app
        .json(Method::GET, "/api/shipments?destination=Saudia", None)
        .await;
    let ids: Vec<i64> = by_destination.as_array().unwrap().iter().map(id_of).collect();
    assert_eq!(ids, vec![closed]);

    let (_, unknown_status) = app
        .json(Method::GET, "/api/shipments?status=archived", None)
        .await;
    assert_eq!(unknown_status.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn closing_records_driver_and_cannot_repeat() {
    let app = TestApp::new().await;
    let id = id_of(&app.create_shipment("Syria").await);

    let closed = app.close_shipment(id).await;
    assert_eq!(closed["isOpen"], json!(false));
    assert_eq!(closed["driverName"], json!("Samir"));
    assert!(closed["dateClosed"].is_string());

    let (status, _) = app
        .json(
            Method::POST,
            &format!("/api/shipments/{id}/close"),
            Some(json!({ "driverName": "Samir", "driverVehicle": "Volvo" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn close_requires_driver_details() {
    let app = TestApp::new().await;
    let id = id_of(&app.create_shipment("Syria").await);

    let (status, _) = app
        .json(
            Method::POST,
            &format!("/api/shipments/{id}/close"),
            Some(json!({ "driverName": "", "driverVehicle": "Volvo" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn patch_closes_but_never_reopens() {
    let app = TestApp::new().await;
    let id = id_of(&app.create_shipment("Syria").await);

    let (status, body) = app
        .json(
            Method::PATCH,
            &format!("/api/shipments/{id}"),
            Some(json!({ "note": "Dock 3" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["note"], json!("Dock 3"));

    let (status, body) = app
        .json(
            Method::PATCH,
            &format!("/api/shipments/{id}"),
            Some(json!({ "isOpen": false, "driverName": "Omar", "driverVehicle": "MAN TGX" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["isOpen"], json!(false));
    assert_eq!(body["driverVehicle"], json!("MAN TGX"));

    let (status, _) = app
        .json(
            Method::PATCH,
            &format!("/api/shipments/{id}"),
            Some(json!({ "isOpen": true })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn shipments_with_partials_cannot_be_deleted() {
    let app = TestApp::new().await;
    let customer_id = id_of(&app.create_customer("Rami", None).await);
    let busy = id_of(&app.create_shipment("Syria").await);
    let empty = id_of(&app.create_shipment("Saudia").await);
    app.create_partial(
        busy,
        partial_payload(
            customer_id,
            json!([{ "length": 1, "width": 1, "height": 1, "weight": 1 }]),
            10.0,
            10.0,
            "paid",
            "customer",
        ),
    )
    .await;

    let (status, _) = app
        .json(Method::DELETE, &format!("/api/shipments/{busy}"), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .json(Method::DELETE, &format!("/api/shipments/{empty}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (status, _) = app
        .json(Method::GET, &format!("/api/shipments/{empty}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_reports_database_up() {
    let app = TestApp::new().await;
    let (status, body) = app.json(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("up"));
    assert_eq!(body["database"]["status"], json!("up"));
}

#[tokio::test]
async fn responses_echo_request_id() {
    let app = TestApp::new().await;
    let response = app.request(Method::GET, "/api/shipments/77", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .expect("x-request-id header");
    let body: serde_json::Value = serde_json::from_str(&response_text(response).await).unwrap();
    assert_eq!(body["requestId"], json!(request_id));
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new().await;
    let (status, body) = app.json(Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]
        .as_object()
        .unwrap()
        .contains_key("/api/shipments/{id}/partial-shipments"));
}

#[tokio::test]
async fn rejected_close_through_patch_leaves_shipment_unchanged() {
    let app = TestApp::new().await;
    let id = id_of(&app.create_shipment("Syria").await);

    let (status, _) = app
        .json(
            Method::PATCH,
            &format!("/api/shipments/{id}"),
            Some(json!({ "isOpen": false, "destination": "Lebanon" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let shipment = app.get_shipment(id).await;
    assert_eq!(shipment["destination"], json!("Syria"));
    assert_eq!(shipment["isOpen"], json!(true));
}

#[tokio::test]
async fn patch_close_applies_destination_and_blank_note() {
    let app = TestApp::new().await;
    let id = id_of(&app.create_shipment("Syria").await);

    let (status, body) = app
        .json(
            Method::PATCH,
            &format!("/api/shipments/{id}"),
            Some(json!({
                "isOpen": false,
                "destination": "Lebanon",
                "driverName": "Omar",
                "driverVehicle": "MAN TGX",
                "note": "  "
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["destination"], json!("Lebanon"));
    assert_eq!(body["isOpen"], json!(false));
    assert!(body["note"].is_null());
}

#[tokio::test]
async fn non_numeric_path_ids_return_json_errors() {
    let app = TestApp::new().await;

    for uri in [
        "/api/shipments/abc",
        "/api/customers/abc",
        "/api/shipments/1/partial-shipments/xyz",
    ] {
        let response = app.request(Method::GET, uri, None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        let body: serde_json::Value =
            serde_json::from_str(&response_text(response).await).expect("JSON error body");
        assert!(body["error"].is_string(), "{uri}: {body}");
    }
}
