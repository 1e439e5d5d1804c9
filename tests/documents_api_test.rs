mod common;

use axum::http::{header, Method, StatusCode};
use common::{id_of, partial_payload, response_text, TestApp};
use serde_json::json;

/// Customer with a phone, a Syria shipment and one partial with two packages.
async fn seeded() -> (TestApp, i64, i64, i64) {
    let app = TestApp::new().await;
    let customer_id = id_of(&app.create_customer("rami", Some("0944 000 321")).await);
    let shipment_id = id_of(&app.create_shipment("Syria").await);
    let mut payload = partial_payload(
        customer_id,
        json!([
            { "length": 1, "width": 1, "height": 1, "weight": 5 },
            { "length": 2, "width": 1, "height": 1, "weight": 3 }
        ]),
        100.0,
        40.0,
        "partially_paid",
        "customer",
    );
    payload["receiverPhone"] = json!(null);
    let (status, created) = app.create_partial(shipment_id, payload).await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    (app, customer_id, shipment_id, id_of(&created))
}

#[tokio::test]
async fn invoice_selects_by_ids_or_customer_and_shipment() {
    let (app, customer_id, shipment_id, pid) = seeded().await;

    let (status, body) = app
        .json(
            Method::POST,
            "/api/documents/invoice",
            Some(json!({ "partialShipmentIds": [pid] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Invoice generated"));
    assert_eq!(body["partials"][0]["customer"]["name"], json!("rami"));
    assert_eq!(body["partials"][0]["packages"].as_array().unwrap().len(), 2);

    let (status, body) = app
        .json(
            Method::POST,
            "/api/documents/invoice",
            Some(json!({ "customerId": customer_id, "shipmentId": shipment_id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["partials"].as_array().unwrap().len(), 1);

    let (status, _) = app
        .json(Method::POST, "/api/documents/invoice", Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delivery_list_needs_an_existing_shipment() {
    let (app, _, shipment_id, _) = seeded().await;

    let (status, body) = app
        .json(
            Method::POST,
            "/api/documents/delivery-list",
            Some(json!({ "shipmentId": shipment_id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Delivery list generated"));
    assert_eq!(body["shipment"]["partialShipments"].as_array().unwrap().len(), 1);

    let (status, _) = app
        .json(
            Method::POST,
            "/api/documents/delivery-list",
            Some(json!({ "shipmentId": 999 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn customs_document_requires_closed_shipment() {
    let (app, _, shipment_id, _) = seeded().await;

    let (status, body) = app
        .json(
            Method::POST,
            "/api/documents/customs",
            Some(json!({ "shipmentId": shipment_id })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Shipment not found or not closed"));

    app.close_shipment(shipment_id).await;
    let (status, body) = app
        .json(
            Method::POST,
            "/api/documents/customs",
            Some(json!({ "shipmentId": shipment_id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Customs document generated"));
}

#[tokio::test]
async fn csv_exports_wait_for_the_shipment_to_close() {
    let (app, _, shipment_id, _) = seeded().await;

    let response = app
        .request(
            Method::GET,
            &format!("/api/shipments/{shipment_id}/exports/items.csv"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn items_and_handover_csv_render_after_close() {
    let (app, _, shipment_id, pid) = seeded().await;
    app.close_shipment(shipment_id).await;

    let response = app
        .request(
            Method::GET,
            &format!("/api/shipments/{shipment_id}/exports/items.csv"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    let text = response_text(response).await;
    let text = text.strip_prefix('\u{feff}').expect("BOM prefix");
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("PartialShipmentID,Weight,Origin,HS Code,Amount,Value")
    );
    assert_eq!(lines.next(), Some(format!("{pid},5,DE,8471.30,2,250").as_str()));

    let response = app
        .request(
            Method::GET,
            &format!("/api/shipments/{shipment_id}/exports/handover.csv"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let text = response_text(response).await;
    let row = text.lines().nth(1).expect("one data row");
    assert_eq!(
        row,
        format!("{pid},Hadi,N/A,Damascus,rami,0944 000 321,partially_paid,customer,2,8,3")
    );
}

#[tokio::test]
async fn labels_print_one_block_per_package() {
    let (app, _, shipment_id, pid) = seeded().await;

    let response = app
        .request(
            Method::GET,
            &format!("/api/shipments/{shipment_id}/partial-shipments/{pid}/labels.zpl"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let zpl = response_text(response).await;
    assert_eq!(zpl.matches("^XA").count(), 2);
    assert!(zpl.contains(&format!("Custom ID: {shipment_id}ZA3211/2")));
    assert!(zpl.contains(&format!("Partial Shipment: {pid} - R")));
    assert!(zpl.contains("Package: 2/2"));
}
