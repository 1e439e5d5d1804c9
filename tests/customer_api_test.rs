mod common;

use axum::http::{Method, StatusCode};
use common::{id_of, number, partial_payload, TestApp};
use serde_json::json;

#[tokio::test]
async fn customers_are_listed_by_name() {
    let app = TestApp::new().await;
    app.create_customer("Zeina", None).await;
    app.create_customer("Adel", Some("+963 944 000 123")).await;

    let (status, body) = app.json(Method::GET, "/api/customers", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Adel", "Zeina"]);
    assert_eq!(number(&body[0]["balance"]), 0.0);
}

#[tokio::test]
async fn create_requires_name_and_address() {
    let app = TestApp::new().await;
    let (status, body) = app
        .json(
            Method::POST,
            "/api/customers",
            Some(json!({ "name": "", "address": "Aleppo" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn malformed_json_keeps_the_error_shape() {
    let app = TestApp::new().await;
    let (status, body) = app
        .json(Method::POST, "/api/customers", Some(json!({ "name": 12 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn missing_customer_is_not_found() {
    let app = TestApp::new().await;
    let (status, body) = app.json(Method::GET, "/api/customers/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("Customer not found"));
}

#[tokio::test]
async fn balance_moves_only_through_increments() {
    let app = TestApp::new().await;
    let id = id_of(&app.create_customer("Rami", None).await);

    let (status, _) = app
        .json(
            Method::PATCH,
            &format!("/api/customers/{id}"),
            Some(json!({ "balance": 500 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .json(
            Method::PATCH,
            &format!("/api/customers/{id}"),
            Some(json!({ "balanceIncrement": "25.5", "phone": "+49 30 1234" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(number(&body["balance"]), 25.5);
    assert_eq!(body["phone"], json!("+49 30 1234"));

    let (_, body) = app
        .json(
            Method::PATCH,
            &format!("/api/customers/{id}"),
            Some(json!({ "balanceIncrement": -5.5 })),
        )
        .await;
    assert_eq!(number(&body["balance"]), 20.0);
}

#[tokio::test]
async fn customers_with_partials_cannot_be_deleted() {
    let app = TestApp::new().await;
    let customer_id = id_of(&app.create_customer("Rami", None).await);
    let idle_id = id_of(&app.create_customer("Idle", None).await);
    let shipment_id = id_of(&app.create_shipment("Syria").await);
    let (status, _) = app
        .create_partial(
            shipment_id,
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
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .json(Method::DELETE, &format!("/api/customers/{customer_id}"), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .json(Method::DELETE, &format!("/api/customers/{idle_id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));
    assert_eq!(app.count_rows("customers").await, 1);
}
