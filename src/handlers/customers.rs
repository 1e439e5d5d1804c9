use super::common::{created_response, path_id, validate_input, ApiResult};
use crate::{
    commands::customers::{UpdateCustomerCommand, UpdateCustomerRequest},
    common::{ApiJson, ApiPath},
    dto::{CustomerDetail, DeleteResponse},
    entities::customer,
    errors::{ErrorResponse, ServiceError},
    services::customers::CreateCustomerRequest,
    AppState,
};
use axum::{
    extract::State,
    response::Response,
    routing::get,
    Json, Router,
};

#[utoipa::path(
    get,
    path = "/api/customers",
    responses(
        (status = 200, description = "Customers ordered by name", body = [customer::Model])
    ),
    tag = "customers"
)]
pub async fn list_customers(State(state): State<AppState>) -> ApiResult<Vec<customer::Model>> {
    Ok(Json(state.customer_service().list_customers().await?))
}

#[utoipa::path(
    post,
    path = "/api/customers",
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer created", body = customer::Model),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    ),
    tag = "customers"
)]
pub async fn create_customer(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateCustomerRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let created = state.customer_service().create_customer(payload).await?;
    Ok(created_response(created))
}

#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    params(("id" = i32, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer with partial shipments", body = CustomerDetail),
        (status = 404, description = "Customer not found", body = ErrorResponse)
    ),
    tag = "customers"
)]
pub async fn get_customer(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<CustomerDetail> {
    let id = path_id(id, "customer")?;
    Ok(Json(state.customer_service().get_customer(id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/customers/{id}",
    params(("id" = i32, Path, description = "Customer ID")),
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Customer updated", body = customer::Model),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Customer not found", body = ErrorResponse)
    ),
    tag = "customers"
)]
pub async fn update_customer(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<UpdateCustomerRequest>,
) -> ApiResult<customer::Model> {
    let command = UpdateCustomerCommand::from_request(path_id(id, "customer")?, payload)?;
    Ok(Json(state.customer_service().update_customer(command).await?))
}

#[utoipa::path(
    delete,
    path = "/api/customers/{id}",
    params(("id" = i32, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer deleted", body = DeleteResponse),
        (status = 404, description = "Customer not found", body = ErrorResponse),
        (status = 409, description = "Customer still has partial shipments", body = ErrorResponse)
    ),
    tag = "customers"
)]
pub async fn delete_customer(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<DeleteResponse> {
    state
        .customer_service()
        .delete_customer(path_id(id, "customer")?)
        .await?;
    Ok(Json(DeleteResponse::ok()))
}

pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route(
            "/:id",
            get(get_customer).patch(update_customer).delete(delete_customer),
        )
}
