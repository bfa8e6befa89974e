use crate::error::{api_success, ApiResponse, ApiResult};
use crate::server::CareDeskServer;
use crate::types::ApiJson;
use crate::validation::RequestValidation;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use billing_service::{Invoice, NewInvoice, PaymentOutcome, PaymentRequest};
use uuid::Uuid;

/// Raise an invoice; totals, status and due date are computed server-side
pub async fn create_invoice(
    State(server): State<CareDeskServer>,
    ApiJson(request): ApiJson<NewInvoice>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Invoice>>)> {
    request.validate()?;
    let invoice = server.billing.create_invoice(request).await?;
    Ok((StatusCode::CREATED, Json(api_success(invoice))))
}

/// Record a payment, raising an insurance claim when a policy is given
pub async fn record_payment(
    State(server): State<CareDeskServer>,
    Path(invoice_id): Path<Uuid>,
    ApiJson(request): ApiJson<PaymentRequest>,
) -> ApiResult<Json<ApiResponse<PaymentOutcome>>> {
    request.validate()?;
    let outcome = server.billing.record_payment(invoice_id, request).await?;
    Ok(Json(api_success(outcome)))
}
