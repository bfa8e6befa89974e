use crate::error::{api_success, ApiResponse, ApiResult};
use crate::server::CareDeskServer;
use crate::types::ApiJson;
use crate::validation::{CoPayRequest, RequestValidation};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use billing_service::ClaimStatusOutcome;
use insurance_service::{
    ClaimStatusUpdate, CoPayQuote, InsuranceCompany, InsurancePolicy, RegisterPolicyRequest,
};
use uuid::Uuid;

pub async fn register_company(
    State(server): State<CareDeskServer>,
    ApiJson(company): ApiJson<InsuranceCompany>,
) -> ApiResult<(StatusCode, Json<ApiResponse<InsuranceCompany>>)> {
    company.validate()?;
    let created = server.insurance.register_company(company).await?;
    Ok((StatusCode::CREATED, Json(api_success(created))))
}

pub async fn register_policy(
    State(server): State<CareDeskServer>,
    ApiJson(request): ApiJson<RegisterPolicyRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<InsurancePolicy>>)> {
    request.validate()?;
    let policy = server.insurance.register_policy(request).await?;
    Ok((StatusCode::CREATED, Json(api_success(policy))))
}

pub async fn patient_policies(
    State(server): State<CareDeskServer>,
    Path(patient_id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Vec<InsurancePolicy>>>> {
    let policies = server.insurance.patient_policies(patient_id).await?;
    Ok(Json(api_success(policies)))
}

/// Settling also credits the claim's invoice with the payout
pub async fn update_claim_status(
    State(server): State<CareDeskServer>,
    Path(claim_id): Path<Uuid>,
    ApiJson(update): ApiJson<ClaimStatusUpdate>,
) -> ApiResult<Json<ApiResponse<ClaimStatusOutcome>>> {
    update.validate()?;
    let outcome = server.billing.update_claim_status(claim_id, update).await?;
    Ok(Json(api_success(outcome)))
}

/// Preview how an amount would split between patient and insurer
pub async fn co_pay_quote(
    State(server): State<CareDeskServer>,
    ApiJson(request): ApiJson<CoPayRequest>,
) -> ApiResult<Json<ApiResponse<CoPayQuote>>> {
    request.validate()?;
    let quote = server
        .insurance
        .quote_co_pay(request.policy_id, request.amount)
        .await?;
    Ok(Json(api_success(quote)))
}
