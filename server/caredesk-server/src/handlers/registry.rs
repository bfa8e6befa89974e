use crate::error::{api_success, ApiResponse, ApiResult};
use crate::server::CareDeskServer;
use crate::types::ApiJson;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use registry_service::{Admission, Appointment, AppointmentChange, DischargeRequest, TransferRequest};
use uuid::Uuid;

pub async fn book_appointment(
    State(server): State<CareDeskServer>,
    ApiJson(appointment): ApiJson<Appointment>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Appointment>>)> {
    let booked = server.registry.book_appointment(appointment).await?;
    Ok((StatusCode::CREATED, Json(api_success(booked))))
}

pub async fn reschedule_appointment(
    State(server): State<CareDeskServer>,
    Path(appointment_id): Path<Uuid>,
    ApiJson(change): ApiJson<AppointmentChange>,
) -> ApiResult<Json<ApiResponse<Appointment>>> {
    let updated = server
        .registry
        .reschedule_appointment(appointment_id, change)
        .await?;
    Ok(Json(api_success(updated)))
}

pub async fn admit(
    State(server): State<CareDeskServer>,
    ApiJson(admission): ApiJson<Admission>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Admission>>)> {
    let admitted = server.registry.admit(admission).await?;
    Ok((StatusCode::CREATED, Json(api_success(admitted))))
}

/// The body is optional; an empty request discharges now
pub async fn discharge(
    State(server): State<CareDeskServer>,
    Path(admission_id): Path<Uuid>,
    request: Option<ApiJson<DischargeRequest>>,
) -> ApiResult<Json<ApiResponse<Admission>>> {
    let request = request.map(|ApiJson(request)| request).unwrap_or_default();
    let discharged = server.registry.discharge(admission_id, request).await?;
    Ok(Json(api_success(discharged)))
}

pub async fn transfer(
    State(server): State<CareDeskServer>,
    Path(admission_id): Path<Uuid>,
    ApiJson(request): ApiJson<TransferRequest>,
) -> ApiResult<Json<ApiResponse<Admission>>> {
    let transferred = server.registry.transfer(admission_id, request).await?;
    Ok(Json(api_success(transferred)))
}
