use crate::error::{api_success, ApiResponse, ApiResult};
use crate::server::CareDeskServer;
use axum::{
    extract::{Path, State},
    Json,
};
use pharmacy_service::DispenseOutcome;
use uuid::Uuid;

pub async fn dispense(
    State(server): State<CareDeskServer>,
    Path(prescription_id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<DispenseOutcome>>> {
    let outcome = server.pharmacy.dispense(prescription_id).await?;
    Ok(Json(api_success(outcome)))
}
