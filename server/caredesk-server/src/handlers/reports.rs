use crate::error::{api_success, ApiResponse, ApiResult};
use crate::server::CareDeskServer;
use accounting_service::{ReportPeriod, RevenueReport, StatsSnapshot};
use axum::{
    extract::{Query, State},
    Json,
};

pub async fn dashboard_stats(
    State(server): State<CareDeskServer>,
) -> ApiResult<Json<ApiResponse<StatsSnapshot>>> {
    let stats = server.accounting.dashboard_stats().await?;
    Ok(Json(api_success(stats)))
}

/// `?from=YYYY-MM-DD&to=YYYY-MM-DD`, both optional and inclusive
pub async fn revenue_report(
    State(server): State<CareDeskServer>,
    Query(period): Query<ReportPeriod>,
) -> ApiResult<Json<ApiResponse<RevenueReport>>> {
    let report = server.accounting.revenue_report(period).await?;
    Ok(Json(api_success(report)))
}
