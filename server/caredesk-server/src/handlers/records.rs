//! Generic CRUD over any stored entity type
//!
//! Query parameters other than `page` and `pageSize` become equality filters
//! on the record's JSON fields (`?status=unpaid&patientId=...`). Updates are
//! JSON merge patches; derived and server-assigned fields cannot be patched.

use crate::error::{api_success, ApiResponse, ApiResult};
use crate::server::CareDeskServer;
use crate::types::{ApiJson, PaginationParams};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use database_layer::{Entity, ListQuery};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

pub async fn list<T: Entity>(
    State(server): State<CareDeskServer>,
    Query(mut params): Query<HashMap<String, String>>,
) -> ApiResult<Json<ApiResponse<Vec<T>>>> {
    let pagination = PaginationParams::take_from(&mut params)?;
    let query = params
        .into_iter()
        .fold(ListQuery::new(), |query, (field, value)| query.filter(field, value));
    query.validate()?;

    let repository = server.db.repository::<T>();
    let total = repository.count(&query).await?;
    let records = repository.list(&pagination.apply(query)).await?;
    Ok(Json(pagination.wrap_response(records, total)))
}

pub async fn get<T: Entity>(
    State(server): State<CareDeskServer>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<T>>> {
    let record = server.db.repository::<T>().get(id).await?;
    Ok(Json(api_success(record)))
}

pub async fn create<T: Entity>(
    State(server): State<CareDeskServer>,
    ApiJson(record): ApiJson<T>,
) -> ApiResult<(StatusCode, Json<ApiResponse<T>>)> {
    let created = server.db.repository::<T>().create(record).await?;
    tracing::info!(collection = %T::COLLECTION, id = %created.id(), "Record created");
    Ok((StatusCode::CREATED, Json(api_success(created))))
}

pub async fn update<T: Entity>(
    State(server): State<CareDeskServer>,
    Path(id): Path<Uuid>,
    ApiJson(patch): ApiJson<Value>,
) -> ApiResult<Json<ApiResponse<T>>> {
    let updated = server.db.repository::<T>().patch(id, &patch).await?;
    Ok(Json(api_success(updated)))
}

pub async fn delete<T: Entity>(
    State(server): State<CareDeskServer>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    server.db.repository::<T>().delete(id).await?;
    tracing::info!(collection = %T::COLLECTION, id = %id, "Record deleted");
    Ok(StatusCode::NO_CONTENT)
}
