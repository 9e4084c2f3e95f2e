use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use shared_models::error::AppError;

use crate::models::{DirectoryError, RegisterDoctorRequest};
use crate::services::{DoctorDirectory, DoctorRegistry};

impl From<DirectoryError> for AppError {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::Validation(msg) => AppError::ValidationError(msg),
            DirectoryError::Duplicate(name) => {
                AppError::Conflict(format!("Doctor '{}' is already registered", name))
            }
            DirectoryError::Persistence(e) => AppError::Database(e.to_string()),
        }
    }
}

#[axum::debug_handler]
pub async fn list_doctors(
    State(registry): State<Arc<DoctorRegistry>>,
) -> Result<Json<Value>, AppError> {
    let doctors = registry.all();

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(registry): State<Arc<DoctorRegistry>>,
    Path(name): Path<String>,
) -> Result<Json<Value>, AppError> {
    let doctor = registry
        .get_by_name(&name)
        .ok_or_else(|| AppError::NotFound(format!("Doctor '{}' not found", name)))?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn register_doctor(
    State(registry): State<Arc<DoctorRegistry>>,
    Json(request): Json<RegisterDoctorRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let doctor = registry.register(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "doctor": doctor,
            "message": format!("{} registered with id {}", doctor.display_name(), doctor.id)
        })),
    ))
}
