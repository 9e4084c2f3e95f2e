// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use shared_models::error::AppError;

use crate::models::{
    AppointmentError, BookAppointmentRequest, BookableItem, QuoteRequest,
    RescheduleAppointmentRequest,
};
use crate::services::AppointmentLedger;

impl From<AppointmentError> for AppError {
    fn from(e: AppointmentError) -> Self {
        match e {
            AppointmentError::Validation(msg) => AppError::ValidationError(msg),
            AppointmentError::NotFound(msg) => AppError::NotFound(msg),
            AppointmentError::Conflict(msg) => AppError::Conflict(msg),
            AppointmentError::InvalidState(msg) => AppError::InvalidState(msg),
            AppointmentError::Persistence(msg) => AppError::Database(msg),
        }
    }
}

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub doctor_name: String,
    pub date: String,
    pub time: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    #[serde(default)]
    pub include_all: bool,
}

// ==============================================================================
// BOOKING AND LIFECYCLE HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(ledger): State<Arc<AppointmentLedger>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let item = BookableItem::try_from(request.item)?;

    let appointment = ledger
        .book(&request.patient_name, &request.doctor_name, &item, &request.date, &request.time)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "appointment": appointment,
            "message": format!("Appointment {} booked", appointment.id)
        })),
    ))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(ledger): State<Arc<AppointmentLedger>>,
    Path(appointment_id): Path<String>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = ledger
        .reschedule(&appointment_id, &request.new_date, &request.new_time)
        .await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": format!("Appointment {} moved to {} at {}", appointment.id, appointment.date, appointment.time)
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(ledger): State<Arc<AppointmentLedger>>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let appointment = ledger.cancel(&appointment_id).await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment cancelled"
    })))
}

#[axum::debug_handler]
pub async fn complete_appointment(
    State(ledger): State<Arc<AppointmentLedger>>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let appointment = ledger.complete(&appointment_id).await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment completed"
    })))
}

// ==============================================================================
// QUERY HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_appointment(
    State(ledger): State<Arc<AppointmentLedger>>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let appointment = ledger.get(&appointment_id).await?;
    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(ledger): State<Arc<AppointmentLedger>>,
) -> Result<Json<Value>, AppError> {
    let appointments = ledger.list_all().await;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_patient_appointments(
    State(ledger): State<Arc<AppointmentLedger>>,
    Path(patient_name): Path<String>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<Value>, AppError> {
    let appointments = ledger.list_by_patient(&patient_name, query.include_all).await;

    Ok(Json(json!({
        "patient_name": patient_name,
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_doctor_appointments(
    State(ledger): State<Arc<AppointmentLedger>>,
    Path(doctor_name): Path<String>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<Value>, AppError> {
    let appointments = ledger.list_by_doctor(&doctor_name, query.include_all).await;

    Ok(Json(json!({
        "doctor_name": doctor_name,
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn check_availability(
    State(ledger): State<Arc<AppointmentLedger>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let check = ledger
        .check_availability(&query.doctor_name, &query.date, &query.time)
        .await;

    Ok(Json(json!({
        "doctor_name": query.doctor_name,
        "date": query.date,
        "time": query.time,
        "available": check.available,
        "reason": check.reason
    })))
}

#[axum::debug_handler]
pub async fn quote_item(
    State(ledger): State<Arc<AppointmentLedger>>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<Value>, AppError> {
    let item = BookableItem::try_from(request.item)?;
    Ok(Json(json!(ledger.quote(&item))))
}
